//! Event command - fire a content event by hand

use crate::cache::TtlCache;
use crate::cli::args::EventArgs;
use crate::error::CacheResult;
use crate::ui::{self, UiContext};

/// Execute the event command
pub async fn execute(args: EventArgs, cache: &TtlCache) -> CacheResult<()> {
    let ctx = UiContext::detect();

    if args.event.is_comment() && cache.comment_region().is_none() {
        ui::step_info(
            &ctx,
            &format!("{}: comment events are not wired to a region", args.event),
        );
        return Ok(());
    }

    let cleared = cache.on_event(args.event).await?;
    ui::step_ok_detail(
        &ctx,
        &format!("Handled {}", args.event),
        &format!("{} cleared", cleared),
    );

    Ok(())
}
