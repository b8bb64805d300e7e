//! Invalidate command - drop a region or everything

use crate::cache::TtlCache;
use crate::cli::args::InvalidateArgs;
use crate::error::{CacheError, CacheResult};
use crate::ui::{self, UiContext};

/// Execute the invalidate command
pub async fn execute(args: InvalidateArgs, cache: &TtlCache) -> CacheResult<()> {
    let ctx = UiContext::detect();

    let (target, cleared) = if args.all {
        ("all regions".to_string(), cache.invalidate_all().await?)
    } else {
        let region = args
            .region
            .ok_or_else(|| CacheError::User("Specify a region or --all".to_string()))?;
        let cleared = cache.invalidate(&region).await?;
        (region, cleared)
    };

    ui::step_ok(
        &ctx,
        &format!("Invalidated {} entr{} in {}", cleared, plural(cleared), target),
    );

    Ok(())
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}
