//! Set command - store a fragment from a file or stdin

use crate::cache::TtlCache;
use crate::cli::args::SetArgs;
use crate::error::{CacheError, CacheResult};
use crate::ui::{self, UiContext};
use tokio::fs;
use tokio::io::{self, AsyncReadExt};

/// Execute the set command
pub async fn execute(args: SetArgs, cache: &TtlCache) -> CacheResult<()> {
    let ctx = UiContext::detect();
    let sub = args.sub.as_deref();
    let key = cache.policy().build_key(&args.region, sub)?;

    let content = match &args.file {
        Some(path) => fs::read_to_string(path)
            .await
            .map_err(|e| CacheError::io(format!("reading {}", path.display()), e))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| CacheError::io("reading stdin", e))?;
            buf
        }
    };

    if !cache.is_enabled() {
        ui::step_warn_hint(
            &ctx,
            &format!("Cache is disabled, {} not stored", key),
            "Set cache.enabled = true in config.toml",
        );
        return Ok(());
    }

    cache.set(&args.region, &content, sub).await?;
    ui::step_ok_detail(&ctx, "Cached fragment", &format!("{}, {} bytes", key, content.len()));

    Ok(())
}
