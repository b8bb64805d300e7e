//! Get command - print a cached fragment

use crate::cache::{Lookup, MissReason, TtlCache};
use crate::cli::args::GetArgs;
use crate::error::{CacheError, CacheResult};
use tokio::io::{self, AsyncWriteExt};
use tracing::debug;

/// Execute the get command
pub async fn execute(args: GetArgs, cache: &TtlCache) -> CacheResult<()> {
    let sub = args.sub.as_deref();
    let key = cache.policy().build_key(&args.region, sub)?;

    match cache.lookup(&args.region, sub).await? {
        Lookup::Hit(content) => {
            let mut stdout = io::stdout();
            stdout
                .write_all(content.as_bytes())
                .await
                .map_err(|e| CacheError::io("writing to stdout", e))?;
            stdout
                .flush()
                .await
                .map_err(|e| CacheError::io("flushing stdout", e))?;
            Ok(())
        }
        Lookup::Miss(reason) => {
            debug!("Miss for {}: {}", key, describe(&reason));
            Err(CacheError::CacheMiss(format!("{} ({})", key, describe(&reason))))
        }
    }
}

fn describe(reason: &MissReason) -> String {
    match reason {
        MissReason::Disabled => "cache disabled".to_string(),
        MissReason::Absent => "absent".to_string(),
        MissReason::Stale => "stale".to_string(),
        MissReason::ContentMissing => "content missing".to_string(),
        MissReason::Failed(e) => format!("store failure: {}", e),
    }
}
