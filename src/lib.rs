//! Fragcache - File-backed TTL fragment cache
//!
//! Stores rendered page fragments under region keys, serves them while
//! fresh and drops whole regions when the underlying content changes.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod log;
pub mod store;
pub mod ui;

pub use cache::{ContentEvent, KeyPolicy, Lookup, MissReason, Region, TtlCache};
pub use error::{CacheError, CacheResult};
pub use factory::open_cache;
