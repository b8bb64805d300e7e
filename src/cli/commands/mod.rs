//! CLI command implementations

pub mod config;
pub mod event;
pub mod get;
pub mod invalidate;
pub mod set;
pub mod status;

pub use config::execute as config;
pub use event::execute as event;
pub use get::execute as get;
pub use invalidate::execute as invalidate;
pub use set::execute as set;
pub use status::execute as status;
