//! CLI command implementations

pub mod caches;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod status;

pub use caches::execute as caches;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use lifecycle::{activate, deploy, install};
pub use message::{execute as message, purge};
pub use status::execute as status;
