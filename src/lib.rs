pub mod bridge;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod mattermost;
pub mod platform;
pub mod server;
pub mod slack;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BridgeError, Result};
