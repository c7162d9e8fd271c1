/// Remote player client abstraction
pub mod client;
/// Playback command facade
pub mod control;
/// Media player error types
pub mod error;
/// Decoding of MPRIS property values
pub mod metadata;
/// Bus name presence watching
pub mod presence;
/// D-Bus proxy trait definitions
pub mod proxy;
/// D-Bus backed player client
pub mod remote;
/// Service wiring
pub mod service;
/// Playback state synchronization
pub mod tracker;
/// Track, status and command types
pub mod types;

#[cfg(test)]
mod tests;

pub use client::*;
pub use control::*;
pub use error::*;
pub use presence::*;
pub use proxy::*;
pub use remote::*;
pub use service::{Config, DEFAULT_OBJECT_PATH, DEFAULT_SERVICE_NAME, NowPlayingService};
pub use tracker::*;
pub use types::*;
