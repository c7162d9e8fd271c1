//! nowplaying - panel widget core for an MPRIS media player.
//!
//! Mirrors the playback status and current track of one player on the
//! session bus, follows it as it starts and exits, and forwards play/pause,
//! next and previous commands.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nowplaying::services::now_playing::{Config, NowPlayingService};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut service = NowPlayingService::new(Config::default()).await?;
//! service.tracker().on_song_changed(|track| println!("{}", track.title));
//! service.start().await?;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Command-line interface.
pub mod cli;

/// Presentation state of the panel widget.
pub mod panel;

/// Services talking to the session bus.
pub mod services;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{NowPlayingError, Result};
