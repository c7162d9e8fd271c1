/// Shared service building blocks
pub mod common;
/// MPRIS now playing service
pub mod now_playing;

pub use now_playing::{NowPlayingService, PlaybackStatus, PresenceState, Track};
