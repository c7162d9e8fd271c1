pub mod player;
pub mod status;
pub mod watch;
