//! Common utilities and abstractions for services

/// Typed multi-subscriber event publishing
pub mod events;

pub use events::{EventPublisher, HandlerId};
