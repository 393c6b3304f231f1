//! # quip-bot
//!
//! The bot-facing layer: configuration, the command dispatcher that
//! turns untrusted chat messages into validated render requests, and
//! the render service that owns the font registry → layout → compositor
//! pipeline. The binary in `main.rs` is a console stand-in for the chat
//! transport.

pub mod config;
pub mod dispatch;
pub mod service;

// Re-exports for ergonomic use.
pub use config::{BotConfig, ConfigError};
pub use dispatch::{Dispatcher, ValidationError};
pub use service::{RenderError, RenderService};
