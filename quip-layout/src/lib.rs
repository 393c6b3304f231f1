//! # quip-layout
//!
//! Text layout for the quip caption bot: greedy word-wrap driven by
//! glyph advance metrics, block centering, and a configurable
//! vertical-overflow policy.
//!
//! ## Architecture
//!
//! ```text
//! text ──► wrap(text, font, max_width) ──► Vec<WrappedLine>
//!                                               │
//!                                               ▼
//!          arrange within bounds ──► Vec<LayoutLine { x, baseline }>
//!                                               │
//!                                               ▼
//!                                     quip-render (stamps glyphs)
//! ```

pub mod engine;

// Re-exports for ergonomic use.
pub use engine::{LayoutEngine, LayoutError, LayoutLine, LayoutOptions, Overflow, TextAlign, WrappedLine};
