//! # quip-text
//!
//! Font handling for the quip caption bot: bundled-font discovery and
//! loading, per-size handles with glyph metrics, and an LRU cache of
//! rasterized coverage bitmaps for the compositor to stamp.
//!
//! ## Architecture
//!
//! ```text
//! FontRegistry (bundled font dir, indexed by file stem)
//!     │
//!     ▼
//! get(family, size) ──► Arc<FontHandle>   (memoized per (family, size))
//!     │                        │
//!     ▼                        ▼
//! GlyphCache ◄── coverage ── measure() / glyph advances
//! ```
//!
//! - **`fonts`** — registry, handles, metrics, load errors.
//! - **`raster`** — glyph coverage rasterization with LRU reuse.

pub mod fonts;
pub mod raster;

// Re-exports for ergonomic use.
pub use fonts::{FontError, FontHandle, FontRegistry};
pub use raster::{GlyphBitmap, GlyphCache};
