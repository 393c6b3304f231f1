//! # quip-render
//!
//! CPU compositor for the quip caption bot: paints a themed background,
//! stamps laid-out text with an outline effect, and encodes the result
//! to PNG — all in memory, no disk writes.
//!
//! ## Architecture
//!
//! ```text
//!  Vec<LayoutLine> (quip-layout)
//!       │
//!       ▼
//!  ThemeTable.resolve(key)        ◀─── closed mapping, default fallback
//!       │
//!       ▼
//!  Compositor.compose()           ◀─── background → outline → fill
//!       │
//!       ▼
//!  RenderedImage { PNG bytes }
//! ```
//!
//! ## Crate modules
//!
//! - [`theme`] — theme table: background, text/accent/outline colors
//! - [`compositor`] — canvas painting, glyph stamping, PNG encoding

pub mod compositor;
pub mod theme;

// Re-exports for convenience
pub use compositor::{ComposeError, Compositor};
pub use theme::{Background, Theme, ThemeTable, DEFAULT_THEME};
