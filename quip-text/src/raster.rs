//! Glyph raster cache — LRU-bounded store of rasterized coverage
//! bitmaps.
//!
//! Rasterizing a glyph outline is the expensive part of drawing text on
//! the CPU; the same few dozen glyphs recur across requests at the same
//! handful of sizes. Each bitmap is a `width × height` alpha-coverage
//! plane plus the placement offsets needed to stamp it at a pen
//! position on a baseline. Glyphs with no outline (spaces) cache as
//! `None` so whitespace never re-enters the rasterizer.

use ab_glyph::{point, Font, GlyphId};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::fonts::FontHandle;

/// Cache key: (registry face id, glyph id, size bit pattern).
type GlyphKey = (u32, u16, u32);

/// A rasterized glyph: alpha coverage plus placement offsets.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub left: i32,
    /// Vertical offset from the baseline to the bitmap's top edge
    /// (negative for anything rising above the baseline).
    pub top: i32,
    /// Row-major alpha coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// LRU cache of rasterized glyphs.
pub struct GlyphCache {
    cache: LruCache<GlyphKey, Option<Arc<GlyphBitmap>>>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    /// Create a cache holding up to `capacity` glyph entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Number of cached entries (including cached empty glyphs).
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Fetch the bitmap for `glyph` in `font`, rasterizing on miss.
    ///
    /// Returns `None` for glyphs with no outline (whitespace, missing
    /// glyphs) — the caller advances the pen and draws nothing.
    pub fn get_or_rasterize(
        &mut self,
        font: &FontHandle,
        glyph: GlyphId,
    ) -> Option<Arc<GlyphBitmap>> {
        let key: GlyphKey = (font.face_id(), glyph.0, font.size().to_bits());
        if let Some(entry) = self.cache.get(&key) {
            self.hits += 1;
            return entry.clone();
        }
        self.misses += 1;
        let entry = rasterize(font, glyph);
        self.cache.put(key, entry.clone());
        entry
    }
}

/// Rasterize one glyph at the handle's size, positioned at the origin so
/// the bitmap offsets are relative to (pen_x, baseline).
fn rasterize(font: &FontHandle, id: GlyphId) -> Option<Arc<GlyphBitmap>> {
    let glyph = id.with_scale_and_position(font.scale(), point(0.0, 0.0));
    let outlined = font.face().outline_glyph(glyph)?;
    let bounds = outlined.px_bounds();

    let width = bounds.width() as u32;
    let height = bounds.height() as u32;
    if width == 0 || height == 0 {
        return None;
    }

    let mut coverage = vec![0u8; (width * height) as usize];
    outlined.draw(|x, y, c| {
        if x < width && y < height {
            coverage[(y * width + x) as usize] = (c * 255.0) as u8;
        }
    });

    Some(Arc::new(GlyphBitmap {
        width,
        height,
        left: bounds.min.x as i32,
        top: bounds.min.y as i32,
        coverage,
    }))
}

// ===================================================================
// Tests
// ===================================================================
