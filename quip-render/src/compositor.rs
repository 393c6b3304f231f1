//! Compositor — paints the card and encodes it.
//!
//! A compose pass allocates an RGBA canvas, paints the theme
//! background, stamps each laid-out line twice (outline disc pass, then
//! fill pass), and PNG-encodes the buffer. Glyph coverage bitmaps come
//! from the shared [`GlyphCache`], so repeated characters rasterize
//! once. Pixels falling outside the canvas clip silently — over-wide
//! lines shave both edges rather than failing.

use ab_glyph::{Font, GlyphId, ScaleFont};
use image::codecs::png::PngEncoder;
use image::{imageops, ImageEncoder, RgbaImage};
use quip_core::{CanvasSize, ImageFormat, RenderedImage, Rgba};
use quip_layout::LayoutLine;
use quip_text::{FontHandle, GlyphCache};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::theme::{Background, Theme, ThemeTable};

/// Font size at which `Theme::outline_width` applies verbatim; other
/// sizes scale the stroke proportionally (a shrunk caption keeps its
/// relative weight).
const OUTLINE_REFERENCE_SIZE: f32 = 96.0;

/// Bound on cached glyph bitmaps across requests.
const GLYPH_CACHE_CAPACITY: usize = 4096;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("cannot encode a {width}x{height} canvas")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("background asset '{file}' for theme '{theme}' failed to load: {source}")]
    Background {
        theme: String,
        file: String,
        #[source]
        source: image::ImageError,
    },

    #[error("theme table has no entries")]
    NoThemes,

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
}

// ── Compositor ──────────────────────────────────────────────────────

/// Owns the theme table and the glyph raster cache; composes one card
/// per call.
///
/// The cache makes `compose` take `&mut self`; callers that render from
/// multiple tasks serialize access (the bot service wraps the
/// compositor in a `Mutex`). A failed compose never leaves partial
/// state behind — the canvas is local to the call.
pub struct Compositor {
    themes: ThemeTable,
    backgrounds_dir: PathBuf,
    cache: GlyphCache,
}

impl Compositor {
    /// Compositor with the built-in themes, loading background assets
    /// from `backgrounds_dir`.
    pub fn new(backgrounds_dir: impl AsRef<Path>) -> Self {
        Self::with_themes(backgrounds_dir, ThemeTable::builtin())
    }

    pub fn with_themes(backgrounds_dir: impl AsRef<Path>, themes: ThemeTable) -> Self {
        Self {
            themes,
            backgrounds_dir: backgrounds_dir.as_ref().to_path_buf(),
            cache: GlyphCache::new(GLYPH_CACHE_CAPACITY),
        }
    }

    pub fn themes(&self) -> &ThemeTable {
        &self.themes
    }

    /// Compose a card: background, outlined text, PNG bytes.
    ///
    /// Zero lines render the background only. Identical inputs produce
    /// identical bytes. No disk writes besides reading an asset-backed
    /// background.
    pub fn compose(
        &mut self,
        canvas: CanvasSize,
        lines: &[LayoutLine],
        font: &FontHandle,
        theme_key: Option<&str>,
    ) -> Result<RenderedImage, ComposeError> {
        if canvas.is_empty() {
            return Err(ComposeError::EmptyCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }

        let theme = self
            .themes
            .resolve(theme_key)
            .ok_or(ComposeError::NoThemes)?
            .clone();

        let mut img = self.paint_background(canvas, &theme)?;

        let outline = effective_outline(theme.outline_width, font.size());
        let mut glyphs = 0u32;
        for (i, line) in lines.iter().enumerate() {
            let fill = if i == 0 { theme.accent } else { theme.text };
            if outline > 0 {
                glyphs += self.draw_line(&mut img, line, font, theme.outline, outline);
            }
            glyphs += self.draw_line(&mut img, line, font, fill, 0);
        }

        log::debug!(
            "compose: {}x{} theme '{}', {} lines, {} glyph stamps (cache {} hits / {} misses)",
            canvas.width,
            canvas.height,
            theme.name,
            lines.len(),
            glyphs,
            self.cache.hits(),
            self.cache.misses(),
        );

        encode_png(&img)
    }

    /// Allocate the canvas and paint the theme background.
    fn paint_background(
        &self,
        canvas: CanvasSize,
        theme: &Theme,
    ) -> Result<RgbaImage, ComposeError> {
        match &theme.background {
            Background::Solid(color) => Ok(RgbaImage::from_pixel(
                canvas.width,
                canvas.height,
                image::Rgba(color.0),
            )),
            Background::Asset { file } => {
                let path = self.backgrounds_dir.join(file);
                let decoded = image::open(&path)
                    .map_err(|source| ComposeError::Background {
                        theme: theme.name.clone(),
                        file: file.clone(),
                        source,
                    })?
                    .to_rgba8();
                if decoded.dimensions() == (canvas.width, canvas.height) {
                    Ok(decoded)
                } else {
                    Ok(imageops::resize(
                        &decoded,
                        canvas.width,
                        canvas.height,
                        imageops::FilterType::Triangle,
                    ))
                }
            }
        }
    }

    /// Stamp one line's glyphs. With `outline > 0` each bitmap is
    /// stamped at every offset within the outline disc (the outline
    /// pass); with `0` it is stamped once (the fill pass). Returns the
    /// number of glyph stamps placed.
    fn draw_line(
        &mut self,
        img: &mut RgbaImage,
        line: &LayoutLine,
        font: &FontHandle,
        color: Rgba,
        outline: i32,
    ) -> u32 {
        let scaled = font.face().as_scaled(font.scale());
        let baseline = line.baseline.round() as i32;
        let mut pen_x = line.x;
        let mut prev: Option<GlyphId> = None;
        let mut stamps = 0u32;

        for ch in line.text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                pen_x += scaled.kern(prev, id);
            }
            if let Some(bitmap) = self.cache.get_or_rasterize(font, id) {
                let origin_x = pen_x.round() as i32 + bitmap.left;
                let origin_y = baseline + bitmap.top;
                if outline > 0 {
                    for dy in -outline..=outline {
                        for dx in -outline..=outline {
                            if dx * dx + dy * dy <= outline * outline {
                                stamp(img, &bitmap, origin_x + dx, origin_y + dy, color);
                                stamps += 1;
                            }
                        }
                    }
                } else {
                    stamp(img, &bitmap, origin_x, origin_y, color);
                    stamps += 1;
                }
            }
            pen_x += scaled.h_advance(id);
            prev = Some(id);
        }
        stamps
    }
}

/// Scale the theme's outline width to the actual font size, keeping at
/// least a 1px stroke for any nonzero configuration.
fn effective_outline(base: u32, size: f32) -> i32 {
    if base == 0 {
        return 0;
    }
    ((base as f32 * size / OUTLINE_REFERENCE_SIZE).round() as i32).max(1)
}

/// Alpha-blend a coverage bitmap onto the canvas at (x, y), clipping at
/// the canvas edges.
fn stamp(img: &mut RgbaImage, bitmap: &quip_text::GlyphBitmap, x: i32, y: i32, color: Rgba) {
    let (img_w, img_h) = img.dimensions();
    for row in 0..bitmap.height {
        let py = y + row as i32;
        if py < 0 || py >= img_h as i32 {
            continue;
        }
        for col in 0..bitmap.width {
            let px = x + col as i32;
            if px < 0 || px >= img_w as i32 {
                continue;
            }
            let coverage = bitmap.coverage[(row * bitmap.width + col) as usize];
            if coverage == 0 {
                continue;
            }
            blend(img.get_pixel_mut(px as u32, py as u32), color, coverage);
        }
    }
}

/// Source-over blend of `color` at `coverage` onto one pixel.
fn blend(dst: &mut image::Rgba<u8>, color: Rgba, coverage: u8) {
    let alpha = coverage as u32 * color.a() as u32 / 255;
    if alpha == 0 {
        return;
    }
    let inv = 255 - alpha;
    for i in 0..3 {
        dst.0[i] = ((color.0[i] as u32 * alpha + dst.0[i] as u32 * inv) / 255) as u8;
    }
    dst.0[3] = (alpha + dst.0[3] as u32 * inv / 255) as u8;
}

fn encode_png(img: &RgbaImage) -> Result<RenderedImage, ComposeError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(RenderedImage {
        bytes,
        format: ImageFormat::Png,
    })
}

// ===================================================================
// Tests
// ===================================================================
