//! # quip-core
//!
//! Shared vocabulary types for the quip caption bot: geometry, colors,
//! and the request/response pair that crosses the dispatcher → renderer
//! boundary. This crate is the leaf of the workspace — everything else
//! depends on it, it depends on nothing internal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Geometry ────────────────────────────────────────────────────────

/// Axis-aligned rectangle, origin + size convention.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Shrink the rect by `amount` on every side. Width/height clamp at
    /// zero rather than going negative for oversized insets.
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }
}

/// Target canvas dimensions in pixels.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero — nothing can be encoded.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The full canvas as a [`Rect`] at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

// ── Color ───────────────────────────────────────────────────────────

/// 8-bit RGBA color.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parse a `#RRGGBB` or `RRGGBB` hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 {
            return None;
        }
        let parse = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self([parse(0)?, parse(2)?, parse(4)?, 255]))
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }
    pub fn g(&self) -> u8 {
        self.0[1]
    }
    pub fn b(&self) -> u8 {
        self.0[2]
    }
    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

// ── Render request / response ───────────────────────────────────────

/// Encoded image format tag.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
        }
    }
}

/// A validated render request.
///
/// Constructed only by the command dispatcher — by the time one of these
/// exists, the text length and canvas dimensions have already passed the
/// configured bounds checks.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RenderRequest {
    /// Correlation id for log lines belonging to this request.
    pub id: Uuid,
    /// Caption text. May contain `\n` hard breaks.
    pub text: String,
    /// Theme key; `None` selects the configured default.
    pub theme: Option<String>,
    /// Target canvas dimensions.
    pub canvas: CanvasSize,
}

impl RenderRequest {
    pub fn new(text: impl Into<String>, theme: Option<String>, canvas: CanvasSize) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            theme,
            canvas,
        }
    }
}

/// The output artifact of one render call: encoded bytes plus a format
/// tag. Handed straight to the reply sink, never cached.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl RenderedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ===================================================================
// Tests
// ===================================================================
