//! Command dispatcher — the validation gate between untrusted chat
//! messages and the render pipeline.
//!
//! Everything downstream trusts the `RenderRequest` it receives, so
//! length and canvas bounds are enforced here, before any font load or
//! layout work happens. A rejected message costs a string scan and
//! nothing else.
//!
//! Message shape:
//!
//! ```text
//! [/card] [theme=<key>] [size=<W>x<H>] caption text...
//! ```
//!
//! Directives are only recognized at the front of the message; the rest
//! is the caption verbatim (including hard line breaks).

use quip_core::{CanvasSize, RenderRequest};
use thiserror::Error;

use crate::config::BotConfig;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("message has no caption text")]
    Empty,

    #[error("caption is {len} characters, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("bad size directive '{given}', expected WIDTHxHEIGHT")]
    BadSize { given: String },

    #[error("canvas {width}x{height} is outside the allowed {min}..={max} per side")]
    CanvasBounds {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },
}

// ── Dispatcher ──────────────────────────────────────────────────────

/// Parses raw chat messages into validated [`RenderRequest`]s.
pub struct Dispatcher {
    config: BotConfig,
}

impl Dispatcher {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }

    /// Parse and validate one message. This is the only constructor of
    /// [`RenderRequest`]s in the bot.
    pub fn parse(&self, raw: &str) -> Result<RenderRequest, ValidationError> {
        let mut rest = raw.trim();
        if let Some(stripped) = rest.strip_prefix("/card") {
            rest = stripped.trim_start();
        }

        let mut theme: Option<String> = None;
        let mut canvas = self.config.default_canvas;

        // Leading directives only; the first plain token ends the scan.
        while let Some(token) = rest.split_whitespace().next() {
            if let Some(value) = token.strip_prefix("theme=") {
                theme = Some(value.to_string());
            } else if let Some(value) = token.strip_prefix("size=") {
                canvas = parse_size(value)?;
            } else {
                break;
            }
            rest = rest[token.len()..].trim_start();
        }

        let text = rest.trim();
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }
        let len = text.chars().count();
        if len > self.config.max_text_len {
            return Err(ValidationError::TooLong {
                len,
                max: self.config.max_text_len,
            });
        }
        self.check_canvas(canvas)?;

        Ok(RenderRequest::new(
            text,
            theme.or_else(|| Some(self.config.default_theme.clone())),
            canvas,
        ))
    }

    fn check_canvas(&self, canvas: CanvasSize) -> Result<(), ValidationError> {
        let (min, max) = (self.config.min_canvas, self.config.max_canvas);
        let in_bounds = |side: u32| (min..=max).contains(&side);
        if !in_bounds(canvas.width) || !in_bounds(canvas.height) {
            return Err(ValidationError::CanvasBounds {
                width: canvas.width,
                height: canvas.height,
                min,
                max,
            });
        }
        Ok(())
    }
}

fn parse_size(value: &str) -> Result<CanvasSize, ValidationError> {
    let bad = || ValidationError::BadSize {
        given: value.to_string(),
    };
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(bad)?;
    let width = w.parse::<u32>().map_err(|_| bad())?;
    let height = h.parse::<u32>().map_err(|_| bad())?;
    Ok(CanvasSize::new(width, height))
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(BotConfig::default())
    }

    #[test]
    fn test_plain_message() {
        let request = dispatcher().parse("hello there").unwrap();
        assert_eq!(request.text, "hello there");
        assert_eq!(request.theme.as_deref(), Some("classic"));
        assert_eq!(request.canvas, BotConfig::default().default_canvas);
    }

    #[test]
    fn test_card_prefix_stripped() {
        let request = dispatcher().parse("/card hello").unwrap();
        assert_eq!(request.text, "hello");
    }

    #[test]
    fn test_theme_directive() {
        let request = dispatcher().parse("theme=dark hello").unwrap();
        assert_eq!(request.theme.as_deref(), Some("dark"));
        assert_eq!(request.text, "hello");
    }

    #[test]
    fn test_size_directive() {
        let request = dispatcher().parse("size=400x200 hello").unwrap();
        assert_eq!(request.canvas, CanvasSize::new(400, 200));
        assert_eq!(request.text, "hello");
    }

    #[test]
    fn test_combined_directives() {
        let request = dispatcher()
            .parse("/card theme=night size=800X400 hello world")
            .unwrap();
        assert_eq!(request.theme.as_deref(), Some("night"));
        assert_eq!(request.canvas, CanvasSize::new(800, 400));
        assert_eq!(request.text, "hello world");
    }

    #[test]
    fn test_directive_after_text_is_caption() {
        let request = dispatcher().parse("hello theme=dark").unwrap();
        assert_eq!(request.text, "hello theme=dark");
        assert_eq!(request.theme.as_deref(), Some("classic"));
    }

    #[test]
    fn test_hard_breaks_survive() {
        let request = dispatcher().parse("top line\nbottom line").unwrap();
        assert_eq!(request.text, "top line\nbottom line");
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(matches!(dispatcher().parse(""), Err(ValidationError::Empty)));
        assert!(matches!(dispatcher().parse("   "), Err(ValidationError::Empty)));
        assert!(matches!(
            dispatcher().parse("/card theme=dark"),
            Err(ValidationError::Empty),
        ));
    }

    #[test]
    fn test_too_long_rejected() {
        let long = "x".repeat(281);
        match dispatcher().parse(&long) {
            Err(ValidationError::TooLong { len, max }) => {
                assert_eq!(len, 281);
                assert_eq!(max, 280);
            }
            other => panic!("expected TooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 280 multibyte characters are exactly at the limit.
        let text = "ß".repeat(280);
        assert!(dispatcher().parse(&text).is_ok());
    }

    #[test]
    fn test_bad_size_rejected() {
        assert!(matches!(
            dispatcher().parse("size=banana hello"),
            Err(ValidationError::BadSize { .. }),
        ));
        assert!(matches!(
            dispatcher().parse("size=400 hello"),
            Err(ValidationError::BadSize { .. }),
        ));
        assert!(matches!(
            dispatcher().parse("size=-4x200 hello"),
            Err(ValidationError::BadSize { .. }),
        ));
    }

    #[test]
    fn test_canvas_bounds_rejected() {
        assert!(matches!(
            dispatcher().parse("size=0x0 hello"),
            Err(ValidationError::CanvasBounds { .. }),
        ));
        assert!(matches!(
            dispatcher().parse("size=10x400 hello"),
            Err(ValidationError::CanvasBounds { .. }),
        ));
        assert!(matches!(
            dispatcher().parse("size=4096x400 hello"),
            Err(ValidationError::CanvasBounds { .. }),
        ));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let request = dispatcher().parse("size=64x2048 hello").unwrap();
        assert_eq!(request.canvas, CanvasSize::new(64, 2048));
    }
}
