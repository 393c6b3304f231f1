//! Layout engine — greedy word-wrap and block placement.
//!
//! Wrapping accumulates words onto the current line while the measured
//! width of the candidate line (advances + kerning, via the font
//! handle) stays within the limit; the overflowing word starts the next
//! line. A single word wider than the limit sits alone on its own line
//! — no hyphenation. Placement stacks lines at the font's line height
//! plus leading, centers the block in the target bounds, and truncates
//! trailing lines that fall outside (policy-controlled).

use quip_core::Rect;
use quip_text::FontHandle;
use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid font handle for '{family}': {reason}")]
    InvalidFont { family: String, reason: String },
}

// ── Policy ──────────────────────────────────────────────────────────

/// Horizontal placement of each line within the bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// What to do when the stacked block is taller than the bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    /// Drop trailing lines that do not fit. At least one line survives
    /// when any line was produced, so the output stays renderable.
    #[default]
    Truncate,
    /// Keep every line; the compositor clips out-of-canvas pixels.
    Clip,
}

/// Tunable layout policy. The defaults match the bot's card style.
#[derive(Clone, Copy, Debug)]
pub struct LayoutOptions {
    /// Extra vertical space between lines, on top of the font's own
    /// line height.
    pub leading: f32,
    pub align: TextAlign,
    pub overflow: Overflow,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            leading: 4.0,
            align: TextAlign::Center,
            overflow: Overflow::Truncate,
        }
    }
}

// ── Output ──────────────────────────────────────────────────────────

/// A wrapped line before placement: substring and measured width.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32,
}

/// A placed line: substring, horizontal offset, vertical baseline, and
/// measured width. Consumed by the compositor, never persisted.
#[derive(Clone, Debug)]
pub struct LayoutLine {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
}

// ── Engine ──────────────────────────────────────────────────────────

/// Stateless layout engine parameterized by [`LayoutOptions`].
#[derive(Clone, Debug, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Baseline-to-baseline distance used when stacking lines.
    pub fn line_height(&self, font: &FontHandle) -> f32 {
        font.line_height() + self.options.leading
    }

    /// Greedy word-wrap of `text` to `max_width`.
    ///
    /// `\n` is a hard break; blank segments collapse. Empty or
    /// whitespace-only input yields zero lines. Never fails on text
    /// length — only on a degenerate font handle.
    pub fn wrap(
        &self,
        text: &str,
        font: &FontHandle,
        max_width: f32,
    ) -> Result<Vec<WrappedLine>, LayoutError> {
        check_font(font)?;

        let mut lines = Vec::new();
        for segment in text.split('\n') {
            let mut current = String::new();
            for word in segment.split_whitespace() {
                if current.is_empty() {
                    // First word always starts the line, even when it is
                    // wider than max_width on its own.
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if font.measure(&candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(WrappedLine {
                        width: font.measure(&current),
                        text: std::mem::take(&mut current),
                    });
                    current.push_str(word);
                }
            }
            if !current.is_empty() {
                lines.push(WrappedLine {
                    width: font.measure(&current),
                    text: current,
                });
            }
        }
        Ok(lines)
    }

    /// Wrap `text` to `bounds.width` and place the resulting block
    /// centered within `bounds`, truncating vertical overflow per the
    /// configured policy.
    pub fn layout(
        &self,
        text: &str,
        font: &FontHandle,
        bounds: Rect,
    ) -> Result<Vec<LayoutLine>, LayoutError> {
        let wrapped = self.wrap(text, font, bounds.width)?;
        Ok(self.arrange(wrapped, font, bounds))
    }

    /// Place already-wrapped lines within `bounds`.
    pub fn arrange(
        &self,
        wrapped: Vec<WrappedLine>,
        font: &FontHandle,
        bounds: Rect,
    ) -> Vec<LayoutLine> {
        if wrapped.is_empty() {
            return Vec::new();
        }

        let line_height = self.line_height(font);
        let mut visible = wrapped.len();

        if self.options.overflow == Overflow::Truncate {
            // Largest n with n * line_height - leading <= bounds.height,
            // floored at one line so the output stays renderable.
            let capacity =
                (((bounds.height + self.options.leading) / line_height).floor() as usize).max(1);
            if capacity < visible {
                log::debug!(
                    "layout: truncating {} of {} lines to fit {:.0}px",
                    visible - capacity,
                    visible,
                    bounds.height,
                );
                visible = capacity;
            }
        }

        let block_height = visible as f32 * line_height - self.options.leading;
        let top = bounds.y + ((bounds.height - block_height) / 2.0).max(0.0);

        wrapped
            .into_iter()
            .take(visible)
            .enumerate()
            .map(|(i, line)| {
                let x = match self.options.align {
                    TextAlign::Left => bounds.x,
                    // An over-wide line centers into negative offsets and
                    // clips symmetrically at the compositor.
                    TextAlign::Center => bounds.x + (bounds.width - line.width) / 2.0,
                    TextAlign::Right => bounds.x + bounds.width - line.width,
                };
                LayoutLine {
                    x,
                    baseline: top + font.ascent() + i as f32 * line_height,
                    width: line.width,
                    text: line.text,
                }
            })
            .collect()
    }
}

/// A handle with zero or non-finite metrics cannot place a baseline.
fn check_font(font: &FontHandle) -> Result<(), LayoutError> {
    if !(font.size() > 0.0) || !font.size().is_finite() {
        return Err(LayoutError::InvalidFont {
            family: font.family().to_string(),
            reason: format!("non-positive size {}", font.size()),
        });
    }
    if !(font.ascent() > 0.0) || !font.height().is_finite() {
        return Err(LayoutError::InvalidFont {
            family: font.family().to_string(),
            reason: format!("degenerate metrics (ascent {})", font.ascent()),
        });
    }
    Ok(())
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quip_text::FontRegistry;
    use std::sync::Arc;

    fn font_at(size: f32) -> Arc<FontHandle> {
        let reg = FontRegistry::open(concat!(env!("CARGO_MANIFEST_DIR"), "/../assets/fonts"))
            .expect("bundled font dir");
        reg.get("dejavusans", size).expect("bundled font")
    }

    #[test]
    fn test_wrap_empty_text() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        assert!(engine.wrap("", &font, 400.0).unwrap().is_empty());
        assert!(engine.wrap("   \n  ", &font, 400.0).unwrap().is_empty());
    }

    #[test]
    fn test_wrap_single_short_line() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let lines = engine.wrap("Hello world", &font, 400.0).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert!(lines[0].width <= 400.0);
    }

    #[test]
    fn test_wrap_respects_max_width() {
        let font = font_at(40.0);
        let engine = LayoutEngine::new();
        let lines = engine
            .wrap("Hello world, this is a caption", &font, 400.0)
            .unwrap();
        assert!(lines.len() >= 2, "expected a wrap, got {lines:?}");
        for line in &lines {
            assert!(
                line.width <= 400.0,
                "line '{}' measures {} > 400",
                line.text,
                line.width,
            );
            // Stored width is the measured width of the substring.
            assert!((line.width - font.measure(&line.text)).abs() < 0.01);
        }
        // No words lost in the wrap.
        let rejoined: Vec<&str> = lines
            .iter()
            .flat_map(|l| l.text.split_whitespace())
            .collect();
        let original: Vec<&str> = "Hello world, this is a caption".split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_oversized_word_sits_alone() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let word = "x".repeat(1000);
        let lines = engine.wrap(&word, &font, 400.0).unwrap();
        assert_eq!(lines.len(), 1, "no hyphenation: one oversized line");
        assert_eq!(lines[0].text, word);
        assert!(lines[0].width > 400.0, "documented exception: wider than max");
    }

    #[test]
    fn test_oversized_word_between_words() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let long = "y".repeat(400);
        let text = format!("tiny {long} tiny");
        let lines = engine.wrap(&text, &font, 300.0).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, long);
        assert!(lines[1].width > 300.0);
        assert!(lines[0].width <= 300.0);
        assert!(lines[2].width <= 300.0);
    }

    #[test]
    fn test_hard_breaks_preserved() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let lines = engine.wrap("top line\nbottom line", &font, 4000.0).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "top line");
        assert_eq!(lines[1].text, "bottom line");
    }

    #[test]
    fn test_layout_centers_block() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let bounds = Rect::new(0.0, 0.0, 400.0, 200.0);
        let lines = engine.layout("Hi", &font, bounds).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        // Horizontally centered.
        let right_gap = 400.0 - (line.x + line.width);
        assert!((line.x - right_gap).abs() < 0.5, "x={} gap={right_gap}", line.x);
        // Vertically centered: baseline sits below the vertical middle
        // (ascent above it, descent below).
        assert!(line.baseline > 80.0 && line.baseline < 130.0, "baseline={}", line.baseline);
    }

    #[test]
    fn test_layout_baselines_increase_by_line_height() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let bounds = Rect::new(0.0, 0.0, 100.0, 1000.0);
        let lines = engine.layout("one two three four five", &font, bounds).unwrap();
        assert!(lines.len() >= 2);
        let expected = engine.line_height(&font);
        for pair in lines.windows(2) {
            let step = pair[1].baseline - pair[0].baseline;
            assert!((step - expected).abs() < 0.01, "step {step} != {expected}");
        }
    }

    #[test]
    fn test_layout_truncates_vertical_overflow() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let line_height = engine.line_height(&font);
        // Room for exactly two lines.
        let bounds = Rect::new(0.0, 0.0, 10.0, line_height * 2.0);
        let lines = engine
            .layout("alpha beta gamma delta epsilon", &font, bounds)
            .unwrap();
        // Narrow width puts each word on its own line; only two fit.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "alpha");
        assert_eq!(lines[1].text, "beta");
    }

    #[test]
    fn test_layout_keeps_one_line_on_tiny_canvas() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let bounds = Rect::new(0.0, 0.0, 400.0, 5.0);
        let lines = engine.layout("still here", &font, bounds).unwrap();
        assert_eq!(lines.len(), 1, "never truncate to nothing");
    }

    #[test]
    fn test_layout_clip_policy_keeps_all_lines() {
        let font = font_at(24.0);
        let engine = LayoutEngine::with_options(LayoutOptions {
            overflow: Overflow::Clip,
            ..Default::default()
        });
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let lines = engine
            .layout("alpha beta gamma delta", &font, bounds)
            .unwrap();
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_layout_left_align() {
        let font = font_at(24.0);
        let engine = LayoutEngine::with_options(LayoutOptions {
            align: TextAlign::Left,
            ..Default::default()
        });
        let bounds = Rect::new(20.0, 0.0, 400.0, 200.0);
        let lines = engine.layout("Hi", &font, bounds).unwrap();
        assert_eq!(lines[0].x, 20.0);
    }

    #[test]
    fn test_layout_empty_is_empty() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let lines = engine
            .layout("", &font, Rect::new(0.0, 0.0, 400.0, 200.0))
            .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_layout_deterministic() {
        let font = font_at(24.0);
        let engine = LayoutEngine::new();
        let bounds = Rect::new(0.0, 0.0, 300.0, 150.0);
        let a = engine.layout("same input same output", &font, bounds).unwrap();
        let b = engine.layout("same input same output", &font, bounds).unwrap();
        assert_eq!(a.len(), b.len());
        for (la, lb) in a.iter().zip(&b) {
            assert_eq!(la.text, lb.text);
            assert_eq!(la.x, lb.x);
            assert_eq!(la.baseline, lb.baseline);
        }
    }
}
