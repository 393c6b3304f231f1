//! Render service — owns the font registry → layout → compositor
//! pipeline and turns one validated request into one encoded card.
//!
//! The service also applies the bot's auto-fit rule: start at the
//! configured font size and step down until the wrapped block fits the
//! padded content box, flooring at the minimum size (where the layout
//! engine's truncation policy takes over). Every error is request-
//! scoped; a failed render never touches the font cache or the glyph
//! cache in a way later requests can observe.

use quip_core::{Rect, RenderRequest, RenderedImage};
use quip_layout::{LayoutEngine, LayoutError, LayoutLine};
use quip_render::{ComposeError, Compositor};
use quip_text::{FontError, FontHandle, FontRegistry};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config::BotConfig;

// ── Errors ──────────────────────────────────────────────────────────

/// Request-scoped umbrella over the pipeline's failure modes.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font: {0}")]
    Font(#[from] FontError),

    #[error("layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("compose: {0}")]
    Compose(#[from] ComposeError),
}

// ── Service ─────────────────────────────────────────────────────────

pub struct RenderService {
    config: BotConfig,
    registry: FontRegistry,
    layout: LayoutEngine,
    // The glyph cache makes compose `&mut`; one worker per command is
    // the bot's model, so composes serialize here.
    compositor: Mutex<Compositor>,
}

impl RenderService {
    /// Wire up the pipeline from config. Indexes the font directory;
    /// loads no font data yet.
    pub fn new(config: BotConfig) -> Result<Self, RenderError> {
        let registry = FontRegistry::open(config.fonts_dir())?;
        let compositor = Compositor::new(config.backgrounds_dir());
        Ok(Self {
            config,
            registry,
            layout: LayoutEngine::new(),
            compositor: Mutex::new(compositor),
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Render one validated request into an encoded card.
    pub fn render_image(&self, request: &RenderRequest) -> Result<RenderedImage, RenderError> {
        let content = request.canvas.rect().inset(self.config.padding);
        let (font, lines) = self.fit_layout(&request.text, content)?;

        log::info!(
            "[{}] rendering {} lines at {:.0}px into {}x{}",
            request.id,
            lines.len(),
            font.size(),
            request.canvas.width,
            request.canvas.height,
        );

        let mut compositor = self.compositor.lock().unwrap_or_else(|e| e.into_inner());
        Ok(compositor.compose(request.canvas, &lines, &font, request.theme.as_deref())?)
    }

    /// Choose the largest configured font size whose wrapped block fits
    /// `content`, stepping down from `font_size` to `min_font_size`.
    /// At the floor the truncating layout is accepted as-is.
    fn fit_layout(
        &self,
        text: &str,
        content: Rect,
    ) -> Result<(Arc<FontHandle>, Vec<LayoutLine>), RenderError> {
        let step = self.config.font_size_step;
        let mut size = self.config.font_size;

        loop {
            let font = self.registry.get(&self.config.font_family, size)?;
            let wrapped = self.layout.wrap(text, &font, content.width)?;

            let widest = wrapped.iter().map(|l| l.width).fold(0.0f32, f32::max);
            let block_height = if wrapped.is_empty() {
                0.0
            } else {
                wrapped.len() as f32 * self.layout.line_height(&font)
                    - self.layout.options().leading
            };
            let fits = widest <= content.width && block_height <= content.height;
            let at_floor = step <= 0.0 || size <= self.config.min_font_size;

            if fits || at_floor {
                if !fits {
                    log::debug!(
                        "auto-fit floored at {size:.0}px; block {block_height:.0}px > {:.0}px",
                        content.height,
                    );
                }
                let lines = self.layout.arrange(wrapped, &font, content);
                return Ok((font, lines));
            }
            size = (size - step).max(self.config.min_font_size);
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
