//! Theme table — a closed mapping from theme key to card styling.
//!
//! Each theme names a background (solid color or bundled asset), the
//! text and accent colors, and the outline stroke. Lookup never fails:
//! an unknown key logs a warning and resolves to the default entry, so
//! a typo in a chat message still produces a card.

use quip_core::Rgba;
use std::collections::HashMap;

/// The fallback entry. Always present in [`ThemeTable::builtin`].
pub const DEFAULT_THEME: &str = "classic";

// Card palette.
const ACCENT_ORANGE: Rgba = Rgba::rgb(0xF5, 0xA6, 0x23);
const INK_DARK: Rgba = Rgba::rgb(0x1C, 0x1C, 0x1E);
const PAPER_LIGHT: Rgba = Rgba::rgb(0xF4, 0xF4, 0xF2);
const SLATE_DARK: Rgba = Rgba::rgb(0x1E, 0x1E, 0x20);
const RUST_ACCENT: Rgba = Rgba::rgb(0xC2, 0x41, 0x0C);

/// Where the card background comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Background {
    Solid(Rgba),
    /// A bundled image under the backgrounds asset directory, resized
    /// to the canvas.
    Asset { file: String },
}

/// One theme entry: background plus text styling.
#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    pub background: Background,
    /// Color for every line after the first.
    pub text: Rgba,
    /// Color for the first line.
    pub accent: Rgba,
    pub outline: Rgba,
    /// Outline radius in pixels at the reference font size; zero
    /// disables the outline pass.
    pub outline_width: u32,
}

/// Closed theme lookup table with an explicit default entry.
#[derive(Clone, Debug)]
pub struct ThemeTable {
    themes: HashMap<String, Theme>,
}

impl ThemeTable {
    /// The built-in themes. `classic` reproduces the transparent-card
    /// look: orange first line, white body, heavy black outline.
    pub fn builtin() -> Self {
        let mut themes = HashMap::new();
        for theme in [
            Theme {
                name: "classic".into(),
                background: Background::Solid(Rgba::TRANSPARENT),
                text: Rgba::WHITE,
                accent: ACCENT_ORANGE,
                outline: Rgba::BLACK,
                outline_width: 8,
            },
            Theme {
                name: "dark".into(),
                background: Background::Solid(SLATE_DARK),
                text: Rgba::WHITE,
                accent: ACCENT_ORANGE,
                outline: Rgba::BLACK,
                outline_width: 4,
            },
            Theme {
                name: "light".into(),
                background: Background::Solid(PAPER_LIGHT),
                text: INK_DARK,
                accent: RUST_ACCENT,
                outline: Rgba::WHITE,
                outline_width: 0,
            },
            Theme {
                name: "night".into(),
                background: Background::Asset {
                    file: "night.png".into(),
                },
                text: Rgba::WHITE,
                accent: ACCENT_ORANGE,
                outline: Rgba::BLACK,
                outline_width: 4,
            },
        ] {
            themes.insert(theme.name.clone(), theme);
        }
        Self { themes }
    }

    /// Build a table from explicit entries. `resolve` prefers the
    /// [`DEFAULT_THEME`] key when falling back; a table built without
    /// one falls back to an arbitrary entry instead.
    pub fn from_themes(themes: Vec<Theme>) -> Self {
        Self {
            themes: themes
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.themes.contains_key(&key.trim().to_lowercase())
    }

    /// All theme names (sorted).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a requested key to a theme. `None` or an unknown key
    /// selects the default entry; unknown keys additionally log a
    /// warning. Returns `None` only for an empty table.
    pub fn resolve(&self, key: Option<&str>) -> Option<&Theme> {
        if let Some(key) = key {
            let normalized = key.trim().to_lowercase();
            if let Some(theme) = self.themes.get(&normalized) {
                return Some(theme);
            }
            log::warn!("unknown theme '{key}', falling back to '{DEFAULT_THEME}'");
        }
        self.themes
            .get(DEFAULT_THEME)
            .or_else(|| self.themes.values().next())
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ===================================================================
// Tests
// ===================================================================
