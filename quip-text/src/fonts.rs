//! Font registry — bundled-font indexing, lazy loading, and memoized
//! per-size handles.
//!
//! The bot ships its fonts in an asset directory; each `.ttf`/`.otf`
//! file is addressed by its lowercased file stem (the logical family
//! name). Parsing happens lazily on first request and the resulting
//! [`FontHandle`] is memoized by (family, size) for the process
//! lifetime. Loads run under the cache write lock, so a race to load
//! the same family resolves to exactly one file read — the losers
//! observe the completed handle, never a partial one.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FontError {
    #[error("unknown font family '{family}'")]
    NotFound { family: String },

    #[error("font directory {dir:?} is not readable: {source}")]
    Directory {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read font file for '{family}': {source}")]
    Io {
        family: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed font file for '{family}': {source}")]
    Malformed {
        family: String,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

// ── Font handle ─────────────────────────────────────────────────────

/// A loaded font face at a specific pixel size.
///
/// Immutable once created. Carries the vertical metrics precomputed at
/// the handle's size, plus the parsed face for advance/kern queries and
/// rasterization. `face_id` is a registry-assigned identifier used to
/// key the glyph raster cache.
pub struct FontHandle {
    family: String,
    size: f32,
    face_id: u32,
    ascent: f32,
    /// Negative, per font conventions (distance below the baseline).
    descent: f32,
    line_gap: f32,
    face: FontArc,
}

impl FontHandle {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn face_id(&self) -> u32 {
        self.face_id
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn descent(&self) -> f32 {
        self.descent
    }

    pub fn line_gap(&self) -> f32 {
        self.line_gap
    }

    pub fn scale(&self) -> PxScale {
        PxScale::from(self.size)
    }

    pub fn face(&self) -> &FontArc {
        &self.face
    }

    /// Glyph height at this size (ascent − descent).
    pub fn height(&self) -> f32 {
        self.ascent - self.descent
    }

    /// Baseline-to-baseline distance before any extra leading.
    pub fn line_height(&self) -> f32 {
        self.height() + self.line_gap
    }

    pub fn glyph_id(&self, c: char) -> GlyphId {
        self.face.glyph_id(c)
    }

    /// Measure a string by summing glyph advances plus kerning. This is
    /// the width the layout engine wraps against — no rasterization.
    pub fn measure(&self, text: &str) -> f32 {
        let scaled = self.face.as_scaled(self.scale());
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.face.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Advance width of a single character (no kerning context).
    pub fn advance(&self, c: char) -> f32 {
        let scaled = self.face.as_scaled(self.scale());
        scaled.h_advance(self.face.glyph_id(c))
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("family", &self.family)
            .field("size", &self.size)
            .field("face_id", &self.face_id)
            .field("ascent", &self.ascent)
            .field("descent", &self.descent)
            .finish()
    }
}

// ── Registry ────────────────────────────────────────────────────────

/// Memoization key: (lowercased family, size bit pattern).
type HandleKey = (String, u32);

#[derive(Clone)]
struct LoadedFace {
    id: u32,
    face: FontArc,
}

#[derive(Default)]
struct CacheInner {
    /// Family → parsed face. One entry per backing-file read.
    faces: HashMap<String, LoadedFace>,
    /// (family, size) → completed handle.
    handles: HashMap<HandleKey, Arc<FontHandle>>,
}

/// Registry over a directory of bundled font files.
///
/// The directory is indexed once at [`FontRegistry::open`]; font data is
/// read and parsed lazily on the first [`get`](FontRegistry::get) for a
/// family, then shared by every subsequent handle at any size.
pub struct FontRegistry {
    dir: PathBuf,
    /// Family name (lowercase file stem) → font file path.
    index: HashMap<String, PathBuf>,
    cache: RwLock<CacheInner>,
    /// Number of backing-file reads performed (diagnostics; tests assert
    /// the at-most-once load guarantee through this).
    loads: AtomicUsize,
}

impl FontRegistry {
    /// Index the font directory. Cheap — reads directory entries only,
    /// no font data.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, FontError> {
        let dir = dir.as_ref().to_path_buf();
        let start = Instant::now();

        let entries = std::fs::read_dir(&dir).map_err(|source| FontError::Directory {
            dir: dir.clone(),
            source,
        })?;

        let mut index = HashMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if !is_font {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                index.insert(stem.to_lowercase(), path.clone());
            }
        }

        log::info!(
            "FontRegistry: indexed {} families in {:?} ({:.1}ms)",
            index.len(),
            dir,
            start.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(Self {
            dir,
            index,
            cache: RwLock::new(CacheInner::default()),
            loads: AtomicUsize::new(0),
        })
    }

    /// Number of font families available.
    pub fn family_count(&self) -> usize {
        self.index.len()
    }

    /// All available family names (sorted).
    pub fn all_families(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether a family is available.
    pub fn has_family(&self, name: &str) -> bool {
        self.index.contains_key(&name.trim().to_lowercase())
    }

    /// Number of backing-file reads performed so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Get (loading and memoizing if necessary) the handle for a family
    /// at a pixel size.
    pub fn get(&self, family: &str, size: f32) -> Result<Arc<FontHandle>, FontError> {
        let family = family.trim().to_lowercase();
        let key: HandleKey = (family, size.to_bits());

        // Fast path: completed handle under the read lock.
        {
            let inner = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(handle) = inner.handles.get(&key) {
                return Ok(handle.clone());
            }
        }

        // Slow path: load under the write lock so at most one loader
        // wins; racers blocked here observe the completed entry on the
        // re-check below.
        let mut inner = self.cache.write().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = inner.handles.get(&key) {
            return Ok(handle.clone());
        }

        let loaded = match inner.faces.get(&key.0).cloned() {
            Some(face) => face,
            None => {
                let face = self.load_face(&key.0)?;
                inner.faces.insert(key.0.clone(), face.clone());
                face
            }
        };

        let scaled = loaded.face.as_scaled(PxScale::from(size));
        let (ascent, descent, line_gap) = (scaled.ascent(), scaled.descent(), scaled.line_gap());
        let handle = Arc::new(FontHandle {
            family: key.0.clone(),
            size,
            face_id: loaded.id,
            ascent,
            descent,
            line_gap,
            face: loaded.face,
        });
        inner.handles.insert(key, handle.clone());
        Ok(handle)
    }

    /// Read and parse a family's backing file. Called with the write
    /// lock held.
    fn load_face(&self, family: &str) -> Result<LoadedFace, FontError> {
        let path = self.index.get(family).ok_or_else(|| FontError::NotFound {
            family: family.to_string(),
        })?;

        let start = Instant::now();
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            family: family.to_string(),
            source,
        })?;
        let face = FontArc::try_from_vec(bytes).map_err(|source| FontError::Malformed {
            family: family.to_string(),
            source,
        })?;

        let id = self.loads.fetch_add(1, Ordering::Relaxed) as u32;
        log::info!(
            "FontRegistry: loaded '{}' from {:?} ({:.1}ms)",
            family,
            path,
            start.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(LoadedFace { id, face })
    }
}

impl fmt::Display for FontRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FontRegistry({} families in {:?}, {} loaded)",
            self.index.len(),
            self.dir,
            self.load_count(),
        )
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_font_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../assets/fonts"))
    }

    fn registry() -> FontRegistry {
        FontRegistry::open(test_font_dir()).expect("bundled font dir should open")
    }

    #[test]
    fn test_open_indexes_bundled_fonts() {
        let reg = registry();
        assert!(reg.family_count() >= 2, "expected bundled DejaVu faces");
        assert!(reg.has_family("dejavusans"));
        assert!(reg.has_family("dejavusans-bold"));
        // Indexing alone reads no font data.
        assert_eq!(reg.load_count(), 0);
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let err = FontRegistry::open("/nonexistent/font/dir");
        assert!(matches!(err, Err(FontError::Directory { .. })));
    }

    #[test]
    fn test_get_unknown_family() {
        let reg = registry();
        let err = reg.get("comic-sans-9000", 24.0);
        assert!(matches!(err, Err(FontError::NotFound { .. })));
        assert_eq!(reg.load_count(), 0);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let reg = registry();
        let a = reg.get("DejaVuSans", 24.0).unwrap();
        let b = reg.get("  dejavusans ", 24.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_handle_metrics_sane() {
        let reg = registry();
        let font = reg.get("dejavusans", 24.0).unwrap();
        assert!(font.ascent() > 0.0);
        assert!(font.descent() < 0.0, "descent is negative by convention");
        assert!(font.height() > 0.0);
        assert!(font.line_height() >= font.height());
        assert_eq!(font.size(), 24.0);
        assert_eq!(font.family(), "dejavusans");
    }

    #[test]
    fn test_memoized_by_family_and_size() {
        let reg = registry();
        let a = reg.get("dejavusans", 24.0).unwrap();
        let b = reg.get("dejavusans", 24.0).unwrap();
        let c = reg.get("dejavusans", 32.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b), "same (family, size) shares a handle");
        assert!(!Arc::ptr_eq(&a, &c), "different size gets its own handle");
        // Two sizes of one family still read the file once.
        assert_eq!(reg.load_count(), 1);
        assert_eq!(a.face_id(), c.face_id());
    }

    #[test]
    fn test_concurrent_first_load_reads_file_once() {
        let reg = Arc::new(registry());
        let mut joins = Vec::new();
        for _ in 0..8 {
            let reg = reg.clone();
            joins.push(std::thread::spawn(move || {
                reg.get("dejavusans-bold", 48.0).unwrap()
            }));
        }
        let handles: Vec<_> = joins.into_iter().map(|j| j.join().unwrap()).collect();
        for pair in handles.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
        assert_eq!(reg.load_count(), 1, "racing loaders must collapse to one read");
    }

    #[test]
    fn test_measure_monotonic_in_text() {
        let reg = registry();
        let font = reg.get("dejavusans", 24.0).unwrap();
        let short = font.measure("Hello");
        let long = font.measure("Hello world");
        assert!(short > 0.0);
        assert!(long > short);
    }

    #[test]
    fn test_measure_empty_is_zero() {
        let reg = registry();
        let font = reg.get("dejavusans", 24.0).unwrap();
        assert_eq!(font.measure(""), 0.0);
    }

    #[test]
    fn test_measure_scales_with_size() {
        let reg = registry();
        let small = reg.get("dejavusans", 12.0).unwrap();
        let large = reg.get("dejavusans", 48.0).unwrap();
        assert!(large.measure("Hello") > small.measure("Hello"));
    }

    #[test]
    fn test_all_families_sorted() {
        let reg = registry();
        let families = reg.all_families();
        assert!(!families.is_empty());
        for pair in families.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_registry_display() {
        let reg = registry();
        let s = format!("{reg}");
        assert!(s.contains("FontRegistry("));
        assert!(s.contains("families"));
    }
}
