//! # Glyph Rasterization
//!
//! The printer draws text through a [`GlyphRasterizer`]: something that can
//! open a face, be sized in points at the page resolution, and render single
//! glyphs to 8-bit coverage bitmaps.
//!
//! ## Implementations
//!
//! | Type | Source | Notes |
//! |------|--------|-------|
//! | [`TtfRasterizer`] | TrueType files via `ab_glyph` | anti-aliased |
//! | [`SpleenRasterizer`] | built-in Spleen 12×24 bitmap face | ignores the font path |
//!
//! ## Glyph Placement
//!
//! ```text
//!         left
//!        ├──┤
//!   ─ ─ ─ ─ ─ ┌──────┐ ─ ─ ┬ ─ ─ ┬─ ascender line
//!             │ ██   │     │ top │
//!             │█  █  │     │     │ ascender
//!   baseline ─│████ ─│─ ─ ─┴ ─ ─ ┴─
//!             │█  █  │
//!             └──────┘
//!   ├─────────────┤ advance
//! ```
//!
//! The page compositor puts the bitmap's top-left corner at
//! `(head_x + left, head_y + ascender - top)`.

pub mod spleen;
pub mod ttf;

use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::error::NeedlepointError;
use crate::printer::config::FontFiles;

pub use spleen::SpleenRasterizer;
pub use ttf::TtfRasterizer;

/// Character size in 1/64 point, at a resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSize {
    pub width_64pt: u32,
    pub height_64pt: u32,
    pub dpi_x: u32,
    pub dpi_y: u32,
}

impl CharSize {
    /// Horizontal em size in pixels
    pub fn width_px(&self) -> f64 {
        f64::from(self.width_64pt) / 64.0 * f64::from(self.dpi_x) / 72.0
    }

    /// Vertical em size in pixels
    pub fn height_px(&self) -> f64 {
        f64::from(self.height_64pt) / 64.0 * f64::from(self.dpi_y) / 72.0
    }
}

/// 2×2 glyph transform, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub xy: f64,
    pub yx: f64,
    pub yy: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        xx: 1.0,
        xy: 0.0,
        yx: 0.0,
        yy: 1.0,
    };

    /// Horizontal shear: `x' = x + factor * y`.
    pub const fn shear(factor: f64) -> Self {
        Self {
            xy: factor,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Font files the printer can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Roman,
    SansSerif,
    Courier,
    Script,
    OcrA,
    OcrB,
    /// Draft face; falls back to Courier when not configured
    DotMatrix,
}

/// Face, size and transform the printer wants for the next glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRequest {
    pub face: FontFace,
    pub size: CharSize,
    pub transform: Transform,
}

/// A rendered glyph: 8-bit coverage plus placement metrics in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub rows: u32,
    /// Bytes per row of `buffer`
    pub pitch: u32,
    pub buffer: Vec<u8>,
    /// Left bearing
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top row
    pub top: i32,
    /// Horizontal advance
    pub advance: f64,
    /// Face ascender at the current size
    pub ascender: i32,
}

impl GlyphBitmap {
    /// A glyph with no ink, such as a space.
    pub fn blank(advance: f64, ascender: i32) -> Self {
        Self {
            width: 0,
            rows: 0,
            pitch: 0,
            buffer: Vec::new(),
            left: 0,
            top: 0,
            advance,
            ascender,
        }
    }

    /// Coverage at a bitmap position, 0 outside.
    #[inline]
    pub fn pixel(&self, col: u32, row: u32) -> u8 {
        if col >= self.width || row >= self.rows {
            return 0;
        }
        self.buffer
            .get((row * self.pitch + col) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Apply a horizontal shear around the baseline.
    pub fn sheared(self, factor: f64) -> Self {
        if factor == 0.0 || self.rows == 0 {
            return self;
        }
        let shift = |row: u32| (factor * f64::from(self.top - row as i32)).round() as i32;
        let shifts: Vec<i32> = (0..self.rows).map(shift).collect();
        let min = shifts.iter().copied().min().unwrap_or(0).min(0);
        let max = shifts.iter().copied().max().unwrap_or(0).max(0);
        let width = self.width + (max - min) as u32;

        let mut buffer = vec![0u8; (width * self.rows) as usize];
        for (row, &s) in shifts.iter().enumerate() {
            let row = row as u32;
            for col in 0..self.width {
                let dst = (col as i32 + s - min) as u32;
                buffer[(row * width + dst) as usize] = self.pixel(col, row);
            }
        }

        Self {
            width,
            pitch: width,
            buffer,
            left: self.left + min,
            ..self
        }
    }
}

/// A font engine that renders single glyphs.
pub trait GlyphRasterizer {
    /// Open a face, replacing any face already open.
    fn open(&mut self, path: &Path) -> Result<(), NeedlepointError>;

    /// Whether a face is open.
    fn is_loaded(&self) -> bool;

    fn set_size(&mut self, size: CharSize);

    fn set_transform(&mut self, transform: Transform);

    /// Glyph id for a Unicode code point, `None` if the face lacks it.
    fn glyph_index(&mut self, codepoint: u32) -> Option<u16>;

    /// Render a glyph at the current size and transform.
    fn render_glyph(&mut self, index: u16) -> Option<GlyphBitmap>;
}

/// Per-device font selection on top of a rasterizer.
///
/// Re-opens the face only when the selected file changes, and reports a
/// file that fails to load once rather than on every style change.
pub struct FontContext {
    rasterizer: Box<dyn GlyphRasterizer>,
    font_dir: PathBuf,
    files: FontFiles,
    current: Option<PathBuf>,
}

impl FontContext {
    pub fn new(rasterizer: Box<dyn GlyphRasterizer>, font_dir: PathBuf, files: FontFiles) -> Self {
        Self {
            rasterizer,
            font_dir,
            files,
            current: None,
        }
    }

    /// File backing a face.
    pub fn path_for(&self, face: FontFace) -> PathBuf {
        let name = match face {
            FontFace::Roman => &self.files.roman,
            FontFace::SansSerif => &self.files.sans_serif,
            FontFace::Courier => &self.files.courier,
            FontFace::Script => &self.files.script,
            FontFace::OcrA => &self.files.ocr_a,
            FontFace::OcrB => &self.files.ocr_b,
            FontFace::DotMatrix => self.files.dot_matrix.as_ref().unwrap_or(&self.files.courier),
        };
        self.font_dir.join(name)
    }

    /// Configure the rasterizer for a request.
    ///
    /// Returns whether text can be printed.
    pub fn select(&mut self, request: &FontRequest) -> bool {
        let path = self.path_for(request.face);
        if self.current.as_ref() != Some(&path) {
            match self.rasterizer.open(&path) {
                Ok(()) => debug!("font: opened {}", path.display()),
                Err(e) => {
                    error!("{}", e);
                    error!("text printing disabled");
                }
            }
            self.current = Some(path);
        }

        if !self.rasterizer.is_loaded() {
            return false;
        }
        self.rasterizer.set_size(request.size);
        self.rasterizer.set_transform(request.transform);
        true
    }

    /// Render the glyph for a code point.
    ///
    /// Code points missing from the face render the face's fallback glyph.
    pub fn render(&mut self, codepoint: u16) -> Option<GlyphBitmap> {
        if !self.rasterizer.is_loaded() {
            return None;
        }
        let index = self.rasterizer.glyph_index(u32::from(codepoint)).unwrap_or(0);
        self.rasterizer.render_glyph(index)
    }
}
