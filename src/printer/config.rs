//! # Printer Configuration
//!
//! This module defines the page geometry and the device settings for the
//! emulated ESC/P printer.
//!
//! ## Default Page
//!
//! | Property | Value |
//! |----------|-------|
//! | Paper | U.S. Letter, 8.5 × 11 in |
//! | Margins | none (page edges) |
//! | Resolution | 360 DPI |
//! | Pitch | 10 cpi |
//! | Line spacing | 6 lpi |
//!
//! ## Usage
//!
//! ```
//! use needlepoint::printer::{PageGeometry, PrinterConfig};
//!
//! let page = PageGeometry::US_LETTER;
//! assert_eq!(page.width_px(), 3060);
//!
//! let config = PrinterConfig::default();
//! assert_eq!(config.page, page);
//! ```
//!
//! ## Configuration Files
//!
//! [`PrinterConfig`] can be loaded from JSON. Every field is optional;
//! missing fields take their defaults:
//!
//! ```json
//! {
//!   "name": "Epson LQ",
//!   "font_dir": "/usr/share/needlepoint/fonts",
//!   "fonts": { "roman": "Roman.ttf" },
//!   "output_dir": "printer"
//! }
//! ```

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::NeedlepointError;

/// # Page Geometry
///
/// Physical page description, in inches. Reset restores the printer to this
/// geometry; the page surface is sized from it once, at device creation.
///
/// ## Calculations
///
/// ```text
/// width_px  = floor(page_width  * dpi)
/// height_px = floor(page_height * dpi)
///
/// For US Letter at 360 DPI:
///   8.5 * 360 = 3060
///   11  * 360 = 3960
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    /// Raster resolution in dots per inch
    pub dpi: u16,
    /// Characters per inch
    pub cpi: f64,
    /// Lines per inch
    pub lpi: f64,
}

impl PageGeometry {
    /// # U.S. Letter
    ///
    /// The power-on page of the emulated printer.
    ///
    /// ```text
    /// ┌──────────── 8.5 in ────────────┐
    /// │ 10 cpi → 85 columns            │
    /// │ 6 lpi  → 66 lines              │ 11 in
    /// │                                │
    /// └────────────────────────────────┘
    /// ```
    pub const US_LETTER: Self = Self {
        page_width: 8.5,
        page_height: 11.0,
        left_margin: 0.0,
        right_margin: 8.5,
        top_margin: 0.0,
        bottom_margin: 11.0,
        dpi: 360,
        cpi: 10.0,
        lpi: 6.0,
    };

    /// Page width in pixels
    #[inline]
    pub fn width_px(&self) -> u32 {
        (f64::from(self.dpi) * self.page_width) as u32
    }

    /// Page height in pixels
    #[inline]
    pub fn height_px(&self) -> u32 {
        (f64::from(self.dpi) * self.page_height) as u32
    }

    /// Reject geometries the interpreter cannot work with.
    pub fn validate(&self) -> Result<(), NeedlepointError> {
        if self.dpi == 0 {
            return Err(NeedlepointError::Config("dpi must be positive".into()));
        }
        if !(self.cpi > 0.0) || !(self.lpi > 0.0) {
            return Err(NeedlepointError::Config(
                "cpi and lpi must be positive".into(),
            ));
        }
        if !(self.page_width > 0.0) || !(self.page_height > 0.0) {
            return Err(NeedlepointError::Config(format!(
                "invalid page size {}x{} in",
                self.page_width, self.page_height
            )));
        }
        Ok(())
    }

    /// This geometry, or US Letter when it fails [`validate`](Self::validate).
    pub fn sanitized(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                warn!("ESC/P: {}, using US Letter", e);
                Self::US_LETTER
            }
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::US_LETTER
    }
}

// ============================================================================
// FONT FILES
// ============================================================================

/// File names of the TrueType faces, relative to the font directory.
///
/// Typefaces without a dedicated file (Prestige, Orator, ...) use the
/// dot-matrix face when configured, Courier otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFiles {
    pub roman: String,
    pub sans_serif: String,
    pub courier: String,
    pub script: String,
    pub ocr_a: String,
    pub ocr_b: String,
    /// Draft-quality face; Courier is used when absent
    pub dot_matrix: Option<String>,
}

impl Default for FontFiles {
    fn default() -> Self {
        Self {
            roman: "roman.ttf".into(),
            sans_serif: "sansserif.ttf".into(),
            courier: "courier.ttf".into(),
            script: "script.ttf".into(),
            ocr_a: "ocra.ttf".into(),
            ocr_b: "ocrb.ttf".into(),
            dot_matrix: None,
        }
    }
}

// ============================================================================
// DEVICE CONFIGURATION
// ============================================================================

/// Settings for one emulated printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Device name, used in log messages
    pub name: String,
    /// Page geometry restored on reset
    pub page: PageGeometry,
    /// Directory holding the TrueType faces
    pub font_dir: PathBuf,
    pub fonts: FontFiles,
    /// Directory receiving page images
    pub output_dir: PathBuf,
    /// Prefix for page image file names
    pub file_prefix: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            name: "EPSON ESC/P compatible printer".into(),
            page: PageGeometry::US_LETTER,
            font_dir: PathBuf::from("fonts"),
            fonts: FontFiles::default(),
            output_dir: PathBuf::from("printer"),
            file_prefix: "page".into(),
        }
    }
}

impl PrinterConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, NeedlepointError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, NeedlepointError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| NeedlepointError::Config(e.to_string()))?;
        config.page.validate()?;
        Ok(config)
    }
}

// ============================================================================
// TESTS
// ============================================================================
