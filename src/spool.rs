//! # Page Spoolers
//!
//! Finished pages leave the printer through a [`PageSink`].
//!
//! | Sink | Output |
//! |------|--------|
//! | [`FileSpooler`] | one PNG per page (binary PGM if PNG encoding fails) |
//! | [`MemorySpooler`] | keeps page copies, for tests and embedding |
//!
//! ## File Names
//!
//! ```text
//! <output_dir>/<prefix>-<YYYYmmdd-HHMMSS>-<nnn>.png
//! ```
//!
//! The counter keeps names unique when several pages finish within the
//! same second.
//!
//! ## Image Format
//!
//! The page surface stores ink (0 = paper, 255 = full ink). Images are
//! written inverted, as 8-bit grayscale, so paper is white.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};
use log::{info, warn};

use crate::error::NeedlepointError;
use crate::render::surface::PageSurface;

/// Destination for completed pages.
pub trait PageSink {
    /// Take a finished page. Called once per dirty page.
    fn emit(&mut self, page: &PageSurface) -> Result<(), NeedlepointError>;
}

/// Paper-white grayscale rows of a page, without row padding.
pub fn inverted(page: &PageSurface) -> Vec<u8> {
    let width = page.width() as usize;
    let pitch = page.pitch() as usize;
    let mut out = Vec::with_capacity(width * page.height() as usize);
    for row in page.pixels().chunks(pitch.max(1)) {
        out.extend(row.iter().take(width).map(|&ink| 255 - ink));
    }
    out
}

// ============================================================================
// FILE SPOOLER
// ============================================================================

/// Writes each page to an image file.
#[derive(Debug)]
pub struct FileSpooler {
    dir: PathBuf,
    prefix: String,
    counter: u32,
    written: Vec<PathBuf>,
}

impl FileSpooler {
    /// Spool into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self, NeedlepointError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            counter: 0,
            written: Vec::new(),
        })
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn next_stem(&mut self) -> String {
        self.counter += 1;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        format!("{}-{}-{:03}", self.prefix, stamp, self.counter)
    }

    fn write_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), NeedlepointError> {
        let file = BufWriter::new(File::create(path)?);
        PngEncoder::new(file)
            .write_image(data, width, height, ExtendedColorType::L8)
            .map_err(|e| NeedlepointError::Encode(e.to_string()))
    }

    fn write_pgm(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), NeedlepointError> {
        let file = BufWriter::new(File::create(path)?);
        PnmEncoder::new(file)
            .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
            .write_image(data, width, height, ExtendedColorType::L8)
            .map_err(|e| NeedlepointError::Encode(e.to_string()))
    }
}

impl PageSink for FileSpooler {
    fn emit(&mut self, page: &PageSurface) -> Result<(), NeedlepointError> {
        let data = inverted(page);
        let (width, height) = (page.width(), page.height());
        let stem = self.next_stem();

        let png = self.dir.join(format!("{}.png", stem));
        let path = match Self::write_png(&png, &data, width, height) {
            Ok(()) => png,
            Err(e) => {
                warn!("PNG encoding of {} failed ({}), writing PGM", png.display(), e);
                let _ = std::fs::remove_file(&png);
                let pgm = self.dir.join(format!("{}.pgm", stem));
                Self::write_pgm(&pgm, &data, width, height)?;
                pgm
            }
        };

        info!("page written to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

// ============================================================================
// MEMORY SPOOLER
// ============================================================================

/// Keeps a copy of every emitted page.
#[derive(Debug, Default)]
pub struct MemorySpooler {
    pages: Vec<PageSurface>,
}

impl MemorySpooler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[PageSurface] {
        &self.pages
    }
}

impl PageSink for MemorySpooler {
    fn emit(&mut self, page: &PageSurface) -> Result<(), NeedlepointError> {
        self.pages.push(page.clone());
        Ok(())
    }
}
