//! Built-in bitmap face.
//!
//! Uses the Spleen 12×24 PSF2 font compiled into the `spleen-font` crate, so
//! text prints without any font files. The 12×24 cell is scaled with nearest
//! neighbour to the requested size: the cell is one em tall and half an em
//! wide, with the baseline at 4/5 of the cell.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use spleen_font::{FONT_12X24, PSF2Font};

use super::{CharSize, GlyphBitmap, GlyphRasterizer, Transform};
use crate::error::NeedlepointError;

const CELL_W: usize = 12;
const CELL_H: usize = 24;

/// Decodes one character to a 12×24 bitmap, one byte per pixel.
type Decoder = Box<dyn FnMut(char) -> Option<Vec<u8>>>;

/// Parse the compiled-in face once; the decoder keeps it.
fn decoder() -> Option<Decoder> {
    let mut spleen = PSF2Font::new(FONT_12X24).ok()?;
    Some(Box::new(move |ch: char| {
        let utf8 = ch.to_string();
        let glyph = spleen.glyph_for_utf8(utf8.as_bytes())?;

        let mut bitmap = vec![0u8; CELL_W * CELL_H];
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if on && row_y < CELL_H && col_x < CELL_W {
                    bitmap[row_y * CELL_W + col_x] = 255;
                }
            }
        }
        Some(bitmap)
    }))
}

/// Rasterizer drawing the built-in Spleen face.
pub struct SpleenRasterizer {
    loaded: bool,
    size: Option<CharSize>,
    transform: Transform,
    decode: Option<Decoder>,
    /// Decoded source bitmaps; `None` for characters the face lacks
    cache: HashMap<char, Option<Vec<u8>>>,
}

impl Default for SpleenRasterizer {
    fn default() -> Self {
        Self {
            loaded: false,
            size: None,
            transform: Transform::IDENTITY,
            decode: decoder(),
            cache: HashMap::new(),
        }
    }
}

impl fmt::Debug for SpleenRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpleenRasterizer")
            .field("loaded", &self.loaded)
            .field("size", &self.size)
            .field("transform", &self.transform)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl SpleenRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rasterizer that is ready without calling `open`.
    pub fn loaded() -> Self {
        Self {
            loaded: true,
            ..Self::default()
        }
    }

    /// Cell size in pixels for the current size.
    fn cell(&self) -> Option<(u32, u32)> {
        let size = self.size?;
        let rows = size.height_px().round().max(1.0) as u32;
        let width = (size.width_px() / 2.0).round().max(1.0) as u32;
        Some((width, rows))
    }

    /// The 12×24 source bitmap of a character.
    fn source(&mut self, ch: char) -> Option<&[u8]> {
        let decode = self.decode.as_mut()?;
        self.cache
            .entry(ch)
            .or_insert_with(|| decode(ch))
            .as_deref()
    }
}

/// Scale a bitmap from src dimensions to dst dimensions using nearest neighbor.
fn scale_bitmap(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let mut dst = vec![0u8; dst_w * dst_h];
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            if let Some(&v) = src.get(sy * src_w + sx) {
                dst[dy * dst_w + dx] = v;
            }
        }
    }
    dst
}

impl GlyphRasterizer for SpleenRasterizer {
    fn open(&mut self, _path: &Path) -> Result<(), NeedlepointError> {
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn set_size(&mut self, size: CharSize) {
        self.size = Some(size);
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn glyph_index(&mut self, codepoint: u32) -> Option<u16> {
        let ch = char::from_u32(codepoint)?;
        let index = u16::try_from(codepoint).ok()?;
        self.source(ch).map(|_| index)
    }

    fn render_glyph(&mut self, index: u16) -> Option<GlyphBitmap> {
        let (width, rows) = self.cell()?;
        let ascender = (rows * 4 / 5) as i32;
        let advance = f64::from(width);

        let source = char::from_u32(u32::from(index)).and_then(|ch| self.source(ch));
        let Some(source) = source else {
            return Some(GlyphBitmap::blank(advance, ascender));
        };

        let buffer = scale_bitmap(source, CELL_W, CELL_H, width as usize, rows as usize);
        let bitmap = GlyphBitmap {
            width,
            rows,
            pitch: width,
            buffer,
            left: 0,
            top: ascender,
            advance,
            ascender,
        };
        Some(bitmap.sheared(self.transform.xy))
    }
}
