//! TrueType glyph rendering with `ab_glyph`.
//!
//! Sizes arrive in points at the page resolution. `ab_glyph` scales by the
//! face's ascent-to-descent height, so the em size is converted with
//! `height_unscaled / units_per_em` first. Italics are applied as a bitmap
//! shear after rasterizing.

use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};

use super::{CharSize, GlyphBitmap, GlyphRasterizer, Transform};
use crate::error::NeedlepointError;

/// Rasterizer backed by a TrueType file.
#[derive(Default)]
pub struct TtfRasterizer {
    font: Option<FontVec>,
    size: Option<CharSize>,
    transform: Transform,
}

impl TtfRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a face from in-memory font data.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, NeedlepointError> {
        let font = FontVec::try_from_vec(data).map_err(|e| NeedlepointError::FontLoad {
            path: "<memory>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }

    fn scale(font: &FontVec, size: CharSize) -> PxScale {
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let em_to_height = font.height_unscaled() / units_per_em;
        PxScale {
            x: size.width_px() as f32 * em_to_height,
            y: size.height_px() as f32 * em_to_height,
        }
    }
}

impl GlyphRasterizer for TtfRasterizer {
    fn open(&mut self, path: &Path) -> Result<(), NeedlepointError> {
        self.font = None;
        let load_err = |reason: String| NeedlepointError::FontLoad {
            path: path.to_path_buf(),
            reason,
        };
        let data = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
        let font = FontVec::try_from_vec(data).map_err(|e| load_err(e.to_string()))?;
        self.font = Some(font);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.font.is_some()
    }

    fn set_size(&mut self, size: CharSize) {
        self.size = Some(size);
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn glyph_index(&mut self, codepoint: u32) -> Option<u16> {
        let font = self.font.as_ref()?;
        let ch = char::from_u32(codepoint)?;
        match font.glyph_id(ch) {
            GlyphId(0) => None,
            GlyphId(id) => Some(id),
        }
    }

    fn render_glyph(&mut self, index: u16) -> Option<GlyphBitmap> {
        let font = self.font.as_ref()?;
        let size = self.size?;
        let scale = Self::scale(font, size);
        let scaled = font.as_scaled(scale);
        let id = GlyphId(index);

        let advance = f64::from(scaled.h_advance(id));
        let ascender = scaled.ascent().round() as i32;

        let glyph = id.with_scale_and_position(scale, point(0.0, 0.0));
        let Some(outlined) = font.outline_glyph(glyph) else {
            return Some(GlyphBitmap::blank(advance, ascender));
        };

        let bounds = outlined.px_bounds();
        let width = bounds.width().ceil().max(0.0) as u32;
        let rows = bounds.height().ceil().max(0.0) as u32;
        let mut buffer = vec![0u8; (width * rows) as usize];
        outlined.draw(|x, y, coverage| {
            if x < width && y < rows {
                let idx = (y * width + x) as usize;
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                buffer[idx] = buffer[idx].max(value);
            }
        });

        let bitmap = GlyphBitmap {
            width,
            rows,
            pitch: width,
            buffer,
            left: bounds.min.x.floor() as i32,
            top: -(bounds.min.y.floor() as i32),
            advance,
            ascender,
        };
        Some(bitmap.sheared(self.transform.xy))
    }
}
