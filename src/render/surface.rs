//! # Page Surface
//!
//! The 8-bit raster one printed page is composed on.
//!
//! ## Pixel Values
//!
//! ```text
//! 0    no ink (paper)
//! 120  score line shoulder / broken line
//! 255  full ink
//! ```
//!
//! The buffer stores ink density, so a blank page is all zeros. Encoders
//! invert it when writing an image so paper comes out white.
//!
//! ## Coordinates
//!
//! Writes take signed coordinates: glyph bearings and shears can put pixels
//! left of or above the page. Anything outside `[0, width) × [0, height)` is
//! dropped.

use crate::font::GlyphBitmap;

/// How glyph pixels combine with what is already on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Replace the destination with the glyph pixel
    Overwrite,
    /// Add to the destination, saturating at 255
    Additive,
}

/// Grayscale page raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSurface {
    width: u32,
    height: u32,
    pitch: u32,
    dirty: bool,
    pixels: Vec<u8>,
}

impl PageSurface {
    /// Create a blank surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pitch: width,
            dirty: false,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Raw ink values, row-major, `pitch` bytes per row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether anything has been printed since the last clear.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Erase the page and reset the dirty flag.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.dirty = false;
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.pitch as usize + x as usize)
    }

    /// Ink value at a position, `None` off the page.
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set one pixel. Off-page writes are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = value;
        }
    }

    /// Fill a rectangle with one value, clipped to the page.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, value: u8) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                self.put(x + dx, y + dy, value);
            }
        }
    }

    /// Composite a rendered glyph with its top-left corner at `(x, y)`.
    ///
    /// Zero (background) glyph pixels are skipped.
    pub fn blit(&mut self, glyph: &GlyphBitmap, x: i32, y: i32, blend: Blend) {
        for row in 0..glyph.rows {
            for col in 0..glyph.width {
                let src = glyph.pixel(col, row);
                if src == 0 {
                    continue;
                }
                let Some(i) = self.index(x + col as i32, y + row as i32) else {
                    continue;
                };
                let dst = &mut self.pixels[i];
                *dst = match blend {
                    Blend::Overwrite => src,
                    Blend::Additive => dst.saturating_add(src),
                };
            }
        }
    }

    /// Number of pixels carrying any ink.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: u32, rows: u32, value: u8) -> GlyphBitmap {
        GlyphBitmap {
            width,
            rows,
            pitch: width,
            buffer: vec![value; (width * rows) as usize],
            left: 0,
            top: rows as i32,
            advance: width as f64,
            ascender: rows as i32,
        }
    }

    #[test]
    fn test_new_is_blank() {
        let s = PageSurface::new(10, 5);
        assert_eq!(s.pixels().len(), 50);
        assert_eq!(s.ink_count(), 0);
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_put_clips() {
        let mut s = PageSurface::new(4, 4);
        s.put(-1, 0, 255);
        s.put(0, -1, 255);
        s.put(4, 0, 255);
        s.put(0, 4, 255);
        assert_eq!(s.ink_count(), 0);
        s.put(3, 3, 255);
        assert_eq!(s.get(3, 3), Some(255));
    }

    #[test]
    fn test_blit_overwrite_and_additive() {
        let mut s = PageSurface::new(8, 8);
        s.blit(&glyph(2, 2, 200), 1, 1, Blend::Overwrite);
        assert_eq!(s.get(1, 1), Some(200));
        s.blit(&glyph(2, 2, 100), 2, 1, Blend::Additive);
        assert_eq!(s.get(2, 1), Some(255));
        assert_eq!(s.get(3, 1), Some(100));
        s.blit(&glyph(1, 1, 30), 1, 1, Blend::Overwrite);
        assert_eq!(s.get(1, 1), Some(30));
    }

    #[test]
    fn test_blit_skips_background() {
        let mut s = PageSurface::new(4, 4);
        s.put(0, 0, 77);
        s.blit(&glyph(2, 2, 0), 0, 0, Blend::Overwrite);
        assert_eq!(s.get(0, 0), Some(77));
    }

    #[test]
    fn test_blit_partially_offpage() {
        let mut s = PageSurface::new(4, 4);
        s.blit(&glyph(3, 3, 255), -1, 2, Blend::Overwrite);
        assert_eq!(s.ink_count(), 4);
    }

    #[test]
    fn test_clear_resets_dirty() {
        let mut s = PageSurface::new(4, 4);
        s.fill_rect(0, 0, 2, 2, 255);
        s.mark_dirty();
        s.clear();
        assert!(!s.is_dirty());
        assert_eq!(s.ink_count(), 0);
    }
}
