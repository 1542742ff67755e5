//! # Bit-Image Decoder
//!
//! Turns the data bytes of `ESC *`, `ESC K`, `ESC L`, `ESC Y` and `ESC Z`
//! into dots on the page.
//!
//! ## Decoding
//!
//! ```text
//! ESC * 0 2 0  0xA8 0x80
//!              │    └── column 1: one dot at the top
//!              └─────── column 0: 10101000 → dots at rows 0, 2, 4
//! ```
//!
//! Each bit (MSB first) is one dot `1/v_density` inch below the previous
//! one. A dot covers `dpi/h_density × dpi/v_density` pixels, at least one.
//! After a column the head moves right `1/h_density` inch and returns to
//! the row it started on.
//!
//! An unsupported density still consumes its data so the stream stays in
//! step, but nothing is drawn and the head does not move.

use arrayvec::ArrayVec;
use log::{trace, warn};

use super::surface::PageSurface;
use crate::protocol::density::{DensitySpec, density, inferred_bytes_per_column};

/// A complete graphics column ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub density: DensitySpec,
    pub bytes: ArrayVec<u8, 6>,
}

/// Bit-image session state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitImage {
    density: Option<DensitySpec>,
    bytes_per_column: u8,
    column: ArrayVec<u8, 6>,
    remaining: u32,
}

impl BitImage {
    /// Start a session of `columns` columns at density `code`.
    pub fn setup(&mut self, code: u8, columns: u16) {
        self.density = density(code);
        self.bytes_per_column = match self.density {
            Some(spec) => spec.bytes_per_column,
            None => {
                warn!("Unsupported bit image density {}", code);
                inferred_bytes_per_column(code)
            }
        };
        self.column.clear();
        self.remaining = u32::from(columns) * u32::from(self.bytes_per_column);
        trace!(
            "bit image: density {} columns {} bytes {}",
            code, columns, self.remaining
        );
    }

    /// Whether graphics bytes are still expected.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn density(&self) -> Option<DensitySpec> {
        self.density
    }

    pub fn bytes_per_column(&self) -> u8 {
        self.bytes_per_column
    }

    /// Feed one data byte.
    ///
    /// Returns the column once it is complete and its density is supported.
    pub fn push(&mut self, byte: u8) -> Option<Column> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let _ = self.column.try_push(byte);
        if self.column.len() < usize::from(self.bytes_per_column) {
            return None;
        }
        let bytes = std::mem::take(&mut self.column);
        self.density.map(|density| Column { density, bytes })
    }
}

/// Paint one column with its top-left dot at `(x, y)` inches.
///
/// Returns how far the head moves right, in inches.
pub fn render_column(surface: &mut PageSurface, dpi: u16, x: f64, y: f64, column: &Column) -> f64 {
    let spec = column.density;
    let dot_w = (u32::from(dpi) / u32::from(spec.h_density)).max(1);
    let dot_h = (u32::from(dpi) / u32::from(spec.v_density)).max(1);
    let step = 1.0 / f64::from(spec.v_density);
    let to_px = |inches: f64| (inches * f64::from(dpi) + 0.5).floor() as i32;

    let px = to_px(x);
    let mut dot_y = y;
    for &byte in &column.bytes {
        for bit in (0..8).rev() {
            if byte >> bit & 1 == 1 {
                surface.fill_rect(px, to_px(dot_y), dot_w, dot_h, 255);
            }
            dot_y += step;
        }
    }
    surface.mark_dirty();

    1.0 / f64::from(spec.h_density)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_counts_bytes() {
        let mut img = BitImage::default();
        img.setup(39, 10);
        assert_eq!(img.remaining(), 30);
        assert_eq!(img.bytes_per_column(), 3);
        assert!(img.is_active());
    }

    #[test]
    fn test_column_completes_after_bytes_per_column() {
        let mut img = BitImage::default();
        img.setup(32, 2);
        assert!(img.push(0xff).is_none());
        assert!(img.push(0x00).is_none());
        let col = img.push(0x81).unwrap();
        assert_eq!(col.bytes.as_slice(), &[0xff, 0x00, 0x81]);
        assert_eq!(img.remaining(), 3);
    }

    #[test]
    fn test_unsupported_density_consumes_silently() {
        let mut img = BitImage::default();
        img.setup(5, 4);
        assert_eq!(img.density(), None);
        assert_eq!(img.remaining(), 4);
        for _ in 0..4 {
            assert!(img.push(0xff).is_none());
        }
        assert!(!img.is_active());

        img.setup(50, 1);
        assert_eq!(img.remaining(), 3);
        img.setup(99, 1);
        assert_eq!(img.remaining(), 6);
    }

    #[test]
    fn test_zero_columns_is_inactive() {
        let mut img = BitImage::default();
        img.setup(0, 0);
        assert!(!img.is_active());
        assert!(img.push(0xff).is_none());
    }

    #[test]
    fn test_render_density_zero() {
        let mut surface = PageSurface::new(64, 64);
        let mut img = BitImage::default();
        img.setup(0, 1);
        let col = img.push(0b1010_1000).unwrap();
        let advance = render_column(&mut surface, 360, 0.0, 0.0, &col);
        assert!((advance - 1.0 / 60.0).abs() < 1e-12);
        assert!(surface.is_dirty());

        // dots are 6x6 pixels, one every 6 pixels
        for row in [0, 12, 24] {
            assert_eq!(surface.get(0, row), Some(255));
            assert_eq!(surface.get(5, row + 5), Some(255));
        }
        for row in [6, 18, 30, 36, 42] {
            assert_eq!(surface.get(0, row), Some(0));
        }
        assert_eq!(surface.ink_count(), 3 * 36);
    }

    #[test]
    fn test_render_full_resolution() {
        let mut surface = PageSurface::new(8, 64);
        let mut img = BitImage::default();
        img.setup(73, 1);
        let mut col = None;
        for b in [0x80, 0, 0, 0, 0, 0x01] {
            col = img.push(b);
        }
        render_column(&mut surface, 360, 1.0 / 360.0, 0.0, &col.unwrap());
        assert_eq!(surface.get(1, 0), Some(255));
        assert_eq!(surface.get(1, 47), Some(255));
        assert_eq!(surface.ink_count(), 2);
    }
}
