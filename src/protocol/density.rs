//! # Bit-Image Densities
//!
//! Dot densities selectable through `ESC *` (directly) and `ESC K/L/Y/Z`
//! (through the reassignable slots set with `ESC ?`).
//!
//! ## Column Layout
//!
//! Graphics data arrives column by column. Each column is 1, 3 or 6 bytes
//! tall; within a byte the MSB is the topmost dot:
//!
//! ```text
//! 8-pin (1 byte)      24-pin (3 bytes)     48-dot (6 bytes)
//! ┌──┐ bit 7          ┌──┐ byte 0          ┌──┐ byte 0
//! │  │ ...            ├──┤ byte 1          │  │ ...
//! └──┘ bit 0          └──┘ byte 2          └──┘ byte 5
//! ```
//!
//! ## Density Table
//!
//! | Code | Horizontal | Vertical | Bytes/col | Adjacent dots |
//! |------|------------|----------|-----------|---------------|
//! | 0 | 60 | 60 | 1 | yes |
//! | 1 | 120 | 60 | 1 | yes |
//! | 2 | 120 | 60 | 1 | no |
//! | 3 | 60 | 240 | 1 | no |
//! | 4 | 80 | 60 | 1 | yes |
//! | 6 | 90 | 60 | 1 | yes |
//! | 32 | 60 | 180 | 3 | yes |
//! | 33 | 120 | 180 | 3 | yes |
//! | 38 | 90 | 180 | 3 | yes |
//! | 39 | 180 | 180 | 3 | yes |
//! | 40 | 360 | 180 | 3 | no |
//! | 71 | 180 | 360 | 6 | yes |
//! | 72 | 360 | 360 | 6 | no |
//! | 73 | 360 | 360 | 6 | yes |
//!
//! The adjacent-dot flag is carried for completeness; rendering ignores it.

use serde::Serialize;

/// A supported bit-image density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DensitySpec {
    /// Density code as sent in `ESC * m`
    pub code: u8,
    /// Horizontal dots per inch
    pub h_density: u16,
    /// Vertical dots per inch
    pub v_density: u16,
    /// Whether horizontally adjacent dots may be printed
    pub adjacent: bool,
    /// Bytes per graphics column (1, 3 or 6)
    pub bytes_per_column: u8,
}

const fn spec(code: u8, h: u16, v: u16, bytes_per_column: u8, adjacent: bool) -> DensitySpec {
    DensitySpec {
        code,
        h_density: h,
        v_density: v,
        adjacent,
        bytes_per_column,
    }
}

/// Every density the printer accepts.
pub static DENSITIES: [DensitySpec; 14] = [
    spec(0, 60, 60, 1, true),
    spec(1, 120, 60, 1, true),
    spec(2, 120, 60, 1, false),
    spec(3, 60, 240, 1, false),
    spec(4, 80, 60, 1, true),
    spec(6, 90, 60, 1, true),
    spec(32, 60, 180, 3, true),
    spec(33, 120, 180, 3, true),
    spec(38, 90, 180, 3, true),
    spec(39, 180, 180, 3, true),
    spec(40, 360, 180, 3, false),
    spec(71, 180, 360, 6, true),
    spec(72, 360, 360, 6, false),
    spec(73, 360, 360, 6, true),
];

/// Look up a density code.
///
/// ## Example
///
/// ```
/// use needlepoint::protocol::density::density;
///
/// let d = density(39).unwrap();
/// assert_eq!((d.h_density, d.v_density, d.bytes_per_column), (180, 180, 3));
/// assert!(density(5).is_none());
/// ```
pub fn density(code: u8) -> Option<DensitySpec> {
    DENSITIES.iter().find(|d| d.code == code).copied()
}

/// Column height to assume for a code missing from the table.
///
/// Keeps the byte stream aligned when an unknown density is selected:
/// codes below 32 are 8-dot modes, below 64 are 24-dot, the rest 48-dot.
#[inline]
pub fn inferred_bytes_per_column(code: u8) -> u8 {
    match code {
        0..=31 => 1,
        32..=63 => 3,
        _ => 6,
    }
}
