//! # Rendering Module
//!
//! Drawing primitives for the page raster.
//!
//! ## Modules
//!
//! - [`surface`]: Page raster, pixel writes and glyph compositing
//! - [`score`]: Underline, strikethrough and overscore lines
//! - [`bit_image`]: Bit-image (graphics) column decoding
//!
//! ## Usage Example
//!
//! ```
//! use needlepoint::render::surface::PageSurface;
//! use needlepoint::render::score;
//!
//! // One inch square at 360 DPI
//! let mut page = PageSurface::new(360, 360);
//!
//! // Solid underline across the top quarter inch
//! score::draw_hline(&mut page, 360, 0, 90, 100, false);
//! assert_eq!(page.get(45, 100), Some(255));
//! ```

pub mod bit_image;
pub mod score;
pub mod surface;

pub use surface::{Blend, PageSurface};
