//! Test helpers shared by the unit tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::NeedlepointError;
use crate::font::{CharSize, GlyphBitmap, GlyphRasterizer, Transform};

/// Glyph cell drawn by [`BlockRasterizer`].
pub const BLOCK_WIDTH: u32 = 10;
pub const BLOCK_ROWS: u32 = 20;
pub const BLOCK_ASCENDER: i32 = 16;

/// Rasterizer drawing every glyph except space as a solid 10×20 block.
///
/// The block's top row sits on the ascender line, so a glyph printed with
/// the head at `(x, y)` pixels covers `x..x+10, y..y+20`.
#[derive(Default)]
pub struct BlockRasterizer {
    pub opened: Rc<RefCell<Vec<PathBuf>>>,
    pub sizes: Rc<RefCell<Vec<CharSize>>>,
    fail: bool,
    loaded: bool,
}

impl BlockRasterizer {
    /// A rasterizer whose every `open` fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl GlyphRasterizer for BlockRasterizer {
    fn open(&mut self, path: &Path) -> Result<(), NeedlepointError> {
        self.opened.borrow_mut().push(path.to_path_buf());
        if self.fail {
            self.loaded = false;
            return Err(NeedlepointError::FontLoad {
                path: path.to_path_buf(),
                reason: "missing".into(),
            });
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn set_size(&mut self, size: CharSize) {
        self.sizes.borrow_mut().push(size);
    }

    fn set_transform(&mut self, _transform: Transform) {}

    fn glyph_index(&mut self, codepoint: u32) -> Option<u16> {
        u16::try_from(codepoint).ok()
    }

    fn render_glyph(&mut self, index: u16) -> Option<GlyphBitmap> {
        if index == 0x20 {
            return Some(GlyphBitmap::blank(f64::from(BLOCK_WIDTH), BLOCK_ASCENDER));
        }
        Some(GlyphBitmap {
            width: BLOCK_WIDTH,
            rows: BLOCK_ROWS,
            pitch: BLOCK_WIDTH,
            buffer: vec![255; (BLOCK_WIDTH * BLOCK_ROWS) as usize],
            left: 0,
            top: BLOCK_ASCENDER,
            advance: f64::from(BLOCK_WIDTH),
            ascender: BLOCK_ASCENDER,
        })
    }
}
