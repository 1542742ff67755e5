//! # Printer State
//!
//! Everything an ESC/P printer remembers between bytes: page geometry and
//! head position, the selected font and styles, tab stops, character
//! tables, the partially parsed escape sequence and any bit-image session
//! in progress.
//!
//! ## Units
//!
//! All positions and distances are in inches (`f64`). They are converted to
//! pixels only when something is drawn, with
//! `px = floor(inches * dpi + 0.5)`.
//!
//! ## Font Metrics
//!
//! Style changes go through [`PrinterState::recompute_metrics`], which derives
//! the effective pitch and the point sizes handed to the glyph rasterizer:
//!
//! | Condition | Horizontal size | Vertical size | Effective cpi |
//! |-----------|-----------------|---------------|---------------|
//! | base | 10.5 pt | 10.5 pt | cpi |
//! | cpi ≠ 10, not condensed | × 10/cpi | × 10/cpi | |
//! | condensed, fixed, 10 cpi | × 10/17.14 | × 10/17.14 | 17.14 |
//! | condensed, fixed, 12 cpi | × 10/20 | × 10/20 | 20 |
//! | condensed otherwise, or proportional | × 1/2 | × 1/2 | |
//! | double width | × 2 | | ÷ 2 |
//! | double height | | × 2 | |
//! | multipoint | size | size | multipoint cpi |
//! | super/subscript | × 2/3 | × 2/3 | ÷ 2/3 |

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::font::{CharSize, FontFace, FontRequest, Transform};
use crate::interpreter::ParsePhase;
use crate::printer::config::PageGeometry;
use crate::printer::tabs::TabStops;
use crate::protocol::charset;
use crate::render::bit_image::BitImage;

/// Base point size of every built-in pitch.
pub const BASE_POINTS: f64 = 10.5;

/// Horizontal shear applied to italic glyphs.
pub const ITALIC_SHEAR: f64 = 0.20;

bitflags! {
    /// Character style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Style: u16 {
        const PROPORTIONAL = 0x0001;
        const CONDENSED = 0x0002;
        const BOLD = 0x0004;
        const DOUBLE_STRIKE = 0x0008;
        const DOUBLE_WIDTH = 0x0010;
        const ITALICS = 0x0020;
        const UNDERLINE = 0x0040;
        const SUPERSCRIPT = 0x0080;
        const SUBSCRIPT = 0x0100;
        const STRIKETHROUGH = 0x0200;
        const OVERSCORE = 0x0400;
        const DOUBLE_WIDTH_ONE_LINE = 0x0800;
        const DOUBLE_HEIGHT = 0x1000;

        /// Bits rewritten by `ESC !`
        const MASTER_SELECT = 0x007f;
        /// Bits that select a score line position
        const SCORES = Self::UNDERLINE.bits() | Self::STRIKETHROUGH.bits() | Self::OVERSCORE.bits();
    }
}

/// Score line shape, as selected by `ESC ( -`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Score {
    #[default]
    None,
    Single,
    Double,
    SingleBroken,
    DoubleBroken,
}

impl Score {
    /// Decode the `d2` byte of `ESC ( -`. Unknown values disable scoring.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Single,
            2 => Self::Double,
            5 => Self::SingleBroken,
            6 => Self::DoubleBroken,
            _ => Self::None,
        }
    }

    pub fn is_double(self) -> bool {
        matches!(self, Self::Double | Self::DoubleBroken)
    }

    pub fn is_broken(self) -> bool {
        matches!(self, Self::SingleBroken | Self::DoubleBroken)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Draft,
    LetterQuality,
}

/// Letter-quality typefaces selectable with `ESC k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typeface {
    Roman,
    SansSerif,
    Courier,
    Prestige,
    Script,
    OcrB,
    OcrA,
    Orator,
    OratorS,
    ScriptC,
    RomanT,
    SansSerifH,
    SvBusaba,
    SvJittra,
}

impl Typeface {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Roman,
            1 => Self::SansSerif,
            2 => Self::Courier,
            3 => Self::Prestige,
            4 => Self::Script,
            5 => Self::OcrB,
            6 => Self::OcrA,
            7 => Self::Orator,
            8 => Self::OratorS,
            9 => Self::ScriptC,
            10 => Self::RomanT,
            11 => Self::SansSerifH,
            30 => Self::SvBusaba,
            31 => Self::SvJittra,
            _ => return None,
        })
    }

    /// Font file backing this typeface in letter quality.
    pub fn face(self) -> FontFace {
        match self {
            Self::Roman => FontFace::Roman,
            Self::SansSerif => FontFace::SansSerif,
            Self::Courier => FontFace::Courier,
            Self::Script => FontFace::Script,
            Self::OcrA => FontFace::OcrA,
            Self::OcrB => FontFace::OcrB,
            _ => FontFace::DotMatrix,
        }
    }
}

/// How the most significant bit of incoming bytes is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MsbMode {
    #[default]
    Unmodified,
    /// `ESC =`
    Clear,
    /// `ESC >`
    Set,
}

impl MsbMode {
    #[inline]
    pub fn apply(self, byte: u8) -> u8 {
        match self {
            Self::Unmodified => byte,
            Self::Clear => byte & 0x7f,
            Self::Set => byte | 0x80,
        }
    }
}

/// Progress through an escape sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EscapeBuffer {
    pub phase: ParsePhase,
    /// Parameter bytes collected for the pending command
    pub params: ArrayVec<u8, 10>,
    /// Bytes still to print verbatim after `ESC ( ^`
    pub verbatim_remaining: u16,
    pub msb: MsbMode,
}

/// Multipoint (`ESC X`) font selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Multipoint {
    pub enabled: bool,
    /// Point size, 0 until first set
    pub size: f64,
    /// Pitch, 0 until first set
    pub cpi: f64,
}

/// Density codes used by `ESC K`, `ESC L`, `ESC Y` and `ESC Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsDensities {
    pub k: u8,
    pub l: u8,
    pub y: u8,
    pub z: u8,
}

impl Default for GraphicsDensities {
    fn default() -> Self {
        Self {
            k: 0,
            l: 1,
            y: 2,
            z: 3,
        }
    }
}

/// Complete printer state.
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterState {
    // geometry, in inches
    pub page_width: f64,
    pub page_height: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub dpi: u16,
    pub cpi: f64,
    pub lpi: f64,
    /// Pitch after style adjustments
    pub actual_cpi: f64,
    pub linespacing: f64,
    /// Horizontal motion index; overrides the pitch when set
    pub hmi: Option<f64>,
    pub curr_x: f64,
    pub curr_y: f64,
    /// Unit set by `ESC ( U`, in steps per inch
    pub defined_unit: Option<f64>,
    pub extra_intra_space: f64,

    // typography
    pub typeface: Typeface,
    pub quality: Quality,
    pub style: Style,
    pub score: Score,
    pub multipoint: Multipoint,
    pub h_points: f64,
    pub v_points: f64,
    pub char_tables: [u16; 4],
    pub curr_char_table: usize,
    /// Active byte to Unicode map
    pub cpmap: [u16; 256],

    pub horizontal_tabs: TabStops<32>,
    /// `None` until set after reset; `Some(empty)` once explicitly cleared
    pub vertical_tabs: Option<TabStops<16>>,

    pub esc: EscapeBuffer,
    pub bit_image: BitImage,
    pub densities: GraphicsDensities,
}

impl PrinterState {
    /// Power-on state for a page geometry.
    pub fn new(page: &PageGeometry) -> Self {
        let char_tables = [0, 437, 437, 437];
        let curr_char_table = 1;
        let mut state = Self {
            page_width: page.page_width,
            page_height: page.page_height,
            left_margin: page.left_margin,
            right_margin: page.right_margin,
            top_margin: page.top_margin,
            bottom_margin: page.bottom_margin,
            dpi: page.dpi,
            cpi: page.cpi,
            lpi: page.lpi,
            actual_cpi: page.cpi,
            linespacing: 1.0 / page.lpi,
            hmi: None,
            curr_x: 0.0,
            curr_y: 0.0,
            defined_unit: None,
            extra_intra_space: 0.0,
            typeface: Typeface::Courier,
            quality: Quality::Draft,
            style: Style::empty(),
            score: Score::None,
            multipoint: Multipoint::default(),
            h_points: BASE_POINTS,
            v_points: BASE_POINTS,
            char_tables,
            curr_char_table,
            cpmap: charset::codepage_map(char_tables[curr_char_table]),
            horizontal_tabs: TabStops::every(8.0 / page.cpi),
            vertical_tabs: None,
            esc: EscapeBuffer::default(),
            bit_image: BitImage::default(),
            densities: GraphicsDensities::default(),
        };
        state.recompute_metrics();
        state
    }

    /// Convert inches to a pixel coordinate on this printer's raster.
    #[inline]
    pub fn to_px(&self, inches: f64) -> i32 {
        (inches * f64::from(self.dpi) + 0.5).floor() as i32
    }

    /// Head position in pixels.
    #[inline]
    pub fn head_px(&self) -> (i32, i32) {
        (self.to_px(self.curr_x), self.to_px(self.curr_y))
    }

    /// Width of one fixed-pitch character cell.
    #[inline]
    pub fn char_advance(&self) -> f64 {
        self.hmi.unwrap_or(1.0 / self.actual_cpi)
    }

    /// Load the base map of the active character table.
    pub fn reload_codepage(&mut self) {
        self.cpmap = charset::codepage_map(self.char_tables[self.curr_char_table]);
    }

    /// Whether glyphs are sheared.
    ///
    /// Table 0 is the italic character table.
    pub fn italic(&self) -> bool {
        self.style.contains(Style::ITALICS) || self.char_tables[self.curr_char_table] == 0
    }

    /// Face to use for the current quality and typeface.
    pub fn face(&self) -> FontFace {
        match self.quality {
            Quality::Draft => FontFace::DotMatrix,
            Quality::LetterQuality => self.typeface.face(),
        }
    }

    /// Derive the effective pitch and point sizes from the style bits.
    ///
    /// Returns the font selection the rasterizer should be configured with.
    pub fn recompute_metrics(&mut self) -> FontRequest {
        let style = self.style;
        let mut h_points = BASE_POINTS;
        let mut v_points = BASE_POINTS;

        if self.multipoint.enabled {
            self.actual_cpi = self.multipoint.cpi;
            h_points = self.multipoint.size;
            v_points = self.multipoint.size;
        } else {
            self.actual_cpi = self.cpi;
            let condensed = style.contains(Style::CONDENSED);
            let fixed = !style.contains(Style::PROPORTIONAL);

            if self.cpi != 10.0 && !condensed {
                h_points *= 10.0 / self.cpi;
                v_points *= 10.0 / self.cpi;
            }

            let mut halve = !fixed;
            if condensed {
                let redefined = if fixed && self.cpi == 10.0 {
                    Some(17.14)
                } else if fixed && self.cpi == 12.0 {
                    Some(20.0)
                } else {
                    None
                };
                match redefined {
                    Some(cpi) => {
                        self.actual_cpi = cpi;
                        h_points *= 10.0 / cpi;
                        v_points *= 10.0 / cpi;
                    }
                    None => halve = true,
                }
            }
            if halve {
                h_points /= 2.0;
                v_points /= 2.0;
            }

            if style.intersects(Style::DOUBLE_WIDTH | Style::DOUBLE_WIDTH_ONE_LINE) {
                self.actual_cpi /= 2.0;
                h_points *= 2.0;
            }

            if style.contains(Style::DOUBLE_HEIGHT) {
                v_points *= 2.0;
            }
        }

        if style.intersects(Style::SUPERSCRIPT | Style::SUBSCRIPT) {
            h_points *= 2.0 / 3.0;
            v_points *= 2.0 / 3.0;
            self.actual_cpi /= 2.0 / 3.0;
        }

        self.h_points = h_points;
        self.v_points = v_points;

        FontRequest {
            face: self.face(),
            size: CharSize {
                width_64pt: (h_points * 64.0) as u32,
                height_64pt: (v_points * 64.0) as u32,
                dpi_x: u32::from(self.dpi),
                dpi_y: u32::from(self.dpi),
            },
            transform: if self.italic() {
                Transform::shear(ITALIC_SHEAR)
            } else {
                Transform::IDENTITY
            },
        }
    }
}
