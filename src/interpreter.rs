//! # ESC/P Command Interpreter
//!
//! A byte-at-a-time state machine over the command tables in
//! [`crate::protocol::commands`].
//!
//! ## Parse Phases
//!
//! ```text
//!            ESC                 opcode (arity n > 0)
//!   Idle ──────────► EscapeSeen ─────────────────────► CollectingParams
//!    ▲                 │   │  '('                          │ n bytes
//!    │                 │   └──────► ExtendedSelector ──────┤
//!    │                 │ B, D, b                           ▼
//!    │                 └──────────► CollectingTabs      dispatch
//!    │                                 │ terminator        │
//!    └─────────────────────────────────┴───────────────────┘
//!                                      (or Skipping for length-prefixed data)
//! ```
//!
//! Dispatch always returns the parser to `Idle` first; a command that needs
//! more input (`ESC C 0`, `ESC ( B`, an unknown `ESC ( x`) re-enters a
//! collecting or skipping phase itself.
//!
//! ## Units
//!
//! | Command | Unit when no `ESC ( U` is set |
//! |---------|-------------------------------|
//! | `ESC $` | 1/60 in |
//! | `ESC \` | 1/120 in draft, 1/180 in LQ |
//! | `ESC ( V`, `ESC ( v`, `ESC ( C`, `ESC ( c` | 1/360 in |

use log::{debug, trace, warn};

use crate::device::EscpPrinter;
use crate::printer::state::{MsbMode, Quality, Score, Style, Typeface};
use crate::printer::tabs::TabStops;
use crate::protocol::charset::{self, CODEPAGES};
use crate::protocol::commands::{
    Arity, BEL, BS, CAN, CR, Command, DC1, DC2, DC3, DC4, ESC, ExtendedCommand, FF,
    GraphicsSlot, HT, LF, SI, SO, TabKind, VT, printable, u16_le,
};
use crate::spool::PageSink;

/// Default unit of `ESC $`, in steps per inch.
const ABSOLUTE_H_UNIT: f64 = 60.0;
/// Default unit of the two-level positioning and page commands.
const EXTENDED_UNIT: f64 = 360.0;

/// Where the parser is within an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePhase {
    #[default]
    Idle,
    /// ESC received, waiting for the opcode
    EscapeSeen,
    /// `ESC (` received, waiting for the selector
    ExtendedSelector,
    CollectingParams {
        pending: Pending,
        required: u8,
    },
    CollectingTabs {
        kind: TabKind,
        /// `ESC b` starts with a channel number
        awaiting_channel: bool,
    },
    /// Discarding length-prefixed data
    Skipping {
        remaining: u16,
    },
}

/// What to run once the parameters are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Command(Command),
    Extended(ExtendedCommand),
    /// Second byte of `ESC C NUL n`
    PageLengthInches,
    /// Length word of an unknown `ESC ( x`
    SkipLength,
}

/// Parse an on/off parameter: 0 / '0' and 1 / '1'.
fn switch(n: u8) -> Option<bool> {
    match n {
        0 | b'0' => Some(false),
        1 | b'1' => Some(true),
        _ => None,
    }
}

fn param(params: &[u8], i: usize) -> u8 {
    params.get(i).copied().unwrap_or(0)
}

fn param16(params: &[u8], i: usize) -> u16 {
    u16_le(param(params, i), param(params, i + 1))
}

impl<S: PageSink> EscpPrinter<S> {
    /// Run one byte through the interpreter.
    ///
    /// Returns `false` when the byte is not part of a command and should be
    /// printed.
    pub(crate) fn process_char(&mut self, ch: u8) -> bool {
        match self.state.esc.phase {
            ParsePhase::Idle => self.control_code(ch),
            ParsePhase::EscapeSeen => {
                self.begin_command(ch);
                true
            }
            ParsePhase::ExtendedSelector => {
                self.begin_extended(ch);
                true
            }
            ParsePhase::CollectingParams { pending, required } => {
                let _ = self.state.esc.params.try_push(ch);
                if self.state.esc.params.len() >= usize::from(required) {
                    self.state.esc.phase = ParsePhase::Idle;
                    let params = std::mem::take(&mut self.state.esc.params);
                    self.dispatch(pending, &params);
                }
                true
            }
            ParsePhase::CollectingTabs {
                kind,
                awaiting_channel,
            } => {
                self.collect_tab(kind, awaiting_channel, ch);
                true
            }
            ParsePhase::Skipping { remaining } => {
                self.state.esc.phase = match remaining.saturating_sub(1) {
                    0 => ParsePhase::Idle,
                    remaining => ParsePhase::Skipping { remaining },
                };
                true
            }
        }
    }

    fn begin_command(&mut self, opcode: u8) {
        self.state.esc.params.clear();
        self.state.esc.phase = ParsePhase::Idle;

        let Some(spec) = Command::lookup(opcode) else {
            warn!(
                "ESC/P: Unknown command ESC {} (0x{:02x}), unable to skip parameters",
                printable(opcode),
                opcode
            );
            return;
        };

        match spec.arity {
            Arity::Fixed(0) => self.execute(spec.command, &[]),
            Arity::Fixed(required) => {
                self.state.esc.phase = ParsePhase::CollectingParams {
                    pending: Pending::Command(spec.command),
                    required,
                };
            }
            Arity::TabList(kind) => {
                match kind {
                    TabKind::Horizontal => self.state.horizontal_tabs.clear(),
                    TabKind::Vertical | TabKind::VfuChannel => {
                        self.state.vertical_tabs = Some(TabStops::new())
                    }
                }
                self.state.esc.phase = ParsePhase::CollectingTabs {
                    kind,
                    awaiting_channel: kind == TabKind::VfuChannel,
                };
            }
            Arity::Extended => self.state.esc.phase = ParsePhase::ExtendedSelector,
        }
    }

    fn begin_extended(&mut self, selector: u8) {
        self.state.esc.params.clear();
        let (pending, required) = match ExtendedCommand::lookup(selector) {
            Some((command, required)) => (Pending::Extended(command), required),
            None => {
                warn!(
                    "ESC/P: Skipping unsupported extended command ESC ( {} (0x{:02x})",
                    printable(selector),
                    selector
                );
                (Pending::SkipLength, 2)
            }
        };
        self.state.esc.phase = ParsePhase::CollectingParams { pending, required };
    }

    fn collect_tab(&mut self, kind: TabKind, awaiting_channel: bool, ch: u8) {
        if awaiting_channel {
            trace!("ESC/P: VFU channel {} ignored", ch);
            self.state.esc.phase = ParsePhase::CollectingTabs {
                kind,
                awaiting_channel: false,
            };
            return;
        }

        let accepted = ch != 0
            && match kind {
                TabKind::Horizontal => {
                    let stop = f64::from(ch) / self.state.cpi;
                    self.state.horizontal_tabs.push(stop)
                }
                TabKind::Vertical | TabKind::VfuChannel => {
                    let stop = f64::from(ch) * self.state.linespacing;
                    self.state
                        .vertical_tabs
                        .get_or_insert_with(TabStops::new)
                        .push(stop)
                }
            };

        if !accepted {
            self.state.esc.phase = ParsePhase::Idle;
        }
    }

    fn dispatch(&mut self, pending: Pending, params: &[u8]) {
        match pending {
            Pending::Command(command) => self.execute(command, params),
            Pending::Extended(command) => self.execute_extended(command, params),
            Pending::PageLengthInches => {
                let s = &mut self.state;
                s.page_height = f64::from(param(params, 0));
                s.bottom_margin = s.page_height;
                s.top_margin = 0.0;
            }
            Pending::SkipLength => self.skip(param16(params, 0)),
        }
    }

    fn skip(&mut self, count: u16) {
        if count > 0 {
            debug!("ESC/P: skipping {} bytes", count);
            self.state.esc.phase = ParsePhase::Skipping { remaining: count };
        }
    }

    // ========================================================================
    // CONTROL CODES
    // ========================================================================

    fn control_code(&mut self, ch: u8) -> bool {
        match ch {
            BEL => trace!("ESC/P: beep"),
            BS => {
                let s = &mut self.state;
                let new_x = s.curr_x - s.char_advance();
                if new_x >= s.left_margin {
                    s.curr_x = new_x;
                }
            }
            HT => {
                let s = &mut self.state;
                if let Some(stop) = s.horizontal_tabs.next_after(s.curr_x) {
                    if stop < s.right_margin {
                        s.curr_x = stop;
                    }
                }
            }
            LF => self.line_feed(),
            VT => {
                self.vertical_tab();
                self.cancel_one_line_double_width();
            }
            FF => {
                self.cancel_one_line_double_width();
                self.new_page();
            }
            CR => {
                self.state.curr_x = self.state.left_margin;
                if self.port.autofeed {
                    self.line_feed();
                }
            }
            SO => self.set_width_style(Style::DOUBLE_WIDTH_ONE_LINE, true),
            SI => self.set_width_style(Style::CONDENSED, true),
            DC1 | DC3 | CAN => {}
            DC2 => {
                self.state.hmi = None;
                self.state.style.remove(Style::CONDENSED);
                self.update_font();
            }
            DC4 => {
                self.state.hmi = None;
                self.state.style.remove(Style::DOUBLE_WIDTH_ONE_LINE);
                self.update_font();
            }
            ESC => self.state.esc.phase = ParsePhase::EscapeSeen,
            _ => return false,
        }
        true
    }

    fn line_feed(&mut self) {
        self.cancel_one_line_double_width();
        let s = &mut self.state;
        s.curr_x = s.left_margin;
        s.curr_y += s.linespacing;
        if s.curr_y > s.bottom_margin {
            self.new_page();
        }
    }

    fn vertical_tab(&mut self) {
        let next = match &self.state.vertical_tabs {
            // never set since reset: line feed
            None => return self.line_feed(),
            // explicitly cleared: carriage return
            Some(tabs) if tabs.is_empty() => {
                self.state.curr_x = self.state.left_margin;
                return;
            }
            Some(tabs) => tabs.next_after(self.state.curr_y),
        };
        match next {
            Some(stop) if stop <= self.state.bottom_margin => self.state.curr_y = stop,
            _ => self.new_page(),
        }
    }

    fn cancel_one_line_double_width(&mut self) {
        if self.state.style.contains(Style::DOUBLE_WIDTH_ONE_LINE) {
            self.state.style.remove(Style::DOUBLE_WIDTH_ONE_LINE);
            self.update_font();
        }
    }

    /// SO / SI and their ESC forms; ignored in multipoint mode.
    fn set_width_style(&mut self, style: Style, on: bool) {
        if self.state.multipoint.enabled {
            return;
        }
        self.state.hmi = None;
        self.state.style.set(style, on);
        self.update_font();
    }

    /// Leave multipoint mode and select a 10.5-point pitch.
    fn select_pitch(&mut self, cpi: f64) {
        self.state.cpi = cpi;
        self.state.hmi = None;
        self.state.multipoint.enabled = false;
        self.update_font();
    }

    fn set_style(&mut self, style: Style, on: bool) {
        self.state.style.set(style, on);
        self.update_font();
    }

    /// Move to `new_y`, or eject the page when it lies past the bottom margin.
    fn move_vertical(&mut self, new_y: f64) {
        if new_y > self.state.bottom_margin {
            self.new_page();
        } else {
            self.state.curr_y = new_y;
        }
    }

    // ========================================================================
    // ESC x COMMANDS
    // ========================================================================

    fn execute(&mut self, command: Command, params: &[u8]) {
        let p0 = param(params, 0);
        trace!("ESC/P: {:?} {:?}", command, params);

        match command {
            Command::Undocumented
            | Command::VerticalTabChannel
            | Command::UnidirectionalOnce
            | Command::Unidirectional
            | Command::Justification
            | Command::LowSpeed => {}

            Command::DoubleWidthOneLine => self.set_width_style(Style::DOUBLE_WIDTH_ONE_LINE, true),
            Command::Condensed => self.set_width_style(Style::CONDENSED, true),

            Command::PaperLoading => {
                if p0 == b'R' {
                    self.new_page();
                }
            }

            Command::IntercharacterSpace => {
                if !self.state.multipoint.enabled {
                    let unit = match self.state.quality {
                        Quality::Draft => 120.0,
                        Quality::LetterQuality => 180.0,
                    };
                    self.state.extra_intra_space = f64::from(p0) / unit;
                    self.state.hmi = None;
                    self.update_font();
                }
            }

            Command::MasterSelect => {
                let s = &mut self.state;
                s.cpi = if p0 & 0x01 != 0 { 12.0 } else { 10.0 };
                s.style.remove(Style::MASTER_SELECT);
                for (bit, style) in [
                    (0x02, Style::PROPORTIONAL),
                    (0x04, Style::CONDENSED),
                    (0x08, Style::BOLD),
                    (0x10, Style::DOUBLE_STRIKE),
                    (0x20, Style::DOUBLE_WIDTH),
                    (0x40, Style::ITALICS),
                ] {
                    if p0 & bit != 0 {
                        s.style.insert(style);
                    }
                }
                if p0 & 0x80 != 0 {
                    s.score = Score::Single;
                    s.style.insert(Style::UNDERLINE);
                }
                s.hmi = None;
                s.multipoint.enabled = false;
                self.update_font();
            }

            Command::CancelMsb => self.state.esc.msb = MsbMode::Unmodified,
            Command::MsbClear => self.state.esc.msb = MsbMode::Clear,
            Command::MsbSet => self.state.esc.msb = MsbMode::Set,

            Command::AbsoluteHorizontal => {
                let s = &mut self.state;
                let unit = s.defined_unit.unwrap_or(ABSOLUTE_H_UNIT);
                let new_x = s.left_margin + f64::from(param16(params, 0)) / unit;
                if new_x <= s.right_margin {
                    s.curr_x = new_x;
                }
            }

            Command::RelativeHorizontal => {
                let s = &mut self.state;
                let unit = s.defined_unit.unwrap_or(match s.quality {
                    Quality::Draft => 120.0,
                    Quality::LetterQuality => 180.0,
                });
                let offset = param16(params, 0) as i16;
                let new_x = s.curr_x + f64::from(offset) / unit;
                if new_x >= s.left_margin && new_x <= s.right_margin {
                    s.curr_x = new_x;
                }
            }

            Command::BitImage => {
                let columns = param16(params, 1);
                self.state.bit_image.setup(p0, columns);
            }

            Command::Graphics(slot) => {
                let d = self.state.densities;
                let code = match slot {
                    GraphicsSlot::K => d.k,
                    GraphicsSlot::L => d.l,
                    GraphicsSlot::Y => d.y,
                    GraphicsSlot::Z => d.z,
                };
                self.state.bit_image.setup(code, param16(params, 0));
            }

            Command::ReassignBitImage => {
                let code = param(params, 1);
                let d = &mut self.state.densities;
                match GraphicsSlot::from_letter(p0) {
                    Some(GraphicsSlot::K) => d.k = code,
                    Some(GraphicsSlot::L) => d.l = code,
                    Some(GraphicsSlot::Y) => d.y = code,
                    Some(GraphicsSlot::Z) => d.z = code,
                    None => debug!("ESC/P: ESC ? for unknown command {}", printable(p0)),
                }
            }

            Command::LineSpacing360 => self.state.linespacing = f64::from(p0) / 360.0,
            Command::LineSpacing180 => self.state.linespacing = f64::from(p0) / 180.0,
            Command::LineSpacing60 => self.state.linespacing = f64::from(p0) / 60.0,
            Command::LineSpacingEighth => self.state.linespacing = 1.0 / 8.0,
            Command::LineSpacingSixth => self.state.linespacing = 1.0 / 6.0,

            Command::Underline => {
                match switch(p0) {
                    Some(false) => self.state.style.remove(Style::UNDERLINE),
                    Some(true) => {
                        self.state.style.insert(Style::UNDERLINE);
                        self.state.score = Score::Single;
                    }
                    None => {}
                }
                self.update_font();
            }

            Command::ItalicOn => self.set_style(Style::ITALICS, true),
            Command::ItalicOff => self.set_style(Style::ITALICS, false),
            Command::BoldOn => self.set_style(Style::BOLD, true),
            Command::BoldOff => self.set_style(Style::BOLD, false),
            Command::DoubleStrikeOn => self.state.style.insert(Style::DOUBLE_STRIKE),
            Command::DoubleStrikeOff => self.state.style.remove(Style::DOUBLE_STRIKE),

            // codes 128-159 always print
            Command::PrintUpperControl | Command::CancelUpperControl => {
                trace!("ESC/P: upper control setting ignored");
            }

            Command::SelectUserDefined | Command::DefineUserDefined | Command::CopyRomToRam => {
                warn!("ESC/P: User-defined characters not supported");
            }

            Command::Initialize => self.reset(),

            Command::PageLengthLines => {
                if p0 == 0 {
                    self.state.esc.phase = ParsePhase::CollectingParams {
                        pending: Pending::PageLengthInches,
                        required: 1,
                    };
                } else {
                    let s = &mut self.state;
                    s.page_height = f64::from(p0) * s.linespacing;
                    s.bottom_margin = s.page_height;
                }
            }

            Command::AdvanceVertical => {
                let new_y = self.state.curr_y + f64::from(p0) / 180.0;
                self.state.curr_y = new_y;
                if new_y > self.state.bottom_margin {
                    self.new_page();
                }
            }

            Command::Pica => self.select_pitch(10.0),
            Command::Elite => self.select_pitch(12.0),
            Command::Micron => self.select_pitch(15.0),

            Command::BottomMargin => {
                let s = &mut self.state;
                s.top_margin = 0.0;
                s.bottom_margin = f64::from(p0) * s.linespacing;
            }
            Command::CancelBottomMargin => {
                let s = &mut self.state;
                s.top_margin = 0.0;
                s.bottom_margin = s.page_height;
            }

            Command::LeftMargin => {
                let s = &mut self.state;
                s.left_margin = (f64::from(p0) - 1.0).max(0.0) / s.cpi;
                if s.curr_x < s.left_margin {
                    s.curr_x = s.left_margin;
                }
            }
            Command::RightMargin => {
                let s = &mut self.state;
                s.right_margin = (f64::from(p0) - 1.0).max(0.0) / s.cpi;
            }

            Command::InternationalCharset => match charset::intl_charset_index(p0) {
                Some(set) => charset::apply_intl_charset(&mut self.state.cpmap, set),
                None => debug!("ESC/P: unknown international character set {}", p0),
            },

            Command::Script => {
                match switch(p0) {
                    Some(false) => {
                        self.state.style.remove(Style::SUPERSCRIPT);
                        self.state.style.insert(Style::SUBSCRIPT);
                    }
                    Some(true) => {
                        self.state.style.remove(Style::SUBSCRIPT);
                        self.state.style.insert(Style::SUPERSCRIPT);
                    }
                    None => {}
                }
                self.update_font();
            }
            Command::CancelScript => {
                self.set_style(Style::SUPERSCRIPT | Style::SUBSCRIPT, false);
            }

            Command::DoubleWidth => {
                if let Some(on) = switch(p0) {
                    self.set_width_style(Style::DOUBLE_WIDTH, on);
                }
            }
            Command::DoubleHeight => {
                if !self.state.multipoint.enabled {
                    if let Some(on) = switch(p0) {
                        self.set_style(Style::DOUBLE_HEIGHT, on);
                    }
                }
            }

            Command::PitchAndPoint => {
                let s = &mut self.state;
                s.multipoint.enabled = true;
                if s.multipoint.cpi == 0.0 {
                    s.multipoint.cpi = s.cpi;
                }
                match p0 {
                    1 => s.style.insert(Style::PROPORTIONAL),
                    5.. => s.multipoint.cpi = 360.0 / f64::from(p0),
                    _ => {}
                }
                if s.multipoint.size == 0.0 {
                    s.multipoint.size = 10.5;
                }
                let half_points = param16(params, 1);
                if half_points > 0 {
                    s.multipoint.size = f64::from(half_points) / 2.0;
                }
                self.update_font();
            }

            Command::MotionIndex => {
                self.state.hmi = Some(f64::from(param16(params, 0)) / 360.0);
                self.state.extra_intra_space = 0.0;
            }

            Command::Typeface => {
                match Typeface::from_code(p0) {
                    Some(typeface) => self.state.typeface = typeface,
                    None => debug!("ESC/P: unknown typeface {}", p0),
                }
                self.update_font();
            }

            Command::Proportional => {
                let s = &mut self.state;
                match switch(p0) {
                    Some(false) => s.style.remove(Style::PROPORTIONAL),
                    Some(true) => {
                        s.style.insert(Style::PROPORTIONAL);
                        s.quality = Quality::LetterQuality;
                    }
                    None => {}
                }
                s.multipoint.enabled = false;
                s.hmi = None;
                self.update_font();
            }

            Command::Color => {
                if p0 != 0 {
                    warn!("ESC/P: Color printing not supported");
                }
            }

            Command::CharacterTable => {
                let slot = match p0 {
                    0..=3 => Some(p0),
                    b'0'..=b'3' => Some(p0 - b'0'),
                    _ => None,
                };
                if let Some(slot) = slot {
                    self.state.curr_char_table = usize::from(slot);
                }
                self.state.reload_codepage();
                self.update_font();
            }

            Command::Quality => {
                match switch(p0) {
                    Some(false) => self.state.quality = Quality::Draft,
                    Some(true) => self.state.quality = Quality::LetterQuality,
                    None => {}
                }
                self.update_font();
            }

            // entered through their own parse phases
            Command::HorizontalTabs
            | Command::VerticalTabs
            | Command::VfuTabs
            | Command::ExtendedPrefix => {}
        }
    }

    // ========================================================================
    // ESC ( x COMMANDS
    // ========================================================================

    fn execute_extended(&mut self, command: ExtendedCommand, params: &[u8]) {
        trace!("ESC/P: {:?} {:?}", command, params);

        match command {
            ExtendedCommand::AssignCharacterTable => {
                let slot = usize::from(param(params, 2));
                let table = usize::from(param(params, 3));
                if slot < self.state.char_tables.len() && table < CODEPAGES.len() {
                    self.state.char_tables[slot] = CODEPAGES[table];
                    if slot == self.state.curr_char_table {
                        self.state.reload_codepage();
                    }
                    self.update_font();
                }
            }

            ExtendedCommand::LineScore => {
                let s = &mut self.state;
                s.style.remove(Style::SCORES);
                s.score = Score::from_code(param(params, 4));
                if s.score != Score::None {
                    match param(params, 3) {
                        1 => s.style.insert(Style::UNDERLINE),
                        2 => s.style.insert(Style::STRIKETHROUGH),
                        3 => s.style.insert(Style::OVERSCORE),
                        _ => {}
                    }
                }
                self.update_font();
            }

            ExtendedCommand::Barcode => {
                warn!("ESC/P: Bar code printing not supported");
                self.skip(param16(params, 0));
            }

            ExtendedCommand::PageLength => {
                if param(params, 0) != 0 {
                    let s = &mut self.state;
                    let unit = s.defined_unit.unwrap_or(EXTENDED_UNIT);
                    s.page_height = f64::from(param16(params, 2)) / unit;
                    s.bottom_margin = s.page_height;
                    s.top_margin = 0.0;
                }
            }

            ExtendedCommand::SetUnit => match param(params, 2) {
                0 => debug!("ESC/P: ignoring zero unit"),
                m => self.state.defined_unit = Some(3600.0 / f64::from(m)),
            },

            ExtendedCommand::AbsoluteVertical => {
                let s = &self.state;
                let unit = s.defined_unit.unwrap_or(EXTENDED_UNIT);
                let new_y = s.top_margin + f64::from(param16(params, 2)) / unit;
                self.move_vertical(new_y);
            }

            ExtendedCommand::RelativeVertical => {
                let s = &self.state;
                let unit = s.defined_unit.unwrap_or(EXTENDED_UNIT);
                let offset = param16(params, 2) as i16;
                let new_y = s.curr_y + f64::from(offset) / unit;
                if new_y >= s.top_margin {
                    self.move_vertical(new_y);
                }
            }

            ExtendedCommand::PrintData => {
                self.state.esc.verbatim_remaining = param16(params, 0);
            }

            ExtendedCommand::PageFormat => {
                let s = &mut self.state;
                let unit = s.defined_unit.unwrap_or(EXTENDED_UNIT);
                s.top_margin = f64::from(param16(params, 2)) / unit;
                s.bottom_margin = f64::from(param16(params, 4)) / unit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::config::PrinterConfig;
    use crate::printer::state::PrinterState;
    use crate::spool::MemorySpooler;
    use crate::testing::BlockRasterizer;
    use pretty_assertions::assert_eq;

    fn printer() -> EscpPrinter<MemorySpooler> {
        EscpPrinter::new(
            PrinterConfig::default(),
            Box::new(BlockRasterizer::default()),
            MemorySpooler::new(),
        )
    }

    fn feed(p: &mut EscpPrinter<MemorySpooler>, bytes: &[u8]) {
        p.write_all(bytes);
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_printable_is_not_a_command() {
        let mut p = printer();
        assert!(!p.process_char(b'A'));
        assert!(p.process_char(ESC));
        assert_eq!(p.state.esc.phase, ParsePhase::EscapeSeen);
    }

    #[test]
    fn test_params_collected_exactly() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'3']);
        assert!(matches!(
            p.state.esc.phase,
            ParsePhase::CollectingParams { required: 1, .. }
        ));
        feed(&mut p, &[36]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert!(p.state.esc.params.is_empty());
        assert!(close(p.state.linespacing, 0.2));
    }

    #[test]
    fn test_every_fixed_arity_returns_to_idle() {
        for opcode in 0..128u8 {
            let Some(spec) = Command::lookup(opcode) else {
                continue;
            };
            let Arity::Fixed(required) = spec.arity else {
                continue;
            };
            if required == 0 {
                continue;
            }

            let mut p = printer();
            feed(&mut p, &[ESC, opcode]);
            for collected in 1..required {
                feed(&mut p, &[0]);
                assert_eq!(
                    p.state.esc.phase,
                    ParsePhase::CollectingParams {
                        pending: Pending::Command(spec.command),
                        required,
                    },
                    "ESC {}",
                    printable(opcode)
                );
                assert_eq!(p.state.esc.params.len(), usize::from(collected));
            }
            feed(&mut p, &[0]);

            // ESC C 0 reads the page length in inches from one more byte
            if spec.command == Command::PageLengthLines {
                assert_eq!(
                    p.state.esc.phase,
                    ParsePhase::CollectingParams {
                        pending: Pending::PageLengthInches,
                        required: 1,
                    }
                );
                feed(&mut p, &[5]);
            }

            assert_eq!(p.state.esc.phase, ParsePhase::Idle, "ESC {}", printable(opcode));
            assert!(p.state.esc.params.is_empty(), "ESC {}", printable(opcode));
            assert!(!p.state.bit_image.is_active(), "ESC {}", printable(opcode));
        }
    }

    #[test]
    fn test_every_extended_arity_returns_to_idle() {
        let mut seen = 0;
        for selector in 0..=255u8 {
            let Some((command, required)) = ExtendedCommand::lookup(selector) else {
                continue;
            };
            seen += 1;

            let mut p = printer();
            feed(&mut p, &[ESC, b'(', selector]);
            for collected in 1..required {
                feed(&mut p, &[0]);
                assert_eq!(
                    p.state.esc.phase,
                    ParsePhase::CollectingParams {
                        pending: Pending::Extended(command),
                        required,
                    },
                    "ESC ( {}",
                    printable(selector)
                );
                assert_eq!(p.state.esc.params.len(), usize::from(collected));
            }
            feed(&mut p, &[0]);

            assert_eq!(p.state.esc.phase, ParsePhase::Idle, "ESC ( {}", printable(selector));
            assert!(p.state.esc.params.is_empty());
            assert_eq!(p.state.esc.verbatim_remaining, 0);
            assert!(!p.process_char(b'A'));
        }
        assert_eq!(seen, 9);
    }

    #[test]
    fn test_initialize_restores_defaults() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'E', ESC, b'3', 10, ESC, b'k', 1, ESC, b'(', b'U', 1, 0, 20]);
        feed(&mut p, &[ESC, b'D', 4, 8, 0, ESC, b'=']);
        assert_ne!(p.state(), &PrinterState::new(&PrinterConfig::default().page));
        feed(&mut p, &[ESC, b'@']);
        assert_eq!(p.state(), &PrinterState::new(&PrinterConfig::default().page));
    }

    #[test]
    fn test_unknown_opcode_resyncs() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'j']);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert!(!p.process_char(b'x'));
    }

    #[test]
    fn test_unknown_extended_skips_length() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'G', 3, 0]);
        assert_eq!(p.state.esc.phase, ParsePhase::Skipping { remaining: 3 });
        feed(&mut p, &[b'A', b'B', b'C']);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert!(!p.page().is_dirty());
        assert!(!p.process_char(b'D'));
    }

    #[test]
    fn test_unknown_extended_zero_length() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'G', 0, 0]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
    }

    #[test]
    fn test_barcode_skipped() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'B', 4, 0, b'1', b'2', b'3', b'4']);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert!(!p.page().is_dirty());
    }

    #[test]
    fn test_horizontal_tabs() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'D', 10, 20, 0]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert_eq!(p.state.horizontal_tabs.iter().collect::<Vec<_>>(), vec![1.0, 2.0]);

        p.state.curr_x = 1.5;
        feed(&mut p, &[HT]);
        assert!(close(p.state.curr_x, 2.0));

        p.state.curr_x = 2.5;
        feed(&mut p, &[HT]);
        assert!(close(p.state.curr_x, 2.5));
    }

    #[test]
    fn test_tab_list_ends_on_non_increasing() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'D', 10, 20, 15]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert_eq!(p.state.horizontal_tabs.len(), 2);
        // terminator consumed, next byte prints
        assert!(!p.process_char(b'A'));
    }

    #[test]
    fn test_vertical_tab_semantics() {
        let mut p = printer();
        // never set: acts as LF
        p.state.curr_x = 1.0;
        feed(&mut p, &[VT]);
        assert!(close(p.state.curr_y, 1.0 / 6.0));
        assert_eq!(p.state.curr_x, 0.0);

        // cleared: acts as CR
        feed(&mut p, &[ESC, b'B', 0]);
        assert_eq!(p.state.vertical_tabs.as_ref().map(|t| t.len()), Some(0));
        p.state.curr_x = 1.0;
        let y = p.state.curr_y;
        feed(&mut p, &[VT]);
        assert_eq!(p.state.curr_x, 0.0);
        assert_eq!(p.state.curr_y, y);

        // set: moves to the next stop below
        feed(&mut p, &[ESC, b'B', 6, 12, 0]);
        feed(&mut p, &[VT]);
        assert!(close(p.state.curr_y, 1.0));
        feed(&mut p, &[VT]);
        assert!(close(p.state.curr_y, 2.0));

        // none below: form feed
        p.handle_char(b'A');
        feed(&mut p, &[VT]);
        assert_eq!(p.sink().pages().len(), 1);
        assert_eq!(p.state.curr_y, 0.0);
    }

    #[test]
    fn test_vfu_channel_byte_skipped() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'b', 3, 6, 0]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        let tabs: Vec<f64> = p.state.vertical_tabs.as_ref().unwrap().iter().collect();
        assert_eq!(tabs.len(), 1);
        assert!(close(tabs[0], 1.0));
    }

    #[test]
    fn test_absolute_horizontal() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'$', 120, 0]);
        assert!(close(p.state.curr_x, 2.0));

        // past the right margin: unchanged
        feed(&mut p, &[ESC, b'$', 0x10, 0x02]);
        assert!(close(p.state.curr_x, 2.0));
    }

    #[test]
    fn test_relative_horizontal_signed() {
        let mut p = printer();
        p.state.curr_x = 1.0;
        feed(&mut p, &[ESC, b'\\', 120, 0]);
        assert!(close(p.state.curr_x, 2.0));
        let back = (-60i16) as u16;
        feed(&mut p, &[ESC, b'\\', back as u8, (back >> 8) as u8]);
        assert!(close(p.state.curr_x, 1.5));
        // left of the margin: unchanged
        let far = (-600i16) as u16;
        feed(&mut p, &[ESC, b'\\', far as u8, (far >> 8) as u8]);
        assert!(close(p.state.curr_x, 1.5));
    }

    #[test]
    fn test_set_unit_and_absolute_vertical() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'U', 1, 0, 20]);
        assert_eq!(p.state.defined_unit, Some(180.0));
        feed(&mut p, &[ESC, b'(', b'V', 2, 0, 90, 0]);
        assert!(close(p.state.curr_y, 0.5));
        assert_eq!(p.state.to_px(p.state.curr_y), 180);
    }

    #[test]
    fn test_absolute_vertical_past_bottom_ejects() {
        let mut p = printer();
        p.handle_char(b'A');
        // 4000/360 in > 11 in
        feed(&mut p, &[ESC, b'(', b'V', 2, 0, 0xa0, 0x0f]);
        assert_eq!(p.sink().pages().len(), 1);
        assert_eq!(p.state.curr_y, 0.0);
    }

    #[test]
    fn test_relative_vertical() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'v', 2, 0, 180, 0]);
        assert!(close(p.state.curr_y, 0.5));
        let up = (-360i16) as u16;
        feed(&mut p, &[ESC, b'(', b'v', 2, 0, up as u8, (up >> 8) as u8]);
        assert!(close(p.state.curr_y, 0.5));
    }

    #[test]
    fn test_page_format_and_length() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'c', 4, 0, 180, 0, 0x10, 0x0e]);
        assert!(close(p.state.top_margin, 0.5));
        assert!(close(p.state.bottom_margin, 10.0));

        feed(&mut p, &[ESC, b'(', b'C', 2, 0, 0x60, 0x09]);
        assert!(close(p.state.page_height, 2400.0 / 360.0));
        assert_eq!(p.state.top_margin, 0.0);
    }

    #[test]
    fn test_page_length_lines_and_inches() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'C', 33]);
        assert!(close(p.state.page_height, 5.5));
        assert!(close(p.state.bottom_margin, 5.5));

        feed(&mut p, &[ESC, b'C', 0, 7]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert_eq!(p.state.page_height, 7.0);
    }

    #[test]
    fn test_margins() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'l', 11, ESC, b'Q', 71]);
        assert!(close(p.state.left_margin, 1.0));
        assert!(close(p.state.right_margin, 7.0));
        assert!(close(p.state.curr_x, 1.0));
        feed(&mut p, &[b'A', CR]);
        assert!(close(p.state.curr_x, 1.0));
    }

    #[test]
    fn test_line_feed_overflow_ejects() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'N', 2, b'A', LF, LF]);
        assert_eq!(p.sink().pages().len(), 0);
        feed(&mut p, &[LF]);
        assert_eq!(p.sink().pages().len(), 1);
        assert_eq!(p.state.curr_y, 0.0);
    }

    #[test]
    fn test_cr_with_autofeed() {
        let mut p = printer();
        p.state.curr_x = 2.0;
        feed(&mut p, &[CR]);
        assert_eq!(p.state.curr_y, 0.0);
        p.port.autofeed = true;
        p.state.curr_x = 2.0;
        feed(&mut p, &[CR]);
        assert_eq!(p.state.curr_x, 0.0);
        assert!(close(p.state.curr_y, 1.0 / 6.0));
    }

    #[test]
    fn test_backspace() {
        let mut p = printer();
        feed(&mut p, &[BS]);
        assert_eq!(p.state.curr_x, 0.0);
        p.state.curr_x = 0.5;
        feed(&mut p, &[BS]);
        assert!(close(p.state.curr_x, 0.4));
    }

    #[test]
    fn test_one_line_double_width_cancelled_at_line_end() {
        let mut p = printer();
        feed(&mut p, &[SO]);
        assert!(p.state.style.contains(Style::DOUBLE_WIDTH_ONE_LINE));
        assert_eq!(p.state.actual_cpi, 5.0);
        feed(&mut p, &[LF]);
        assert!(!p.state.style.contains(Style::DOUBLE_WIDTH_ONE_LINE));
        assert_eq!(p.state.actual_cpi, 10.0);
    }

    #[test]
    fn test_condensed_on_off() {
        let mut p = printer();
        p.state.hmi = Some(0.2);
        feed(&mut p, &[SI]);
        assert_eq!(p.state.actual_cpi, 17.14);
        assert_eq!(p.state.hmi, None);
        feed(&mut p, &[DC2]);
        assert_eq!(p.state.actual_cpi, 10.0);
    }

    #[test]
    fn test_master_select() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'!', 0x01 | 0x08 | 0x80]);
        assert_eq!(p.state.cpi, 12.0);
        assert!(p.state.style.contains(Style::BOLD | Style::UNDERLINE));
        assert_eq!(p.state.score, Score::Single);
        feed(&mut p, &[ESC, b'!', 0x20]);
        assert_eq!(p.state.cpi, 10.0);
        assert_eq!(p.state.style, Style::DOUBLE_WIDTH);
    }

    #[test]
    fn test_pitch_commands() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'M']);
        assert_eq!(p.state.cpi, 12.0);
        feed(&mut p, &[ESC, b'g']);
        assert_eq!(p.state.cpi, 15.0);
        feed(&mut p, &[ESC, b'P']);
        assert_eq!(p.state.cpi, 10.0);
    }

    #[test]
    fn test_pitch_and_point() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'X', 30, 24, 0]);
        assert!(p.state.multipoint.enabled);
        assert!(close(p.state.multipoint.cpi, 12.0));
        assert_eq!(p.state.multipoint.size, 12.0);
        assert!(close(p.state.actual_cpi, 12.0));
        assert_eq!(p.state.h_points, 12.0);

        // width commands are ignored in multipoint mode
        feed(&mut p, &[ESC, b'W', 1]);
        assert!(!p.state.style.contains(Style::DOUBLE_WIDTH));

        feed(&mut p, &[ESC, b'P']);
        assert!(!p.state.multipoint.enabled);
    }

    #[test]
    fn test_motion_index() {
        let mut p = printer();
        feed(&mut p, &[ESC, b' ', 12]);
        assert!(close(p.state.extra_intra_space, 0.1));
        feed(&mut p, &[ESC, b'c', 72, 0]);
        assert_eq!(p.state.hmi, Some(0.2));
        assert_eq!(p.state.extra_intra_space, 0.0);
    }

    #[test]
    fn test_line_score() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'-', 3, 0, 1, 2, 6]);
        assert!(p.state.style.contains(Style::STRIKETHROUGH));
        assert_eq!(p.state.score, Score::DoubleBroken);
        feed(&mut p, &[ESC, b'(', b'-', 3, 0, 1, 1, 0]);
        assert!(!p.state.style.intersects(Style::SCORES));
        assert_eq!(p.state.score, Score::None);
    }

    #[test]
    fn test_character_tables() {
        let mut p = printer();
        feed(&mut p, &[ESC, b't', b'0']);
        assert_eq!(p.state.curr_char_table, 0);
        assert!(p.state.italic());
        feed(&mut p, &[ESC, b'(', b't', 3, 0, 2, 3, 0]);
        assert_eq!(p.state.char_tables[2], 850);
        feed(&mut p, &[ESC, b'(', b't', 3, 0, 2, 15, 0]);
        assert_eq!(p.state.char_tables[2], 850);
        feed(&mut p, &[ESC, b't', 2]);
        assert_eq!(p.state.curr_char_table, 2);
        assert!(!p.state.italic());
    }

    #[test]
    fn test_international_charset() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'R', 2]);
        assert_eq!(p.state.cpmap[0x5b], 0x00c4);
        feed(&mut p, &[ESC, b'R', b'@']);
        assert_eq!(p.state.cpmap[0x7e], 0x2122);
        feed(&mut p, &[ESC, b't', 1]);
        assert_eq!(p.state.cpmap[0x7e], 0x7e);
    }

    #[test]
    fn test_msb_modes() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'=']);
        assert_eq!(p.state.esc.msb, MsbMode::Clear);
        // 0x9b & 0x7f = ESC
        feed(&mut p, &[0x9b, b'E' | 0x80]);
        assert!(p.state.style.contains(Style::BOLD));
        feed(&mut p, &[ESC, b'#']);
        assert_eq!(p.state.esc.msb, MsbMode::Unmodified);
    }

    #[test]
    fn test_print_verbatim() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'(', b'^', 2, 0, ESC, LF]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert_eq!(p.state.esc.verbatim_remaining, 0);
        assert_eq!(p.state.curr_y, 0.0);
        assert!(close(p.state.curr_x, 0.2));
        assert!(p.page().is_dirty());
    }

    #[test]
    fn test_bit_image_density_zero() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'*', 0, 1, 0, 0b1010_1000]);
        assert!(close(p.state.curr_x, 1.0 / 60.0));
        assert_eq!(p.state.curr_y, 0.0);
        for row in [0, 12, 24] {
            assert_eq!(p.page().get(0, row), Some(255));
        }
        assert_eq!(p.page().get(0, 6), Some(0));
        assert!(p.page().is_dirty());
    }

    #[test]
    fn test_reassigned_graphics_density() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'?', b'K', 39]);
        assert_eq!(p.state.densities.k, 39);
        feed(&mut p, &[ESC, b'K', 2, 0]);
        assert_eq!(p.state.bit_image.remaining(), 6);
        feed(&mut p, &[0xff, 0xff, 0xff, 0, 0, 0]);
        assert!(!p.state.bit_image.is_active());
        assert!(close(p.state.curr_x, 2.0 / 180.0));
    }

    #[test]
    fn test_unsupported_density_consumes_data() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'*', 5, 2, 0, b'A', b'B']);
        assert!(!p.state.bit_image.is_active());
        assert_eq!(p.state.curr_x, 0.0);
        assert!(!p.page().is_dirty());
        assert!(!p.process_char(b'C'));
    }

    #[test]
    fn test_paper_eject() {
        let mut p = printer();
        feed(&mut p, &[b'A', ESC, 0x19, b'R']);
        assert_eq!(p.sink().pages().len(), 1);
    }

    #[test]
    fn test_form_feed() {
        let mut p = printer();
        feed(&mut p, &[FF]);
        assert_eq!(p.sink().pages().len(), 0);
        feed(&mut p, &[b'A', FF]);
        assert_eq!(p.sink().pages().len(), 1);
    }

    #[test]
    fn test_typeface_and_quality() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'x', 1, ESC, b'k', 0]);
        assert_eq!(p.state.quality, Quality::LetterQuality);
        assert_eq!(p.state.typeface, Typeface::Roman);
        feed(&mut p, &[ESC, b'k', 20]);
        assert_eq!(p.state.typeface, Typeface::Roman);
        feed(&mut p, &[ESC, b'p', 1]);
        assert!(p.state.style.contains(Style::PROPORTIONAL));
    }

    #[test]
    fn test_script() {
        let mut p = printer();
        feed(&mut p, &[ESC, b'S', 1]);
        assert!(p.state.style.contains(Style::SUPERSCRIPT));
        feed(&mut p, &[ESC, b'S', b'0']);
        assert!(p.state.style.contains(Style::SUBSCRIPT));
        assert!(!p.state.style.contains(Style::SUPERSCRIPT));
        feed(&mut p, &[ESC, b'T']);
        assert!(!p.state.style.intersects(Style::SUPERSCRIPT | Style::SUBSCRIPT));
    }

    #[test]
    fn test_user_defined_params_consumed() {
        let mut p = printer();
        feed(&mut p, &[ESC, b':', 0, 0, 0]);
        assert_eq!(p.state.esc.phase, ParsePhase::Idle);
        assert!(!p.page().is_dirty());
    }

    #[test]
    fn test_ignored_commands_keep_state() {
        let mut p = printer();
        let before = p.state().clone();
        feed(&mut p, &[ESC, b'U', 1, ESC, b'<', ESC, b'a', 1, ESC, b's', ESC, b'r', 1]);
        feed(&mut p, &[ESC, b'6', ESC, b'7', BEL, DC1, DC3, CAN]);
        assert_eq!(p.state(), &before);
    }
}
