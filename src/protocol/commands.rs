//! # ESC/P Command Table
//!
//! This module describes the ESC/P control language as understood by the
//! emulated dot-matrix printer: the single-byte control codes, the
//! `ESC x` commands and the two-level `ESC ( x` commands.
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`, `FF`, `HT`, `SO`, `SI`
//! - Two bytes: `ESC @`, `ESC E`, `ESC 4`
//! - Fixed parameters: `ESC 3 n`, `ESC $ nL nH`, `ESC * m nL nH`
//! - Tab lists: `ESC D n1 n2 ... NUL`
//! - Extended: `ESC ( x nL nH d1 ... dk`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//!
//! ## Dispatch
//!
//! Opcodes are resolved through static tables built at compile time. Each
//! entry carries the command variant together with its parameter arity, so
//! the interpreter never has to branch on raw opcode numbers.

// ============================================================================
// CONTROL CODES
// ============================================================================

/// BEL - Beeper
pub const BEL: u8 = 0x07;

/// BS - Backspace by one character
pub const BS: u8 = 0x08;

/// HT - Advance to the next horizontal tab stop
pub const HT: u8 = 0x09;

/// LF - Line feed (also returns the carriage)
pub const LF: u8 = 0x0A;

/// VT - Advance to the next vertical tab stop
pub const VT: u8 = 0x0B;

/// FF - Form feed (eject the page)
pub const FF: u8 = 0x0C;

/// CR - Carriage return
pub const CR: u8 = 0x0D;

/// SO - Double-width printing for one line
pub const SO: u8 = 0x0E;

/// SI - Condensed printing
pub const SI: u8 = 0x0F;

/// DC1 - Select printer
pub const DC1: u8 = 0x11;

/// DC2 - Cancel condensed printing
pub const DC2: u8 = 0x12;

/// DC3 - Deselect printer
pub const DC3: u8 = 0x13;

/// DC4 - Cancel one-line double-width printing
pub const DC4: u8 = 0x14;

/// CAN - Cancel line
pub const CAN: u8 = 0x18;

/// ESC (Escape) - Command prefix byte
///
/// Every ESC/P command begins with ESC (0x1B). This byte signals the start
/// of a control sequence rather than printable text.
pub const ESC: u8 = 0x1B;

/// Second byte of the two-level `ESC ( x` commands
pub const EXTENDED_PREFIX: u8 = b'(';

/// Build a little-endian u16 from two parameter bytes.
#[inline]
pub fn u16_le(low: u8, high: u8) -> u16 {
    u16::from(low) | (u16::from(high) << 8)
}

// ============================================================================
// COMMAND VARIANTS
// ============================================================================

/// Which tab list an `ESC B` / `ESC D` / `ESC b` sequence is filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    /// `ESC D`: stops in columns of the current pitch
    Horizontal,
    /// `ESC B`: stops in lines of the current line spacing
    Vertical,
    /// `ESC b c`: vertical stops for a VFU channel (channel byte first)
    VfuChannel,
}

/// Parameter shape of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many parameter bytes follow the opcode
    Fixed(u8),
    /// A zero- or non-increasing-terminated list of tab stops follows
    TabList(TabKind),
    /// A selector byte follows, looked up in the extended table
    Extended,
}

/// Graphics command letters whose density can be reassigned with `ESC ?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsSlot {
    K,
    L,
    Y,
    Z,
}

impl GraphicsSlot {
    /// Map the command letter used by `ESC ?` to its slot.
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'K' => Some(Self::K),
            b'L' => Some(Self::L),
            b'Y' => Some(Self::Y),
            b'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// Single-level `ESC x` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// ESC STX (undocumented, ignored)
    Undocumented,
    /// ESC SO - double-width printing for one line
    DoubleWidthOneLine,
    /// ESC SI - condensed printing
    Condensed,
    /// ESC EM n - paper loading / ejecting
    PaperLoading,
    /// ESC SP n - intercharacter space
    IntercharacterSpace,
    /// ESC ! n - master select
    MasterSelect,
    /// ESC # - cancel MSB control
    CancelMsb,
    /// ESC $ nL nH - absolute horizontal print position
    AbsoluteHorizontal,
    /// ESC % n - select user-defined set (unsupported)
    SelectUserDefined,
    /// ESC & - define user-defined characters (unsupported)
    DefineUserDefined,
    /// ESC * m nL nH - select bit image
    BitImage,
    /// ESC + n - n/360-inch line spacing
    LineSpacing360,
    /// ESC - n - underline on/off
    Underline,
    /// ESC / c - select vertical tab channel
    VerticalTabChannel,
    /// ESC 0 - 1/8-inch line spacing
    LineSpacingEighth,
    /// ESC 2 - 1/6-inch line spacing
    LineSpacingSixth,
    /// ESC 3 n - n/180-inch line spacing
    LineSpacing180,
    /// ESC 4 - italics on
    ItalicOn,
    /// ESC 5 - italics off
    ItalicOff,
    /// ESC 6 - print upper control codes
    PrintUpperControl,
    /// ESC 7 - treat upper control codes as control codes
    CancelUpperControl,
    /// ESC : 0 n m - copy ROM to RAM (unsupported)
    CopyRomToRam,
    /// ESC < - unidirectional mode for one line
    UnidirectionalOnce,
    /// ESC = - force MSB to 0
    MsbClear,
    /// ESC > - force MSB to 1
    MsbSet,
    /// ESC ? c m - reassign bit-image density
    ReassignBitImage,
    /// ESC @ - initialize printer
    Initialize,
    /// ESC A n - n/60-inch line spacing
    LineSpacing60,
    /// ESC C n - page length in lines (n = 0 is followed by inches)
    PageLengthLines,
    /// ESC E - bold on
    BoldOn,
    /// ESC F - bold off
    BoldOff,
    /// ESC G - double-strike on
    DoubleStrikeOn,
    /// ESC H - double-strike off
    DoubleStrikeOff,
    /// ESC J n - advance vertically n/180 inch
    AdvanceVertical,
    /// ESC K / L / Y / Z nL nH - graphics at the slot's density
    Graphics(GraphicsSlot),
    /// ESC M - 10.5-point, 12-cpi
    Elite,
    /// ESC N n - bottom margin in lines
    BottomMargin,
    /// ESC O - cancel bottom margin
    CancelBottomMargin,
    /// ESC P - 10.5-point, 10-cpi
    Pica,
    /// ESC Q n - right margin in columns
    RightMargin,
    /// ESC R n - international character set
    InternationalCharset,
    /// ESC S n - superscript / subscript
    Script,
    /// ESC T - cancel superscript / subscript
    CancelScript,
    /// ESC U n - unidirectional mode
    Unidirectional,
    /// ESC W n - double-width on/off
    DoubleWidth,
    /// ESC X m nL nH - select font by pitch and point
    PitchAndPoint,
    /// ESC \ nL nH - relative horizontal print position
    RelativeHorizontal,
    /// ESC a n - justification
    Justification,
    /// ESC c nL nH - horizontal motion index
    MotionIndex,
    /// ESC g - 10.5-point, 15-cpi
    Micron,
    /// ESC k n - select typeface
    Typeface,
    /// ESC l n - left margin in columns
    LeftMargin,
    /// ESC p n - proportional mode on/off
    Proportional,
    /// ESC r n - printing colour
    Color,
    /// ESC s - low-speed mode
    LowSpeed,
    /// ESC t n - select character table
    CharacterTable,
    /// ESC w n - double-height on/off
    DoubleHeight,
    /// ESC x n - draft / letter quality
    Quality,
    /// ESC D - horizontal tab stops
    HorizontalTabs,
    /// ESC B - vertical tab stops
    VerticalTabs,
    /// ESC b c - vertical tab stops in a VFU channel
    VfuTabs,
    /// ESC ( - two-level command prefix
    ExtendedPrefix,
}

/// A command table entry: the variant and how many bytes it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: Command,
    pub arity: Arity,
}

const fn fixed(command: Command, count: u8) -> Option<CommandSpec> {
    Some(CommandSpec {
        command,
        arity: Arity::Fixed(count),
    })
}

const fn tabs(command: Command, kind: TabKind) -> Option<CommandSpec> {
    Some(CommandSpec {
        command,
        arity: Arity::TabList(kind),
    })
}

static COMMAND_TABLE: [Option<CommandSpec>; 128] = build_command_table();

const fn build_command_table() -> [Option<CommandSpec>; 128] {
    use Command::*;

    let mut t: [Option<CommandSpec>; 128] = [None; 128];

    t[0x02] = fixed(Undocumented, 0);
    t[0x0e] = fixed(DoubleWidthOneLine, 0);
    t[0x0f] = fixed(Condensed, 0);
    t[0x19] = fixed(PaperLoading, 1);
    t[b' ' as usize] = fixed(IntercharacterSpace, 1);
    t[b'!' as usize] = fixed(MasterSelect, 1);
    t[b'#' as usize] = fixed(CancelMsb, 0);
    t[b'$' as usize] = fixed(AbsoluteHorizontal, 2);
    t[b'%' as usize] = fixed(SelectUserDefined, 1);
    t[b'&' as usize] = fixed(DefineUserDefined, 0);
    t[EXTENDED_PREFIX as usize] = Some(CommandSpec {
        command: ExtendedPrefix,
        arity: Arity::Extended,
    });
    t[b'*' as usize] = fixed(BitImage, 3);
    t[b'+' as usize] = fixed(LineSpacing360, 1);
    t[b'-' as usize] = fixed(Underline, 1);
    t[b'/' as usize] = fixed(VerticalTabChannel, 1);
    t[b'0' as usize] = fixed(LineSpacingEighth, 0);
    t[b'2' as usize] = fixed(LineSpacingSixth, 0);
    t[b'3' as usize] = fixed(LineSpacing180, 1);
    t[b'4' as usize] = fixed(ItalicOn, 0);
    t[b'5' as usize] = fixed(ItalicOff, 0);
    t[b'6' as usize] = fixed(PrintUpperControl, 0);
    t[b'7' as usize] = fixed(CancelUpperControl, 0);
    t[b':' as usize] = fixed(CopyRomToRam, 3);
    t[b'<' as usize] = fixed(UnidirectionalOnce, 0);
    t[b'=' as usize] = fixed(MsbClear, 0);
    t[b'>' as usize] = fixed(MsbSet, 0);
    t[b'?' as usize] = fixed(ReassignBitImage, 2);
    t[b'@' as usize] = fixed(Initialize, 0);
    t[b'A' as usize] = fixed(LineSpacing60, 1);
    t[b'B' as usize] = tabs(VerticalTabs, TabKind::Vertical);
    t[b'C' as usize] = fixed(PageLengthLines, 1);
    t[b'D' as usize] = tabs(HorizontalTabs, TabKind::Horizontal);
    t[b'E' as usize] = fixed(BoldOn, 0);
    t[b'F' as usize] = fixed(BoldOff, 0);
    t[b'G' as usize] = fixed(DoubleStrikeOn, 0);
    t[b'H' as usize] = fixed(DoubleStrikeOff, 0);
    t[b'J' as usize] = fixed(AdvanceVertical, 1);
    t[b'K' as usize] = fixed(Graphics(GraphicsSlot::K), 2);
    t[b'L' as usize] = fixed(Graphics(GraphicsSlot::L), 2);
    t[b'M' as usize] = fixed(Elite, 0);
    t[b'N' as usize] = fixed(BottomMargin, 1);
    t[b'O' as usize] = fixed(CancelBottomMargin, 0);
    t[b'P' as usize] = fixed(Pica, 0);
    t[b'Q' as usize] = fixed(RightMargin, 1);
    t[b'R' as usize] = fixed(InternationalCharset, 1);
    t[b'S' as usize] = fixed(Script, 1);
    t[b'T' as usize] = fixed(CancelScript, 0);
    t[b'U' as usize] = fixed(Unidirectional, 1);
    t[b'W' as usize] = fixed(DoubleWidth, 1);
    t[b'X' as usize] = fixed(PitchAndPoint, 3);
    t[b'Y' as usize] = fixed(Graphics(GraphicsSlot::Y), 2);
    t[b'Z' as usize] = fixed(Graphics(GraphicsSlot::Z), 2);
    t[b'\\' as usize] = fixed(RelativeHorizontal, 2);
    t[b'a' as usize] = fixed(Justification, 1);
    t[b'b' as usize] = tabs(VfuTabs, TabKind::VfuChannel);
    t[b'c' as usize] = fixed(MotionIndex, 2);
    t[b'g' as usize] = fixed(Micron, 0);
    t[b'k' as usize] = fixed(Typeface, 1);
    t[b'l' as usize] = fixed(LeftMargin, 1);
    t[b'p' as usize] = fixed(Proportional, 1);
    t[b'r' as usize] = fixed(Color, 1);
    t[b's' as usize] = fixed(LowSpeed, 0);
    t[b't' as usize] = fixed(CharacterTable, 1);
    t[b'w' as usize] = fixed(DoubleHeight, 1);
    t[b'x' as usize] = fixed(Quality, 1);

    t
}

impl Command {
    /// Look up the command selected by the byte following ESC.
    ///
    /// Returns `None` for opcodes the printer does not know.
    ///
    /// ## Example
    ///
    /// ```
    /// use needlepoint::protocol::commands::{Arity, Command};
    ///
    /// let spec = Command::lookup(b'$').unwrap();
    /// assert_eq!(spec.command, Command::AbsoluteHorizontal);
    /// assert_eq!(spec.arity, Arity::Fixed(2));
    /// ```
    #[inline]
    pub fn lookup(opcode: u8) -> Option<CommandSpec> {
        COMMAND_TABLE.get(opcode as usize).copied().flatten()
    }
}

// ============================================================================
// EXTENDED (ESC ( x) COMMANDS
// ============================================================================

/// Two-level `ESC ( x` commands.
///
/// All of them start with a little-endian length word; the arity below
/// includes those two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedCommand {
    /// ESC ( t - assign a codepage to a character table slot
    AssignCharacterTable,
    /// ESC ( - - select line / score
    LineScore,
    /// ESC ( B - bar code setup and print (unsupported, skipped)
    Barcode,
    /// ESC ( C - page length in defined units
    PageLength,
    /// ESC ( U - set unit
    SetUnit,
    /// ESC ( V - absolute vertical print position
    AbsoluteVertical,
    /// ESC ( ^ - print data as characters
    PrintData,
    /// ESC ( c - page format (top / bottom margin)
    PageFormat,
    /// ESC ( v - relative vertical print position
    RelativeVertical,
}

static EXTENDED_TABLE: [(u8, ExtendedCommand, u8); 9] = [
    (b't', ExtendedCommand::AssignCharacterTable, 5),
    (b'-', ExtendedCommand::LineScore, 5),
    (b'B', ExtendedCommand::Barcode, 2),
    (b'C', ExtendedCommand::PageLength, 4),
    (b'U', ExtendedCommand::SetUnit, 3),
    (b'V', ExtendedCommand::AbsoluteVertical, 4),
    (b'^', ExtendedCommand::PrintData, 2),
    (b'c', ExtendedCommand::PageFormat, 6),
    (b'v', ExtendedCommand::RelativeVertical, 4),
];

impl ExtendedCommand {
    /// Look up the command selected by the byte following `ESC (`.
    ///
    /// Returns the command and the number of parameter bytes it takes.
    pub fn lookup(selector: u8) -> Option<(ExtendedCommand, u8)> {
        EXTENDED_TABLE
            .iter()
            .find(|(byte, _, _)| *byte == selector)
            .map(|&(_, command, arity)| (command, arity))
    }
}

/// Render an opcode for diagnostics: the character if printable, else `?`.
pub fn printable(byte: u8) -> char {
    if (0x20..0x7f).contains(&byte) {
        byte as char
    } else {
        '?'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x34, 0x12), 0x1234);
        assert_eq!(u16_le(0xff, 0x00), 255);
    }

    #[test]
    fn test_lookup_arities() {
        assert_eq!(Command::lookup(b'@').unwrap().arity, Arity::Fixed(0));
        assert_eq!(Command::lookup(b'3').unwrap().arity, Arity::Fixed(1));
        assert_eq!(Command::lookup(b'\\').unwrap().arity, Arity::Fixed(2));
        assert_eq!(Command::lookup(b'*').unwrap().arity, Arity::Fixed(3));
        assert_eq!(Command::lookup(b'X').unwrap().arity, Arity::Fixed(3));
        assert_eq!(
            Command::lookup(b'D').unwrap().arity,
            Arity::TabList(TabKind::Horizontal)
        );
        assert_eq!(
            Command::lookup(b'b').unwrap().arity,
            Arity::TabList(TabKind::VfuChannel)
        );
        assert_eq!(Command::lookup(b'(').unwrap().arity, Arity::Extended);
    }

    #[test]
    fn test_graphics_letters() {
        assert_eq!(
            Command::lookup(b'Z').unwrap().command,
            Command::Graphics(GraphicsSlot::Z)
        );
        assert_eq!(GraphicsSlot::from_letter(b'L'), Some(GraphicsSlot::L));
        assert_eq!(GraphicsSlot::from_letter(b'Q'), None);
    }

    #[test]
    fn test_unknown_opcodes() {
        assert!(Command::lookup(b'j').is_none());
        assert!(Command::lookup(b'i').is_none());
        assert!(Command::lookup(0x7f).is_none());
        assert!(Command::lookup(0xc0).is_none());
    }

    #[test]
    fn test_extended_lookup() {
        assert_eq!(
            ExtendedCommand::lookup(b'U'),
            Some((ExtendedCommand::SetUnit, 3))
        );
        assert_eq!(
            ExtendedCommand::lookup(b'c'),
            Some((ExtendedCommand::PageFormat, 6))
        );
        assert_eq!(ExtendedCommand::lookup(b'G'), None);
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable(b'A'), 'A');
        assert_eq!(printable(0x0e), '?');
    }
}
