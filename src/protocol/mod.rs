//! # ESC/P Protocol Tables
//!
//! Static descriptions of the ESC/P control language: which bytes are
//! commands, how many parameters they take, and the lookup tables the
//! printer consults while executing them.
//!
//! ## Module Structure
//!
//! - [`commands`]: Control codes and the `ESC x` / `ESC ( x` command tables
//! - [`density`]: Bit-image density table for `ESC *` and `ESC K/L/Y/Z`
//! - [`charset`]: Codepages and international character sets
//!
//! ## Usage Example
//!
//! ```
//! use needlepoint::protocol::commands::{Arity, Command, ESC};
//!
//! // ESC 3 n: set n/180-inch line spacing
//! let stream = [ESC, b'3', 30];
//! let spec = Command::lookup(stream[1]).unwrap();
//! assert_eq!(spec.command, Command::LineSpacing180);
//! assert_eq!(spec.arity, Arity::Fixed(1));
//! ```
//!
//! ## Protocol Reference
//!
//! Based on the "ESC/P Reference Manual" by Seiko Epson Corporation,
//! covering the 9-pin and 24-pin ESC/P and ESC/P2 command sets.

pub mod charset;
pub mod commands;
pub mod density;
