//! # Needlepoint - ESC/P Dot-Matrix Printer Emulation
//!
//! Needlepoint emulates an Epson ESC/P compatible dot-matrix printer sitting
//! on a parallel port. Bytes arrive one at a time through the port handshake,
//! are interpreted as ESC/P commands or printable characters, and are
//! composited onto a page raster. Finished pages are handed to a sink, which
//! by default writes grayscale PNG files.
//!
//! - **Interpreter**: single-level `ESC x` and two-level `ESC ( x` commands,
//!   tab lists, control codes
//! - **Typography**: pitches, condensed, double width and height, multipoint,
//!   super/subscript, bold, double strike, italics, score lines
//! - **Graphics**: `ESC *` and the reassignable `ESC K/L/Y/Z` bit images
//! - **Port**: data, control and status registers of a Centronics port
//!
//! ## Quick Start
//!
//! ```no_run
//! use needlepoint::{
//!     EscpPrinter, PrinterConfig,
//!     font::SpleenRasterizer,
//!     port::{Control, LptDevice},
//!     spool::FileSpooler,
//! };
//!
//! let config = PrinterConfig::default();
//! let spool = FileSpooler::new(&config.output_dir, &config.file_prefix)?;
//! let mut printer = EscpPrinter::new(config, Box::new(SpleenRasterizer::loaded()), spool);
//!
//! for &byte in b"\x1b@\x1bEHello\x0c" {
//!     printer.write_data(byte);
//!     printer.write_control(Control::STROBE | Control::NOT_RESET | Control::SELECT);
//!     printer.write_control(Control::NOT_RESET | Control::SELECT);
//! }
//! printer.close();
//!
//! # Ok::<(), needlepoint::NeedlepointError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Command tables, character sets, bit-image densities |
//! | [`printer`] | Configuration, printer state, tab stops |
//! | [`interpreter`] | Byte-at-a-time command state machine |
//! | [`render`] | Page surface, bit-image columns, score lines |
//! | [`font`] | Glyph rasterizers (TrueType and built-in bitmap) |
//! | [`device`] | The printer: state + page + fonts + sink |
//! | [`port`] | Parallel port handshake |
//! | [`spool`] | Page sinks |
//! | [`error`] | Error types |

pub mod device;
pub mod error;
pub mod font;
pub mod interpreter;
pub mod port;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod spool;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use device::EscpPrinter;
pub use error::NeedlepointError;
pub use printer::PrinterConfig;
