//! # Printer Module
//!
//! This module holds the printer's configuration and its mutable state.
//!
//! ## Modules
//!
//! - [`config`]: Page geometry and device settings
//! - [`state`]: Printer state, style model and font metrics
//! - [`tabs`]: Bounded tab-stop lists

pub mod config;
pub mod state;
pub mod tabs;

pub use config::{FontFiles, PageGeometry, PrinterConfig};
pub use state::{PrinterState, Quality, Score, Style, Typeface};
pub use tabs::TabStops;
