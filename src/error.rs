//! # Error Types
//!
//! This module defines error types used throughout the needlepoint library.
//!
//! Errors only surface from operations that touch the outside world (font
//! files, page images, configuration). The byte-stream interpreter itself
//! never fails: malformed input is logged and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for needlepoint operations
#[derive(Debug, Error)]
pub enum NeedlepointError {
    /// A font file could not be opened or parsed
    #[error("Unable to load font '{}': {}", .path.display(), .reason)]
    FontLoad { path: PathBuf, reason: String },

    /// A page image could not be encoded or written
    #[error("Encoding error: {0}")]
    Encode(String),

    /// Invalid configuration file or value
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
