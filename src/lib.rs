//! # utf8validate
//!
//! Structural UTF-8 validation for archival workflows.
//!
//! Every malformed code-unit sequence is reported together with its 1-based
//! byte offset, or only the first one when the caller asks to fail fast.
//!
//! ## Module Organization
//!
//! - [`text`] - Byte sources, violation handlers and the UTF-8 validator
//! - [`file`] - Validating files through a buffered stream or a memory map
//! - [`error`] - Error type for I/O failures
//!
//! ## Quick Start
//!
//! ```
//! use utf8validate::text::{validate_slice, CollectAll, Outcome};
//!
//! let mut handler = CollectAll::new();
//! assert_eq!(validate_slice("€".as_bytes(), &mut handler).unwrap(), Outcome::Valid);
//!
//! let outcome = validate_slice(&[0xC3], &mut handler).unwrap();
//! assert_eq!(outcome, Outcome::Invalid { violations: 1 });
//! assert_eq!(handler.violations()[0].byte_offset(), -1);
//! ```
//!
//! ## Features
//!
//! - `mmap` (default) - Memory-mapped file access via [`file::Access::Mapped`]
//! - `cli` - Build the `utf8validate` command-line tool

// =============================================================================
// Core modules
// =============================================================================

/// Error types.
pub mod error;

/// UTF-8 validation over byte sources.
pub mod text;

/// File-level entry point.
pub mod file;

// =============================================================================
// Public re-exports
// =============================================================================

pub use error::{Error, Result};
pub use file::{validate_path, Access, Options};
pub use text::{
    validate, validate_slice, ByteSource, CollectAll, FailFast, Flow, Outcome, Policy,
    SliceSource, StreamSource, ValidationHandler, Violation, ViolationKind,
};
