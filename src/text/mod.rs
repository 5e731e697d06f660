//! Text processing utilities.
//!
//! This module provides structural UTF-8 validation over byte sources.
//!
//! ## UTF-8 Validation
//!
//! - [`source`]: where bytes come from (streamed or resident in memory)
//! - [`handler`]: what happens to each violation (collect all or fail fast)
//! - [`utf8`]: the validator itself
//!
//! ```
//! use std::io::Cursor;
//! use utf8validate::text::{validate, CollectAll, Outcome, StreamSource, ViolationKind};
//!
//! let mut source = StreamSource::new(Cursor::new(vec![0x78u8, 0xC2, 0x78]));
//! let mut handler = CollectAll::new();
//! let outcome = validate(&mut source, &mut handler).unwrap();
//!
//! assert_eq!(outcome, Outcome::Invalid { violations: 1 });
//! let v = handler.violations()[0];
//! assert_eq!(v.offset, Some(3));
//! assert!(matches!(v.kind, ViolationKind::InvalidContinuation { position: 2, length: 2, .. }));
//! ```

pub mod handler;
pub mod source;
pub mod utf8;

// Re-export commonly used types
pub use handler::{CollectAll, FailFast, Flow, Policy, ValidationHandler};
pub use source::{ByteSource, SliceSource, StreamSource, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
pub use utf8::{validate, validate_slice, Outcome, Violation, ViolationKind};
