//! Structural UTF-8 validation with offset reporting.
//!
//! The validator is a single forward pass over a [`ByteSource`]. It tracks
//! how many continuation bytes the current multi-byte sequence still needs
//! and reports every break in the byte pattern to a [`ValidationHandler`].
//!
//! ## UTF-8 Encoding Rules
//!
//! | Bytes | First byte    | Continuation bytes |
//! |-------|---------------|--------------------|
//! | 1     | `0xxxxxxx`    | -                  |
//! | 2     | `110xxxxx`    | `10xxxxxx`         |
//! | 3     | `1110xxxx`    | `10xxxxxx` × 2     |
//! | 4     | `11110xxx`    | `10xxxxxx` × 3     |
//!
//! ## Validation Checks
//!
//! 1. **Invalid lead bytes**: a `10xxxxxx` byte where a lead byte is expected
//! 2. **Invalid continuation bytes**: anything but `10xxxxxx` inside a sequence
//! 3. **Truncated sequences**: a multi-byte sequence cut off at end of input
//!
//! Lead bytes are classified by mask tests only, longest prefix first, so
//! `0xF8..=0xFF` open a four-byte sequence and `0xC0`/`0xC1` a two-byte one.
//! Overlong forms, surrogates and code points above U+10FFFF are structurally
//! well formed and are not reported.
//!
//! ```
//! use utf8validate::text::utf8::{validate_slice, Outcome};
//! use utf8validate::text::handler::CollectAll;
//!
//! let mut handler = CollectAll::new();
//! let outcome = validate_slice(&[0x92, 0x2C, 0x63], &mut handler).unwrap();
//! assert_eq!(outcome, Outcome::Invalid { violations: 1 });
//! assert_eq!(handler.violations()[0].offset, Some(1));
//! ```

use std::fmt;

use super::handler::{Flow, ValidationHandler};
use super::source::{ByteSource, SliceSource};
use crate::error::Result;

const CONTINUATION_MASK: u8 = 0xC0;
const CONTINUATION_BITS: u8 = 0x80;
const FOUR_BYTE_LEAD: u8 = 0xF0; // 11110xxx
const THREE_BYTE_LEAD: u8 = 0xE0; // 1110xxxx
const TWO_BYTE_LEAD: u8 = 0xC0; // 110xxxxx

/// A single break in the UTF-8 byte pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// The rule that was broken.
    pub kind: ViolationKind,
    /// 1-based offset of the offending byte, or `None` when the input ended
    /// before the offending position existed.
    pub offset: Option<u64>,
}

impl Violation {
    /// Offset in signed form: the 1-based position, or `-1` if unknown.
    pub fn byte_offset(&self) -> i64 {
        self.offset
            .and_then(|o| i64::try_from(o).ok())
            .unwrap_or(-1)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at byte {}", self.kind, offset),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// The specific UTF-8 rule that was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A `10xxxxxx` byte appeared where a lead byte was expected.
    InvalidLeadByte { byte: u8 },

    /// Byte `position` of a `length`-byte sequence is not `10xxxxxx`.
    InvalidContinuation { byte: u8, position: u8, length: u8 },

    /// Input ended with `remaining` bytes still owed to a `length`-byte sequence.
    Truncated { remaining: u8, length: u8 },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::InvalidLeadByte { byte } => {
                write!(f, "invalid single-byte UTF-8 character {}", format_byte(byte))
            }
            Self::InvalidContinuation {
                byte,
                position,
                length,
            } => write!(
                f,
                "invalid UTF-8 sequence, byte {} of {} byte sequence (found {})",
                position,
                length,
                format_byte(byte)
            ),
            Self::Truncated { remaining, length } => write!(
                f,
                "invalid UTF-8 sequence, expecting {} more bytes in {} byte sequence, end of input reached",
                remaining, length
            ),
        }
    }
}

/// How a validation call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No violations were found.
    Valid,
    /// The scan reached end of input after reporting `violations` violations.
    Invalid { violations: u64 },
    /// The handler stopped the scan at this violation.
    Aborted(Violation),
}

impl Outcome {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Mutable state of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Continuation bytes still owed to the current sequence; zero between
    /// characters.
    pub pending: u8,
    /// Total length of the sequence in progress; meaningful only while
    /// `pending > 0`.
    pub sequence_length: u8,
    /// Bytes read so far. Never rolled back.
    pub consumed: u64,
}

impl ScanState {
    /// Advance the machine by one byte, returning the violation it causes.
    #[inline]
    pub fn step(&mut self, byte: u8) -> Option<Violation> {
        self.consumed += 1;

        if self.pending > 0 {
            self.pending -= 1;
            if is_continuation_byte(byte) {
                return None;
            }
            let kind = ViolationKind::InvalidContinuation {
                byte,
                position: self.sequence_length - self.pending,
                length: self.sequence_length,
            };
            // The broken sequence is abandoned; the next byte must be a lead.
            self.pending = 0;
            return Some(Violation {
                kind,
                offset: Some(self.consumed),
            });
        }

        match classify_lead(byte) {
            Some(1) => None,
            Some(length) => {
                self.sequence_length = length;
                self.pending = length - 1;
                None
            }
            None => Some(Violation {
                kind: ViolationKind::InvalidLeadByte { byte },
                offset: Some(self.consumed),
            }),
        }
    }

    /// The violation owed at end of input, if a sequence is still open.
    pub fn finish(&self) -> Option<Violation> {
        (self.pending > 0).then_some(Violation {
            kind: ViolationKind::Truncated {
                remaining: self.pending,
                length: self.sequence_length,
            },
            offset: None,
        })
    }
}

/// Validate every byte of `source`, reporting violations to `handler`.
///
/// Returns [`Outcome::Aborted`] as soon as the handler answers
/// [`Flow::Abort`]. I/O errors from the source are returned unchanged and are
/// never reported to the handler.
pub fn validate<S, H>(source: &mut S, handler: &mut H) -> Result<Outcome>
where
    S: ByteSource + ?Sized,
    H: ValidationHandler + ?Sized,
{
    let mut state = ScanState::default();
    let mut violations = 0u64;

    tracing::debug!(source = source.label(), "starting UTF-8 scan");

    while let Some(byte) = source.next_byte()? {
        if let Some(violation) = state.step(byte) {
            violations += 1;
            if report(source.label(), &violation, handler) == Flow::Abort {
                tracing::debug!(
                    source = source.label(),
                    bytes = state.consumed,
                    "UTF-8 scan aborted"
                );
                return Ok(Outcome::Aborted(violation));
            }
        }
    }

    if let Some(violation) = state.finish() {
        violations += 1;
        if report(source.label(), &violation, handler) == Flow::Abort {
            return Ok(Outcome::Aborted(violation));
        }
    }

    tracing::debug!(
        source = source.label(),
        bytes = state.consumed,
        violations,
        "UTF-8 scan complete"
    );

    Ok(if violations == 0 {
        Outcome::Valid
    } else {
        Outcome::Invalid { violations }
    })
}

/// Validate an in-memory byte slice.
///
/// # Examples
///
/// ```
/// use utf8validate::text::utf8::{validate_slice, Outcome};
/// use utf8validate::text::handler::FailFast;
///
/// let mut handler = FailFast::new();
/// assert!(validate_slice("日本語".as_bytes(), &mut handler).unwrap().is_valid());
///
/// let outcome = validate_slice(&[0xC2, 0x78], &mut handler).unwrap();
/// assert!(matches!(outcome, Outcome::Aborted(v) if v.offset == Some(2)));
/// ```
pub fn validate_slice<H>(input: &[u8], handler: &mut H) -> Result<Outcome>
where
    H: ValidationHandler + ?Sized,
{
    validate(&mut SliceSource::new(input), handler)
}

#[inline]
fn report<H>(label: &str, violation: &Violation, handler: &mut H) -> Flow
where
    H: ValidationHandler + ?Sized,
{
    tracing::trace!(
        source = label,
        offset = violation.byte_offset(),
        "{}",
        violation.kind
    );
    handler.error(label, violation)
}

/// Check if a byte matches the continuation pattern `10xxxxxx`.
#[inline(always)]
pub fn is_continuation_byte(byte: u8) -> bool {
    (byte & CONTINUATION_MASK) == CONTINUATION_BITS
}

/// Sequence length announced by a lead byte, or `None` for `10xxxxxx`.
///
/// Masks are tested longest prefix first because they nest.
#[inline]
pub fn classify_lead(byte: u8) -> Option<u8> {
    if byte & 0x80 == 0 {
        Some(1)
    } else if byte & FOUR_BYTE_LEAD == FOUR_BYTE_LEAD {
        Some(4)
    } else if byte & THREE_BYTE_LEAD == THREE_BYTE_LEAD {
        Some(3)
    } else if byte & TWO_BYTE_LEAD == TWO_BYTE_LEAD {
        Some(2)
    } else {
        None
    }
}

/// Format a byte for display (e.g. `0x92`).
pub fn format_byte(byte: u8) -> String {
    format!("0x{:02X}", byte)
}
