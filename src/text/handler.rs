//! Violation handlers and failure policy.
//!
//! The validator hands every violation to a [`ValidationHandler`]. The
//! handler's [`Flow`] answer decides whether scanning continues, which is how
//! the two standard policies are expressed:
//!
//! - [`CollectAll`]: record the violation and keep scanning to end of input.
//! - [`FailFast`]: remember the first violation and stop.

use super::utf8::Violation;

/// Whether the validator should keep scanning after a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep scanning.
    Continue,
    /// Stop scanning; the validation call returns [`Outcome::Aborted`](super::utf8::Outcome::Aborted).
    Abort,
}

/// Receives violations as the validator finds them.
pub trait ValidationHandler {
    /// Handle one violation found in the source identified by `label`.
    fn error(&mut self, label: &str, violation: &Violation) -> Flow;
}

impl<F> ValidationHandler for F
where
    F: FnMut(&str, &Violation) -> Flow,
{
    #[inline]
    fn error(&mut self, label: &str, violation: &Violation) -> Flow {
        self(label, violation)
    }
}

/// Failure policy selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Scan to completion and report every violation.
    #[default]
    CollectAll,
    /// Stop at the first violation.
    FailFast,
}

impl Policy {
    /// Map the `--fail-fast` switch onto a policy.
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::CollectAll
        }
    }

    /// The flow a handler following this policy returns after a violation.
    #[inline]
    pub fn flow(self) -> Flow {
        match self {
            Self::CollectAll => Flow::Continue,
            Self::FailFast => Flow::Abort,
        }
    }
}

/// Handler that aborts on the first violation.
#[derive(Debug, Default, Clone)]
pub struct FailFast {
    first: Option<Violation>,
}

impl FailFast {
    pub fn new() -> Self {
        Self::default()
    }

    /// The violation that stopped the scan, if any.
    pub fn first(&self) -> Option<&Violation> {
        self.first.as_ref()
    }

    pub fn is_errored(&self) -> bool {
        self.first.is_some()
    }
}

impl ValidationHandler for FailFast {
    fn error(&mut self, _label: &str, violation: &Violation) -> Flow {
        if self.first.is_none() {
            self.first = Some(*violation);
        }
        Flow::Abort
    }
}

/// Handler that records violations and lets the scan run to the end.
///
/// Every violation is counted. At most `limit` of them are retained, so a
/// badly damaged multi-gigabyte file does not turn into an equally large
/// error list.
#[derive(Debug, Clone)]
pub struct CollectAll {
    count: u64,
    limit: usize,
    violations: Vec<Violation>,
}

impl Default for CollectAll {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectAll {
    /// Retain every violation.
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Retain at most `limit` violations; later ones are only counted.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            count: 0,
            limit,
            violations: Vec::new(),
        }
    }

    /// True once at least one violation has been reported.
    pub fn is_errored(&self) -> bool {
        self.count > 0
    }

    /// Total number of violations reported.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Retained violations, in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl ValidationHandler for CollectAll {
    fn error(&mut self, _label: &str, violation: &Violation) -> Flow {
        self.count += 1;
        if self.violations.len() < self.limit {
            self.violations.push(*violation);
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::utf8::ViolationKind;

    fn lead(byte: u8, offset: u64) -> Violation {
        Violation {
            kind: ViolationKind::InvalidLeadByte { byte },
            offset: Some(offset),
        }
    }

    #[test]
    fn policy_from_switch() {
        assert_eq!(Policy::from_fail_fast(true), Policy::FailFast);
        assert_eq!(Policy::from_fail_fast(false), Policy::CollectAll);
        assert_eq!(Policy::default(), Policy::CollectAll);
        assert_eq!(Policy::FailFast.flow(), Flow::Abort);
        assert_eq!(Policy::CollectAll.flow(), Flow::Continue);
    }

    #[test]
    fn fail_fast_keeps_first() {
        let mut h = FailFast::new();
        assert!(!h.is_errored());
        assert_eq!(h.error("a", &lead(0x80, 1)), Flow::Abort);
        assert_eq!(h.error("a", &lead(0x81, 7)), Flow::Abort);
        assert_eq!(h.first(), Some(&lead(0x80, 1)));
    }

    #[test]
    fn collect_all_counts_everything() {
        let mut h = CollectAll::new();
        for i in 1..=5 {
            assert_eq!(h.error("a", &lead(0x80, i)), Flow::Continue);
        }
        assert!(h.is_errored());
        assert_eq!(h.count(), 5);
        assert_eq!(h.violations().len(), 5);
        assert_eq!(h.violations()[4], lead(0x80, 5));
    }

    #[test]
    fn collect_all_limit_only_caps_storage() {
        let mut h = CollectAll::with_limit(2);
        for i in 1..=4 {
            h.error("a", &lead(0x90, i));
        }
        assert_eq!(h.count(), 4);
        assert_eq!(h.into_violations(), vec![lead(0x90, 1), lead(0x90, 2)]);
    }

    #[test]
    fn closures_are_handlers() {
        let mut seen = Vec::new();
        let mut h = |label: &str, v: &Violation| {
            seen.push((label.to_string(), v.offset));
            Flow::Continue
        };
        assert_eq!(h.error("notes.txt", &lead(0xA0, 3)), Flow::Continue);
        assert_eq!(seen, vec![("notes.txt".to_string(), Some(3))]);
    }
}
