//! Error types for validation calls.
//!
//! UTF-8 violations are not errors: they go to the
//! [`ValidationHandler`](crate::text::handler::ValidationHandler) and show up
//! in the returned [`Outcome`](crate::text::utf8::Outcome). Only failures of
//! the underlying medium end up here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be opened (missing file, permission denied, ...).
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input became unreadable part-way through the scan.
    #[error("I/O error while reading: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
