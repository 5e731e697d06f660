//! Validating files on disk.
//!
//! [`validate_path`] opens a file, wraps it in the [`ByteSource`] selected by
//! [`Options::access`], runs the validator and releases the file handle (and
//! mapping) on every exit path.

use std::fs::File;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::MmapOptions;

use crate::error::{Error, Result};
use crate::text::handler::ValidationHandler;
#[cfg(feature = "mmap")]
use crate::text::source::{ByteSource, SliceSource};
use crate::text::source::{StreamSource, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use crate::text::utf8::{self, Outcome};

/// How file contents reach the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    /// Stream through a [`BufReader`](std::io::BufReader).
    #[default]
    Buffered,
    /// Map the whole file and scan it in place.
    #[cfg(feature = "mmap")]
    Mapped,
}

/// Options for [`validate_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Buffer capacity for [`Access::Buffered`] (default: 8192).
    pub buffer_size: usize,
    /// Streaming or mapped access (default: streaming).
    pub access: Access,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            access: Access::Buffered,
        }
    }
}

impl Options {
    /// Set the stream buffer size. Non-positive sizes select the default and
    /// sizes above [`MAX_BUFFER_SIZE`] are clamped to it.
    pub fn with_buffer_size(mut self, size: i64) -> Self {
        self.buffer_size = usize::try_from(size)
            .ok()
            .filter(|&n| n > 0)
            .map_or(DEFAULT_BUFFER_SIZE, |n| n.min(MAX_BUFFER_SIZE));
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}

/// Validate the file at `path`.
///
/// Opening failures are reported as [`Error::Open`] so callers can tell a
/// missing input from one that fails mid-read ([`Error::Io`]).
pub fn validate_path<P, H>(path: P, options: &Options, handler: &mut H) -> Result<Outcome>
where
    P: AsRef<Path>,
    H: ValidationHandler + ?Sized,
{
    let path = path.as_ref();
    let label = path.display().to_string();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %label,
        access = ?options.access,
        buffer_size = options.buffer_size,
        "validating file"
    );

    match options.access {
        Access::Buffered => {
            let mut source =
                StreamSource::with_capacity(options.buffer_size, file).with_label(label);
            utf8::validate(&mut source, handler)
        }
        #[cfg(feature = "mmap")]
        Access::Mapped => validate_mapped(&file, &label, handler),
    }
}

#[cfg(feature = "mmap")]
fn validate_mapped<H>(file: &File, label: &str, handler: &mut H) -> Result<Outcome>
where
    H: ValidationHandler + ?Sized,
{
    // Zero-length files cannot be mapped on every platform.
    if file.metadata()?.len() == 0 {
        return utf8::validate(&mut SliceSource::new(&[]).with_label(label), handler);
    }

    // SAFETY: Read-only mapping; the file is not modified by this process and
    // the mapping is dropped before this function returns.
    let mmap = unsafe { MmapOptions::new().map(file)? };
    let mut source = SliceSource::new(&mmap).with_label(label);
    let outcome = utf8::validate(&mut source, handler);
    tracing::trace!(bytes = source.bytes_read(), "unmapping");
    outcome
}
