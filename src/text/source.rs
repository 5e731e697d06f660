//! Byte sources consumed by the UTF-8 validator.
//!
//! A [`ByteSource`] is an ordered, finite sequence of bytes that can be read
//! one byte at a time and reports how many bytes it has delivered so far.
//! Two forms are provided:
//!
//! - [`StreamSource`]: wraps any [`Read`] behind a [`BufReader`] and pulls
//!   data lazily, so the whole input never has to be resident.
//! - [`SliceSource`]: random access over bytes that are already in memory
//!   (a `Vec<u8>`, a `&'static [u8]`, or a memory-mapped file).
//!
//! Both forms yield identical validation reports for identical content.

use std::io::{self, BufRead, BufReader, ErrorKind, Read};

/// Default capacity of the buffer used by [`StreamSource`].
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Largest buffer [`StreamSource`] will allocate.
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Label reported for sources that were not given one.
pub const UNLABELED: &str = "<input>";

/// An ordered, finite sequence of bytes.
pub trait ByteSource {
    /// Return the next byte, or `None` once the input is exhausted.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;

    /// Number of bytes delivered so far by `next_byte` and `read_n`.
    fn bytes_read(&self) -> u64;

    /// Fill `buf` with up to `buf.len()` bytes.
    ///
    /// Returns fewer bytes than requested only at end of input. The validator
    /// itself only calls `next_byte`; this is bulk access for other callers
    /// sharing the same source, and it advances `bytes_read` the same way.
    fn read_n(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.next_byte()? {
                Some(b) => {
                    buf[filled] = b;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }

    /// Identifier handed to the validation handler alongside each violation.
    fn label(&self) -> &str {
        UNLABELED
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }

    #[inline]
    fn bytes_read(&self) -> u64 {
        (**self).bytes_read()
    }

    fn read_n(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_n(buf)
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

// =============================================================================
// Streaming source
// =============================================================================

/// Sequential source over a buffered reader, counting bytes as they are
/// delivered.
pub struct StreamSource<R> {
    inner: BufReader<R>,
    count: u64,
    label: String,
}

impl<R: Read> StreamSource<R> {
    /// Wrap `reader` with a buffer of [`DEFAULT_BUFFER_SIZE`] bytes.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, reader)
    }

    /// Wrap `reader` with a buffer of `capacity` bytes.
    ///
    /// A capacity of zero falls back to [`DEFAULT_BUFFER_SIZE`]; larger
    /// capacities are clamped to [`MAX_BUFFER_SIZE`].
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            capacity.min(MAX_BUFFER_SIZE)
        };
        Self {
            inner: BufReader::with_capacity(capacity, reader),
            count: 0,
            label: UNLABELED.to_string(),
        }
    }

    /// Set the label reported with violations.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Capacity of the internal buffer.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Unwrap the underlying reader, discarding any buffered data.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    #[inline]
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let first = match self.inner.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if first.is_some() {
                self.inner.consume(1);
                self.count += 1;
            }
            return Ok(first);
        }
    }

    #[inline]
    fn bytes_read(&self) -> u64 {
        self.count
    }

    fn read_n(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = match self.inner.fill_buf() {
                Ok(available) => {
                    let n = available.len().min(buf.len() - filled);
                    buf[filled..filled + n].copy_from_slice(&available[..n]);
                    n
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                break;
            }
            self.inner.consume(n);
            self.count += n as u64;
            filled += n;
        }
        Ok(filled)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// =============================================================================
// Random-access source
// =============================================================================

/// Source over bytes that are already resident in memory.
///
/// No intermediate copy is made; this is the form used for memory-mapped
/// files.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    label: &'a str,
}

impl<'a> SliceSource<'a> {
    /// Create a source positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            label: UNLABELED,
        }
    }

    /// Set the label reported with violations.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    /// Bytes not yet read.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    #[inline]
    fn bytes_read(&self) -> u64 {
        self.pos as u64
    }

    fn read_n(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = self.remaining();
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    fn label(&self) -> &str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out one byte per call, interleaving `Interrupted`.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(ErrorKind::Interrupted, "again"));
            }
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Reader that fails after delivering its prefix.
    struct Broken {
        prefix: Vec<u8>,
        served: bool,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.served {
                self.served = true;
                let n = self.prefix.len().min(buf.len());
                buf[..n].copy_from_slice(&self.prefix[..n]);
                return Ok(n);
            }
            Err(io::Error::new(ErrorKind::Other, "device unplugged"))
        }
    }

    fn drain<S: ByteSource>(source: &mut S) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(b) = source.next_byte().unwrap() {
            out.push(b);
        }
        out
    }

    mod stream {
        use super::*;

        #[test]
        fn delivers_bytes_in_order() {
            let mut src = StreamSource::new(Cursor::new(b"abc".to_vec()));
            assert_eq!(drain(&mut src), b"abc");
            assert_eq!(src.bytes_read(), 3);
            assert_eq!(src.next_byte().unwrap(), None);
            assert_eq!(src.bytes_read(), 3);
        }

        #[test]
        fn zero_capacity_uses_default() {
            let src = StreamSource::with_capacity(0, Cursor::new(Vec::<u8>::new()));
            assert_eq!(src.capacity(), DEFAULT_BUFFER_SIZE);
        }

        #[test]
        fn tiny_buffer_crosses_refills() {
            let data: Vec<u8> = (0..=255).collect();
            let mut src = StreamSource::with_capacity(3, Cursor::new(data.clone()));
            assert_eq!(drain(&mut src), data);
            assert_eq!(src.bytes_read(), 256);
        }

        #[test]
        fn interrupted_reads_are_retried() {
            let reader = Trickle {
                data: b"xyz".to_vec(),
                pos: 0,
                interrupt: false,
            };
            let mut src = StreamSource::new(reader);
            assert_eq!(drain(&mut src), b"xyz");
        }

        #[test]
        fn read_n_short_at_end() {
            let mut src = StreamSource::with_capacity(2, Cursor::new(b"hello".to_vec()));
            let mut buf = [0u8; 4];
            assert_eq!(src.read_n(&mut buf).unwrap(), 4);
            assert_eq!(&buf, b"hell");
            assert_eq!(src.read_n(&mut buf).unwrap(), 1);
            assert_eq!(buf[0], b'o');
            assert_eq!(src.bytes_read(), 5);
            assert_eq!(src.read_n(&mut buf).unwrap(), 0);
        }

        #[test]
        fn io_error_propagates() {
            let reader = Broken {
                prefix: b"ok".to_vec(),
                served: false,
            };
            let mut src = StreamSource::new(reader);
            assert_eq!(src.next_byte().unwrap(), Some(b'o'));
            assert_eq!(src.next_byte().unwrap(), Some(b'k'));
            let err = src.next_byte().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Other);
            assert_eq!(src.bytes_read(), 2);
        }

        #[test]
        fn label_defaults_and_overrides() {
            let src = StreamSource::new(Cursor::new(Vec::<u8>::new()));
            assert_eq!(src.label(), UNLABELED);
            let src = src.with_label("notes.txt");
            assert_eq!(src.label(), "notes.txt");
        }
    }

    mod slice {
        use super::*;

        #[test]
        fn delivers_bytes_in_order() {
            let mut src = SliceSource::new(b"abc");
            assert_eq!(drain(&mut src), b"abc");
            assert_eq!(src.bytes_read(), 3);
            assert!(src.remaining().is_empty());
        }

        #[test]
        fn empty_input() {
            let mut src = SliceSource::new(&[]);
            assert_eq!(src.next_byte().unwrap(), None);
            assert_eq!(src.bytes_read(), 0);
        }

        #[test]
        fn read_n_then_next_byte() {
            let mut src = SliceSource::new(b"hello");
            let mut buf = [0u8; 3];
            assert_eq!(src.read_n(&mut buf).unwrap(), 3);
            assert_eq!(&buf, b"hel");
            assert_eq!(src.next_byte().unwrap(), Some(b'l'));
            assert_eq!(src.remaining(), b"o");
            assert_eq!(src.read_n(&mut buf).unwrap(), 1);
            assert_eq!(src.bytes_read(), 5);
        }

        #[test]
        fn lent_source_forwards() {
            fn take_two<S: ByteSource>(mut source: S) -> (usize, String) {
                let mut buf = [0u8; 8];
                let n = source.read_n(&mut buf).unwrap();
                (n, source.label().to_string())
            }

            let mut inner = SliceSource::new(b"xy").with_label("borrowed");
            assert_eq!(take_two(&mut inner), (2, "borrowed".to_string()));
            assert_eq!(inner.bytes_read(), 2);
        }
    }
}
