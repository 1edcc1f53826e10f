//! Component A: sized pull-I/O that the rest of the decoder reads from.
//!
//! Two concrete sources are provided — a file-backed one and a memory-backed
//! one — behind a single `ByteSource` trait. Nothing above this layer cares
//! which one it has; `remaining`/`read`/`skip` is the entire contract.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use {Error, ErrorKind, Result};

/// Sized pull-I/O. Implementations fail with `ErrorKind::Underflow` rather
/// than returning a short read — the framer never has to check lengths
/// itself.
pub trait ByteSource {
    /// Bytes still available to read.
    fn remaining(&self) -> usize;

    /// Fills `buf` entirely or fails.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Advances the cursor `n` bytes or fails.
    fn skip(&mut self, n: usize) -> Result<()>;
}

/// A file-backed source over a seekable handle held exclusively for the
/// decode.
#[derive(Debug)]
pub struct FileByteSource {
    file: File,
    remaining: usize,
}
impl FileByteSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = track!(File::open(path).map_err(Error::from))?;
        let len = track!(file.metadata().map_err(Error::from))?.len();
        Ok(FileByteSource {
            file,
            remaining: len as usize,
        })
    }
}
impl ByteSource for FileByteSource {
    fn remaining(&self) -> usize {
        self.remaining
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        track_assert!(
            buf.len() <= self.remaining,
            ErrorKind::Underflow,
            "want {} bytes, only {} left",
            buf.len(),
            self.remaining
        );
        track!(self.file.read_exact(buf).map_err(Error::from))?;
        self.remaining -= buf.len();
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        track_assert!(
            n <= self.remaining,
            ErrorKind::Underflow,
            "want to skip {} bytes, only {} left",
            n,
            self.remaining
        );
        track!(
            self.file
                .seek(SeekFrom::Current(n as i64))
                .map_err(Error::from)
        )?;
        self.remaining -= n;
        Ok(())
    }
}

/// A memory-backed source over a buffer borrowed non-mutably for the decode
/// lifetime.
#[derive(Debug)]
pub struct MemByteSource<'a> {
    data: &'a [u8],
    pos: usize,
}
impl<'a> MemByteSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MemByteSource { data, pos: 0 }
    }
}
impl<'a> ByteSource for MemByteSource<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        track_assert!(
            buf.len() <= self.remaining(),
            ErrorKind::Underflow,
            "want {} bytes, only {} left",
            buf.len(),
            self.remaining()
        );
        let end = self.pos + buf.len();
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        track_assert!(
            n <= self.remaining(),
            ErrorKind::Underflow,
            "want to skip {} bytes, only {} left",
            n,
            self.remaining()
        );
        self.pos += n;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mem_source_reads_and_skips() {
        let data = [1u8, 2, 3, 4, 5];
        let mut src = MemByteSource::new(&data);
        assert_eq!(src.remaining(), 5);

        let mut buf = [0u8; 2];
        track_try_unwrap!(src.read(&mut buf));
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.remaining(), 3);

        track_try_unwrap!(src.skip(1));
        assert_eq!(src.remaining(), 2);

        let mut buf = [0u8; 2];
        track_try_unwrap!(src.read(&mut buf));
        assert_eq!(buf, [4, 5]);
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn mem_source_underflows() {
        let data = [1u8];
        let mut src = MemByteSource::new(&data);
        let mut buf = [0u8; 2];
        assert!(src.read(&mut buf).is_err());
    }
}
