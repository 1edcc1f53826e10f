//! Component B: typed reads on top of a `ByteSource`, with the wire's
//! endianness (picked at runtime from the file header) applied via
//! `byteorder`, plus the zero-terminated / fixed-width string readers the
//! framer needs.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use byte_source::ByteSource;
use {Error, ErrorKind, Result};

/// The endianness negotiated from the P7D file header (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// Wraps a byte source and the endianness decided for this decode run.
pub struct PrimitiveReader<'a, S: ByteSource + 'a> {
    source: &'a mut S,
    endian: Endianness,
}
impl<'a, S: ByteSource + 'a> PrimitiveReader<'a, S> {
    pub fn new(source: &'a mut S, endian: Endianness) -> Self {
        PrimitiveReader { source, endian }
    }

    pub fn endian(&self) -> Endianness {
        self.endian
    }

    pub fn remaining(&self) -> usize {
        self.source.remaining()
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.source.skip(n)
    }

    fn read_buf<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        track!(self.source.read(&mut buf))?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(track!(self.read_buf::<1>())?[0])
    }
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(track!(self.read_u8())? as i8)
    }
    pub fn read_u16(&mut self) -> Result<u16> {
        let buf = track!(self.read_buf::<2>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_u16(&buf),
            Endianness::Big => BigEndian::read_u16(&buf),
        })
    }
    pub fn read_i16(&mut self) -> Result<i16> {
        let buf = track!(self.read_buf::<2>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_i16(&buf),
            Endianness::Big => BigEndian::read_i16(&buf),
        })
    }
    pub fn read_u32(&mut self) -> Result<u32> {
        let buf = track!(self.read_buf::<4>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_u32(&buf),
            Endianness::Big => BigEndian::read_u32(&buf),
        })
    }
    pub fn read_i32(&mut self) -> Result<i32> {
        let buf = track!(self.read_buf::<4>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_i32(&buf),
            Endianness::Big => BigEndian::read_i32(&buf),
        })
    }
    pub fn read_u64(&mut self) -> Result<u64> {
        let buf = track!(self.read_buf::<8>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_u64(&buf),
            Endianness::Big => BigEndian::read_u64(&buf),
        })
    }
    pub fn read_i64(&mut self) -> Result<i64> {
        let buf = track!(self.read_buf::<8>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_i64(&buf),
            Endianness::Big => BigEndian::read_i64(&buf),
        })
    }
    pub fn read_f64(&mut self) -> Result<f64> {
        let buf = track!(self.read_buf::<8>())?;
        Ok(match self.endian {
            Endianness::Little => LittleEndian::read_f64(&buf),
            Endianness::Big => BigEndian::read_f64(&buf),
        })
    }

    /// Reads `u16` code units until a NUL (or the source is exhausted),
    /// reporting the number of bytes consumed including the terminator.
    pub fn zero_units_u16(&mut self, consumed: &mut u32) -> Result<Vec<u16>> {
        let mut out = Vec::new();
        while self.remaining() > 0 {
            let unit = track!(self.read_u16())?;
            *consumed += 2;
            if unit == 0 {
                break;
            }
            out.push(unit);
        }
        Ok(out)
    }

    /// Reads `u8` code units (ASCII/UTF-8 bytes) until a NUL.
    pub fn zero_units_u8(&mut self, consumed: &mut u32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while self.remaining() > 0 {
            let unit = track!(self.read_u8())?;
            *consumed += 1;
            if unit == 0 {
                break;
            }
            out.push(unit);
        }
        Ok(out)
    }

    /// Reads `u32` code units (UTF-32) until a NUL.
    pub fn zero_units_u32(&mut self, consumed: &mut u32) -> Result<Vec<u32>> {
        let mut out = Vec::new();
        while self.remaining() > 0 {
            let unit = track!(self.read_u32())?;
            *consumed += 4;
            if unit == 0 {
                break;
            }
            out.push(unit);
        }
        Ok(out)
    }

    /// Reads `u16` code units until a NUL or `byte_budget` is exhausted;
    /// remaining budget after a NUL is skipped.
    pub fn fixed_units_u16(&mut self, mut byte_budget: u32) -> Result<Vec<u16>> {
        let mut out = Vec::new();
        while byte_budget > 0 {
            let unit = track!(self.read_u16())?;
            byte_budget -= 2;
            if unit == 0 {
                break;
            }
            out.push(unit);
        }
        track!(self.skip(byte_budget as usize))?;
        Ok(out)
    }

    /// Reads `u8` code units until a NUL or `byte_budget` is exhausted.
    pub fn fixed_units_u8(&mut self, mut byte_budget: u32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while byte_budget > 0 {
            let unit = track!(self.read_u8())?;
            byte_budget -= 1;
            if unit == 0 {
                break;
            }
            out.push(unit);
        }
        track!(self.skip(byte_budget as usize))?;
        Ok(out)
    }
}
