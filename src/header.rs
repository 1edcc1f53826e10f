//! Component C (header half): the fixed 8-byte magic plus the dump preamble
//! that immediately follows it (spec.md §3).

use byte_source::ByteSource;
use primitive::{Endianness, PrimitiveReader};
use {ErrorKind, Result};

const MAGIC_LE: [u8; 8] = [0xA6, 0x2C, 0xF3, 0xEC, 0x71, 0xAC, 0xD2, 0x45];
const MAGIC_BE: [u8; 8] = [0x45, 0xD2, 0xAC, 0x71, 0xEC, 0xF3, 0x2C, 0xA6];

/// Size in bytes of each of `processName`/`hostName`'s fixed-width slot.
pub const FIXED_STRING_BYTES: u32 = 0x200;

/// Reads the 8-byte magic and returns the endianness it selects, or fails
/// with `BadMagic` if it matches neither sequence.
pub fn read_endianness<S: ByteSource>(source: &mut S) -> Result<Endianness> {
    let mut magic = [0u8; 8];
    track!(source.read(&mut magic))?;
    if magic == MAGIC_LE {
        Ok(Endianness::Little)
    } else if magic == MAGIC_BE {
        Ok(Endianness::Big)
    } else {
        track_panic!(ErrorKind::BadMagic, "header bytes {:?} match neither magic", magic)
    }
}

/// The `(processId, createTime, processName, hostName)` preamble.
#[derive(Debug, Clone, Default)]
pub struct Preamble {
    pub process_id: u32,
    pub create_time: u64,
    pub process_name: Vec<u16>,
    pub host_name: Vec<u16>,
}

pub fn read_preamble<S: ByteSource>(reader: &mut PrimitiveReader<S>) -> Result<Preamble> {
    let process_id = track!(reader.read_u32())?;
    let create_time = track!(reader.read_u64())?;
    let process_name = track!(reader.fixed_units_u16(FIXED_STRING_BYTES))?;
    let host_name = track!(reader.fixed_units_u16(FIXED_STRING_BYTES))?;
    Ok(Preamble {
        process_id,
        create_time,
        process_name,
        host_name,
    })
}
