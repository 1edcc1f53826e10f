//! Component D: per-channel description table — the cached line/module
//! metadata that the variadic renderer (component E) looks records up in.

use std::collections::HashMap;

/// Tag byte for a single variadic argument descriptor (spec.md §3 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Int8,
    Char16,
    Int16,
    Int32,
    Int64,
    Double,
    Pointer,
    Utf16Str,
    AsciiStr,
    Utf8Str,
    Utf32Str,
    Char32,
    IntMax,
}
impl ArgType {
    pub fn from_tag(tag: u8) -> Option<ArgType> {
        match tag {
            0x01 => Some(ArgType::Int8),
            0x02 => Some(ArgType::Char16),
            0x03 => Some(ArgType::Int16),
            0x04 => Some(ArgType::Int32),
            0x05 => Some(ArgType::Int64),
            0x06 => Some(ArgType::Double),
            0x07 => Some(ArgType::Pointer),
            0x08 => Some(ArgType::Utf16Str),
            0x09 => Some(ArgType::AsciiStr),
            0x0A => Some(ArgType::Utf8Str),
            0x0B => Some(ArgType::Utf32Str),
            0x0C => Some(ArgType::Char32),
            0x0D => Some(ArgType::IntMax),
            _ => None,
        }
    }
}

/// A single `(type, size)` argument descriptor as stored on the wire.
#[derive(Debug, Clone, Copy)]
pub struct ArgDescriptor {
    pub arg_type: ArgType,
    pub size: u8,
}

/// A cached `(format string, argument types, source location)` tuple keyed
/// by line id within a channel.
#[derive(Debug, Clone, Default)]
pub struct P7Line {
    pub file_line: u16,
    pub module_id: u16,
    pub format_infos: Vec<ArgDescriptor>,
    pub format_string: Vec<u16>,
    pub file_name: Vec<u8>,
    pub func_name: Vec<u8>,
}

/// Module metadata — name and configured verbosity level.
#[derive(Debug, Clone, Default)]
pub struct P7Module {
    pub verb_level: u32,
    pub name: String,
}

/// The `StreamInfo` trace-subtype payload (spec.md §4.D, subtype 0x00).
#[derive(Debug, Clone, Default)]
pub struct TraceStreamInfo {
    pub time: u64,
    pub timer: u64,
    pub timer_freq: u64,
    pub flags: u64,
    pub name: Vec<u16>,
}
impl TraceStreamInfo {
    pub fn name_contains(&self, needle: &str) -> bool {
        utf16_contains(&self.name, needle)
    }
}

/// Per-emitted-trace record (spec.md §3, `TraceLineData`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceLineData {
    pub id: u16,
    pub modid: u16,
    pub level: u8,
    pub cpu: u8,
    pub threadid: u32,
    pub sequence: u32,
    pub timer: u64,
}

/// One per channel id (5-bit): the line and module description tables plus
/// the stream's own metadata.
#[derive(Debug, Clone, Default)]
pub struct StreamStorage {
    pub info: TraceStreamInfo,
    pub lines: HashMap<u16, P7Line>,
    pub modules: HashMap<u16, P7Module>,
}
impl StreamStorage {
    pub fn module_name(&self, mod_id: u16) -> &str {
        self.modules
            .get(&mod_id)
            .map(|m| m.name.as_str())
            .unwrap_or("")
    }
}

/// Case-sensitive substring search over raw UTF-16 code units, avoiding an
/// allocation for every classifier rule that just wants `contains`.
pub fn utf16_contains(haystack: &[u16], needle: &str) -> bool {
    let needle: Vec<u16> = needle.encode_utf16().collect();
    if needle.is_empty() {
        return true;
    }
    if haystack.len() < needle.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}
