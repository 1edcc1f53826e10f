//! Hand-rolled byte-level builder for synthetic P7D dumps, used by the
//! integration tests to exercise the decoder without a real trace capture.

const MAGIC_LE: [u8; 8] = [0xA6, 0x2C, 0xF3, 0xEC, 0x71, 0xAC, 0xD2, 0x45];
const MAGIC_BE: [u8; 8] = [0x45, 0xD2, 0xAC, 0x71, 0xEC, 0xF3, 0x2C, 0xA6];

pub struct Writer {
    le: bool,
    pub buf: Vec<u8>,
}

impl Writer {
    pub fn new(le: bool) -> Self {
        Writer { le, buf: Vec::new() }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }
    pub fn u16(&mut self, v: u16) -> &mut Self {
        let b = if self.le { v.to_le_bytes() } else { v.to_be_bytes() };
        self.buf.extend_from_slice(&b);
        self
    }
    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.u16(v as u16)
    }
    pub fn u32(&mut self, v: u32) -> &mut Self {
        let b = if self.le { v.to_le_bytes() } else { v.to_be_bytes() };
        self.buf.extend_from_slice(&b);
        self
    }
    pub fn u64(&mut self, v: u64) -> &mut Self {
        let b = if self.le { v.to_le_bytes() } else { v.to_be_bytes() };
        self.buf.extend_from_slice(&b);
        self
    }

    /// Zero-terminated UTF-16.
    pub fn zstr16(&mut self, s: &str) -> &mut Self {
        for unit in s.encode_utf16() {
            self.u16(unit);
        }
        self.u16(0);
        self
    }
    /// Zero-terminated ASCII.
    pub fn zstr8(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        self
    }
    /// Fixed-width UTF-16 slot of `byte_budget` bytes, NUL-padded.
    pub fn fixed16(&mut self, s: &str, byte_budget: usize) -> &mut Self {
        let start = self.buf.len();
        for unit in s.encode_utf16() {
            if self.buf.len() - start + 2 > byte_budget {
                break;
            }
            self.u16(unit);
        }
        while self.buf.len() - start < byte_budget {
            self.u8(0);
        }
        self
    }
    pub fn bytes(&mut self, raw: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(raw);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Wraps `items` (each item's own header + payload, already encoded) in the
/// channel's `StreamInfo` envelope.
pub fn envelope(le: bool, channel: u8, items: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = Vec::new();
    for item in items {
        payload.extend_from_slice(item);
    }
    let size = payload.len() as u32 + 4;
    let word = (size & 0x07FF_FFFF) | ((channel as u32 & 0x1F) << 27);
    let mut w = Writer::new(le);
    w.u32(word);
    w.bytes(&payload);
    w.into_bytes()
}

/// Encodes one `StreamItem` (header word + payload).
pub fn item(le: bool, item_type: u8, subtype: u8, payload: Vec<u8>) -> Vec<u8> {
    let size = payload.len() as u32 + 4;
    let word = (item_type as u32 & 0x1F) | ((subtype as u32 & 0x1F) << 5) | ((size & 0x003F_FFFF) << 10);
    let mut w = Writer::new(le);
    w.u32(word);
    w.bytes(&payload);
    w.into_bytes()
}

/// A trailing zero-payload `Verb` item (subtype 0x03): just the 4-byte item
/// header, no payload at all. Real dumps emit one of these (or Close/
/// UtcOffset) at the end of a stream's envelope.
pub fn verb_item(le: bool) -> Vec<u8> {
    item(le, 0x00, 0x03, vec![])
}

pub fn preamble(le: bool, process_name: &str) -> Vec<u8> {
    let mut w = Writer::new(le);
    w.u32(1); // process id
    w.u64(0); // create time
    w.fixed16(process_name, 0x200);
    w.fixed16("", 0x200);
    w.into_bytes()
}

pub fn magic(le: bool) -> [u8; 8] {
    if le {
        MAGIC_LE
    } else {
        MAGIC_BE
    }
}

/// A module-description item (subtype 0x07): `mod_id: i16, verb_level: u32, name: [u8; 54]`.
pub fn module_item(le: bool, mod_id: i16, verb_level: u32, name: &str) -> Vec<u8> {
    let mut w = Writer::new(le);
    w.i16(mod_id);
    w.u32(verb_level);
    let start = w.buf.len();
    w.buf.extend_from_slice(name.as_bytes());
    while w.buf.len() - start < 54 {
        w.u8(0);
    }
    item(le, 0x00, 0x07, w.into_bytes())
}

/// A line-description item (subtype 0x01) with no variadic arguments.
pub fn description_item_no_args(
    le: bool,
    line_id: u16,
    module_id: u16,
    format_string: &str,
    file_name: &str,
    func_name: &str,
) -> Vec<u8> {
    let mut w = Writer::new(le);
    w.u16(line_id);
    w.u16(0); // file_line
    w.u16(module_id);
    w.u16(0); // num_fmt
    w.zstr16(format_string);
    w.zstr8(file_name);
    w.zstr8(func_name);
    item(le, 0x00, 0x01, w.into_bytes())
}

/// A line-description item with a fixed `%d %s` descriptor pair: one Int32
/// argument (tag 0x04) and one AsciiStr argument (tag 0x09).
pub fn description_item_int_and_str(le: bool, line_id: u16, module_id: u16) -> Vec<u8> {
    let mut w = Writer::new(le);
    w.u16(line_id);
    w.u16(0);
    w.u16(module_id);
    w.u16(2); // num_fmt
    w.u8(0x04).u8(4); // Int32, size 4
    w.u8(0x09).u8(0); // AsciiStr, size unused
    w.zstr16("%d %s");
    w.zstr8("test.cpp");
    w.zstr8("main");
    item(le, 0x00, 0x01, w.into_bytes())
}

/// A data item (subtype 0x02) referencing `line_id`, carrying an `i32` then
/// a NUL-terminated ASCII string argument.
pub fn data_item_int_and_str(le: bool, line_id: u16, value: i32, text: &str) -> Vec<u8> {
    let mut w = Writer::new(le);
    w.u16(line_id);
    w.u8(0); // level
    w.u8(0); // cpu
    w.u32(0); // threadid
    w.u32(0); // sequence
    w.u64(0); // timer
    // i64 argument slot for the Int32 descriptor (read_args always reads 8
    // bytes for any integer-family tag).
    let v = value as i64;
    let b = if le { v.to_le_bytes() } else { v.to_be_bytes() };
    w.bytes(&b);
    w.zstr8(text);
    item(le, 0x00, 0x02, w.into_bytes())
}

/// A data item with no arguments (the line's format string is the rendered
/// text verbatim).
pub fn data_item_no_args(le: bool, line_id: u16) -> Vec<u8> {
    let mut w = Writer::new(le);
    w.u16(line_id);
    w.u8(0);
    w.u8(0);
    w.u32(0);
    w.u32(0);
    w.u64(0);
    item(le, 0x00, 0x02, w.into_bytes())
}
