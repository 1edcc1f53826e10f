//! Component E: the variadic argument reconstructor and the printf-subset
//! interpreter it feeds.
//!
//! The original format pulls values from a raw argument-vector byte blob
//! that it then hands to the host's `vswprintf` — a C ABI implementation
//! detail spec.md §4.E and §9 call out as non-portable. This port follows
//! the spec's own recommendation: read each descriptor into a typed
//! [`ArgValue`], then interpret the stored format string against that typed
//! list directly, rather than re-building a byte-aligned argument vector.

use trackable::error::ErrorKindExt;

use byte_source::ByteSource;
use description::{ArgDescriptor, ArgType, P7Line};
use primitive::PrimitiveReader;
use {Error, ErrorKind, Result};

/// A single reconstructed argument value, already in the representation the
/// printf interpreter consumes.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Int(i64),
    Double(f64),
    Utf16Str(Vec<u16>),
    AsciiStr(Vec<u8>),
    Utf8Str(Vec<u8>),
    Utf32Str(Vec<u32>),
}
impl ArgValue {
    fn as_i64(&self) -> i64 {
        match *self {
            ArgValue::Int(v) => v,
            ArgValue::Double(v) => v as i64,
            _ => 0,
        }
    }

    fn as_f64(&self) -> f64 {
        match *self {
            ArgValue::Double(v) => v,
            ArgValue::Int(v) => v as f64,
            _ => 0.0,
        }
    }

    fn as_string(&self) -> String {
        match *self {
            ArgValue::Utf16Str(ref units) => String::from_utf16_lossy(units),
            ArgValue::AsciiStr(ref bytes) | ArgValue::Utf8Str(ref bytes) => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            ArgValue::Utf32Str(ref units) => units
                .iter()
                .filter_map(|&u| char::from_u32(u))
                .collect(),
            ArgValue::Int(v) => v.to_string(),
            ArgValue::Double(v) => v.to_string(),
        }
    }
}

/// Reads one argument value per descriptor, in order, charging every byte
/// read against `cread`. This is the "variadic call frame" reconstruction
/// step of spec.md §4.E, minus the raw-stack blob the original builds for
/// its `vswprintf` call.
pub fn read_args<S: ByteSource>(
    reader: &mut PrimitiveReader<S>,
    descriptors: &[ArgDescriptor],
    cread: &mut u32,
) -> Result<Vec<ArgValue>> {
    let mut args = Vec::with_capacity(descriptors.len());
    for desc in descriptors {
        let value = match desc.arg_type {
            ArgType::Int8 | ArgType::Int16 | ArgType::Int32 | ArgType::Int64 | ArgType::Pointer => {
                let v = track!(reader.read_i64())?;
                *cread += 8;
                ArgValue::Int(v)
            }
            ArgType::Double => {
                let v = track!(reader.read_f64())?;
                *cread += 8;
                ArgValue::Double(v)
            }
            ArgType::Char16 => {
                let v = track!(reader.read_u16())?;
                *cread += 2;
                ArgValue::Int(i64::from(v))
            }
            ArgType::Char32 => {
                let v = track!(reader.read_u32())?;
                *cread += 4;
                ArgValue::Int(i64::from(v))
            }
            ArgType::IntMax => {
                let v = track!(reader.read_i64())?;
                *cread += 8;
                ArgValue::Int(v)
            }
            ArgType::Utf16Str => {
                let units = track!(reader.zero_units_u16(cread))?;
                ArgValue::Utf16Str(units)
            }
            ArgType::AsciiStr => {
                let bytes = track!(reader.zero_units_u8(cread))?;
                ArgValue::AsciiStr(bytes)
            }
            ArgType::Utf8Str => {
                let bytes = track!(reader.zero_units_u8(cread))?;
                ArgValue::Utf8Str(bytes)
            }
            ArgType::Utf32Str => {
                let units = track!(reader.zero_units_u32(cread))?;
                ArgValue::Utf32Str(units)
            }
        };
        args.push(value);
    }
    Ok(args)
}

/// Renders a `Data` item: looks up its line, reads its arguments off the
/// wire and runs them through the stored format string. Returns `None` if
/// the line has no known description (caller logs `UnknownLineId`).
pub fn render_line<S: ByteSource>(
    reader: &mut PrimitiveReader<S>,
    line: &P7Line,
    cread: &mut u32,
) -> Result<String> {
    if line.format_infos.is_empty() {
        return Ok(String::from_utf16_lossy(&line.format_string));
    }
    let args = track!(read_args(reader, &line.format_infos, cread))?;
    Ok(format_printf(&String::from_utf16_lossy(&line.format_string), &args))
}

/// A printf-subset interpreter driven by the descriptor sequence rather
/// than by the `%` tokens themselves — per spec.md §9, the conversions in
/// the format string may disagree with the descriptor types, and the
/// descriptor order is authoritative for which value gets pulled next.
pub fn format_printf(format: &str, args: &[ArgValue]) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '%' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        i += 1;
        if i >= chars.len() {
            out.push('%');
            break;
        }
        if chars[i] == '%' {
            out.push('%');
            i += 1;
            continue;
        }

        // flags
        while i < chars.len() && "+-0 #".contains(chars[i]) {
            i += 1;
        }
        // width
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        // precision
        let mut precision: Option<usize> = None;
        if i < chars.len() && chars[i] == '.' {
            i += 1;
            let prec_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            precision = chars[prec_start..i]
                .iter()
                .collect::<String>()
                .parse()
                .ok()
                .or(Some(0));
        }
        // length modifiers: l, ll, h, hh, z, j, t
        while i < chars.len() && "lhzjtL".contains(chars[i]) {
            i += 1;
        }

        if i >= chars.len() {
            out.extend(&chars[start..i]);
            break;
        }

        let conv = chars[i];
        i += 1;

        match conv {
            'd' | 'i' => {
                if let Some(v) = args.next() {
                    out.push_str(&v.as_i64().to_string());
                }
            }
            'u' => {
                if let Some(v) = args.next() {
                    out.push_str(&(v.as_i64() as u64).to_string());
                }
            }
            'x' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("{:x}", v.as_i64() as u64));
                }
            }
            'X' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("{:X}", v.as_i64() as u64));
                }
            }
            'o' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("{:o}", v.as_i64() as u64));
                }
            }
            'p' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("0x{:x}", v.as_i64() as u64));
                }
            }
            'f' | 'F' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("{:.*}", precision.unwrap_or(6), v.as_f64()));
                }
            }
            'e' | 'E' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("{:.*e}", precision.unwrap_or(6), v.as_f64()));
                }
            }
            'g' | 'G' => {
                if let Some(v) = args.next() {
                    out.push_str(&format!("{}", v.as_f64()));
                }
            }
            'c' => {
                if let Some(v) = args.next() {
                    if let Some(ch) = char::from_u32(v.as_i64() as u32) {
                        out.push(ch);
                    }
                }
            }
            's' => {
                if let Some(v) = args.next() {
                    let s = v.as_string();
                    match precision {
                        Some(p) => out.extend(s.chars().take(p)),
                        None => out.push_str(&s),
                    }
                }
            }
            _ => {
                // Unknown conversion: emit the literal substring verbatim.
                out.extend(&chars[start..i]);
            }
        }
    }

    out
}

pub fn unknown_argument_error(tag: u8) -> Error {
    ErrorKind::UnknownArgument.cause(format!("unknown argument tag: {}", tag)).into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_int_and_string() {
        let args = vec![ArgValue::Int(42), ArgValue::AsciiStr(b"ok".to_vec())];
        assert_eq!(format_printf("%d %s", &args), "42 ok");
    }

    #[test]
    fn double_percent_is_literal() {
        let args: Vec<ArgValue> = vec![];
        assert_eq!(format_printf("100%%", &args), "100%");
    }

    #[test]
    fn unknown_conversion_emits_literal() {
        let args = vec![ArgValue::Int(1)];
        assert_eq!(format_printf("value=%q done", &args), "value=%q done");
    }

    #[test]
    fn hex_and_float() {
        let args = vec![ArgValue::Int(255), ArgValue::Double(1.5)];
        assert_eq!(format_printf("%x %.1f", &args), "ff 1.5");
    }

    #[test]
    fn string_dispatch_ignores_percent_s_modifiers() {
        let args = vec![ArgValue::Utf16Str(vec![b'h' as u16, b'i' as u16])];
        assert_eq!(format_printf("%s", &args), "hi");
    }
}
