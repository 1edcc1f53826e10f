//! Component C (packet half) + component D's dispatch table: the per-stream
//! `StreamInfo` envelope, the `StreamItem` inner records, and the trace
//! subtype switch that fills in the description table and drives the
//! renderer (spec.md §4.C–§4.D).

use byte_source::ByteSource;
use description::{
    ArgDescriptor, ArgType, P7Line, P7Module, StreamStorage, TraceLineData,
};
use primitive::PrimitiveReader;
use render;
use {ErrorKind, Result};

/// Unpacked `StreamInfo` envelope header: `size: 27, channel: 5` packed
/// low-bits-first into a 32-bit word.
#[derive(Debug, Clone, Copy)]
struct StreamInfoWord {
    size: u32,
    channel: u8,
}
impl StreamInfoWord {
    fn unpack(raw: u32) -> Self {
        StreamInfoWord {
            size: raw & 0x07FF_FFFF,
            channel: ((raw >> 27) & 0x1F) as u8,
        }
    }
}

/// Unpacked `StreamItem` header: `type: 5, subtype: 5, size: 22`.
#[derive(Debug, Clone, Copy)]
struct StreamItemWord {
    item_type: u8,
    subtype: u8,
    size: u32,
}
impl StreamItemWord {
    fn unpack(raw: u32) -> Self {
        StreamItemWord {
            item_type: (raw & 0x1F) as u8,
            subtype: ((raw >> 5) & 0x1F) as u8,
            size: (raw >> 10) & 0x003F_FFFF,
        }
    }
}

/// A rendered line together with the context the analyzer classifies on.
pub struct RenderedLine<'a> {
    pub stream: &'a StreamStorage,
    pub trace: &'a TraceLineData,
    pub text: &'a str,
}

/// Receives one rendered line at a time, in wire order.
pub trait LineSink {
    fn handle_line(&mut self, line: RenderedLine);
}

/// Reads envelopes until the source is exhausted, dispatching `StreamItem`s
/// of `type == 0` (trace stream) into the description table / renderer and
/// skipping (with a diagnostic) anything else.
pub fn run<S: ByteSource, K: LineSink>(
    reader: &mut PrimitiveReader<S>,
    streams: &mut std::collections::HashMap<u8, StreamStorage>,
    sink: &mut K,
) -> Result<()> {
    while reader.remaining() >= 4 {
        let envelope = StreamInfoWord::unpack(track!(reader.read_u32())?);
        let mut envelope_left = envelope.size;

        let stream = streams.entry(envelope.channel).or_insert_with(StreamStorage::default);

        while envelope_left > 4 {
            let item = StreamItemWord::unpack(track!(reader.read_u32())?);
            track_assert!(
                item.size >= 4,
                ErrorKind::ZeroItem,
                "StreamItem size {} is smaller than its own header",
                item.size
            );
            envelope_left = envelope_left.saturating_sub(item.size);
            let payload_len = item.size - 4;

            match item.item_type {
                0x00 => {
                    let actual = track!(process_trace_item(reader, stream, item.subtype, payload_len, sink))?;
                    if payload_len > actual {
                        track!(reader.skip((payload_len - actual) as usize))?;
                    }
                }
                other => {
                    track!(reader.skip(payload_len as usize))?;
                    log::warn!("Stream item type {} ignored", other);
                }
            }
        }
    }
    Ok(())
}

fn process_trace_item<S: ByteSource, K: LineSink>(
    reader: &mut PrimitiveReader<S>,
    stream: &mut StreamStorage,
    subtype: u8,
    payload_len: u32,
    sink: &mut K,
) -> Result<u32> {
    let mut cread: u32 = 0;

    match subtype {
        0x00 => {
            // StreamInfo: time, timer, timer_freq, flags, name[0x80 fixed]
            stream.info.time = track!(reader.read_u64())?;
            cread += 8;
            stream.info.timer = track!(reader.read_u64())?;
            cread += 8;
            stream.info.timer_freq = track!(reader.read_u64())?;
            cread += 8;
            stream.info.flags = track!(reader.read_u64())?;
            cread += 8;
            stream.info.name = track!(reader.fixed_units_u16(0x80))?;
            cread += 0x80;
        }
        0x01 => {
            track_assert!(
                payload_len >= 8,
                ErrorKind::Corrupted,
                "description item payload ({} bytes) is smaller than its mandatory header",
                payload_len
            );
            let line_id = track!(reader.read_u16())?;
            cread += 2;
            let mut line = P7Line::default();
            line.file_line = track!(reader.read_u16())?;
            cread += 2;
            line.module_id = track!(reader.read_u16())?;
            cread += 2;
            let num_fmt = track!(reader.read_u16())?;
            cread += 2;

            if payload_len > cread {
                if num_fmt > 0 {
                    let arg_size_bytes = u32::from(num_fmt) * 2;
                    track_assert!(
                        payload_len >= cread + arg_size_bytes,
                        ErrorKind::Corrupted,
                        "description declares {} bytes of args but only {} remain",
                        arg_size_bytes,
                        payload_len - cread
                    );
                    line.format_infos.reserve(num_fmt as usize);
                    cread += arg_size_bytes;
                    for _ in 0..num_fmt {
                        let tag = track!(reader.read_u8())?;
                        let size = track!(reader.read_u8())?;
                        let arg_type = match ArgType::from_tag(tag) {
                            Some(t) => t,
                            None => return Err(render::unknown_argument_error(tag)),
                        };
                        line.format_infos.push(ArgDescriptor { arg_type, size });
                    }
                }

                if cread < payload_len {
                    let mut consumed = 0;
                    line.format_string = track!(reader.zero_units_u16(&mut consumed))?;
                    cread += consumed;
                    track_assert!(cread <= payload_len, ErrorKind::Corrupted, "format string overruns item payload");
                }
                if cread < payload_len {
                    let mut consumed = 0;
                    line.file_name = track!(reader.zero_units_u8(&mut consumed))?;
                    cread += consumed;
                    track_assert!(cread <= payload_len, ErrorKind::Corrupted, "file name overruns item payload");
                }
                if cread < payload_len {
                    let mut consumed = 0;
                    line.func_name = track!(reader.zero_units_u8(&mut consumed))?;
                    cread += consumed;
                    track_assert!(cread <= payload_len, ErrorKind::Corrupted, "function name overruns item payload");
                }
            }

            stream.lines.insert(line_id, line);
        }
        0x02 => {
            let mut tsd = TraceLineData::default();
            tsd.id = track!(reader.read_u16())?;
            cread += 2;
            tsd.level = track!(reader.read_u8())?;
            cread += 1;
            tsd.cpu = track!(reader.read_u8())?;
            cread += 1;
            tsd.threadid = track!(reader.read_u32())?;
            cread += 4;
            tsd.sequence = track!(reader.read_u32())?;
            cread += 4;
            tsd.timer = track!(reader.read_u64())?;
            cread += 8;

            let line = match stream.lines.get(&tsd.id) {
                Some(line) => line.clone(),
                None => {
                    log::warn!("no description for line id {}, skipping Data item", tsd.id);
                    return Ok(cread);
                }
            };
            tsd.modid = line.module_id;

            let rendered = track!(render::render_line(reader, &line, &mut cread))?;
            sink.handle_line(RenderedLine {
                stream: &*stream,
                trace: &tsd,
                text: &rendered,
            });
        }
        0x03 | 0x04 | 0x09 => {
            // Verb / Close / UtcOffset: no payload semantics, nothing to read here.
        }
        0x07 => {
            let mod_id = track!(reader.read_i16())? as u16;
            cread += 2;
            let mut module = P7Module::default();
            module.verb_level = track!(reader.read_u32())?;
            cread += 4;
            let name_units = track!(reader.fixed_units_u8(54))?;
            cread += 54;
            module.name = String::from_utf8_lossy(&name_units).into_owned();
            stream.modules.insert(mod_id, module);
        }
        other => {
            log::warn!("trace stream item subtype {} ignored", other);
        }
    }

    Ok(cread)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stream_info_word_unpacks_low_bits_first() {
        // size = 10, channel = 3 -> channel in bits 27..32
        let raw = 10u32 | (3u32 << 27);
        let word = StreamInfoWord::unpack(raw);
        assert_eq!(word.size, 10);
        assert_eq!(word.channel, 3);
    }

    #[test]
    fn stream_item_word_unpacks_fields() {
        let raw = 1u32 | (2u32 << 5) | (100u32 << 10);
        let word = StreamItemWord::unpack(raw);
        assert_eq!(word.item_type, 1);
        assert_eq!(word.subtype, 2);
        assert_eq!(word.size, 100);
    }
}
