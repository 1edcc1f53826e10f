//! Top-level orchestration: wires components A through G together into the
//! single entry points spec.md §4.C enumerates.

use std::collections::HashMap;

use analyzer::{Analyzer, LineContext, LineOutcome};
use byte_source::{ByteSource, FileByteSource, MemByteSource};
use description::StreamStorage;
use framer::{self, LineSink, RenderedLine};
use header;
use plog;
use primitive::PrimitiveReader;
use Result;

/// Adapts the `Analyzer` to the framer's per-line callback, translating a
/// `RenderedLine`'s `(stream, trace)` pair into the `(module, tty)` context
/// the classifier keys off of.
struct AnalyzerSink {
    analyzer: Analyzer,
    stopped: bool,
}
impl LineSink for AnalyzerSink {
    fn handle_line(&mut self, line: RenderedLine) {
        if self.stopped {
            return;
        }
        let ctx = LineContext {
            module_name: line.stream.module_name(line.trace.modid),
            is_tty: line.stream.info.name_contains("tty"),
        };
        if self.analyzer.handle(ctx, line.text) == LineOutcome::Stop {
            self.stopped = true;
        }
    }
}

/// Decodes a P7D binary dump read from `source` and returns the finished
/// analysis document (spec.md §4.C, §6).
pub fn decode<S: ByteSource>(source: &mut S) -> Result<serde_json::Value> {
    let endian = track!(header::read_endianness(source))?;
    let mut reader = PrimitiveReader::new(source, endian);
    let preamble = track!(header::read_preamble(&mut reader))?;

    let mut streams: HashMap<u8, StreamStorage> = HashMap::new();
    let mut sink = AnalyzerSink {
        analyzer: Analyzer::for_p7d(preamble.process_name),
        stopped: false,
    };

    track!(framer::run(&mut reader, &mut streams, &mut sink))?;

    Ok(sink.analyzer.finish())
}

/// Decodes a P7D dump held entirely in memory.
pub fn decode_bytes(data: &[u8]) -> Result<serde_json::Value> {
    let mut source = MemByteSource::new(data);
    decode(&mut source)
}

/// Decodes a P7D dump from a file on disk.
pub fn decode_file<P: AsRef<std::path::Path>>(path: P) -> Result<serde_json::Value> {
    let mut source = track!(FileByteSource::open(path))?;
    decode(&mut source)
}

/// Parses and analyzes a PLOG text dump, returning the finished document.
/// PLOG has no magic/framing to fail on, so this never returns `Err`.
pub fn decode_plog(text: &str) -> serde_json::Value {
    plog::run(text)
}

/// Serializes an analysis document the way the CLI driver and tests expect:
/// pretty-printed with a 2-space indent (spec.md §6).
pub fn to_pretty_string(doc: &serde_json::Value) -> String {
    serde_json::to_string_pretty(doc).expect("Value serialization cannot fail")
}
