//! Component G: the PLOG text format (spec.md §3.1) — nine semicolon
//! delimited fields per line, fed through the same classifier as P7D.

use analyzer::{Analyzer, LineContext, LineOutcome};

const FIELD_COUNT: usize = 9;
const TTY_MODULE: &str = "TTY";

/// One parsed PLOG record. `tid` and `source` are always zero: the text
/// exporter writes placeholders in those fields and nothing downstream
/// reads them.
#[derive(Debug, Clone, Default)]
pub struct PlogLine {
    pub channel: String,
    pub module: String,
    pub level: String,
    pub timestamp: String,
    pub pid: String,
    pub tid: u32,
    pub source: u32,
    pub function: String,
    pub message: String,
}

/// Splits one PLOG line into its nine fields. Only the first eight `;`
/// characters are delimiters — the message field is free text and may
/// itself contain `;`. Returns `None` for a blank line (trailing newline
/// at EOF, for instance).
pub fn parse_line(line: &str) -> Option<PlogLine> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return None;
    }

    let mut parts: Vec<&str> = Vec::with_capacity(FIELD_COUNT);
    let mut rest = line;
    for _ in 0..FIELD_COUNT - 1 {
        match rest.find(';') {
            Some(idx) => {
                parts.push(&rest[..idx]);
                rest = &rest[idx + 1..];
            }
            None => {
                parts.push(rest);
                rest = "";
            }
        }
    }
    parts.push(rest);

    Some(PlogLine {
        channel: parts[0].to_string(),
        module: parts[1].to_string(),
        level: parts[2].to_string(),
        timestamp: parts[3].to_string(),
        pid: parts[4].to_string(),
        tid: 0,
        source: 0,
        function: parts[7].to_string(),
        message: parts[8].trim_end_matches('\r').to_string(),
    })
}

/// Runs an entire PLOG text dump through the classifier and returns the
/// finished JSON document.
pub fn run(text: &str) -> serde_json::Value {
    let mut analyzer = Analyzer::for_plog();

    for raw_line in text.lines() {
        let parsed = match parse_line(raw_line) {
            Some(p) => p,
            None => continue,
        };
        let ctx = LineContext {
            module_name: &parsed.module,
            is_tty: parsed.module == TTY_MODULE,
        };
        if analyzer.handle(ctx, &parsed.message) == LineOutcome::Stop {
            break;
        }
    }

    analyzer.finish()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn splits_nine_fields_keeping_semicolons_in_message() {
        let line = "ch;Kernel;INFO;00:00:01;1234;5678;src;func;a;b;c";
        let parsed = parse_line(line).unwrap();
        assert_eq!(parsed.module, "Kernel");
        assert_eq!(parsed.function, "func");
        assert_eq!(parsed.message, "a;b;c");
        assert_eq!(parsed.tid, 0);
        assert_eq!(parsed.source, 0);
    }

    #[test]
    fn blank_line_is_skipped() {
        assert!(parse_line("").is_none());
        assert!(parse_line("\r").is_none());
    }

    #[test]
    fn child_process_detection_and_shutdown_short_circuit() {
        let text = "ch;Kernel;INFO;t;1;2;s;f;child process\nch;Kernel;INFO;t;1;2;s;f;-> client shutdown request\nch;Kernel;INFO;t;1;2;s;f;psOff.app.id = CUSA99999\n";
        let doc = run(text);
        assert_eq!(doc["type"], "child-process");
        // the line after the shutdown marker must never have been applied
        assert_eq!(doc["title_id"], "CUSA00000");
    }

    #[test]
    fn missing_symbol_label_is_plog_only() {
        let text = "ch;runtime;WARN;t;1;2;s;f;child process\nch;runtime;WARN;t;1;2;s;f;Missing Symbol| foo\n";
        let doc = run(text);
        let labels: Vec<&str> = doc["labels"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
        assert!(labels.contains(&"missing-symbol"));
    }
}
