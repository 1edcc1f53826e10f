extern crate p7d_analyzer;

use p7d_analyzer::decoder;

#[test]
fn plog_main_process_picks_up_gpu_and_language() {
    let text = "\
ch;videoout;INFO;t;1;2;s;f;main process\n\
ch;videoout;INFO;t;1;2;s;f;Selected GPU: AMD RX 580\n\
ch;Kernel;INFO;t;1;2;s;f;Language switched to English\n";
    let doc = decoder::decode_plog(text);
    assert_eq!(doc["type"], "main-process");
    assert_eq!(doc["user-gpu"], " AMD RX 580");
    assert_eq!(doc["user-lang"], "English");
}

#[test]
fn plog_shutdown_marker_stops_further_classification() {
    let text = "\
ch;Kernel;INFO;t;1;2;s;f;child process\n\
ch;Kernel;INFO;t;1;2;s;f;-> client shutdown request\n\
ch;Kernel;INFO;t;1;2;s;f;psOff.app.id = CUSA00001\n";
    let doc = decoder::decode_plog(text);
    assert_eq!(doc["type"], "child-process");
    assert_eq!(doc["title_id"], "CUSA00000");
}

#[test]
fn plog_runtime_missing_symbol_label_is_latched() {
    let text = "\
ch;Kernel;INFO;t;1;2;s;f;child process\n\
ch;runtime;WARN;t;1;2;s;f;Missing Symbol| SomeExport\n";
    let doc = decoder::decode_plog(text);
    let labels: Vec<&str> = doc["labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(labels.contains(&"missing-symbol"));
}
