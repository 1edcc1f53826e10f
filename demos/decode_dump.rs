extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate trackable;
extern crate p7d_analyzer;

use clap::{App, Arg};
use p7d_analyzer::decoder;

fn main() {
    env_logger::init();

    let matches = App::new("decode_dump")
        .arg(
            Arg::with_name("INPUT")
                .required(true)
                .help("path to a .p7d trace dump or a .plog text dump"),
        )
        .arg(
            Arg::with_name("plog")
                .long("plog")
                .help("parse INPUT as a PLOG text dump instead of a P7D binary one"),
        )
        .get_matches();

    let path = matches.value_of("INPUT").expect("INPUT is required");

    let doc = if matches.is_present("plog") {
        let text = std::fs::read_to_string(path).expect("failed to read PLOG dump");
        decoder::decode_plog(&text)
    } else {
        track_try_unwrap!(decoder::decode_file(path))
    };

    println!("{}", decoder::to_pretty_string(&doc));
}
