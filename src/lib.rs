extern crate byteorder;
extern crate log;
extern crate serde_json;
#[macro_use]
extern crate trackable;

pub use error::{Error, ErrorKind};

pub mod analyzer;
pub mod byte_source;
pub mod decoder;
pub mod description;
pub mod framer;
pub mod header;
pub mod plog;
pub mod primitive;
pub mod render;

mod error;

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use byte_source::MemByteSource;
    use decoder;

    #[test]
    fn decodes_an_empty_dump_past_the_preamble() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xA6, 0x2C, 0xF3, 0xEC, 0x71, 0xAC, 0xD2, 0x45]);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&[0u8; 0x200]); // processName
        data.extend_from_slice(&[0u8; 0x200]); // hostName

        let mut source = MemByteSource::new(&data);
        let doc = track_try_unwrap!(decoder::decode(&mut source));
        assert_eq!(doc["type"], "main-process");
    }

    #[test]
    fn decodes_a_plog_child_process_line() {
        let doc = decoder::decode_plog("chan;Kernel;INFO;t;1;2;s;f;child process\n");
        assert_eq!(doc["type"], "child-process");
    }
}
