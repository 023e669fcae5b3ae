//! contains small utility functions that have nowhere else to go

use crate::buffer::ByteBuffer;
use std::fs::File;
use std::io;
use std::path::Path;

/// reads a whole source file, which has to be valid UTF-8
pub fn read_source(path: impl AsRef<Path>) -> io::Result<String> {
    let buf = ByteBuffer::read_from(File::open(path)?)?;
    buf.into_string()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

macro_rules! bug {
    ($msg:literal $(, $args:tt)*) => {
       panic!(concat!("An Interpreter bug occured:\n\n", $msg) $(, $args)*)
    };
}

pub(crate) use bug;
