//! The growable buffer that backs lists and the source reader

use derive_more::Deref;
use std::io::{self, Read};
use std::string::FromUtf8Error;

/// initial capacity for general purpose buffers
pub const INIT_CAP: usize = 256;
/// initial capacity for the storage of list values. Most lists are tiny
pub const LIST_INIT_CAP: usize = 16;

const READ_CHUNK: usize = 1024;

/// A resizable sequence with an explicitly managed capacity.
///
/// An empty buffer owns no allocation. The first reservation jumps straight to
/// `init_cap` and from then on the capacity doubles until the request fits, so
/// growth is predictable no matter what the allocator does. The buffer never
/// shrinks: `pop` and `truncate` only lower the count.
///
/// Read access goes through `Deref` to the underlying `Vec`, writes only through
/// the methods below, so the capacity bookkeeping can't be bypassed.
#[derive(Debug, Clone, Deref)]
pub struct Buffer<T> {
    #[deref]
    data: Vec<T>,
    cap: usize,
    init_cap: usize,
}

pub type ByteBuffer = Buffer<u8>;

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Buffer<T> {
    pub const fn new() -> Self {
        Self::with_init_cap(INIT_CAP)
    }

    pub const fn with_init_cap(init_cap: usize) -> Self {
        Self {
            data: Vec::new(),
            cap: 0,
            init_cap,
        }
    }

    /// makes sure that `additional` more elements fit without another allocation
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if self.cap >= needed {
            return;
        }
        let mut new_cap = if self.cap == 0 {
            self.init_cap.max(1)
        } else {
            self.cap
        };
        while new_cap < needed {
            new_cap *= 2;
        }
        self.data.reserve_exact(new_cap - self.data.len());
        self.cap = new_cap;
    }

    pub fn push(&mut self, val: T) {
        self.reserve(1);
        self.data.push(val);
    }

    /// removes the last element, the capacity stays as it is
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// lowers the count to `len`, dropping everything past it
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl<T: Clone> Buffer<T> {
    pub fn extend_from_slice(&mut self, elems: &[T]) {
        self.reserve(elems.len());
        self.data.extend_from_slice(elems);
    }
}

impl ByteBuffer {
    pub fn cat(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    /// reads everything `reader` has to offer, chunk by chunk
    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut res = Self::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => return Ok(res),
                Ok(n) => res.cat(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    pub fn into_string(self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.data)
    }
}
