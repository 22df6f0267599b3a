// Copyright 2025 The Pigweed Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

//! # fmtio_stream
//!
//! `no_std` reading and writing primitives for the `fmtio` crates:
//!
//! * [`Reader`]: a cursor over an immutable character sequence with
//!   peek/pop/match/parse-integer/bounded-search primitives.
//! * [`Buffer`]: a polymorphic write sink exposing a uniform chunked
//!   "write area" contract over fixed spans, inline arrays, growable heap
//!   storage, cached sinks, host streams, counting and truncating wrappers.
//! * [`Writer`]: character/string/escaped/repeated/integer writes on top of
//!   any buffer.
//!
//! The input and output streams are treated as sequences of 8-bit code
//! units.  Positions and counts are byte based.
//!
//! # Example
//!
//! ```
//! use fmtio_stream::{ArrayBuffer, Buffer, Reader, Writer};
//!
//! let mut input = Reader::new("17 apples");
//! let count: u32 = input.parse_int(10).unwrap();
//!
//! let mut buf = ArrayBuffer::<32>::new();
//! let mut out = Writer::new(&mut buf);
//! out.write_int(count, Default::default()).unwrap();
//! out.write_str(" apples counted").unwrap();
//! assert_eq!(buf.as_str(), Ok("17 apples counted"));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(all(test, not(feature = "std")))]
extern crate std;

use fmtio_status::Result;

mod buffer;
mod reader;
mod writer;

pub use buffer::{
    ArrayBuffer, Buffer, CountingBuffer, SpanBuffer, TruncatingBuffer, WriteBuffer,
    INTERNAL_CACHE_SIZE,
};
#[cfg(feature = "alloc")]
pub use buffer::{GrowBuffer, VecBuffer};
#[cfg(feature = "std")]
pub use buffer::{FileBuffer, StdioSink};
pub use reader::{ParseInt, ReadUntilOptions, Reader};
pub use writer::{count_digits, escaped_len, write_digits, Integer, WriteIntOptions, Writer};

/// A sink for the byte output of cached buffers.
///
/// This is the narrow interface through which the cached buffer variants
/// drain; hosts adapt their stream types to it.
pub trait Write {
    /// Writes a buffer to the sink, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Commits any outstanding buffered writes to the underlying storage.
    fn flush(&mut self) -> Result<()>;

    /// Writes the entire buffer to the sink.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let len = self.write(buf)?;

            // End of stream.
            if len == 0 {
                break;
            }

            buf = &buf[len..];
        }

        if buf.is_empty() {
            Ok(())
        } else {
            Err(fmtio_status::Error::EndOfFile)
        }
    }
}

impl<W: Write + ?Sized> Write for &mut W {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmtio_status::Error;
    use std::vec::Vec;

    struct ShortWriter {
        data: Vec<u8>,
        chunk: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            let len = core::cmp::min(self.chunk, buf.len());
            self.data.extend_from_slice(&buf[..len]);
            Ok(len)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct FullSink;

    impl Write for FullSink {
        fn write(&mut self, _buf: &[u8]) -> Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_all_loops_over_short_writes() {
        let mut writer = ShortWriter {
            data: Vec::new(),
            chunk: 3,
        };
        writer.write_all(b"0123456789").unwrap();
        assert_eq!(writer.data, b"0123456789");
    }

    #[test]
    fn write_all_reports_a_full_sink() {
        assert_eq!(FullSink.write_all(b"x"), Err(Error::EndOfFile));
        assert_eq!(FullSink.write_all(b""), Ok(()));
    }
}
