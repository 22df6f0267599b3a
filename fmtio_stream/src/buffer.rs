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

use core::cmp::min;

use fmtio_status::{Error, Result};

use crate::Write;

/// Size of the internal cache used by the cached buffer variants.
pub const INTERNAL_CACHE_SIZE: usize = 256;

/// A sink handing out contiguous *write areas*.
///
/// A buffer always holds one current write area; characters written into the
/// first `used` bytes of that area are committed to the buffer's logical
/// output when the next area is acquired or the buffer is flushed.  Concrete
/// implementations only provide [`area_and_used`](Buffer::area_and_used) and
/// [`request_write_area`](Buffer::request_write_area); the area bookkeeping is
/// shared below, like the provided methods of a stream trait.
///
/// A failing area request never changes the committed output.
pub trait Buffer {
    /// Returns the current write area and the count of bytes already handed
    /// out of it.
    #[doc(hidden)]
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize);

    /// Commits the first `used` bytes of the current area and installs a new
    /// area able to hold up to `size` bytes.  Returns the granted length,
    /// which may be smaller than `size` but is at least 1 on success.
    ///
    /// After a successful call the new area's used count is owned by the
    /// caller (the provided methods set it to the granted length).
    #[doc(hidden)]
    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize>;

    /// Returns a write area which may be smaller than the requested size.
    ///
    /// Use this to write long data in chunks through buffers with a limited
    /// internal cache.
    fn get_write_area_of_max(&mut self, size: usize) -> Result<&mut [u8]> {
        let (area, used) = self.area_and_used();
        if area.len() - *used >= size {
            let start = *used;
            *used += size;
            let (area, _) = self.area_and_used();
            return Ok(&mut area[start..start + size]);
        }
        let used_now = *used;
        let granted = self.request_write_area(used_now, size)?;
        let (area, used) = self.area_and_used();
        *used = granted;
        Ok(&mut area[..granted])
    }

    /// Returns a write area with exactly the requested size, or `EndOfFile`
    /// if the buffer cannot provide it.
    fn get_write_area_of(&mut self, size: usize) -> Result<&mut [u8]> {
        let granted = match self.get_write_area_of_max(size) {
            Ok(area) => area.len(),
            Err(e) => return Err(e),
        };
        let (area, used) = self.area_and_used();
        if granted < size {
            // Release the partial reservation.
            *used -= granted;
            return Err(Error::EndOfFile);
        }
        let start = *used - size;
        let end = *used;
        Ok(&mut area[start..end])
    }
}

impl<B: Buffer + ?Sized> Buffer for &mut B {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (**self).area_and_used()
    }

    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize> {
        (**self).request_write_area(used, size)
    }
}

/// A buffer over a caller-provided byte span.  Fails with `EndOfFile` once
/// the span is full.
#[derive(Debug)]
pub struct SpanBuffer<'a> {
    data: &'a mut [u8],
    used: usize,
}

impl<'a> SpanBuffer<'a> {
    /// Creates a buffer writing into `data`.
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, used: 0 }
    }

    /// Returns the written output.
    pub fn view(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Returns the written output as a string slice.
    pub fn as_str(&self) -> Result<&str> {
        core::str::from_utf8(self.view()).map_err(|_| Error::InvalidData)
    }

    /// Discards the written output and starts over at the beginning.
    pub fn reset(&mut self) {
        self.used = 0;
    }
}

impl Buffer for SpanBuffer<'_> {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (&mut *self.data, &mut self.used)
    }

    fn request_write_area(&mut self, _used: usize, _size: usize) -> Result<usize> {
        Err(Error::EndOfFile)
    }
}

/// A buffer over an inline array of compile-time size.  Fails with
/// `EndOfFile` once the array is full.
#[derive(Debug)]
pub struct ArrayBuffer<const N: usize> {
    data: [u8; N],
    used: usize,
}

impl<const N: usize> ArrayBuffer<N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            used: 0,
        }
    }

    /// Returns the written output.
    pub fn view(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Returns the written output as a string slice.
    pub fn as_str(&self) -> Result<&str> {
        core::str::from_utf8(self.view()).map_err(|_| Error::InvalidData)
    }

    /// Discards the written output and starts over at the beginning.
    pub fn reset(&mut self) {
        self.used = 0;
    }
}

impl<const N: usize> Default for ArrayBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Buffer for ArrayBuffer<N> {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (&mut self.data, &mut self.used)
    }

    fn request_write_area(&mut self, _used: usize, _size: usize) -> Result<usize> {
        Err(Error::EndOfFile)
    }
}

/// A growable heap-backed buffer.  The logical view is the concatenation of
/// the committed prefixes of all past write areas, in order.
#[cfg(feature = "alloc")]
#[derive(Debug, Default, Clone)]
pub struct VecBuffer {
    data: alloc::vec::Vec<u8>,
    committed: usize,
    used: usize,
}

#[cfg(feature = "alloc")]
impl VecBuffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            data: alloc::vec::Vec::new(),
            committed: 0,
            used: 0,
        }
    }

    /// Creates a buffer with `capacity` bytes of storage installed up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: alloc::vec![0; capacity],
            committed: 0,
            used: 0,
        }
    }

    /// Returns the written output.
    pub fn view(&self) -> &[u8] {
        &self.data[..self.committed + self.used]
    }

    /// Returns the written output as a string slice.
    pub fn as_str(&self) -> Result<&str> {
        core::str::from_utf8(self.view()).map_err(|_| Error::InvalidData)
    }

    /// Discards the written output, keeping the allocation.
    pub fn reset(&mut self) {
        self.committed = 0;
        self.used = 0;
    }

    /// Consumes the buffer and returns the written output.
    pub fn into_vec(mut self) -> alloc::vec::Vec<u8> {
        self.data.truncate(self.committed + self.used);
        self.data
    }
}

#[cfg(feature = "alloc")]
impl Buffer for VecBuffer {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (&mut self.data[self.committed..], &mut self.used)
    }

    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize> {
        self.committed += used;
        self.data.resize(self.committed + size, 0);
        Ok(size)
    }
}

/// A buffer appending to a caller-owned `Vec<u8>`.
///
/// Content present before construction is preserved.  The vector may hold
/// uncommitted tail bytes while the buffer is alive; [`flush`](Self::flush)
/// (called on drop) trims it to the written length.
#[cfg(feature = "alloc")]
#[derive(Debug)]
pub struct GrowBuffer<'a> {
    data: &'a mut alloc::vec::Vec<u8>,
    start: usize,
    committed: usize,
    used: usize,
}

#[cfg(feature = "alloc")]
impl<'a> GrowBuffer<'a> {
    /// Creates a buffer appending to `data`.
    pub fn new(data: &'a mut alloc::vec::Vec<u8>) -> Self {
        let start = data.len();
        Self {
            data,
            start,
            committed: 0,
            used: 0,
        }
    }

    /// Trims the container to the written length.
    pub fn flush(&mut self) {
        self.data.truncate(self.start + self.committed + self.used);
    }
}

#[cfg(feature = "alloc")]
impl Drop for GrowBuffer<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(feature = "alloc")]
impl Buffer for GrowBuffer<'_> {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (
            &mut self.data[self.start + self.committed..],
            &mut self.used,
        )
    }

    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize> {
        self.committed += used;
        let new_len = self.start + self.committed + size;
        self.data.resize(new_len, 0);
        Ok(size)
    }
}

/// A buffer draining through an internal cache into any [`Write`] sink.
///
/// The cache is flushed whenever a new write area is needed and when the
/// buffer is dropped.
#[derive(Debug)]
pub struct WriteBuffer<W: Write> {
    sink: W,
    cache: [u8; INTERNAL_CACHE_SIZE],
    used: usize,
}

impl<W: Write> WriteBuffer<W> {
    /// Creates a buffer draining into `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            cache: [0; INTERNAL_CACHE_SIZE],
            used: 0,
        }
    }

    /// Flushes the internal cache and the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.write_all(&self.cache[..self.used])?;
        self.used = 0;
        self.sink.flush()
    }

    /// Returns the sink.
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Returns the sink mutably.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }
}

impl<W: Write> Drop for WriteBuffer<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<W: Write> Buffer for WriteBuffer<W> {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (&mut self.cache, &mut self.used)
    }

    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize> {
        self.sink.write_all(&self.cache[..used])?;
        Ok(min(size, INTERNAL_CACHE_SIZE))
    }
}

/// Adapter implementing [`Write`] for host I/O streams.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct StdioSink<W: std::io::Write>(W);

#[cfg(feature = "std")]
impl<W: std::io::Write> StdioSink<W> {
    /// Wraps a host stream.
    pub fn new(stream: W) -> Self {
        Self(stream)
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> Write for StdioSink<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.0.write(buf).map_err(|_| Error::EndOfFile)
    }

    fn flush(&mut self) -> Result<()> {
        self.0.flush().map_err(|_| Error::EndOfFile)
    }
}

/// A buffer flushing its cache into a host file or stream.
#[cfg(feature = "std")]
pub type FileBuffer<W> = WriteBuffer<StdioSink<W>>;

/// A buffer that discards its output and only counts its length.
///
/// Fails with `EndOfFile` if the total would overflow `usize`.
#[derive(Debug)]
pub struct CountingBuffer {
    cache: [u8; INTERNAL_CACHE_SIZE],
    counted: usize,
    used: usize,
}

impl CountingBuffer {
    /// Creates a counting buffer.
    pub const fn new() -> Self {
        Self {
            cache: [0; INTERNAL_CACHE_SIZE],
            counted: 0,
            used: 0,
        }
    }

    /// Returns the number of bytes written so far.
    pub const fn count(&self) -> usize {
        self.counted + self.used
    }
}

impl Default for CountingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer for CountingBuffer {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (&mut self.cache, &mut self.used)
    }

    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize> {
        self.counted = self.counted.checked_add(used).ok_or(Error::EndOfFile)?;
        Ok(min(size, INTERNAL_CACHE_SIZE))
    }
}

/// A buffer wrapping a primary buffer with an output limit.
///
/// Everything up to `limit` bytes reaches the primary buffer; the rest is
/// discarded, but the untruncated total is still counted.
/// [`flush`](Self::flush) pushes the pending in-limit bytes to the primary
/// and surfaces the primary's error, e.g. `EndOfFile` if the primary is
/// smaller than the limit.
pub struct TruncatingBuffer<'a> {
    primary: &'a mut dyn Buffer,
    limit: usize,
    total: usize,
    cache: [u8; INTERNAL_CACHE_SIZE],
    used: usize,
}

impl<'a> TruncatingBuffer<'a> {
    /// Creates a buffer forwarding at most `limit` bytes into `primary`.
    pub fn new(primary: &'a mut dyn Buffer, limit: usize) -> Self {
        Self {
            primary,
            limit,
            total: 0,
            cache: [0; INTERNAL_CACHE_SIZE],
            used: 0,
        }
    }

    /// Returns the untruncated number of bytes written so far.
    pub const fn count(&self) -> usize {
        self.total + self.used
    }

    /// Pushes pending in-limit bytes to the primary buffer.
    pub fn flush(&mut self) -> Result<()> {
        let used = self.used;
        self.used = 0;
        self.drain(used)?;
        Ok(())
    }

    // Commits cache[..n]: the portion still within the limit goes to the
    // primary, the rest is dropped.  All n bytes count toward the total.
    fn drain(&mut self, n: usize) -> Result<usize> {
        let within = min(n, self.limit.saturating_sub(min(self.total, self.limit)));
        let mut src = 0;
        while src < within {
            let area = self.primary.get_write_area_of_max(within - src)?;
            let len = area.len();
            area.copy_from_slice(&self.cache[src..src + len]);
            src += len;
        }
        self.total += n;
        Ok(n)
    }
}

impl Drop for TruncatingBuffer<'_> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl Buffer for TruncatingBuffer<'_> {
    fn area_and_used(&mut self) -> (&mut [u8], &mut usize) {
        (&mut self.cache, &mut self.used)
    }

    fn request_write_area(&mut self, used: usize, size: usize) -> Result<usize> {
        self.drain(used)?;
        Ok(min(size, INTERNAL_CACHE_SIZE))
    }
}
