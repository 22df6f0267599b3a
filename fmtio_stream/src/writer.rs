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

use fmtio_status::{Error, Result};

use crate::buffer::Buffer;

/// Options for [`Writer::write_int`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteIntOptions {
    /// The output base.  Must be in 2..=36.
    pub base: u32,
    /// If true, digit letters are upper case.
    pub upper_case: bool,
}

impl Default for WriteIntOptions {
    fn default() -> Self {
        Self {
            base: 10,
            upper_case: false,
        }
    }
}

/// Writes characters and other kinds of data into a [`Buffer`].
///
/// The writer holds the buffer as a trait object so that the code operating
/// on it is compiled only once, not per buffer type.
pub struct Writer<'a> {
    buf: &'a mut dyn Buffer,
}

impl<'a> Writer<'a> {
    /// Creates a writer over `buf`.
    pub fn new(buf: &'a mut dyn Buffer) -> Self {
        Self { buf }
    }

    /// Returns the underlying buffer.
    pub fn buffer(&mut self) -> &mut dyn Buffer {
        self.buf
    }

    /// Writes one character.
    pub fn write_char(&mut self, c: char) -> Result<()> {
        let mut encoded = [0u8; 4];
        self.write_str(c.encode_utf8(&mut encoded))
    }

    /// Writes `n` copies of a character, chunked to support cached sinks.
    pub fn write_char_n(&mut self, c: char, n: usize) -> Result<()> {
        if c.len_utf8() == 1 {
            let mut remaining = n;
            while remaining != 0 {
                let area = self.buf.get_write_area_of_max(remaining)?;
                area.fill(c as u8);
                remaining -= area.len();
            }
            return Ok(());
        }
        for _ in 0..n {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Writes a character sequence, chunked to support cached sinks.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let area = self.buf.get_write_area_of_max(bytes.len())?;
            let len = area.len();
            area.copy_from_slice(&bytes[..len]);
            bytes = &bytes[len..];
        }
        Ok(())
    }

    /// Writes a character in its single-quoted, escaped debug form.
    pub fn write_char_escaped(&mut self, c: char) -> Result<()> {
        let mut encoded = [0u8; 4];
        let s = c.encode_utf8(&mut encoded);
        self.write_quoted_escaped(s, '\'')
    }

    /// Writes a character sequence in its double-quoted, escaped debug form.
    pub fn write_str_escaped(&mut self, s: &str) -> Result<()> {
        self.write_quoted_escaped(s, '"')
    }

    /// Writes an integer.
    ///
    /// Returns `InvalidArgument` if the requested base is not in 2..=36.
    pub fn write_int<T: Integer>(&mut self, value: T, options: WriteIntOptions) -> Result<()> {
        if !crate::reader::is_valid_number_base(options.base) {
            return Err(Error::InvalidArgument);
        }
        let (negative, abs) = value.split_abs();
        let count = count_digits(abs, options.base) + usize::from(negative);

        let area = self.buf.get_write_area_of(count)?;
        if negative {
            area[0] = b'-';
        }
        write_digits(abs, options.base, options.upper_case, area);
        Ok(())
    }

    // Escaping works on the raw code units, so runs are sliced as bytes.
    fn write_quoted_escaped(&mut self, s: &str, quote: char) -> Result<()> {
        self.write_char(quote)?;
        let bytes = s.as_bytes();
        let mut run_start = 0;
        for (i, b) in bytes.iter().enumerate() {
            if !needs_escape(*b) {
                continue;
            }
            self.write_bytes(&bytes[run_start..i])?;
            run_start = i + 1;
            match *b {
                b'\n' => self.write_str("\\n")?,
                b'\r' => self.write_str("\\r")?,
                b'\t' => self.write_str("\\t")?,
                b'\\' => self.write_str("\\\\")?,
                b'\'' => self.write_str("\\'")?,
                b'"' => self.write_str("\\\"")?,
                b => {
                    let hex = [
                        b'\\',
                        b'x',
                        hex_digit(b >> 4, false),
                        hex_digit(b & 0xf, false),
                    ];
                    self.write_bytes(&hex)?;
                }
            }
        }
        self.write_bytes(&bytes[run_start..])?;
        self.write_char(quote)
    }
}

/// Integer types writable with [`Writer::write_int`].
pub trait Integer: Copy {
    /// Splits the value into its sign and absolute magnitude.
    #[doc(hidden)]
    fn split_abs(self) -> (bool, u64);
}

macro_rules! integer_impl {
    (signed, $ty:ty) => {
        impl Integer for $ty {
            fn split_abs(self) -> (bool, u64) {
                (self < 0, self.unsigned_abs() as u64)
            }
        }
    };
    (unsigned, $ty:ty) => {
        impl Integer for $ty {
            fn split_abs(self) -> (bool, u64) {
                (false, self as u64)
            }
        }
    };
}

integer_impl!(signed, i8);
integer_impl!(signed, i16);
integer_impl!(signed, i32);
integer_impl!(signed, i64);
integer_impl!(signed, isize);
integer_impl!(unsigned, u8);
integer_impl!(unsigned, u16);
integer_impl!(unsigned, u32);
integer_impl!(unsigned, u64);
integer_impl!(unsigned, usize);

/// Returns the number of digits `abs` has in `base`.
pub fn count_digits(abs: u64, base: u32) -> usize {
    if abs == 0 {
        return 1;
    }
    let bits = 64 - abs.leading_zeros() as usize;
    match base {
        10 => count_digits_10(abs),
        2 => bits,
        8 => (bits + 2) / 3,
        16 => (bits + 3) / 4,
        _ => {
            let mut count = 1;
            let mut value = abs / u64::from(base);
            while value != 0 {
                count += 1;
                value /= u64::from(base);
            }
            count
        }
    }
}

// Integer division is slow, so handle a group of four digits per round.
fn count_digits_10(mut number: u64) -> usize {
    let mut count = 1;
    loop {
        if number < 10 {
            return count;
        }
        if number < 100 {
            return count + 1;
        }
        if number < 1000 {
            return count + 2;
        }
        if number < 10000 {
            return count + 3;
        }
        number /= 10000;
        count += 4;
    }
}

/// Returns the length `s` has in its escaped debug form, without quotes.
pub fn escaped_len(s: &str) -> usize {
    s.as_bytes()
        .iter()
        .map(|b| match *b {
            b'\n' | b'\r' | b'\t' | b'\\' | b'\'' | b'"' => 2,
            b if needs_escape(b) => 4,
            _ => 1,
        })
        .sum()
}

fn needs_escape(b: u8) -> bool {
    b < 0x20 || b >= 0x7f || b == b'\'' || b == b'"' || b == b'\\'
}

fn hex_digit(value: u8, upper: bool) -> u8 {
    match value {
        0..=9 => b'0' + value,
        _ if upper => b'A' + value - 10,
        _ => b'a' + value - 10,
    }
}

/// Writes the digits of `abs` right to left into the tail of `area`.
///
/// `area` must be at least [`count_digits`]`(abs, base)` long; bytes in
/// front of the digits are left untouched.
pub fn write_digits(mut abs: u64, base: u32, upper: bool, area: &mut [u8]) {
    let mut next = area.len();
    if abs == 0 {
        next -= 1;
        area[next] = b'0';
        return;
    }
    while abs != 0 {
        next -= 1;
        area[next] = hex_digit((abs % u64::from(base)) as u8, upper);
        abs /= u64::from(base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{ArrayBuffer, WriteBuffer, INTERNAL_CACHE_SIZE};
    use crate::Write;
    use std::string::String;
    use std::vec::Vec;

    fn render(f: impl FnOnce(&mut Writer<'_>) -> Result<()>) -> String {
        let mut buf = ArrayBuffer::<4096>::new();
        let mut writer = Writer::new(&mut buf);
        f(&mut writer).unwrap();
        String::from(buf.as_str().unwrap())
    }

    #[test]
    fn write_char_and_str_append_in_order() {
        let out = render(|w| {
            w.write_char('a')?;
            w.write_str("bc")?;
            w.write_char('d')
        });
        assert_eq!(out, "abcd");
    }

    #[test]
    fn write_char_n_repeats_the_fill_character() {
        assert_eq!(render(|w| w.write_char_n('*', 5)), "*****");
        assert_eq!(render(|w| w.write_char_n('*', 0)), "");
    }

    #[test]
    fn write_char_n_crosses_cache_boundaries() {
        struct Collect(Vec<u8>);
        impl Write for Collect {
            fn write(&mut self, buf: &[u8]) -> Result<usize> {
                self.0.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let mut sink = Collect(Vec::new());
        {
            let mut buf = WriteBuffer::new(&mut sink);
            let mut writer = Writer::new(&mut buf);
            writer.write_char_n('x', INTERNAL_CACHE_SIZE + 10).unwrap();
            writer.write_str(&"y".repeat(INTERNAL_CACHE_SIZE + 10)).unwrap();
        }
        assert_eq!(sink.0.len(), 2 * (INTERNAL_CACHE_SIZE + 10));
    }

    #[test]
    fn write_char_fails_when_the_buffer_is_full() {
        let mut buf = ArrayBuffer::<1>::new();
        let mut writer = Writer::new(&mut buf);
        writer.write_char('a').unwrap();
        assert_eq!(writer.write_char('b'), Err(Error::EndOfFile));
    }

    #[test]
    fn write_int_renders_all_supported_bases() {
        let options = |base| WriteIntOptions {
            base,
            upper_case: false,
        };
        assert_eq!(render(|w| w.write_int(42, options(10))), "42");
        assert_eq!(render(|w| w.write_int(-42, options(10))), "-42");
        assert_eq!(render(|w| w.write_int(0, options(10))), "0");
        assert_eq!(render(|w| w.write_int(42, options(2))), "101010");
        assert_eq!(render(|w| w.write_int(42, options(8))), "52");
        assert_eq!(render(|w| w.write_int(0x2a, options(16))), "2a");
        assert_eq!(render(|w| w.write_int(35, options(36))), "z");
        assert_eq!(
            render(|w| {
                w.write_int(
                    0x2a,
                    WriteIntOptions {
                        base: 16,
                        upper_case: true,
                    },
                )
            }),
            "2A"
        );
    }

    #[test]
    fn write_int_covers_the_integer_limits() {
        let options = WriteIntOptions::default();
        assert_eq!(render(|w| w.write_int(i64::MIN, options)), "-9223372036854775808");
        assert_eq!(render(|w| w.write_int(i64::MAX, options)), "9223372036854775807");
        assert_eq!(render(|w| w.write_int(u64::MAX, options)), "18446744073709551615");
        assert_eq!(render(|w| w.write_int(i8::MIN, options)), "-128");
    }

    #[test]
    fn write_int_rejects_unsupported_bases() {
        let mut buf = ArrayBuffer::<16>::new();
        let mut writer = Writer::new(&mut buf);
        let options = WriteIntOptions {
            base: 1,
            upper_case: false,
        };
        assert_eq!(writer.write_int(1, options), Err(Error::InvalidArgument));
    }

    #[test]
    fn write_str_escaped_quotes_and_escapes() {
        assert_eq!(
            render(|w| w.write_str_escaped("\n\t\"")),
            "\"\\n\\t\\\"\""
        );
        assert_eq!(render(|w| w.write_str_escaped("plain")), "\"plain\"");
        assert_eq!(render(|w| w.write_str_escaped("\x05")), "\"\\x05\"");
        assert_eq!(render(|w| w.write_str_escaped("a\\b")), "\"a\\\\b\"");
    }

    #[test]
    fn write_char_escaped_uses_single_quotes() {
        assert_eq!(render(|w| w.write_char_escaped('a')), "'a'");
        assert_eq!(render(|w| w.write_char_escaped('\n')), "'\\n'");
        assert_eq!(render(|w| w.write_char_escaped('\'')), "'\\''");
    }

    #[test]
    fn escaped_len_matches_the_written_form() {
        for s in ["", "plain", "\n\t\"", "\x05\x7f", "a\\b'c"] {
            let written = render(|w| w.write_str_escaped(s));
            assert_eq!(escaped_len(s) + 2, written.len(), "input: {s:?}");
        }
    }

    #[test]
    fn count_digits_agrees_with_rendered_lengths() {
        for base in [2u32, 8, 10, 16, 36] {
            for value in [0u64, 1, 7, 8, 9, 10, 35, 36, 255, 4095, u64::MAX] {
                let rendered = render(|w| {
                    w.write_int(
                        value,
                        WriteIntOptions {
                            base,
                            upper_case: false,
                        },
                    )
                });
                assert_eq!(
                    count_digits(value, base),
                    rendered.len(),
                    "value {value} in base {base}"
                );
            }
        }
    }
}
