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
use fmtio_stream::{count_digits, escaped_len, Integer, Reader, WriteIntOptions, Writer};

use crate::specs::{
    check_bool_specs, check_char_specs, check_integral_specs, check_pointer_specs,
    check_string_specs, check_unsigned_specs, parse_format_specs, Alignment, FormatSpecs, Sign,
};

/// Formatting rules for values of type `T`.
///
/// Implementations parse the spec substring of a replacement field (up to and
/// including the closing `}`) and render a value according to it.  The
/// provided [`validate`](Formatter::validate) parses on a throw-away instance;
/// types whose validation is cheaper than a parse can override it.
pub trait Formatter<T: ?Sized>: Default {
    /// Checks the spec substring for validity without keeping state.
    fn validate(rdr: &mut Reader<'_>) -> Result<()>
    where
        Self: Sized,
    {
        Self::default().parse(rdr)
    }

    /// Parses the spec substring and stores the parsed state.
    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()>;

    /// Renders `value` according to the parsed spec.
    fn format(&self, out: &mut Writer<'_>, value: &T) -> Result<()>;

    /// Overrides the parsed width, for formatters that support one.
    fn set_width(&mut self, _width: i32) {}

    /// Overrides the parsed precision, for formatters that support one.
    fn set_precision(&mut self, _precision: i32) {}
}

/// Types that can be formatted through a replacement field.
pub trait Format {
    /// The formatter implementation for this type.
    type Formatter: Formatter<Self>;
}

/// Forwards formatting of references to the referenced type.
pub struct RefFormatter<T: Format + ?Sized>(T::Formatter);

impl<T: Format + ?Sized> Default for RefFormatter<T> {
    fn default() -> Self {
        Self(T::Formatter::default())
    }
}

impl<T: Format + ?Sized> Clone for RefFormatter<T>
where
    T::Formatter: Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'b, T: Format + ?Sized> Formatter<&'b T> for RefFormatter<T> {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        T::Formatter::validate(rdr)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        self.0.parse(rdr)
    }

    fn format(&self, out: &mut Writer<'_>, value: &&'b T) -> Result<()> {
        self.0.format(out, value)
    }

    fn set_width(&mut self, width: i32) {
        self.0.set_width(width);
    }

    fn set_precision(&mut self, precision: i32) {
        self.0.set_precision(precision);
    }
}

impl<'b, T: Format + ?Sized> Format for &'b T {
    type Formatter = RefFormatter<T>;
}

//
// Padding protocol.
//

pub(crate) fn write_padding_left(
    out: &mut Writer<'_>,
    specs: &mut FormatSpecs,
    width: usize,
) -> Result<()> {
    if specs.width == 0 || (specs.width as i64) < width as i64 {
        specs.width = 0;
        return Ok(());
    }
    let mut fill_width = specs.width - width as i32;
    if specs.align == Alignment::Left {
        specs.width = fill_width;
        return Ok(());
    }
    if specs.align == Alignment::Center {
        fill_width /= 2;
    }
    specs.width -= fill_width + width as i32;
    out.write_char_n(specs.fill, fill_width as usize)
}

pub(crate) fn write_padding_right(out: &mut Writer<'_>, specs: &FormatSpecs) -> Result<()> {
    if specs.width == 0 || !matches!(specs.align, Alignment::Left | Alignment::Center) {
        return Ok(());
    }
    out.write_char_n(specs.fill, specs.width as usize)
}

/// Pads `body` to the spec's width: fill before for right/center alignment,
/// fill after for left/center.  `width` is the body's rendered width.
pub(crate) fn write_padded<F>(
    out: &mut Writer<'_>,
    specs: &mut FormatSpecs,
    default_align: Alignment,
    width: usize,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut Writer<'_>) -> Result<()>,
{
    if specs.align == Alignment::None {
        specs.align = default_align;
    }
    write_padding_left(out, specs, width)?;
    body(out)?;
    write_padding_right(out, specs)
}

//
// Integer rendering shared by several kinds.
//

fn make_write_int_options(ty: Option<char>) -> Result<(&'static str, WriteIntOptions)> {
    let (prefix, base, upper_case) = match ty {
        None | Some('d') => ("", 10, false),
        Some('x') => ("0x", 16, false),
        Some('X') => ("0X", 16, true),
        Some('b') => ("0b", 2, false),
        Some('B') => ("0B", 2, false),
        Some('o') => ("0", 8, false),
        _ => return Err(Error::InvalidFormat),
    };
    Ok((prefix, WriteIntOptions { base, upper_case }))
}

fn write_sign_and_prefix(
    out: &mut Writer<'_>,
    sign: Sign,
    negative: bool,
    prefix: &str,
) -> Result<()> {
    if negative {
        out.write_char('-')?;
    } else if sign == Sign::Plus {
        out.write_char('+')?;
    } else if sign == Sign::Space {
        out.write_char(' ')?;
    }
    if !prefix.is_empty() {
        out.write_str(prefix)?;
    }
    Ok(())
}

pub(crate) fn write_int_arg<T: Integer>(
    out: &mut Writer<'_>,
    mut specs: FormatSpecs,
    value: T,
) -> Result<()> {
    if specs.ty == Some('c') {
        let (negative, abs) = value.split_abs();
        let c = if negative {
            None
        } else {
            u32::try_from(abs).ok().and_then(char::from_u32)
        };
        let Some(c) = c else {
            return Err(Error::OutOfRange);
        };
        return write_padded(out, &mut specs, Alignment::Left, 1, |out| out.write_char(c));
    }

    let (mut prefix, options) = make_write_int_options(specs.ty)?;
    let (negative, abs) = value.split_abs();
    // The octal prefix is omitted for a zero value.
    if specs.ty == Some('o') && abs == 0 {
        prefix = "";
    }
    if !specs.alternate_form {
        prefix = "";
    }

    let number_of_digits = count_digits(abs, options.base);
    let mut total_width = number_of_digits + prefix.len();
    if negative || matches!(specs.sign, Sign::Plus | Sign::Space) {
        total_width += 1;
    }

    let sign = specs.sign;
    let zero_flag = specs.zero_flag;
    // With zero padding the sign and prefix sit in front of the fill.
    if zero_flag {
        write_sign_and_prefix(out, sign, negative, prefix)?;
    }
    write_padded(out, &mut specs, Alignment::Right, total_width, |out| {
        if !zero_flag {
            write_sign_and_prefix(out, sign, negative, prefix)?;
        }
        let area = out.buffer().get_write_area_of(number_of_digits)?;
        fmtio_stream::write_digits(abs, options.base, options.upper_case, area);
        Ok(())
    })
}

//
// Core formatters.
//

/// Formatter for the primitive integer types.
#[derive(Clone, Debug, Default)]
pub struct IntFormatter {
    specs: FormatSpecs,
}

macro_rules! int_format_impl {
    ($ty:ty, $($extra_check:expr)?) => {
        impl Formatter<$ty> for IntFormatter {
            fn validate(rdr: &mut Reader<'_>) -> Result<()> {
                let mut specs = FormatSpecs::default();
                parse_format_specs(rdr, &mut specs)?;
                check_integral_specs(&specs)?;
                $($extra_check(&specs)?;)?
                Ok(())
            }

            fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
                parse_format_specs(rdr, &mut self.specs)
            }

            fn format(&self, out: &mut Writer<'_>, value: &$ty) -> Result<()> {
                write_int_arg(out, self.specs, *value)
            }

            fn set_width(&mut self, width: i32) {
                self.specs.width = width.max(0);
            }

            fn set_precision(&mut self, precision: i32) {
                self.specs.precision = Some(precision.max(0));
            }
        }

        impl Format for $ty {
            type Formatter = IntFormatter;
        }
    };
}

int_format_impl!(i8,);
int_format_impl!(i16,);
int_format_impl!(i32,);
int_format_impl!(i64,);
int_format_impl!(isize,);
int_format_impl!(u8, check_unsigned_specs);
int_format_impl!(u16, check_unsigned_specs);
int_format_impl!(u32, check_unsigned_specs);
int_format_impl!(u64, check_unsigned_specs);
int_format_impl!(usize, check_unsigned_specs);

/// Formatter for `bool`.
#[derive(Clone, Debug, Default)]
pub struct BoolFormatter {
    specs: FormatSpecs,
}

impl Formatter<bool> for BoolFormatter {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        let mut specs = FormatSpecs::default();
        parse_format_specs(rdr, &mut specs)?;
        check_bool_specs(&specs)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_format_specs(rdr, &mut self.specs)
    }

    fn format(&self, out: &mut Writer<'_>, value: &bool) -> Result<()> {
        let mut specs = self.specs;
        // With an integer presentation type, render as 0/1.
        if !matches!(specs.ty, None | Some('s')) {
            return write_int_arg(out, specs, u8::from(*value));
        }
        let text = if *value { "true" } else { "false" };
        write_padded(out, &mut specs, Alignment::Left, text.len(), |out| {
            out.write_str(text)
        })
    }

    fn set_width(&mut self, width: i32) {
        self.specs.width = width.max(0);
    }
}

impl Format for bool {
    type Formatter = BoolFormatter;
}

/// Formatter for `char`.
#[derive(Clone, Debug, Default)]
pub struct CharFormatter {
    specs: FormatSpecs,
}

impl Formatter<char> for CharFormatter {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        let mut specs = FormatSpecs::default();
        parse_format_specs(rdr, &mut specs)?;
        check_char_specs(&specs)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_format_specs(rdr, &mut self.specs)
    }

    fn format(&self, out: &mut Writer<'_>, value: &char) -> Result<()> {
        let mut specs = self.specs;
        // With an integer presentation type, render the code point value.
        if !matches!(specs.ty, None | Some('c' | '?')) {
            return write_int_arg(out, specs, *value as u32);
        }
        if specs.ty == Some('?') {
            let mut encoded = [0u8; 4];
            let escaped = escaped_len(value.encode_utf8(&mut encoded)) + 2;
            let c = *value;
            return write_padded(out, &mut specs, Alignment::Left, escaped, move |out| {
                out.write_char_escaped(c)
            });
        }
        let c = *value;
        write_padded(out, &mut specs, Alignment::Left, 1, move |out| {
            out.write_char(c)
        })
    }

    fn set_width(&mut self, width: i32) {
        self.specs.width = width.max(0);
    }
}

impl Format for char {
    type Formatter = CharFormatter;
}

/// Formatter for string slices.
#[derive(Clone, Debug, Default)]
pub struct StrFormatter {
    specs: FormatSpecs,
}

impl Formatter<str> for StrFormatter {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        let mut specs = FormatSpecs::default();
        parse_format_specs(rdr, &mut specs)?;
        check_string_specs(&specs)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_format_specs(rdr, &mut self.specs)
    }

    fn format(&self, out: &mut Writer<'_>, value: &str) -> Result<()> {
        let mut specs = self.specs;
        // The precision truncates the character count.
        let text = match specs.precision {
            Some(precision) => truncate_chars(value, precision as usize),
            None => value,
        };
        if specs.ty == Some('?') {
            let width = escaped_len(text) + 2;
            return write_padded(out, &mut specs, Alignment::Left, width, |out| {
                out.write_str_escaped(text)
            });
        }
        let width = text.chars().count();
        write_padded(out, &mut specs, Alignment::Left, width, |out| {
            out.write_str(text)
        })
    }

    fn set_width(&mut self, width: i32) {
        self.specs.width = width.max(0);
    }

    fn set_precision(&mut self, precision: i32) {
        self.specs.precision = Some(precision.max(0));
    }
}

impl Format for str {
    type Formatter = StrFormatter;
}

#[cfg(feature = "alloc")]
impl Formatter<alloc::string::String> for StrFormatter {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        <StrFormatter as Formatter<str>>::validate(rdr)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_format_specs(rdr, &mut self.specs)
    }

    fn format(&self, out: &mut Writer<'_>, value: &alloc::string::String) -> Result<()> {
        <StrFormatter as Formatter<str>>::format(self, out, value)
    }

    fn set_width(&mut self, width: i32) {
        self.specs.width = width.max(0);
    }

    fn set_precision(&mut self, precision: i32) {
        self.specs.precision = Some(precision.max(0));
    }
}

#[cfg(feature = "alloc")]
impl Format for alloc::string::String {
    type Formatter = StrFormatter;
}

fn truncate_chars(s: &str, count: usize) -> &str {
    match s.char_indices().nth(count) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Formatter for raw pointers.
#[derive(Clone, Debug, Default)]
pub struct PointerFormatter {
    specs: FormatSpecs,
}

impl PointerFormatter {
    fn validate_specs(rdr: &mut Reader<'_>) -> Result<()> {
        let mut specs = FormatSpecs::default();
        parse_format_specs(rdr, &mut specs)?;
        check_pointer_specs(&specs)
    }

    fn format_address(&self, out: &mut Writer<'_>, address: usize) -> Result<()> {
        let mut specs = self.specs;
        specs.alternate_form = true;
        specs.ty = Some('x');
        write_int_arg(out, specs, address)
    }
}

macro_rules! pointer_format_impl {
    ($ptr:ty) => {
        impl<T> Formatter<$ptr> for PointerFormatter {
            fn validate(rdr: &mut Reader<'_>) -> Result<()> {
                Self::validate_specs(rdr)
            }

            fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
                parse_format_specs(rdr, &mut self.specs)
            }

            fn format(&self, out: &mut Writer<'_>, value: &$ptr) -> Result<()> {
                self.format_address(out, *value as usize)
            }

            fn set_width(&mut self, width: i32) {
                self.specs.width = width.max(0);
            }
        }

        impl<T> Format for $ptr {
            type Formatter = PointerFormatter;
        }
    };
}

pointer_format_impl!(*const T);
pointer_format_impl!(*mut T);

#[cfg(test)]
mod tests {
    use super::*;
    use fmtio_stream::ArrayBuffer;
    use std::string::String;

    // Formats one value through the full parse + format path.
    fn format_one<T: Format + ?Sized>(spec: &str, value: &T) -> Result<String> {
        let mut rdr = Reader::new(spec);
        T::Formatter::validate(&mut rdr)?;

        let mut rdr = Reader::new(spec);
        let mut formatter = T::Formatter::default();
        formatter.parse(&mut rdr)?;

        let mut buf = ArrayBuffer::<256>::new();
        let mut out = Writer::new(&mut buf);
        formatter.format(&mut out, value)?;
        Ok(String::from(buf.as_str().unwrap()))
    }

    #[test]
    fn integers_format_in_all_bases() {
        assert_eq!(format_one("}", &42).unwrap(), "42");
        assert_eq!(format_one("d}", &-42).unwrap(), "-42");
        assert_eq!(format_one("b}", &5).unwrap(), "101");
        assert_eq!(format_one("B}", &5).unwrap(), "101");
        assert_eq!(format_one("o}", &8).unwrap(), "10");
        assert_eq!(format_one("x}", &255).unwrap(), "ff");
        assert_eq!(format_one("X}", &255).unwrap(), "FF");
    }

    #[test]
    fn alternate_form_prepends_the_base_prefix() {
        assert_eq!(format_one("#x}", &42).unwrap(), "0x2a");
        assert_eq!(format_one("#X}", &42).unwrap(), "0X2A");
        assert_eq!(format_one("#b}", &5).unwrap(), "0b101");
        assert_eq!(format_one("#B}", &5).unwrap(), "0B101");
        assert_eq!(format_one("#o}", &8).unwrap(), "010");
        // No octal prefix for zero.
        assert_eq!(format_one("#o}", &0).unwrap(), "0");
        assert_eq!(format_one("#d}", &42).unwrap(), "42");
    }

    #[test]
    fn sign_handling_covers_plus_minus_and_space() {
        assert_eq!(format_one("+}", &42).unwrap(), "+42");
        assert_eq!(format_one("+}", &-42).unwrap(), "-42");
        assert_eq!(format_one("-}", &42).unwrap(), "42");
        assert_eq!(format_one(" }", &42).unwrap(), " 42");
        assert_eq!(format_one(" }", &-42).unwrap(), "-42");
    }

    #[test]
    fn numeric_padding_defaults_to_right_alignment() {
        assert_eq!(format_one("5}", &42).unwrap(), "   42");
        assert_eq!(format_one("<5}", &42).unwrap(), "42   ");
        assert_eq!(format_one("^5}", &42).unwrap(), " 42  ");
        assert_eq!(format_one("*^5}", &-42).unwrap(), "*-42*");
        // A width smaller than the value never truncates.
        assert_eq!(format_one("1}", &4711).unwrap(), "4711");
    }

    #[test]
    fn zero_padding_keeps_sign_and_prefix_in_front() {
        assert_eq!(format_one("06}", &42).unwrap(), "000042");
        assert_eq!(format_one("06}", &-42).unwrap(), "-00042");
        assert_eq!(format_one("+#010x}", &42).unwrap(), "+0x0000002a");
        assert_eq!(format_one("#06x}", &-42i32).unwrap(), "-0x02a");
    }

    #[test]
    fn integer_limits_format_without_overflow() {
        assert_eq!(format_one("}", &i64::MIN).unwrap(), "-9223372036854775808");
        assert_eq!(format_one("}", &u64::MAX).unwrap(), "18446744073709551615");
    }

    #[test]
    fn the_c_type_formats_the_code_point() {
        assert_eq!(format_one("c}", &97).unwrap(), "a");
        assert_eq!(format_one("c}", &-1).unwrap_err(), Error::OutOfRange);
        assert_eq!(format_one("c}", &0x110000).unwrap_err(), Error::OutOfRange);
    }

    #[test]
    fn unsigned_arguments_reject_a_sign_at_validation() {
        assert_eq!(format_one("+}", &42u32).unwrap_err(), Error::InvalidFormat);
        assert_eq!(format_one("}", &42u32).unwrap(), "42");
    }

    #[test]
    fn precision_on_integers_is_rejected() {
        assert_eq!(format_one(".3}", &42).unwrap_err(), Error::InvalidFormat);
    }

    #[test]
    fn bools_format_as_words_or_integers() {
        assert_eq!(format_one("}", &true).unwrap(), "true");
        assert_eq!(format_one("}", &false).unwrap(), "false");
        assert_eq!(format_one("s}", &true).unwrap(), "true");
        assert_eq!(format_one("d}", &true).unwrap(), "1");
        assert_eq!(format_one("x}", &false).unwrap(), "0");
        assert_eq!(format_one("7}", &true).unwrap(), "true   ");
    }

    #[test]
    fn chars_format_plain_escaped_or_numeric() {
        assert_eq!(format_one("}", &'y').unwrap(), "y");
        assert_eq!(format_one("c}", &'y').unwrap(), "y");
        assert_eq!(format_one("?}", &'\n').unwrap(), "'\\n'");
        assert_eq!(format_one("d}", &'a').unwrap(), "97");
        assert_eq!(format_one("^5}", &'y').unwrap(), "  y  ");
    }

    #[test]
    fn strings_format_with_padding_truncation_and_escaping() {
        assert_eq!(format_one("}", "hello").unwrap(), "hello");
        assert_eq!(format_one("8}", "hello").unwrap(), "hello   ");
        assert_eq!(format_one(">8}", "hello").unwrap(), "   hello");
        assert_eq!(format_one(".3}", "hello").unwrap(), "hel");
        assert_eq!(format_one(".9}", "hello").unwrap(), "hello");
        assert_eq!(format_one("?}", "a\nb").unwrap(), "\"a\\nb\"");
        assert_eq!(format_one("x}", "hello").unwrap_err(), Error::InvalidFormat);
    }

    #[test]
    fn references_format_like_their_referents() {
        let value = 42;
        assert_eq!(format_one("}", &&value).unwrap(), "42");
        let text = "hi";
        assert_eq!(format_one("}", &&text).unwrap(), "hi");
    }

    #[test]
    fn pointers_format_as_lowercase_hex_addresses() {
        let ptr = 0xdeadbeefusize as *const u32;
        assert_eq!(format_one("}", &ptr).unwrap(), "0xdeadbeef");
        assert_eq!(format_one("p}", &ptr).unwrap(), "0xdeadbeef");
        let null = core::ptr::null::<u8>();
        assert_eq!(format_one("}", &null).unwrap(), "0x0");
        assert_eq!(format_one("+}", &ptr).unwrap_err(), Error::InvalidFormat);
    }
}
