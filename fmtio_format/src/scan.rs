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
use fmtio_stream::Reader;

use crate::specs::{check_char_scan_specs, check_int_scan_specs, parse_scan_specs, ScanSpecs};

/// Scanning rules for values of type `T`.
///
/// The mirror image of the formatter contract: implementations parse the
/// spec substring of a replacement field and extract a value from the input
/// reader into an out-parameter.
pub trait Scanner<T>: Default {
    /// Checks the spec substring for validity without keeping state.
    fn validate(rdr: &mut Reader<'_>) -> Result<()>
    where
        Self: Sized,
    {
        Self::default().parse(rdr)
    }

    /// Parses the spec substring and stores the parsed state.
    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()>;

    /// Consumes characters from `input` and assigns the value into `out`.
    fn scan(&self, input: &mut Reader<'_>, out: &mut T) -> Result<()>;
}

/// Types that can be scanned through a replacement field.
pub trait Scan: Sized {
    /// The scanner implementation for this type.
    type Scanner: Scanner<Self>;
}

/// Scanner for the primitive integer types.
#[derive(Clone, Debug, Default)]
pub struct IntScanner {
    specs: ScanSpecs,
}

fn scan_base(specs: &ScanSpecs) -> u32 {
    match specs.ty {
        Some('b') => 2,
        Some('o') => 8,
        Some('x') => 16,
        _ => 10,
    }
}

// Consumes the base prefix for alternate-form scanning, either case.
fn read_base_prefix(input: &mut Reader<'_>, base: u32) -> Result<()> {
    let (lower, upper) = match base {
        2 => ("0b", "0B"),
        8 => ("0o", "0O"),
        _ => ("0x", "0X"),
    };
    if input.read_if_match_str(lower).is_ok() {
        return Ok(());
    }
    input.read_if_match_str(upper).map(|_| ())
}

macro_rules! int_scan_impl {
    (signed, $ty:ty) => {
        int_scan_impl!(@impl, $ty, |magnitude: $ty, negative: bool| {
            if negative {
                magnitude.checked_neg().ok_or(Error::OutOfRange)
            } else {
                Ok(magnitude)
            }
        });
    };
    (unsigned, $ty:ty) => {
        int_scan_impl!(@impl, $ty, |magnitude: $ty, negative: bool| {
            if negative {
                Err(Error::OutOfRange)
            } else {
                Ok(magnitude)
            }
        });
    };
    (@impl, $ty:ty, $apply_sign:expr) => {
        impl Scanner<$ty> for IntScanner {
            fn validate(rdr: &mut Reader<'_>) -> Result<()> {
                let mut specs = ScanSpecs::default();
                parse_scan_specs(rdr, &mut specs)?;
                check_int_scan_specs(&specs)
            }

            fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
                parse_scan_specs(rdr, &mut self.specs)
            }

            fn scan(&self, input: &mut Reader<'_>, out: &mut $ty) -> Result<()> {
                let base = scan_base(&self.specs);
                if !self.specs.alternate_form {
                    *out = input.parse_int(base)?;
                    return Ok(());
                }
                // Sign, then prefix, then the digits.
                let negative = match input.peek()? {
                    '-' => {
                        input.pop(1);
                        true
                    }
                    '+' => {
                        input.pop(1);
                        false
                    }
                    _ => false,
                };
                read_base_prefix(input, base)?;
                let magnitude: $ty = input.parse_int(base)?;
                let apply_sign = $apply_sign;
                *out = apply_sign(magnitude, negative)?;
                Ok(())
            }
        }

        impl Scan for $ty {
            type Scanner = IntScanner;
        }
    };
}

int_scan_impl!(signed, i8);
int_scan_impl!(signed, i16);
int_scan_impl!(signed, i32);
int_scan_impl!(signed, i64);
int_scan_impl!(signed, isize);
int_scan_impl!(unsigned, u8);
int_scan_impl!(unsigned, u16);
int_scan_impl!(unsigned, u32);
int_scan_impl!(unsigned, u64);
int_scan_impl!(unsigned, usize);

/// Scanner for `char`.
#[derive(Clone, Debug, Default)]
pub struct CharScanner {
    specs: ScanSpecs,
}

impl Scanner<char> for CharScanner {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        let mut specs = ScanSpecs::default();
        parse_scan_specs(rdr, &mut specs)?;
        check_char_scan_specs(&specs)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_scan_specs(rdr, &mut self.specs)
    }

    fn scan(&self, input: &mut Reader<'_>, out: &mut char) -> Result<()> {
        *out = input.read_char()?;
        Ok(())
    }
}

impl Scan for char {
    type Scanner = CharScanner;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one<T: Scan + Default>(spec: &str, input: &str) -> Result<(T, usize)> {
        let mut rdr = Reader::new(spec);
        <T::Scanner as Scanner<T>>::validate(&mut rdr)?;

        let mut rdr = Reader::new(spec);
        let mut scanner = T::Scanner::default();
        scanner.parse(&mut rdr)?;

        let mut input = Reader::new(input);
        let mut out = T::default();
        scanner.scan(&mut input, &mut out)?;
        Ok((out, input.pos()))
    }

    #[test]
    fn integers_scan_in_the_requested_base() {
        assert_eq!(scan_one::<i32>("}", "42"), Ok((42, 2)));
        assert_eq!(scan_one::<i32>("d}", "-42"), Ok((-42, 3)));
        assert_eq!(scan_one::<u32>("b}", "101"), Ok((5, 3)));
        assert_eq!(scan_one::<u32>("o}", "17"), Ok((15, 2)));
        assert_eq!(scan_one::<u32>("x}", "2a"), Ok((42, 2)));
    }

    #[test]
    fn alternate_form_requires_the_base_prefix() {
        assert_eq!(scan_one::<u32>("#x}", "0x2a"), Ok((42, 4)));
        assert_eq!(scan_one::<u32>("#x}", "0X2A"), Ok((42, 4)));
        assert_eq!(scan_one::<i32>("#b}", "-0b101"), Ok((-5, 6)));
        assert_eq!(scan_one::<u32>("#o}", "0o17"), Ok((15, 4)));
        assert_eq!(
            scan_one::<u32>("#x}", "2a").unwrap_err(),
            Error::InvalidData
        );
    }

    #[test]
    fn scan_range_errors_match_parse_int() {
        assert_eq!(scan_one::<i8>("}", "-128"), Ok((-128, 4)));
        assert_eq!(scan_one::<i8>("}", "128").unwrap_err(), Error::OutOfRange);
        assert_eq!(scan_one::<u8>("}", "-1").unwrap_err(), Error::OutOfRange);
        assert_eq!(scan_one::<i32>("}", "").unwrap_err(), Error::EndOfFile);
        assert_eq!(scan_one::<i32>("}", "x").unwrap_err(), Error::InvalidData);
    }

    #[test]
    fn chars_scan_one_code_unit() {
        assert_eq!(scan_one::<char>("}", "ab"), Ok(('a', 1)));
        assert_eq!(scan_one::<char>("c}", "b"), Ok(('b', 1)));
        assert_eq!(scan_one::<char>("}", "").unwrap_err(), Error::EndOfFile);
    }

    #[test]
    fn invalid_scan_specs_are_rejected() {
        assert_eq!(
            scan_one::<i32>("#d}", "1").unwrap_err(),
            Error::InvalidFormat
        );
        assert_eq!(
            scan_one::<i32>("s}", "1").unwrap_err(),
            Error::InvalidFormat
        );
        assert_eq!(
            scan_one::<char>("#c}", "a").unwrap_err(),
            Error::InvalidFormat
        );
    }
}
