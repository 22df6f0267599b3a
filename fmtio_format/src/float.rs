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
use fmtio_stream::{count_digits, Reader, Writer};

use crate::formatter::{write_padded, Format, Formatter};
use crate::specs::{check_floating_point_specs, parse_format_specs, Alignment, FormatSpecs, Sign};
use fmtio_flt2dec::{
    decode, format_exact, format_shortest, Decoded, Finite, FormatExactMode, MAX_SHORTEST_DIGITS,
};

// Scratch for exact-mode digits: at most `k + precision` digits plus the
// rounding slot (309 + 1100 + 1).
const EXACT_SCRATCH: usize = 1412;

const DEFAULT_PRECISION: i32 = 6;

// The decimal point stays in a fixed-notation window for the default
// (shortest) rendering when the scientific exponent lies in [-4, 16).
const FIXED_EXP_LOWER: i32 = -4;
const FIXED_EXP_UPPER: i32 = 16;

/// Formatter for `f64` and `f32`.
#[derive(Clone, Debug, Default)]
pub struct FloatFormatter {
    specs: FormatSpecs,
}

impl Formatter<f64> for FloatFormatter {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        let mut specs = FormatSpecs::default();
        parse_format_specs(rdr, &mut specs)?;
        check_floating_point_specs(&specs)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_format_specs(rdr, &mut self.specs)
    }

    fn format(&self, out: &mut Writer<'_>, value: &f64) -> Result<()> {
        write_float_arg(out, self.specs, *value)
    }

    fn set_width(&mut self, width: i32) {
        self.specs.width = width.max(0);
    }

    fn set_precision(&mut self, precision: i32) {
        self.specs.precision = Some(precision.max(0));
    }
}

impl Format for f64 {
    type Formatter = FloatFormatter;
}

impl Formatter<f32> for FloatFormatter {
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        <FloatFormatter as Formatter<f64>>::validate(rdr)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        parse_format_specs(rdr, &mut self.specs)
    }

    fn format(&self, out: &mut Writer<'_>, value: &f32) -> Result<()> {
        write_float_arg(out, self.specs, f64::from(*value))
    }

    fn set_width(&mut self, width: i32) {
        self.specs.width = width.max(0);
    }

    fn set_precision(&mut self, precision: i32) {
        self.specs.precision = Some(precision.max(0));
    }
}

impl Format for f32 {
    type Formatter = FloatFormatter;
}

// How the digit sequence is laid out in the output.
enum Notation {
    // digits split around a decimal point at position `k`.
    Fixed,
    // d.ddd with an explicit decimal exponent.
    Scientific,
}

struct Layout<'a> {
    digits: &'a [u8],
    // Decimal point position: value = 0.digits * 10^k.
    k: i32,
    notation: Notation,
    // Digits behind the decimal point.
    frac_digits: usize,
    show_point: bool,
}

impl Layout<'_> {
    // Digit at overall position `idx` (0 = first digit in front of the
    // point for fixed notation, first significant digit for scientific);
    // positions outside the generated digits read as zero.
    fn digit_at(&self, idx: i32) -> u8 {
        if idx >= 0 && (idx as usize) < self.digits.len() {
            self.digits[idx as usize]
        } else {
            b'0'
        }
    }

    fn scientific_exp(&self) -> i32 {
        self.k - 1
    }

    fn width(&self) -> usize {
        let point = usize::from(self.show_point);
        match self.notation {
            Notation::Fixed => {
                let int_digits = if self.k <= 0 { 1 } else { self.k as usize };
                int_digits + point + self.frac_digits
            }
            Notation::Scientific => {
                let exp = self.scientific_exp().unsigned_abs();
                let exp_digits = count_digits(u64::from(exp), 10).max(2);
                1 + point + self.frac_digits + 2 + exp_digits
            }
        }
    }

    fn write(&self, out: &mut Writer<'_>, upper: bool) -> Result<()> {
        match self.notation {
            Notation::Fixed => {
                if self.k <= 0 {
                    out.write_char('0')?;
                } else {
                    for idx in 0..self.k {
                        out.write_char(self.digit_at(idx) as char)?;
                    }
                }
                if self.show_point {
                    out.write_char('.')?;
                }
                for j in 0..self.frac_digits {
                    out.write_char(self.digit_at(self.k + j as i32) as char)?;
                }
            }
            Notation::Scientific => {
                out.write_char(self.digit_at(0) as char)?;
                if self.show_point {
                    out.write_char('.')?;
                }
                for j in 0..self.frac_digits {
                    out.write_char(self.digit_at(1 + j as i32) as char)?;
                }
                out.write_char(if upper { 'E' } else { 'e' })?;
                let exp = self.scientific_exp();
                out.write_char(if exp < 0 { '-' } else { '+' })?;
                let exp_abs = u64::from(exp.unsigned_abs());
                let exp_digits = count_digits(exp_abs, 10).max(2);
                let area = out.buffer().get_write_area_of(exp_digits)?;
                // The exponent has at least two digits; zero fill the front.
                area.fill(b'0');
                fmtio_stream::write_digits(exp_abs, 10, false, area);
            }
        }
        Ok(())
    }
}

// Validation caps the parsed precision; dynamic overrides are clamped here
// so the digit scratch is always large enough.
fn effective_precision(specs: &FormatSpecs) -> i32 {
    specs
        .precision
        .unwrap_or(DEFAULT_PRECISION)
        .min(crate::specs::MAX_FLOAT_PRECISION)
}

fn write_sign(out: &mut Writer<'_>, sign: Sign, negative: bool) -> Result<()> {
    if negative {
        out.write_char('-')
    } else if sign == Sign::Plus {
        out.write_char('+')
    } else if sign == Sign::Space {
        out.write_char(' ')
    } else {
        Ok(())
    }
}

fn sign_width(sign: Sign, negative: bool) -> usize {
    usize::from(negative || matches!(sign, Sign::Plus | Sign::Space))
}

fn write_nonfinite(
    out: &mut Writer<'_>,
    mut specs: FormatSpecs,
    negative: bool,
    text: &'static str,
) -> Result<()> {
    // Zero padding does not apply to text output.
    if specs.zero_flag {
        specs.zero_flag = false;
        specs.fill = ' ';
    }
    let sign = specs.sign;
    let total = text.len() + sign_width(sign, negative);
    write_padded(out, &mut specs, Alignment::Right, total, |out| {
        write_sign(out, sign, negative)?;
        out.write_str(text)
    })
}

pub(crate) fn write_float_arg(out: &mut Writer<'_>, specs: FormatSpecs, value: f64) -> Result<()> {
    let (negative, decoded) = decode(value);
    let upper = matches!(specs.ty, Some('F' | 'E' | 'G'));

    let finite = match decoded {
        Decoded::Nan => {
            return write_nonfinite(out, specs, negative, if upper { "NAN" } else { "nan" })
        }
        Decoded::Infinity => {
            return write_nonfinite(out, specs, negative, if upper { "INF" } else { "inf" })
        }
        // Zero renders through the common layout with no significant digits.
        Decoded::Zero => None,
        Decoded::Finite(finite) => Some(finite),
    };

    let mut shortest_digits = [0u8; MAX_SHORTEST_DIGITS];
    let mut exact_digits = [0u8; EXACT_SCRATCH];

    let layout = match specs.ty {
        None => {
            let (len, k) = render_shortest(&finite, &mut shortest_digits);
            let digits = &shortest_digits[..len];
            let exp = i32::from(k) - 1;
            if (FIXED_EXP_LOWER..FIXED_EXP_UPPER).contains(&exp) {
                let frac_digits = (len as i32 - i32::from(k)).max(0) as usize;
                Layout {
                    digits,
                    k: i32::from(k),
                    notation: Notation::Fixed,
                    frac_digits,
                    show_point: frac_digits > 0 || specs.alternate_form,
                }
            } else {
                let frac_digits = len.saturating_sub(1);
                Layout {
                    digits,
                    k: i32::from(k),
                    notation: Notation::Scientific,
                    frac_digits,
                    show_point: frac_digits > 0 || specs.alternate_form,
                }
            }
        }
        Some('f' | 'F') => {
            let precision = effective_precision(&specs);
            let (len, k) = render_exact(
                &finite,
                &mut exact_digits,
                FormatExactMode::DecimalPoint,
                precision as i16,
            );
            Layout {
                digits: &exact_digits[..len],
                k: i32::from(k),
                notation: Notation::Fixed,
                frac_digits: precision as usize,
                show_point: precision > 0 || specs.alternate_form,
            }
        }
        Some('e' | 'E') => {
            let precision = effective_precision(&specs);
            let (len, k) = render_exact(
                &finite,
                &mut exact_digits,
                FormatExactMode::SignificandDigits,
                precision as i16 + 1,
            );
            Layout {
                digits: &exact_digits[..len],
                k: i32::from(k),
                notation: Notation::Scientific,
                frac_digits: precision as usize,
                show_point: precision > 0 || specs.alternate_form,
            }
        }
        Some('g' | 'G') => {
            let precision = effective_precision(&specs).max(1);
            let (len, k) = render_exact(
                &finite,
                &mut exact_digits,
                FormatExactMode::SignificandDigits,
                precision as i16,
            );
            let digits = &exact_digits[..len];
            let exp = i32::from(k) - 1;
            if (FIXED_EXP_LOWER..precision).contains(&exp) {
                let frac_digits = (precision - i32::from(k)).max(0) as usize;
                let frac_digits = if specs.alternate_form {
                    frac_digits
                } else {
                    strip_fixed_trailing_zeros(digits, i32::from(k), frac_digits)
                };
                Layout {
                    digits,
                    k: i32::from(k),
                    notation: Notation::Fixed,
                    frac_digits,
                    show_point: frac_digits > 0 || specs.alternate_form,
                }
            } else {
                let frac_digits = if specs.alternate_form {
                    (precision - 1) as usize
                } else {
                    strip_scientific_trailing_zeros(digits)
                };
                Layout {
                    digits,
                    k: i32::from(k),
                    notation: Notation::Scientific,
                    frac_digits,
                    show_point: frac_digits > 0 || specs.alternate_form,
                }
            }
        }
        // Ruled out by validation.
        _ => return Err(Error::InvalidFormat),
    };

    let sign = specs.sign;
    let zero_flag = specs.zero_flag;
    let total = layout.width() + sign_width(sign, negative);

    let mut specs = specs;
    // With zero padding the sign sits in front of the fill.
    if zero_flag {
        write_sign(out, sign, negative)?;
    }
    write_padded(out, &mut specs, Alignment::Right, total, |out| {
        if !zero_flag {
            write_sign(out, sign, negative)?;
        }
        layout.write(out, upper)
    })
}

// Shortest digits; a zero value has no significant digits and `k = 1` so
// the fixed rendering produces a bare `0`.
fn render_shortest(finite: &Option<Finite>, buf: &mut [u8]) -> (usize, i16) {
    match finite {
        Some(finite) => format_shortest(finite, buf),
        None => (0, 1),
    }
}

fn render_exact(
    finite: &Option<Finite>,
    buf: &mut [u8],
    mode: FormatExactMode,
    number_of_digits: i16,
) -> (usize, i16) {
    match finite {
        Some(finite) => format_exact(finite, buf, mode, number_of_digits),
        None => (0, 1),
    }
}

// Number of fractional digits left when trailing zeros are dropped from a
// fixed-notation fraction.
fn strip_fixed_trailing_zeros(digits: &[u8], k: i32, frac_digits: usize) -> usize {
    match digits.iter().rposition(|d| *d != b'0') {
        Some(idx) => {
            let last_significant = idx as i32 + 1 - k;
            last_significant.clamp(0, frac_digits as i32) as usize
        }
        None => 0,
    }
}

// Same for the fractional part of d.ddde±xx.
fn strip_scientific_trailing_zeros(digits: &[u8]) -> usize {
    match digits.iter().rposition(|d| *d != b'0') {
        Some(idx) => idx,
        None => 0,
    }
}
