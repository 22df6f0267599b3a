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

// replacement_field ::= "{" [arg_id] [":" format_spec] "}"
// arg_id            ::= digit+                    (0..=255)
// format_spec       ::= [[fill]align][sign]["#"]["0"][width]["." precision][type]
// fill              ::= <any character other than '{' or '}'>
// align             ::= "<" | ">" | "^"
// sign              ::= "+" | "-" | " "
// width             ::= digit+                    (<= i32 max)
// precision         ::= digit+                    (<= i32 max)
// type              ::= letter | "?"
//
// scan_spec         ::= ["#"][type]

use fmtio_status::{Error, Result};
use fmtio_stream::Reader;

/// Largest precision accepted for floating-point formatting.
pub const MAX_FLOAT_PRECISION: i32 = 1100;

/// Field alignment of a format spec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// No alignment given; the argument kind picks its default.
    #[default]
    None,
    /// Left alignment (`<`).
    Left,
    /// Center alignment (`^`).
    Center,
    /// Right alignment (`>`).
    Right,
}

/// Sign handling of a format spec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sign {
    /// No sign given; behaves like [`Sign::Minus`].
    #[default]
    None,
    /// `+`: a sign for both negative and nonnegative numbers.
    Plus,
    /// `-`: a sign for negative numbers only.
    Minus,
    /// ` `: a leading space for nonnegative numbers.
    Space,
}

/// The parsed form of a replacement field's format spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpecs {
    /// Fill character used for padding.
    pub fill: char,
    /// Field alignment.
    pub align: Alignment,
    /// Sign handling.
    pub sign: Sign,
    /// `#`: alternate form (base prefixes, forced decimal point).
    pub alternate_form: bool,
    /// `0`: sign-aware zero padding.
    pub zero_flag: bool,
    /// Minimum field width; 0 means unset.
    pub width: i32,
    /// Precision, or `None` if unset.
    pub precision: Option<i32>,
    /// Presentation type character, or `None` if unset.
    pub ty: Option<char>,
}

impl Default for FormatSpecs {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: Alignment::None,
            sign: Sign::None,
            alternate_form: false,
            zero_flag: false,
            width: 0,
            precision: None,
            ty: None,
        }
    }
}

/// The parsed form of a replacement field's scan spec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSpecs {
    /// `#`: require the base prefix in the input.
    pub alternate_form: bool,
    /// Conversion type character, or `None` if unset.
    pub ty: Option<char>,
}

fn alignment_of(c: char) -> Alignment {
    match c {
        '<' => Alignment::Left,
        '^' => Alignment::Center,
        _ => Alignment::Right,
    }
}

/// Parses a format spec from `rdr` into `specs`, consuming the terminating
/// `}`.
///
/// The parse is one pass with one character of lookahead (for the fill/align
/// ambiguity).  Constraint violations of the grammar itself are reported
/// here; argument-kind constraints are checked separately by the `check_*`
/// functions.
pub fn parse_format_specs(rdr: &mut Reader<'_>, specs: &mut FormatSpecs) -> Result<()> {
    let mut c = rdr.read_char()?;
    if c == '}' {
        return Ok(());
    }
    if c == '{' {
        return Err(Error::InvalidFormat);
    }

    let mut width_required = false;
    // A fill character is only a fill if an alignment follows it.
    let c2 = rdr.peek()?;
    if matches!(c2, '<' | '^' | '>') {
        specs.align = alignment_of(c2);
        specs.fill = c;
        width_required = true;
        rdr.pop(1);
        c = rdr.read_char()?;
    } else if matches!(c, '<' | '^' | '>') {
        specs.align = alignment_of(c);
        width_required = true;
        c = rdr.read_char()?;
    }
    if matches!(c, '+' | '-' | ' ') {
        specs.sign = match c {
            '+' => Sign::Plus,
            '-' => Sign::Minus,
            _ => Sign::Space,
        };
        c = rdr.read_char()?;
    }
    if c == '#' {
        specs.alternate_form = true;
        c = rdr.read_char()?;
    }
    if c == '0' {
        // An explicit alignment and the zero flag are mutually exclusive.
        if width_required {
            return Err(Error::InvalidFormat);
        }
        specs.fill = '0';
        specs.align = Alignment::Right;
        specs.zero_flag = true;
        width_required = true;
        c = rdr.read_char()?;
    }
    if c.is_ascii_digit() {
        rdr.unpop(1);
        specs.width = rdr.parse_int(10)?;
        c = rdr.read_char()?;
    } else if width_required {
        return Err(Error::InvalidFormat);
    }
    if c == '.' {
        specs.precision = Some(rdr.parse_int(10)?);
        c = rdr.read_char()?;
    }
    if c.is_ascii_alphabetic() || c == '?' {
        specs.ty = Some(c);
        c = rdr.read_char()?;
    }
    if c == '}' {
        Ok(())
    } else {
        Err(Error::InvalidFormat)
    }
}

/// Parses a scan spec from `rdr` into `specs`, consuming the terminating
/// `}`.
pub fn parse_scan_specs(rdr: &mut Reader<'_>, specs: &mut ScanSpecs) -> Result<()> {
    let mut c = rdr.read_char()?;
    if c == '}' {
        return Ok(());
    }
    if c == '#' {
        specs.alternate_form = true;
        c = rdr.read_char()?;
    }
    if c.is_ascii_alphabetic() {
        specs.ty = Some(c);
        c = rdr.read_char()?;
    }
    if c == '}' {
        Ok(())
    } else {
        Err(Error::InvalidFormat)
    }
}

/// Checks a spec against the rules for signed integer arguments.
pub fn check_integral_specs(specs: &FormatSpecs) -> Result<()> {
    if specs.precision.is_some() {
        return Err(Error::InvalidFormat);
    }
    match specs.ty {
        None | Some('b' | 'B' | 'c' | 'd' | 'o' | 'x' | 'X') => Ok(()),
        _ => Err(Error::InvalidFormat),
    }
}

/// Checks the additional rule for unsigned integer arguments.
pub fn check_unsigned_specs(specs: &FormatSpecs) -> Result<()> {
    if specs.sign == Sign::None {
        Ok(())
    } else {
        Err(Error::InvalidFormat)
    }
}

/// Checks a spec against the rules for boolean arguments.
pub fn check_bool_specs(specs: &FormatSpecs) -> Result<()> {
    if !matches!(specs.ty, None | Some('s')) {
        return check_integral_specs(specs);
    }
    if specs.precision.is_some() {
        return Err(Error::InvalidFormat);
    }
    Ok(())
}

/// Checks a spec against the rules for character arguments.
pub fn check_char_specs(specs: &FormatSpecs) -> Result<()> {
    if !matches!(specs.ty, None | Some('c' | '?')) {
        return check_integral_specs(specs);
    }
    if specs.alternate_form
        || specs.sign != Sign::None
        || specs.zero_flag
        || specs.precision.is_some()
    {
        return Err(Error::InvalidFormat);
    }
    Ok(())
}

/// Checks a spec against the rules for pointer arguments.
pub fn check_pointer_specs(specs: &FormatSpecs) -> Result<()> {
    if !matches!(specs.ty, None | Some('p')) {
        return Err(Error::InvalidFormat);
    }
    if specs.alternate_form
        || specs.sign != Sign::None
        || specs.zero_flag
        || specs.precision.is_some()
    {
        return Err(Error::InvalidFormat);
    }
    Ok(())
}

/// Checks a spec against the rules for floating-point arguments.
pub fn check_floating_point_specs(specs: &FormatSpecs) -> Result<()> {
    if !matches!(specs.ty, None | Some('f' | 'F' | 'e' | 'E' | 'g' | 'G')) {
        return Err(Error::InvalidFormat);
    }
    match specs.precision {
        Some(precision) if precision > MAX_FLOAT_PRECISION => Err(Error::InvalidFormat),
        _ => Ok(()),
    }
}

/// Checks a spec against the rules for string arguments.
pub fn check_string_specs(specs: &FormatSpecs) -> Result<()> {
    if specs.alternate_form || specs.sign != Sign::None || specs.zero_flag {
        return Err(Error::InvalidFormat);
    }
    match specs.ty {
        None | Some('s' | '?') => Ok(()),
        _ => Err(Error::InvalidFormat),
    }
}

/// Checks a scan spec against the rules for integer arguments.
pub fn check_int_scan_specs(specs: &ScanSpecs) -> Result<()> {
    match specs.ty {
        None | Some('d') => {
            // There is no base prefix in decimal.
            if specs.alternate_form {
                Err(Error::InvalidFormat)
            } else {
                Ok(())
            }
        }
        Some('b' | 'o' | 'x') => Ok(()),
        _ => Err(Error::InvalidFormat),
    }
}

/// Checks a scan spec against the rules for character arguments.
pub fn check_char_scan_specs(specs: &ScanSpecs) -> Result<()> {
    if specs.alternate_form {
        return Err(Error::InvalidFormat);
    }
    match specs.ty {
        None | Some('c') => Ok(()),
        _ => Err(Error::InvalidFormat),
    }
}
