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

//! Compile-time evaluable format string validation.
//!
//! This is the validation-only rendition of the driver, restricted to
//! argument *type identities* so it can run in `const` contexts.  It accepts
//! exactly the strings the runtime validation pass accepts for the core
//! argument kinds:
//!
//! ```
//! use fmtio_format::{validate_format_string, ArgKind};
//!
//! const OK: bool = validate_format_string("{:>6} = {:#x}", &[ArgKind::Str, ArgKind::SignedInt]);
//! const BAD: bool = validate_format_string("{:d}", &[ArgKind::Str]);
//! assert!(OK);
//! assert!(!BAD);
//! ```

/// The argument kind identities the const validator distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// Signed integers.
    SignedInt,
    /// Unsigned integers.
    UnsignedInt,
    /// `bool`.
    Bool,
    /// `char`.
    Char,
    /// `f32`/`f64`.
    Float,
    /// String slices.
    Str,
    /// Raw pointers.
    Pointer,
}

// The parsed pieces of a spec the kind checks need.
struct ConstSpecs {
    sign: bool,
    alternate_form: bool,
    zero_flag: bool,
    precision: i32,
    ty: u8,
}

const NO_PRECISION: i32 = -1;
const NO_TYPE: u8 = 0;
const MAX_FLOAT_PRECISION: i32 = crate::specs::MAX_FLOAT_PRECISION;

// Parses digits at `pos` into an i32.  Returns the value and the next
// position, or None on overflow or if no digit is present.
const fn parse_number(bytes: &[u8], mut pos: usize) -> Option<(i32, usize)> {
    if pos >= bytes.len() || !bytes[pos].is_ascii_digit() {
        return None;
    }
    let mut value: i32 = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        let digit = (bytes[pos] - b'0') as i32;
        value = match value.checked_mul(10) {
            Some(v) => v,
            None => return None,
        };
        value = match value.checked_add(digit) {
            Some(v) => v,
            None => return None,
        };
        pos += 1;
    }
    Some((value, pos))
}

const fn is_align(b: u8) -> bool {
    matches!(b, b'<' | b'^' | b'>')
}

// Parses one format spec starting behind the `:`; returns the position
// behind the closing `}` and the spec pieces, or None if malformed.
const fn parse_spec(bytes: &[u8], mut pos: usize) -> Option<(ConstSpecs, usize)> {
    let mut specs = ConstSpecs {
        sign: false,
        alternate_form: false,
        zero_flag: false,
        precision: NO_PRECISION,
        ty: NO_TYPE,
    };

    let mut width_required = false;
    // Fill and alignment with one byte of lookahead.
    if pos + 1 < bytes.len() && is_align(bytes[pos + 1]) && bytes[pos] != b'{' && bytes[pos] != b'}'
    {
        width_required = true;
        pos += 2;
    } else if pos < bytes.len() && is_align(bytes[pos]) {
        width_required = true;
        pos += 1;
    }
    if pos < bytes.len() && matches!(bytes[pos], b'+' | b'-' | b' ') {
        specs.sign = true;
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'#' {
        specs.alternate_form = true;
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'0' {
        if width_required {
            return None;
        }
        specs.zero_flag = true;
        width_required = true;
        pos += 1;
    }
    match parse_number(bytes, pos) {
        Some((_, next)) => pos = next,
        None => {
            if width_required && !(pos < bytes.len() && bytes[pos].is_ascii_digit()) {
                return None;
            }
            // A digit that failed to parse is an overflow.
            if pos < bytes.len() && bytes[pos].is_ascii_digit() {
                return None;
            }
        }
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        match parse_number(bytes, pos + 1) {
            Some((value, next)) => {
                specs.precision = value;
                pos = next;
            }
            None => return None,
        }
    }
    if pos < bytes.len() && (bytes[pos].is_ascii_alphabetic() || bytes[pos] == b'?') {
        specs.ty = bytes[pos];
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'}' {
        Some((specs, pos + 1))
    } else {
        None
    }
}

const fn check_integral(specs: &ConstSpecs) -> bool {
    specs.precision == NO_PRECISION
        && matches!(
            specs.ty,
            NO_TYPE | b'b' | b'B' | b'c' | b'd' | b'o' | b'x' | b'X'
        )
}

const fn check_kind(kind: ArgKind, specs: &ConstSpecs) -> bool {
    match kind {
        ArgKind::SignedInt => check_integral(specs),
        ArgKind::UnsignedInt => check_integral(specs) && !specs.sign,
        ArgKind::Bool => {
            if !matches!(specs.ty, NO_TYPE | b's') {
                check_integral(specs)
            } else {
                specs.precision == NO_PRECISION
            }
        }
        ArgKind::Char => {
            if !matches!(specs.ty, NO_TYPE | b'c' | b'?') {
                check_integral(specs)
            } else {
                !specs.alternate_form
                    && !specs.sign
                    && !specs.zero_flag
                    && specs.precision == NO_PRECISION
            }
        }
        ArgKind::Float => {
            matches!(
                specs.ty,
                NO_TYPE | b'f' | b'F' | b'e' | b'E' | b'g' | b'G'
            ) && specs.precision <= MAX_FLOAT_PRECISION
        }
        ArgKind::Str => {
            !specs.alternate_form
                && !specs.sign
                && !specs.zero_flag
                && matches!(specs.ty, NO_TYPE | b's' | b'?')
        }
        ArgKind::Pointer => {
            !specs.alternate_form
                && !specs.sign
                && !specs.zero_flag
                && specs.precision == NO_PRECISION
                && matches!(specs.ty, NO_TYPE | b'p')
        }
    }
}

/// Validates `format` against an argument list given as kind identities.
///
/// Checks the full replacement-field grammar, the positional-vs-automatic
/// indexing discipline, per-kind spec compatibility and that every argument
/// is referenced.  Usable in `const` contexts; a `const` assertion on the
/// result rejects a bad format string at compile time.
pub const fn validate_format_string(format: &str, kinds: &[ArgKind]) -> bool {
    let bytes = format.as_bytes();
    if kinds.len() > 128 {
        return false;
    }

    let mut pos = 0;
    let mut seen: u128 = 0;
    // 0 = undecided, 1 = automatic, 2 = positional.
    let mut index_mode = 0u8;
    let mut next_auto_arg: u32 = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        pos += 1;
        if b == b'}' {
            if pos < bytes.len() && bytes[pos] == b'}' {
                pos += 1;
                continue;
            }
            return false;
        }
        if b != b'{' {
            continue;
        }
        if pos < bytes.len() && bytes[pos] == b'{' {
            pos += 1;
            continue;
        }

        // A replacement field: arg-id, then `}` or `:spec}`.
        let arg: u32;
        match parse_number(bytes, pos) {
            Some((value, next)) => {
                if index_mode == 1 || value > 255 {
                    return false;
                }
                index_mode = 2;
                arg = value as u32;
                pos = next;
            }
            None => {
                if index_mode == 2 {
                    return false;
                }
                index_mode = 1;
                arg = next_auto_arg;
                next_auto_arg += 1;
            }
        }
        if arg as usize >= kinds.len() {
            return false;
        }
        seen |= 1 << arg;
        let kind = kinds[arg as usize];

        if pos >= bytes.len() {
            return false;
        }
        let specs = if bytes[pos] == b'}' {
            pos += 1;
            ConstSpecs {
                sign: false,
                alternate_form: false,
                zero_flag: false,
                precision: NO_PRECISION,
                ty: NO_TYPE,
            }
        } else if bytes[pos] == b':' {
            match parse_spec(bytes, pos + 1) {
                Some((specs, next)) => {
                    pos = next;
                    specs
                }
                None => return false,
            }
        } else {
            return false;
        };

        if !check_kind(kind, &specs) {
            return false;
        }
    }

    // Every argument must be referenced at least once.
    let want = if kinds.len() == 128 {
        u128::MAX
    } else {
        (1u128 << kinds.len()) - 1
    };
    seen & want == want
}
