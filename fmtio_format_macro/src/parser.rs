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

//! The expansion-time format string checker.
//!
//! Parses the `{[arg_id][:spec]}` grammar with `nom` and reports the
//! type-independent constraint violations that can be decided without
//! seeing the argument types.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{anychar, digit1, one_of},
    combinator::{map, opt, verify},
    multi::many0,
    sequence::preceded,
    IResult,
};

/// Which replacement-field grammar to check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// The full format-spec grammar.
    Format,
    /// The minimal `[#][type]` scan-spec grammar.
    Scan,
}

// Type characters accepted by at least one argument kind; anything else is
// a typo no argument type could accept.
const FORMAT_TYPES: &str = "bBcdoxXsfFeEgGp?";
const SCAN_TYPES: &str = "bdoxc";

#[derive(Debug, PartialEq, Eq)]
enum Fragment {
    Literal,
    Field { arg: Option<usize>, spec: RawSpec },
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RawSpec {
    has_align: bool,
    has_sign: bool,
    alternate_form: bool,
    zero_flag: bool,
    width: Option<String>,
    precision: Option<String>,
    ty: Option<char>,
}

fn escape_fragment(input: &str) -> IResult<&str, Fragment> {
    map(alt((tag("{{"), tag("}}"))), |_| Fragment::Literal)(input)
}

fn literal_fragment(input: &str) -> IResult<&str, Fragment> {
    map(take_till1(|c| c == '{' || c == '}'), |_| Fragment::Literal)(input)
}

// A fill character plus an alignment, for cases including an alignment
// character used as the fill itself.
fn fill_and_alignment(input: &str) -> IResult<&str, char> {
    let (input, _) = verify(anychar, |c| *c != '{' && *c != '}')(input)?;
    one_of("<^>")(input)
}

fn alignment(input: &str) -> IResult<&str, bool> {
    if let Ok((input, _)) = fill_and_alignment(input) {
        return Ok((input, true));
    }
    if let Ok((input, _)) = one_of::<_, _, nom::error::Error<&str>>("<^>")(input) {
        return Ok((input, true));
    }
    Ok((input, false))
}

fn format_spec(input: &str) -> IResult<&str, RawSpec> {
    let (input, has_align) = alignment(input)?;
    let (input, sign) = opt(one_of("+- "))(input)?;
    let (input, alternate) = opt(tag("#"))(input)?;
    let (input, zero) = opt(tag("0"))(input)?;
    let (input, width) = opt(digit1)(input)?;
    let (input, precision) = opt(preceded(tag("."), digit1))(input)?;
    let (input, ty) = opt(verify(anychar, |c| c.is_ascii_alphabetic() || *c == '?'))(input)?;

    Ok((
        input,
        RawSpec {
            has_align,
            has_sign: sign.is_some(),
            alternate_form: alternate.is_some(),
            zero_flag: zero.is_some(),
            width: width.map(str::to_owned),
            precision: precision.map(str::to_owned),
            ty,
        },
    ))
}

fn scan_spec(input: &str) -> IResult<&str, RawSpec> {
    let (input, alternate) = opt(tag("#"))(input)?;
    let (input, ty) = opt(verify(anychar, |c| c.is_ascii_alphabetic()))(input)?;
    Ok((
        input,
        RawSpec {
            alternate_form: alternate.is_some(),
            ty,
            ..RawSpec::default()
        },
    ))
}

fn arg_id(input: &str) -> IResult<&str, usize> {
    let (input, digits) = digit1(input)?;
    match digits.parse::<usize>() {
        Ok(value) if value <= 255 => Ok((input, value)),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TooLarge,
        ))),
    }
}

fn field_fragment(mode: Mode) -> impl Fn(&str) -> IResult<&str, Fragment> {
    move |input| {
        let (input, _) = tag("{")(input)?;
        let (input, arg) = opt(arg_id)(input)?;
        let (input, spec) = opt(preceded(
            tag(":"),
            match mode {
                Mode::Format => format_spec,
                Mode::Scan => scan_spec,
            },
        ))(input)?;
        let (input, _) = tag("}")(input)?;
        Ok((
            input,
            Fragment::Field {
                arg,
                spec: spec.unwrap_or_default(),
            },
        ))
    }
}

fn format_string(input: &str, mode: Mode) -> IResult<&str, Vec<Fragment>> {
    many0(alt((escape_fragment, field_fragment(mode), literal_fragment)))(input)
}

fn check_spec(spec: &RawSpec, mode: Mode) -> Result<(), String> {
    match mode {
        Mode::Format => {
            if spec.zero_flag && spec.has_align {
                return Err("the zero flag conflicts with an explicit alignment".to_owned());
            }
            if (spec.zero_flag || spec.has_align) && spec.width.is_none() {
                return Err("an alignment or zero flag requires a width".to_owned());
            }
            if let Some(width) = &spec.width {
                if width.parse::<i32>().is_err() {
                    return Err(format!("width {width} does not fit an i32"));
                }
            }
            if let Some(precision) = &spec.precision {
                if precision.parse::<i32>().is_err() {
                    return Err(format!("precision {precision} does not fit an i32"));
                }
            }
            if let Some(ty) = spec.ty {
                if !FORMAT_TYPES.contains(ty) {
                    return Err(format!("unknown presentation type '{ty}'"));
                }
            }
        }
        Mode::Scan => {
            if let Some(ty) = spec.ty {
                if !SCAN_TYPES.contains(ty) {
                    return Err(format!("unknown scan type '{ty}'"));
                }
            }
        }
    }
    Ok(())
}

/// Checks `format` against `arg_count` arguments.  Returns a diagnostic
/// message for the first violation found.
pub(crate) fn check_format_string(
    format: &str,
    arg_count: usize,
    mode: Mode,
) -> Result<(), String> {
    if arg_count > 128 {
        return Err("at most 128 arguments are supported".to_owned());
    }

    let (rest, fragments) = format_string(format, mode)
        .map_err(|e| format!("failed to parse format string: {e}"))?;
    if !rest.is_empty() {
        return Err(format!("invalid format string fragment: \"{rest}\""));
    }

    let mut seen: u128 = 0;
    let mut positional: Option<bool> = None;
    let mut next_auto_arg = 0usize;

    for fragment in &fragments {
        let Fragment::Field { arg, spec } = fragment else {
            continue;
        };
        let index = match arg {
            Some(index) => {
                if positional == Some(false) {
                    return Err(
                        "cannot mix positional and automatic argument indexing".to_owned()
                    );
                }
                positional = Some(true);
                *index
            }
            None => {
                if positional == Some(true) {
                    return Err(
                        "cannot mix positional and automatic argument indexing".to_owned()
                    );
                }
                positional = Some(false);
                let index = next_auto_arg;
                next_auto_arg += 1;
                index
            }
        };
        if index >= arg_count {
            return Err(format!(
                "the format string references argument {index} but only {arg_count} are given"
            ));
        }
        seen |= 1 << index;
        check_spec(spec, mode)?;
    }

    let want = if arg_count == 128 {
        u128::MAX
    } else {
        (1u128 << arg_count) - 1
    };
    if seen & want != want {
        return Err("every argument must be referenced by the format string".to_owned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(format: &str, arg_count: usize) -> Result<(), String> {
        check_format_string(format, arg_count, Mode::Format)
    }

    #[test]
    fn valid_format_strings_pass() {
        assert!(check("plain text", 0).is_ok());
        assert!(check("{} {}", 2).is_ok());
        assert!(check("{1} {0}", 2).is_ok());
        assert!(check("{{}} {}", 1).is_ok());
        assert!(check("{:*^5} {:+#010x} {:.3f} {:?}", 4).is_ok());
        assert!(check("{:<<3}", 1).is_ok());
    }

    #[test]
    fn grammar_violations_are_reported() {
        assert!(check("{", 0).is_err());
        assert!(check("}", 0).is_err());
        assert!(check("{foo}", 1).is_err());
        assert!(check("{:q}", 1).is_err());
        assert!(check("{:<05}", 1).is_err());
        assert!(check("{:<}", 1).is_err());
        assert!(check("{:2147483648}", 1).is_err());
        assert!(check("{:.2147483648}", 1).is_err());
    }

    #[test]
    fn indexing_discipline_is_enforced() {
        assert!(check("{0} {}", 2).is_err());
        assert!(check("{} {1}", 2).is_err());
        assert!(check("{2}", 2).is_err());
        assert!(check("{0}", 2).is_err());
        assert!(check("{} {}", 1).is_err());
        assert!(check("{256}", 1).is_err());
    }

    #[test]
    fn scan_strings_use_the_minimal_grammar() {
        let check_scan = |format, count| check_format_string(format, count, Mode::Scan);
        assert!(check_scan("{} {:x} {:#b}", 3).is_ok());
        assert!(check_scan("{:c}", 1).is_ok());
        assert!(check_scan("{:*^5}", 1).is_err());
        assert!(check_scan("{:f}", 1).is_err());
    }
}
