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

use fmtio_format::{format_to, formatted_size, format_to_n, FormatArg, FormatSpec};
use fmtio_format_macro::{format_to, format_to_n, formatted_size};
use fmtio_status::Error;
use fmtio_stream::{ArrayBuffer, SpanBuffer};

fn render(format: &str, args: &[FormatArg<'_>]) -> Result<String, Error> {
    let mut buf = ArrayBuffer::<4096>::new();
    format_to(&mut buf, format, args)?;
    Ok(String::from(buf.as_str().unwrap()))
}

#[test]
fn mixed_arguments_format_in_source_order() {
    let text = render(
        "{} {:.2f} {}{}",
        &[
            FormatArg::new(&42),
            FormatArg::new(&42.24),
            FormatArg::new(&"x,"),
            FormatArg::new(&'y'),
        ],
    )
    .unwrap();
    assert_eq!(text, "42 42.24 x,y");
}

#[test]
fn zero_padded_hex_keeps_sign_and_prefix_outside_the_fill() {
    assert_eq!(render("{:+#010x}", &[FormatArg::new(&42)]).unwrap(), "+0x0000002a");
}

#[test]
fn center_alignment_pads_both_sides() {
    assert_eq!(render("{:*^5}", &[FormatArg::new(&-42)]).unwrap(), "*-42*");
}

#[test]
fn scientific_rendering_matches_the_reference_output() {
    // The 7th significant digit of pi is 6, so the kept tail rounds up.
    let pi = core::f64::consts::PI;
    assert_eq!(render("{:e}", &[FormatArg::new(&pi)]).unwrap(), "3.141593e+00");
}

#[test]
fn the_shortest_rendering_switches_notation_near_ten_to_the_minus_four() {
    assert_eq!(render("{}", &[FormatArg::new(&1e-5)]).unwrap(), "1e-05");
    assert_eq!(render("{}", &[FormatArg::new(&1e-4)]).unwrap(), "0.0001");
}

#[test]
fn debug_strings_are_quoted_and_escaped() {
    assert_eq!(
        render("{:?}", &[FormatArg::new(&"\n\t\"")]).unwrap(),
        "\"\\n\\t\\\"\""
    );
}

#[test]
fn escaped_braces_render_literally() {
    assert_eq!(render("{{}}", &[]).unwrap(), "{}");
    assert_eq!(render("{{{}}}", &[FormatArg::new(&1)]).unwrap(), "{1}");
}

#[test]
fn unbalanced_braces_are_invalid() {
    assert_eq!(render("{", &[]).unwrap_err(), Error::InvalidFormat);
    assert_eq!(render("}", &[]).unwrap_err(), Error::InvalidFormat);
    assert_eq!(
        render("{}", &[]).unwrap_err(),
        Error::InvalidFormat
    );
}

#[test]
fn positional_arguments_may_repeat_but_must_cover_all() {
    assert_eq!(
        render("{1} {0} {1}", &[FormatArg::new(&1), FormatArg::new(&2)]).unwrap(),
        "2 1 2"
    );
    assert_eq!(
        render("{0}", &[FormatArg::new(&1), FormatArg::new(&2)]).unwrap_err(),
        Error::InvalidFormat
    );
    assert_eq!(
        render("{0} {}", &[FormatArg::new(&1), FormatArg::new(&2)]).unwrap_err(),
        Error::InvalidFormat
    );
}

#[test]
fn a_failed_validation_writes_nothing() {
    let mut storage = [0u8; 16];
    let mut buf = SpanBuffer::new(&mut storage);
    assert_eq!(
        format_to(&mut buf, "a{:q}", &[FormatArg::new(&1)]),
        Err(Error::InvalidFormat)
    );
    assert_eq!(buf.view(), b"");
}

#[test]
fn zero_flag_with_explicit_alignment_is_invalid() {
    assert_eq!(
        render("{:<05}", &[FormatArg::new(&1)]).unwrap_err(),
        Error::InvalidFormat
    );
}

#[test]
fn width_pads_but_never_truncates() {
    assert_eq!(render("{:8}", &[FormatArg::new(&1234)]).unwrap(), "    1234");
    assert_eq!(render("{:2}", &[FormatArg::new(&1234)]).unwrap(), "1234");
}

#[test]
fn formatted_size_equals_the_written_length() {
    let cases: &[(&str, &[FormatArg<'_>])] = &[
        ("{} {:.2f} {}{}", &[
            FormatArg::new(&42),
            FormatArg::new(&42.24),
            FormatArg::new(&"x,"),
            FormatArg::new(&'y'),
        ]),
        ("{:+#010x}", &[FormatArg::new(&42)]),
        ("{:*^17}", &[FormatArg::new(&"m")]),
        ("{:e}", &[FormatArg::new(&6.02214076e23)]),
        ("no fields at all", &[]),
    ];
    for (format, args) in cases {
        let text = render(format, args).unwrap();
        assert_eq!(
            formatted_size(format, args).unwrap(),
            text.len(),
            "format: {format}"
        );
    }
}

#[test]
fn format_to_n_truncates_but_reports_the_full_size() {
    let mut storage = [0u8; 32];
    let mut buf = SpanBuffer::new(&mut storage);
    let total = format_to_n(&mut buf, 6, "{} {}", &[FormatArg::new(&12345), FormatArg::new(&6789)])
        .unwrap();
    assert_eq!(total, 10);
    assert_eq!(buf.as_str(), Ok("12345 "));
}

#[test]
fn a_buffer_too_small_for_the_output_reports_end_of_file() {
    let mut storage = [0u8; 4];
    let mut buf = SpanBuffer::new(&mut storage);
    assert_eq!(
        format_to(&mut buf, "{}", &[FormatArg::new(&123456)]),
        Err(Error::EndOfFile)
    );
}

#[test]
fn dynamic_specs_override_width_and_precision_at_call_time() {
    let spec = FormatSpec {
        width: 8,
        precision: 2,
    };
    let value = 3.14159;
    assert_eq!(
        render("{:f}", &[FormatArg::new(&spec.with(&value))]).unwrap(),
        "    3.14"
    );

    let unset = FormatSpec::default();
    assert_eq!(
        render("{:.3f}", &[FormatArg::new(&unset.with(&value))]).unwrap(),
        "3.142"
    );
}

#[test]
fn the_format_to_macro_checks_and_expands() {
    let mut buf = ArrayBuffer::<64>::new();
    format_to!(buf, "{} {:.2f} {}{}", 42, 42.24, "x,", 'y').unwrap();
    assert_eq!(buf.as_str(), Ok("42 42.24 x,y"));

    let mut buf = ArrayBuffer::<64>::new();
    format_to!(buf, "{:*^5}", -42).unwrap();
    assert_eq!(buf.as_str(), Ok("*-42*"));

    let mut buf = ArrayBuffer::<64>::new();
    let name = "x";
    format_to!(buf, "{1}={0}", 17, name).unwrap();
    assert_eq!(buf.as_str(), Ok("x=17"));
}

#[test]
fn the_size_and_truncation_macros_expand() {
    assert_eq!(formatted_size!("{:+#010x}", 42).unwrap(), 11);

    let mut buf = ArrayBuffer::<64>::new();
    let total = format_to_n!(buf, 3, "{}", 98765).unwrap();
    assert_eq!(total, 5);
    assert_eq!(buf.as_str(), Ok("987"));
}

#[test]
fn kind_mismatches_surface_from_the_runtime_validation_pass() {
    let mut buf = ArrayBuffer::<64>::new();
    assert_eq!(
        format_to!(buf, "{:x}", "not a number").unwrap_err(),
        Error::InvalidFormat
    );
}
