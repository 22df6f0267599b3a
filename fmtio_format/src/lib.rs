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

//! # fmtio_format
//!
//! The format/scan mini-language of the `fmtio` crates: replacement-field
//! parsing, per-type formatters and scanners, type-erased argument views and
//! the drivers tying them together.
//!
//! Replacement fields follow the `{[arg_id][:spec]}` grammar with
//! `[[fill]align][sign][#][0][width][.precision][type]` specs.  `{{` and
//! `}}` escape literal braces.  A format string either names all its
//! arguments positionally (`{0}`) or all automatically (`{}`).
//!
//! The ergonomic front-end lives in the `fmtio_format_macro` crate; the
//! functions here take a format string plus a slice of erased arguments:
//!
//! ```
//! use fmtio_format::{format_to, FormatArg};
//! use fmtio_stream::ArrayBuffer;
//!
//! let mut buf = ArrayBuffer::<32>::new();
//! format_to(
//!     &mut buf,
//!     "{}: {:#06x}",
//!     &[FormatArg::new(&"status"), FormatArg::new(&1066)],
//! )
//! .unwrap();
//! assert_eq!(buf.as_str(), Ok("status: 0x042a"));
//! ```
//!
//! Scanning mirrors formatting; literal text must match the input exactly:
//!
//! ```
//! use fmtio_format::{scan_from, ScanArg};
//! use fmtio_stream::Reader;
//!
//! let mut input = Reader::new("id=42/7");
//! let (mut id, mut rev) = (0u32, 0u32);
//! scan_from(
//!     &mut input,
//!     "id={}/{}",
//!     &mut [ScanArg::new(&mut id), ScanArg::new(&mut rev)],
//! )
//! .unwrap();
//! assert_eq!((id, rev), (42, 7));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(all(test, not(feature = "std")))]
extern crate std;

use fmtio_status::{Error, Result};
use fmtio_stream::{Buffer, CountingBuffer, Reader, TruncatingBuffer, Writer};

mod args;
mod dynamic;
mod float;
mod formatter;
mod parser;
mod scan;
mod specs;
mod validate;

pub use args::{FormatArg, ScanArg};
pub use dynamic::{FormatSpec, SpecWith, SpecWithFormatter};
pub use float::FloatFormatter;
pub use formatter::{
    BoolFormatter, CharFormatter, Format, Formatter, IntFormatter, PointerFormatter, RefFormatter,
    StrFormatter,
};
pub use scan::{CharScanner, IntScanner, Scan, Scanner};
pub use specs::{
    check_bool_specs, check_char_scan_specs, check_char_specs, check_floating_point_specs,
    check_int_scan_specs, check_integral_specs, check_pointer_specs, check_string_specs,
    check_unsigned_specs, parse_format_specs, parse_scan_specs, Alignment, FormatSpecs, ScanSpecs,
    Sign, MAX_FLOAT_PRECISION,
};
pub use validate::{validate_format_string, ArgKind};

use parser::{ArgCoverage, Parser};

/// Validates a format string against an argument pack.
///
/// Checks grammar, indexing discipline, per-argument spec compatibility and
/// that every argument is referenced at least once.
pub fn validate_format(format: &str, args: &[FormatArg<'_>]) -> Result<()> {
    let mut parser = Parser::new(format);
    let mut coverage = ArgCoverage::default();
    loop {
        let Some(arg) = parser.next_field(|_| Ok(()))? else {
            break;
        };
        let index = usize::from(arg);
        if index >= args.len() {
            return Err(Error::InvalidFormat);
        }
        coverage.mark(arg)?;
        args[index].validate(&mut parser.rdr)?;
    }
    if coverage.covers_first(args.len()) {
        Ok(())
    } else {
        Err(Error::InvalidFormat)
    }
}

/// Validates a scan string against a scan argument pack.
pub fn validate_scan(format: &str, args: &[ScanArg<'_>]) -> Result<()> {
    let mut parser = Parser::new(format);
    let mut coverage = ArgCoverage::default();
    loop {
        let Some(arg) = parser.next_field(|_| Ok(()))? else {
            break;
        };
        let index = usize::from(arg);
        if index >= args.len() {
            return Err(Error::InvalidFormat);
        }
        coverage.mark(arg)?;
        args[index].validate(&mut parser.rdr)?;
    }
    if coverage.covers_first(args.len()) {
        Ok(())
    } else {
        Err(Error::InvalidFormat)
    }
}

/// Formats `args` according to `format` into `buf`.
///
/// The format string is validated first; nothing is written when validation
/// fails.  Replacement fields are evaluated left to right; the first error
/// stops the call.
pub fn format_to(buf: &mut dyn Buffer, format: &str, args: &[FormatArg<'_>]) -> Result<()> {
    validate_format(format, args)?;
    let mut out = Writer::new(buf);
    let mut parser = Parser::new(format);
    loop {
        let field = parser.next_field(|lit| out.write_str(lit))?;
        let Some(arg) = field else {
            return Ok(());
        };
        args[usize::from(arg)].process(&mut out, &mut parser.rdr)?;
    }
}

/// Returns the length [`format_to`] would write into an unbounded sink.
pub fn formatted_size(format: &str, args: &[FormatArg<'_>]) -> Result<usize> {
    let mut buf = CountingBuffer::new();
    format_to(&mut buf, format, args)?;
    Ok(buf.count())
}

/// Formats into `buf`, truncating after `n` bytes.
///
/// Returns the untruncated output size.
pub fn format_to_n(
    buf: &mut dyn Buffer,
    n: usize,
    format: &str,
    args: &[FormatArg<'_>],
) -> Result<usize> {
    let mut truncated = TruncatingBuffer::new(buf, n);
    format_to(&mut truncated, format, args)?;
    truncated.flush()?;
    Ok(truncated.count())
}

/// Scans `input` according to `format`, assigning the matched values into
/// `args`.
///
/// Literal text in the format string must match the input (`InvalidData` on
/// a mismatch, `EndOfFile` when the input runs out); replacement fields
/// invoke the scanner of the paired out-parameter.
pub fn scan_from(input: &mut Reader<'_>, format: &str, args: &mut [ScanArg<'_>]) -> Result<()> {
    validate_scan(format, args)?;
    let mut parser = Parser::new(format);
    loop {
        let field = parser.next_field(|lit| input.read_if_match_str(lit).map(|_| ()))?;
        let Some(arg) = field else {
            return Ok(());
        };
        args[usize::from(arg)].process(input, &mut parser.rdr)?;
    }
}
