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

//! # fmtio_status
//!
//! Error codes shared by the `fmtio` formatting and scanning crates.  Every
//! fallible operation in the workspace returns [`Result`] with exactly one of
//! the five [`Error`] kinds, keeping error propagation a plain `?` everywhere.
//!
//! # Example
//!
//! ```
//! use fmtio_status::{Error, Result};
//!
//! fn first_digit(s: &str) -> Result<u8> {
//!     match s.bytes().next() {
//!         None => Err(Error::EndOfFile),
//!         Some(b @ b'0'..=b'9') => Ok(b - b'0'),
//!         Some(_) => Err(Error::InvalidData),
//!     }
//! }
//!
//! assert_eq!(first_digit("42"), Ok(4));
//! assert_eq!(first_digit(""), Err(Error::EndOfFile));
//! assert_eq!(first_digit("x"), Err(Error::InvalidData));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

/// Error type used by all fallible `fmtio` operations.
///
/// The set is closed on purpose: callers can exhaustively match and every
/// layer of the stack maps its failures onto these five kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A sink ran out of space or a source ran out of input.
    EndOfFile,
    /// A programmer error, e.g. a numeric base outside 2..=36.
    InvalidArgument,
    /// Input data that does not match what was expected (scan mismatch).
    InvalidData,
    /// A parsed number does not fit into the requested type.
    OutOfRange,
    /// A malformed format string or a spec not applicable to the argument.
    InvalidFormat,
}

impl Error {
    /// Returns a short static description of the error.
    pub const fn as_str(self) -> &'static str {
        match self {
            Error::EndOfFile => "end of file",
            Error::InvalidArgument => "invalid argument",
            Error::InvalidData => "invalid data",
            Error::OutOfRange => "out of range",
            Error::InvalidFormat => "invalid format",
        }
    }
}

/// Result alias used by all fallible `fmtio` operations.
pub type Result<T> = core::result::Result<T, Error>;
