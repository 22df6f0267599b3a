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

//! # fmtio_flt2dec
//!
//! Correctly rounded binary64 to decimal conversion, built from three pieces:
//!
//! * [`Bignum`]: a stack-allocated base-2³² integer bounded by a fixed block
//!   count, sized for every transient value the renderer needs.
//! * [`decode`]: extraction of sign, significand, exponent and rounding
//!   boundaries from a binary64 bit pattern, without float arithmetic.
//! * [`format_shortest`] / [`format_exact`]: decimal digit generation in the
//!   Dragon4 family, producing either the shortest round-tripping sequence
//!   or an exact-length one with half-to-even rounding.
//!
//! Digits are written into caller-provided scratch space; nothing here
//! allocates.
//!
//! # Example
//!
//! ```
//! use fmtio_flt2dec::{decode, format_shortest, Decoded, MAX_SHORTEST_DIGITS};
//!
//! let (negative, decoded) = decode(0.3);
//! let Decoded::Finite(finite) = decoded else { unreachable!() };
//! let mut digits = [0u8; MAX_SHORTEST_DIGITS];
//! let (len, k) = format_shortest(&finite, &mut digits);
//! assert!(!negative);
//! assert_eq!(&digits[..len], b"3");
//! assert_eq!(k, 0); // 0.3 = 0.3e0
//! ```

#![no_std]
#![deny(missing_docs)]

#[cfg(test)]
extern crate std;

mod bignum;
mod decode;
mod dragon;

pub use bignum::{Bignum, MAX_BLOCKS};
pub use decode::{decode, Decoded, Finite};
pub use dragon::{format_exact, format_shortest, FormatExactMode, MAX_SHORTEST_DIGITS};
