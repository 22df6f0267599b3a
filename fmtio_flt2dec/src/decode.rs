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

/// A decoded finite, nonzero binary64 value.
///
/// The value equals `mant * 2^exp`.  `minus` and `plus` are the distances to
/// the neighboring representable values, in half-ulp units at `exp`: every
/// number between `(mant - minus) * 2^exp` and `(mant + plus) * 2^exp` maps
/// back to this value, bounds included iff `inclusive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Finite {
    /// Scaled significand.
    pub mant: u64,
    /// Distance to the previous representable value.
    pub minus: u64,
    /// Distance to the next representable value.
    pub plus: u64,
    /// Binary exponent.
    pub exp: i16,
    /// True if the rounding boundaries are themselves included.
    pub inclusive: bool,
}

/// Classification of a decoded binary64 bit pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Positive or negative zero.
    Zero,
    /// A finite, nonzero value.
    Finite(Finite),
    /// Positive or negative infinity.
    Infinity,
    /// Not a number.
    Nan,
}

const FRACTION_MASK: u64 = 0xf_ffff_ffff_ffff;
const IMPLICIT_BIT: u64 = 0x10_0000_0000_0000;
// Biased exponent of the non-number patterns, after bias and shift removal.
const NON_NUMBER_EXP: i16 = 972;
// Exponent of the subnormal range, after bias and shift removal.
const SUBNORMAL_EXP: i16 = -1075;

/// Decodes the bit pattern of a binary64 value.
///
/// Returns the sign and the classified payload.  No floating-point
/// arithmetic is involved.
pub fn decode(value: f64) -> (bool, Decoded) {
    let bits = value.to_bits();
    let negative = bits >> 63 != 0;
    if bits & !(1 << 63) == 0 {
        return (negative, Decoded::Zero);
    }

    // Remove the exponent bias and the fraction width.
    let exp = (((bits >> 52) & 0x7ff) as i16) - (1023 + 52);
    let fraction = bits & FRACTION_MASK;
    let mut mant = if exp == SUBNORMAL_EXP {
        fraction << 1
    } else {
        fraction
    };
    let inclusive = mant & 1 == 0;

    if exp == NON_NUMBER_EXP {
        return (
            negative,
            if mant == 0 {
                Decoded::Infinity
            } else {
                Decoded::Nan
            },
        );
    }

    let mut exp = exp;
    let mut plus = 1;
    if exp != SUBNORMAL_EXP {
        mant |= IMPLICIT_BIT;
        if mant == IMPLICIT_BIT {
            // At a power of two the gap below is half the gap above; one
            // extra scaling bit keeps both half-ulp distances integral.
            plus = 2;
            mant <<= 2;
            exp -= 2;
        } else {
            mant <<= 1;
            exp -= 1;
        }
    }

    (
        negative,
        Decoded::Finite(Finite {
            mant,
            minus: 1,
            plus,
            exp,
            inclusive,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finite(value: f64) -> Finite {
        match decode(value) {
            (_, Decoded::Finite(f)) => f,
            other => panic!("expected finite decoding, got {other:?}"),
        }
    }

    #[test]
    fn nan_patterns_decode_as_nan() {
        assert_eq!(decode(f64::NAN).1, Decoded::Nan);
        let signaling = f64::from_bits(0x7ff0_0000_0000_0001);
        assert_eq!(decode(signaling).1, Decoded::Nan);
    }

    #[test]
    fn infinities_keep_their_sign() {
        assert_eq!(decode(f64::INFINITY), (false, Decoded::Infinity));
        assert_eq!(decode(f64::NEG_INFINITY), (true, Decoded::Infinity));
    }

    #[test]
    fn zeros_keep_their_sign() {
        assert_eq!(decode(0.0), (false, Decoded::Zero));
        assert_eq!(decode(-0.0), (true, Decoded::Zero));
    }

    #[test]
    fn the_smallest_subnormal_decodes_without_normalization() {
        let f = finite(f64::from_bits(1));
        assert_eq!(f.exp, -1075);
        assert_eq!(f.mant, 2);
        assert_eq!(f.minus, 1);
        assert_eq!(f.plus, 1);
        assert!(f.inclusive);
    }

    #[test]
    fn the_smallest_normal_has_an_asymmetric_upper_boundary() {
        let f = finite(f64::MIN_POSITIVE);
        assert_eq!(f.exp, -1076);
        assert_eq!(f.mant, 0x40_0000_0000_0000);
        assert_eq!(f.minus, 1);
        assert_eq!(f.plus, 2);
        assert!(f.inclusive);
    }

    #[test]
    fn the_largest_normal_decodes_exclusively() {
        let f = finite(f64::MAX);
        assert_eq!(f.exp, 970);
        assert_eq!(f.mant, 0x3f_ffff_ffff_fffe);
        assert_eq!(f.minus, 1);
        assert_eq!(f.plus, 1);
        assert!(!f.inclusive);
    }

    #[test]
    fn powers_of_two_get_the_asymmetric_boundaries() {
        // 1.0 = 2^54 * 2^-54 after the two-bit scaling shift; the gap to
        // 0.999... is half the gap to 1.000...1.
        let f = finite(1.0);
        assert_eq!(f.mant, 1 << 54);
        assert_eq!(f.exp, -54);
        assert_eq!(f.minus, 1);
        assert_eq!(f.plus, 2);
        assert!(f.inclusive);
    }

    #[test]
    fn values_off_a_power_of_two_scale_by_one_bit() {
        let f = finite(1.5);
        assert_eq!(f.mant, 3 << 52);
        assert_eq!(f.exp, -53);
        assert_eq!(f.minus, 1);
        assert_eq!(f.plus, 1);
        assert!(f.inclusive);
    }
}
