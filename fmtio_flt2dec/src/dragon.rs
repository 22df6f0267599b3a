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

use core::cmp::Ordering;

use crate::bignum::Bignum;
use crate::decode::Finite;

/// Scratch space needed by [`format_shortest`].
///
/// A binary64 value needs at most 17 digits; one extra slot absorbs a
/// rounding cascade.
pub const MAX_SHORTEST_DIGITS: usize = 18;

// floor(2^32 * log10(2)); multiplying by it underestimates (or hits) the
// decimal scaling factor, but never by more than one.
const LOG10_2_FRACTION: i64 = 1_292_913_986;

/// Selects how [`format_exact`] counts the requested digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatExactMode {
    /// Produce exactly `number_of_digits` significant digits.
    SignificandDigits,
    /// Produce digits so that exactly `number_of_digits` of them sit behind
    /// the decimal point.
    DecimalPoint,
}

// Estimates `k` with `10^(k-1) < mant * 2^exp <= 10^(k+1)`.
fn estimate_scaling_factor(mant: u64, exp: i16) -> i16 {
    // 2^(nbits-1) < mant <= 2^nbits for mant > 0.
    let nbits = 64 - i64::from(mant.wrapping_sub(1).leading_zeros());
    (((nbits + i64::from(exp)) * LOG10_2_FRACTION) >> 32) as i16
}

// Increments the decimal digit string by one ulp.  Returns the digit to
// append when the increment lengthens the number (all-nines cascade or an
// empty buffer).
fn round_up(d: &mut [u8]) -> Option<u8> {
    match d.iter().rposition(|c| *c != b'9') {
        Some(i) => {
            // d[i+1..] is all nines.
            d[i] += 1;
            for c in &mut d[i + 1..] {
                *c = b'0';
            }
            None
        }
        None if !d.is_empty() => {
            // 999..999 rounds to 1000..000 with an increased exponent.
            d[0] = b'1';
            for c in &mut d[1..] {
                *c = b'0';
            }
            Some(b'0')
        }
        // An empty buffer rounds up (a bit strange but reasonable).
        None => Some(b'1'),
    }
}

struct Scaled {
    mant: Bignum,
    scale: Bignum,
    k: i16,
    // Multipliers applied to the boundary values, if any are tracked.
    m2: usize,
    m5: usize,
}

// Converts `mant * 2^exp` into the fraction `mant / scale` with
// `scale / 10 < estimate <= scale * 10`, where `estimate` also covers the
// upper boundary for the shortest mode.
fn scale_for(dec: &Finite, estimate_mant: u64) -> Scaled {
    let k = estimate_scaling_factor(estimate_mant, dec.exp);

    let mut mant = Bignum::from_u64(dec.mant);
    let mut scale = Bignum::from_u32(1);

    let mut s2 = 0usize;
    let mut s5 = 0usize;
    let mut m2 = 0usize;
    let mut m5 = 0usize;

    if dec.exp < 0 {
        s2 = (-dec.exp) as usize;
    } else {
        m2 += dec.exp as usize;
    }

    // Divide `mant` by `10^k`.
    if k >= 0 {
        s2 += k as usize;
        s5 += k as usize;
    } else {
        m2 += (-k) as usize;
        m5 += (-k) as usize;
    }

    scale.mul_pow5(s5);
    scale.mul_pow2(s2);

    mant.mul_pow5(m5);
    mant.mul_pow2(m2);

    Scaled {
        mant,
        scale,
        k,
        m2,
        m5,
    }
}

// Extracts the next decimal digit of `mant / scale` in constant time using
// the cached 2x/4x/8x multiples of `scale`.
fn next_digit(mant: &mut Bignum, scale: &Bignum, scale2: &Bignum, scale4: &Bignum, scale8: &Bignum) -> u8 {
    let mut d = 0;
    if *mant >= *scale8 {
        mant.sub(scale8);
        d += 8;
    }
    if *mant >= *scale4 {
        mant.sub(scale4);
        d += 4;
    }
    if *mant >= *scale2 {
        mant.sub(scale2);
        d += 2;
    }
    if *mant >= *scale {
        mant.sub(scale);
        d += 1;
    }
    debug_assert!(*mant < *scale);
    debug_assert!(d < 10);
    d
}

/// Renders the shortest decimal digit sequence that reads back as the input.
///
/// Writes the digits into `buf` (at least [`MAX_SHORTEST_DIGITS`] long) and
/// returns the digit count together with `k`, the exponent with
/// `value = 0.digits * 10^k`.
pub fn format_shortest(dec: &Finite, buf: &mut [u8]) -> (usize, i16) {
    // The value `v` to format is known to be:
    // - equal to `mant * 2^exp`;
    // - preceded by `(mant - 2 * minus) * 2^exp` in binary64; and
    // - followed by `(mant + 2 * plus) * 2^exp` in binary64.
    //
    // Any number between `low = (mant - minus) * 2^exp` and
    // `high = (mant + plus) * 2^exp` maps to `v`, bounds included when the
    // original significand was even.
    debug_assert!(dec.mant > 0);
    debug_assert!(dec.minus > 0);
    debug_assert!(dec.plus > 0);
    debug_assert!(buf.len() >= MAX_SHORTEST_DIGITS);

    // `rounding(a.cmp(&b))` is `a <= b` for inclusive bounds, `a < b` else.
    let rounding = |ordering: Ordering| {
        if dec.inclusive {
            ordering != Ordering::Greater
        } else {
            ordering == Ordering::Less
        }
    };

    let Scaled {
        mut mant,
        scale,
        mut k,
        m2,
        m5,
    } = scale_for(dec, dec.mant + dec.plus);

    let mut minus = Bignum::from_u64(dec.minus);
    let mut plus = Bignum::from_u64(dec.plus);
    minus.mul_pow5(m5);
    minus.mul_pow2(m2);
    plus.mul_pow5(m5);
    plus.mul_pow2(m2);

    // Fixup when `mant + plus > scale` (or `>=`).  Instead of scaling
    // `scale` by 10 the initial multiplication of `mant` is skipped.  After
    // this `scale < mant + plus <= scale * 10` and digit generation can
    // start.  `d[0]` can still be zero when `scale - plus < mant < scale`;
    // the round-up condition then triggers immediately.
    let mut mant_plus = mant;
    mant_plus.add(&plus);
    if rounding(scale.cmp(&mant_plus)) {
        k += 1;
    } else {
        mant.mul_small(10);
        minus.mul_small(10);
        plus.mul_small(10);
    }

    let mut scale2 = scale;
    scale2.mul_pow2(1);
    let mut scale4 = scale;
    scale4.mul_pow2(2);
    let mut scale8 = scale;
    scale8.mul_pow2(3);

    let mut down;
    let mut up;
    let mut i = 0;
    loop {
        buf[i] = b'0' + next_digit(&mut mant, &scale, &scale2, &scale4, &scale8);
        i += 1;

        // Stop and keep the digits when `mant < minus` (or `<=`); stop and
        // increment the last digit when `scale < mant + plus` (or `<=`);
        // generate more digits otherwise.
        down = rounding(mant.cmp(&minus));
        let mut mant_plus = mant;
        mant_plus.add(&plus);
        up = rounding(scale.cmp(&mant_plus));
        if down || up {
            break;
        }

        // `minus` and `plus` only grow while `mant` stays clipped modulo
        // `scale`, so this loop terminates.
        mant.mul_small(10);
        minus.mul_small(10);
        plus.mul_small(10);
    }

    // Round up when only the up condition triggered, or when both did and
    // the tie prefers up (`2 * mant >= scale`).
    if up && (!down || *mant.mul_pow2(1) >= scale) {
        if let Some(c) = round_up(&mut buf[..i]) {
            // Rounding up lengthened the number; the exponent moves too.
            buf[i] = c;
            i += 1;
            k += 1;
        }
    }
    (i, k)
}

/// Renders an exact-length decimal digit sequence with round-half-to-even.
///
/// In [`SignificandDigits`](FormatExactMode::SignificandDigits) mode exactly
/// `number_of_digits` digits are produced; in
/// [`DecimalPoint`](FormatExactMode::DecimalPoint) mode exactly
/// `number_of_digits` digits end up behind the decimal point.  `buf` must
/// hold one slot more than the digits requested by the mode.  Returns the
/// digit count and `k` as in [`format_shortest`]; the count can be zero when
/// the value rounds away entirely.
pub fn format_exact(
    dec: &Finite,
    buf: &mut [u8],
    mode: FormatExactMode,
    number_of_digits: i16,
) -> (usize, i16) {
    debug_assert!(dec.mant > 0);
    debug_assert!(dec.minus > 0);
    debug_assert!(dec.plus > 0);

    let Scaled {
        mut mant,
        mut scale,
        mut k,
        ..
    } = scale_for(dec, dec.mant);

    let mut len = 0usize;
    let mut extra_len = 0usize;
    match mode {
        FormatExactMode::SignificandDigits => {
            debug_assert!(number_of_digits >= 0);
            len = number_of_digits as usize;
        }
        FormatExactMode::DecimalPoint => {
            if k + number_of_digits >= 0 {
                len = (k + number_of_digits) as usize;
                extra_len = 1;
            }
        }
    }

    // Estimate fixup as in the shortest mode.  With a fixed digit count the
    // buffer length moves with the exponent correction.
    if mant >= scale {
        k += 1;
        len += extra_len;
    } else {
        mant.mul_small(10);
    }
    debug_assert!(buf.len() > len);

    if len > 0 {
        let mut scale2 = scale;
        scale2.mul_pow2(1);
        let mut scale4 = scale;
        scale4.mul_pow2(2);
        let mut scale8 = scale;
        scale8.mul_pow2(3);

        for i in 0..len {
            if mant.is_zero() {
                // All following digits are zeroes; no rounding can occur.
                for c in &mut buf[i..len] {
                    *c = b'0';
                }
                return (len, k);
            }
            buf[i] = b'0' + next_digit(&mut mant, &scale, &scale2, &scale4, &scale8);
            mant.mul_small(10);
        }
    }

    // We stopped in the middle of digits.  If the remainder is exactly
    // 5000... the prior digit decides: round to even.
    let order = mant.cmp(scale.mul_small(5));
    if order == Ordering::Greater
        || (order == Ordering::Equal && len > 0 && buf[len - 1] & 1 == 1)
    {
        if let Some(c) = round_up(&mut buf[..len]) {
            // Rounding up changed the length, so the exponent changes too.
            // With a fixed decimal-point position the additional digit only
            // materializes when it still sits in front of the point.
            k += 1;
            if i32::from(k) > -i32::from(number_of_digits) && len == 0 {
                buf[0] = c;
                len = 1;
            }
        }
    }
    (len, k)
}
