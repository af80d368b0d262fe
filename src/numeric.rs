//! Big-integer arithmetic helpers for literal-math folding (spec.md §4.D).
//!
//! Grounded on `tsz-common::numeric`'s safe-integer collapsing, extended
//! with Python's floor-division/modulo sign convention ("sign follows the
//! divisor") per spec.md §9's Open Question on division semantics, resolved
//! in favor of that convention rather than the host language's native
//! truncating remainder.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::limits::SAFE_INTEGER_BOUND;
use crate::types::literal::IntLiteral;

/// Floor division: `a.div_euclid`-like, but with the divisor's sign
/// controlling rounding direction rather than Euclidean (always
/// non-negative remainder) semantics. Returns `None` for division by zero.
#[must_use]
pub fn floor_div(a: &BigInt, b: &BigInt) -> Option<BigInt> {
    if b.is_zero() {
        return None;
    }
    let (q, r) = (a / b, a % b);
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Modulo with the result's sign always following the divisor's sign, the
/// same convention `floor_div` implements (spec.md §9).
#[must_use]
pub fn floor_mod(a: &BigInt, b: &BigInt) -> Option<BigInt> {
    if b.is_zero() {
        return None;
    }
    let r = a % b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        Some(r + b)
    } else {
        Some(r)
    }
}

/// Collapse a big integer back to [`IntLiteral::Small`] if it fits within
/// [`SAFE_INTEGER_BOUND`], otherwise keep it as [`IntLiteral::Big`]
/// (spec.md §4.D step 5).
#[must_use]
pub fn collapse(value: BigInt) -> IntLiteral {
    let bound = BigInt::from(SAFE_INTEGER_BOUND);
    if value <= bound && value >= -bound {
        IntLiteral::from_bigint(value)
    } else {
        IntLiteral::Big(value)
    }
}
