//! Checked fixed-point arithmetic over the protocol's two scales.
//!
//! Every operation rounds half up and treats overflow as a hard error,
//! mirroring the on-chain accounting bit for bit. Nothing here wraps,
//! saturates, or goes through floating point.

use alloy::primitives::{uint, U256};
use thiserror::Error;

/// Wad unit: 1e18. Token amounts and reference-currency values.
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Ray unit: 1e27. Interest rates and accrual indices.
pub const RAY: U256 = uint!(1_000_000_000_000_000_000_000_000_000_U256);

/// Ratio between the two scales: 1e9.
pub const WAD_RAY_RATIO: U256 = uint!(1_000_000_000_U256);

const HALF_WAD: U256 = uint!(500_000_000_000_000_000_U256);
const HALF_RAY: U256 = uint!(500_000_000_000_000_000_000_000_000_U256);
const HALF_RATIO: U256 = uint!(500_000_000_U256);

/// Arithmetic failure. Fatal to the computation that hit it; callers decide
/// whether to propagate or isolate, never to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}

/// Fixed-point scale tag. Mixing scales requires an explicit [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Wad,
    Ray,
}

impl Scale {
    pub const fn one(self) -> U256 {
        match self {
            Scale::Wad => WAD,
            Scale::Ray => RAY,
        }
    }

    pub const fn half(self) -> U256 {
        match self {
            Scale::Wad => HALF_WAD,
            Scale::Ray => HALF_RAY,
        }
    }
}

/// `round_half_up(a * b / one)`. Multiplying by the scale's own unit is an
/// exact identity.
pub fn mul(a: U256, b: U256, scale: Scale) -> Result<U256, MathError> {
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    let rounded = product.checked_add(scale.half()).ok_or(MathError::Overflow)?;
    Ok(rounded / scale.one())
}

/// `round_half_up(a / b)` with the result in `scale`.
///
/// Callers that can legitimately see `b == 0` (health factor with zero debt)
/// must special-case it before calling, not catch the error.
pub fn div(a: U256, b: U256, scale: Scale) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let scaled = a.checked_mul(scale.one()).ok_or(MathError::Overflow)?;
    let rounded = scaled
        .checked_add(b / U256::from(2u8))
        .ok_or(MathError::Overflow)?;
    Ok(rounded / b)
}

/// Scale conversion. Widening (Wad -> Ray) is an exact multiply and the only
/// direction that can overflow; narrowing (Ray -> Wad) rounds half up at the
/// 1e9 boundary and never fails.
pub fn convert(value: U256, from: Scale, to: Scale) -> Result<U256, MathError> {
    match (from, to) {
        (Scale::Wad, Scale::Ray) => value.checked_mul(WAD_RAY_RATIO).ok_or(MathError::Overflow),
        (Scale::Ray, Scale::Wad) => {
            let quotient = value / WAD_RAY_RATIO;
            let remainder = value % WAD_RAY_RATIO;
            if remainder >= HALF_RATIO {
                Ok(quotient + U256::from(1u8))
            } else {
                Ok(quotient)
            }
        }
        _ => Ok(value),
    }
}

/// Plain-integer exponentiation by squaring. `pow(x, 0) == 1`, including
/// `pow(0, 0) == 1`.
pub fn pow(base: U256, exp: u64) -> Result<U256, MathError> {
    let mut acc = U256::from(1u8);
    let mut base = base;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.checked_mul(base).ok_or(MathError::Overflow)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base.checked_mul(base).ok_or(MathError::Overflow)?;
        }
    }
    Ok(acc)
}

#[inline]
pub fn wad_mul(a: U256, b: U256) -> Result<U256, MathError> {
    mul(a, b, Scale::Wad)
}

#[inline]
pub fn wad_div(a: U256, b: U256) -> Result<U256, MathError> {
    div(a, b, Scale::Wad)
}

#[inline]
pub fn ray_mul(a: U256, b: U256) -> Result<U256, MathError> {
    mul(a, b, Scale::Ray)
}

#[inline]
pub fn ray_div(a: U256, b: U256) -> Result<U256, MathError> {
    div(a, b, Scale::Ray)
}

/// Value of `amount` token units (`decimals` fractional digits) at `price`
/// (Wad reference currency per whole token), as a Wad value. Rounds half up
/// at the token-unit boundary.
pub fn value_in_reference(amount: U256, price: U256, decimals: u8) -> Result<U256, MathError> {
    if amount.is_zero() || price.is_zero() {
        return Ok(U256::ZERO);
    }
    let unit = pow(U256::from(10u8), decimals as u64)?;
    let product = amount.checked_mul(price).ok_or(MathError::Overflow)?;
    let rounded = product
        .checked_add(unit / U256::from(2u8))
        .ok_or(MathError::Overflow)?;
    Ok(rounded / unit)
}

/// Display-only conversion. Never feed the result back into accounting math.
pub fn to_f64(value: U256, scale: Scale) -> f64 {
    let limbs = value.as_limbs();
    let mut x = 0f64;
    for limb in limbs.iter().rev() {
        x = x * (u64::MAX as f64 + 1.0) + *limb as f64;
    }
    match scale {
        Scale::Wad => x / 1e18,
        Scale::Ray => x / 1e27,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_by_unit_is_identity() {
        for scale in [Scale::Wad, Scale::Ray] {
            for value in [U256::ZERO, U256::from(1u8), U256::from(123_456_789u64)] {
                assert_eq!(mul(value, scale.one(), scale).unwrap(), value);
            }
        }
    }

    #[test]
    fn div_by_unit_is_identity() {
        for scale in [Scale::Wad, Scale::Ray] {
            for value in [U256::ZERO, U256::from(7u8), U256::from(987_654_321u64)] {
                assert_eq!(div(value, scale.one(), scale).unwrap(), value);
            }
        }
    }

    #[test]
    fn mul_integral_inputs_are_exact() {
        let ten = WAD * U256::from(10u8);
        let three = WAD * U256::from(3u8);
        assert_eq!(mul(ten, three, Scale::Wad).unwrap(), WAD * U256::from(30u8));
    }

    #[test]
    fn mul_rounds_half_up() {
        let half = WAD / U256::from(2u8);
        // 0.5 * 3 = 1.5 -> 2
        assert_eq!(mul(half, U256::from(3u8), Scale::Wad).unwrap(), U256::from(2u8));
        // 0.5 * 5 = 2.5 -> 3
        assert_eq!(mul(half, U256::from(5u8), Scale::Wad).unwrap(), U256::from(3u8));
    }

    #[test]
    fn div_by_zero_fails() {
        assert_eq!(
            div(U256::from(1u8), U256::ZERO, Scale::Wad),
            Err(MathError::DivisionByZero)
        );
    }

    #[test]
    fn div_zero_numerator_is_zero() {
        assert_eq!(
            div(U256::ZERO, U256::from(42u8), Scale::Ray).unwrap(),
            U256::ZERO
        );
    }

    #[test]
    fn mul_overflow_is_detected() {
        assert_eq!(
            mul(U256::MAX, U256::from(2u8), Scale::Wad),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn div_overflow_is_detected() {
        assert_eq!(
            div(U256::MAX, U256::from(3u8), Scale::Wad),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn convert_unit_round_trips() {
        assert_eq!(convert(RAY, Scale::Ray, Scale::Wad).unwrap(), WAD);
        assert_eq!(convert(WAD, Scale::Wad, Scale::Ray).unwrap(), RAY);
        assert_eq!(convert(WAD, Scale::Wad, Scale::Wad).unwrap(), WAD);
    }

    #[test]
    fn convert_narrowing_rounds_half_up() {
        let just_above_half = U256::from(1_500_000_000u64);
        assert_eq!(
            convert(just_above_half, Scale::Ray, Scale::Wad).unwrap(),
            U256::from(2u8)
        );
        let just_below_half = U256::from(1_499_999_999u64);
        assert_eq!(
            convert(just_below_half, Scale::Ray, Scale::Wad).unwrap(),
            U256::from(1u8)
        );
    }

    #[test]
    fn convert_widening_overflow_is_detected() {
        assert_eq!(
            convert(U256::MAX, Scale::Wad, Scale::Ray),
            Err(MathError::Overflow)
        );
        // Narrowing the same value succeeds.
        assert!(convert(U256::MAX, Scale::Ray, Scale::Wad).is_ok());
    }

    #[test]
    fn pow_zero_exponent_is_one() {
        assert_eq!(pow(U256::ZERO, 0).unwrap(), U256::from(1u8));
        assert_eq!(pow(U256::from(7u8), 0).unwrap(), U256::from(1u8));
    }

    #[test]
    fn pow_basics() {
        assert_eq!(pow(U256::from(2u8), 10).unwrap(), U256::from(1024u64));
        assert_eq!(pow(U256::from(10u8), 27).unwrap(), RAY);
    }

    #[test]
    fn pow_overflow_is_detected() {
        assert_eq!(pow(U256::from(2u8), 256), Err(MathError::Overflow));
    }

    #[test]
    fn value_in_reference_scales_by_decimals() {
        // 1000 tokens with 6 decimals at price 1.0 -> 1000 Wad
        let amount = U256::from(1_000_000_000u64);
        let value = value_in_reference(amount, WAD, 6).unwrap();
        assert_eq!(value, WAD * U256::from(1000u64));

        // 1.5 tokens with 18 decimals at price 2000 -> 3000 Wad
        let amount = U256::from(1_500_000_000_000_000_000u128);
        let price = WAD * U256::from(2000u64);
        let value = value_in_reference(amount, price, 18).unwrap();
        assert_eq!(value, WAD * U256::from(3000u64));
    }

    #[test]
    fn to_f64_is_close() {
        let value = WAD * U256::from(1000u64);
        assert!((to_f64(value, Scale::Wad) - 1000.0).abs() < 1e-6);
        assert!((to_f64(RAY, Scale::Ray) - 1.0).abs() < 1e-9);
    }
}
