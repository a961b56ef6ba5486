//! Interest accrual and the borrow-rate curve, mirrored from the protocol's
//! reserve accounting.

use alloy::primitives::{uint, U256};

use crate::math::{self, MathError, Scale, RAY, WAD_RAY_RATIO};
use crate::position::ReserveSnapshot;

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Internal compounding scale: Ray widened by nine decimal digits (1e36).
/// Keeps the per-second rate from truncating before exponentiation.
const EXTRA: U256 = uint!(1_000_000_000_000_000_000_000_000_000_000_000_000_U256);
const HALF_EXTRA: U256 = uint!(500_000_000_000_000_000_000_000_000_000_000_000_U256);

/// Per-reserve rate curve parameters, all Ray-scaled. Set at listing time by
/// the protocol admin; read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRateStrategyParams {
    pub optimal_usage_ratio: U256,
    pub base_variable_borrow_rate: U256,
    pub variable_rate_slope1: U256,
    pub variable_rate_slope2: U256,
}

/// Linearly accrued interest factor over `[last_update_timestamp,
/// current_timestamp]`: `1 + rate * elapsed / SECONDS_PER_YEAR`, Ray.
pub fn linear_interest(
    rate_per_year: U256,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    let elapsed = current_timestamp.saturating_sub(last_update_timestamp);
    let elapsed_ray = U256::from(elapsed)
        .checked_mul(RAY)
        .ok_or(MathError::Overflow)?;
    let year_ray = U256::from(SECONDS_PER_YEAR)
        .checked_mul(RAY)
        .ok_or(MathError::Overflow)?;

    let growth = math::div(
        math::mul(rate_per_year, elapsed_ray, Scale::Ray)?,
        year_ray,
        Scale::Ray,
    )?;
    RAY.checked_add(growth).ok_or(MathError::Overflow)
}

/// Interest factor under discrete per-second compounding, Ray.
///
/// The annual rate is converted to a per-second rate at the widened internal
/// scale, then expanded through the same truncated series the protocol uses
/// on-chain: `1 + r*n + r^2*n(n-1)/2 + r^3*n(n-1)(n-2)/6` for `n` elapsed
/// seconds. Returns exactly one Ray when no time has elapsed.
pub fn compounded_interest(
    rate_per_year: U256,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    let elapsed = current_timestamp.saturating_sub(last_update_timestamp);
    if elapsed == 0 {
        return Ok(RAY);
    }

    let year = U256::from(SECONDS_PER_YEAR);
    let widened = rate_per_year
        .checked_mul(WAD_RAY_RATIO)
        .ok_or(MathError::Overflow)?;
    let rate_per_second = widened
        .checked_add(year / U256::from(2u8))
        .ok_or(MathError::Overflow)?
        / year;

    // Second and third powers of the per-second rate, half-up at EXTRA scale.
    // The square goes through plain integer pow before rescaling.
    let base_power_two = math::pow(rate_per_second, 2)?
        .checked_add(HALF_EXTRA)
        .ok_or(MathError::Overflow)?
        / EXTRA;
    let base_power_three = mul_extra(base_power_two, rate_per_second)?;

    let n = U256::from(elapsed);
    let n_minus_one = U256::from(elapsed - 1);
    let n_minus_two = U256::from(elapsed.saturating_sub(2));

    let first_term = n.checked_mul(rate_per_second).ok_or(MathError::Overflow)?;
    let second_term = n
        .checked_mul(n_minus_one)
        .ok_or(MathError::Overflow)?
        .checked_mul(base_power_two)
        .ok_or(MathError::Overflow)?
        / U256::from(2u8);
    let third_term = n
        .checked_mul(n_minus_one)
        .ok_or(MathError::Overflow)?
        .checked_mul(n_minus_two)
        .ok_or(MathError::Overflow)?
        .checked_mul(base_power_three)
        .ok_or(MathError::Overflow)?
        / U256::from(6u8);

    let factor = EXTRA
        .checked_add(first_term)
        .ok_or(MathError::Overflow)?
        .checked_add(second_term)
        .ok_or(MathError::Overflow)?
        .checked_add(third_term)
        .ok_or(MathError::Overflow)?;

    // Narrow EXTRA -> Ray, half up at the same 1e9 boundary as Ray -> Wad.
    let quotient = factor / WAD_RAY_RATIO;
    let remainder = factor % WAD_RAY_RATIO;
    if remainder >= WAD_RAY_RATIO / U256::from(2u8) {
        Ok(quotient + U256::from(1u8))
    } else {
        Ok(quotient)
    }
}

fn mul_extra(a: U256, b: U256) -> Result<U256, MathError> {
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    let rounded = product.checked_add(HALF_EXTRA).ok_or(MathError::Overflow)?;
    Ok(rounded / EXTRA)
}

/// Current annual variable borrow rate for a reserve, Ray.
///
/// Utilization is `debt / (debt + liquidity)`, zero when the reserve is
/// empty. Below the optimal usage ratio the rate climbs along slope1; at or
/// above it, along slope2 over the remaining headroom.
pub fn current_borrow_rate(
    params: &InterestRateStrategyParams,
    total_debt: U256,
    total_liquidity: U256,
) -> Result<U256, MathError> {
    let supply = total_debt
        .checked_add(total_liquidity)
        .ok_or(MathError::Overflow)?;
    let utilization = if supply.is_zero() {
        U256::ZERO
    } else {
        math::div(total_debt, supply, Scale::Ray)?
    };

    if utilization < params.optimal_usage_ratio {
        let slope = math::mul(
            math::div(utilization, params.optimal_usage_ratio, Scale::Ray)?,
            params.variable_rate_slope1,
            Scale::Ray,
        )?;
        params
            .base_variable_borrow_rate
            .checked_add(slope)
            .ok_or(MathError::Overflow)
    } else {
        let excess = utilization - params.optimal_usage_ratio;
        let headroom = RAY
            .checked_sub(params.optimal_usage_ratio)
            .ok_or(MathError::Overflow)?;
        let slope = math::mul(
            math::div(excess, headroom, Scale::Ray)?,
            params.variable_rate_slope2,
            Scale::Ray,
        )?;
        params
            .base_variable_borrow_rate
            .checked_add(params.variable_rate_slope1)
            .ok_or(MathError::Overflow)?
            .checked_add(slope)
            .ok_or(MathError::Overflow)
    }
}

/// Current supply accrual factor for a reserve: the stored liquidity index
/// carried forward linearly to `now`.
pub fn normalized_income(reserve: &ReserveSnapshot, now: u64) -> Result<U256, MathError> {
    if reserve.last_update_timestamp == now {
        return Ok(reserve.liquidity_index);
    }
    let factor = linear_interest(
        reserve.current_liquidity_rate,
        reserve.last_update_timestamp,
        now,
    )?;
    math::mul(factor, reserve.liquidity_index, Scale::Ray)
}

/// Current variable-debt accrual factor for a reserve: the stored borrow
/// index carried forward with per-second compounding to `now`.
pub fn normalized_debt(reserve: &ReserveSnapshot, now: u64) -> Result<U256, MathError> {
    if reserve.last_update_timestamp == now {
        return Ok(reserve.variable_borrow_index);
    }
    let factor = compounded_interest(
        reserve.current_variable_borrow_rate,
        reserve.last_update_timestamp,
        now,
    )?;
    math::mul(factor, reserve.variable_borrow_index, Scale::Ray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn pct(numerator: u64, denominator: u64) -> U256 {
        RAY * U256::from(numerator) / U256::from(denominator)
    }

    #[test]
    fn linear_interest_full_year_at_full_rate_doubles() {
        let factor = linear_interest(RAY, 0, SECONDS_PER_YEAR).unwrap();
        assert_eq!(factor, RAY * U256::from(2u8));
    }

    #[test]
    fn linear_interest_zero_elapsed_is_one() {
        assert_eq!(linear_interest(RAY, 1_700_000_000, 1_700_000_000).unwrap(), RAY);
    }

    #[test]
    fn compounded_interest_zero_elapsed_is_one() {
        for rate in [U256::ZERO, RAY, RAY * U256::from(5u8)] {
            assert_eq!(compounded_interest(rate, 1_700_000_000, 1_700_000_000).unwrap(), RAY);
        }
    }

    #[test]
    fn compounded_exceeds_linear_over_a_year() {
        let compounded = compounded_interest(RAY, 0, SECONDS_PER_YEAR).unwrap();
        let linear = linear_interest(RAY, 0, SECONDS_PER_YEAR).unwrap();
        assert!(compounded > linear);

        // 100%/year compounded per second lands at ~2.666666e27.
        let truncated = compounded / uint!(1_000_000_000_000_000_000_000_U256);
        assert_eq!(truncated, U256::from(2_666_666u64));
    }

    #[test]
    fn compounded_interest_short_interval_is_near_linear() {
        let one_hour = 3600;
        let compounded = compounded_interest(pct(5, 100), 0, one_hour).unwrap();
        let linear = linear_interest(pct(5, 100), 0, one_hour).unwrap();
        assert!(compounded >= linear);
        // Divergence over an hour at 5% stays under 1e-9 of a Ray.
        assert!(compounded - linear < uint!(1_000_000_000_000_000_000_U256));
    }

    fn test_params() -> InterestRateStrategyParams {
        InterestRateStrategyParams {
            optimal_usage_ratio: pct(80, 100),
            base_variable_borrow_rate: pct(1, 100),
            variable_rate_slope1: pct(4, 100),
            variable_rate_slope2: pct(60, 100),
        }
    }

    #[test]
    fn borrow_rate_empty_reserve_is_base() {
        let rate = current_borrow_rate(&test_params(), U256::ZERO, U256::ZERO).unwrap();
        assert_eq!(rate, pct(1, 100));
    }

    #[test]
    fn borrow_rate_below_optimal_climbs_slope1() {
        // utilization 0.4 of optimal 0.8 -> base + 0.5 * slope1
        let rate =
            current_borrow_rate(&test_params(), U256::from(40u8), U256::from(60u8)).unwrap();
        assert_eq!(rate, pct(3, 100));
    }

    #[test]
    fn borrow_rate_at_optimal_is_base_plus_slope1() {
        let rate =
            current_borrow_rate(&test_params(), U256::from(80u8), U256::from(20u8)).unwrap();
        assert_eq!(rate, pct(5, 100));
    }

    #[test]
    fn borrow_rate_above_optimal_climbs_slope2() {
        // utilization 0.9: excess 0.1 over headroom 0.2 -> base + slope1 + 0.5 * slope2
        let rate =
            current_borrow_rate(&test_params(), U256::from(90u8), U256::from(10u8)).unwrap();
        assert_eq!(rate, pct(35, 100));
    }

    fn reserve(rate: U256, index: U256, last_update: u64) -> ReserveSnapshot {
        ReserveSnapshot {
            reserve_id: Address::ZERO,
            symbol: "TST".into(),
            decimals: 18,
            current_liquidity_rate: rate,
            current_variable_borrow_rate: rate,
            liquidity_index: index,
            variable_borrow_index: index,
            last_update_timestamp: last_update,
        }
    }

    #[test]
    fn normalized_income_shortcuts_on_fresh_snapshot() {
        let snapshot = reserve(RAY, RAY * U256::from(3u8), 1_000);
        assert_eq!(normalized_income(&snapshot, 1_000).unwrap(), RAY * U256::from(3u8));
        assert_eq!(normalized_debt(&snapshot, 1_000).unwrap(), RAY * U256::from(3u8));
    }

    #[test]
    fn normalized_income_accrues_linearly() {
        let snapshot = reserve(RAY, RAY, 0);
        let income = normalized_income(&snapshot, SECONDS_PER_YEAR).unwrap();
        assert_eq!(income, RAY * U256::from(2u8));
    }
}
