//! Solvency aggregation: the liquidation health factor and its projections.

use alloy::primitives::{uint, U256};

use crate::math::{self, MathError, Scale, RAY};
use crate::position::{HealthFactor, HealthFactorResult, UserPosition};

/// Ray 1.0. A position with a finite health factor below this and nonzero
/// debt is eligible for liquidation.
pub const HEALTH_FACTOR_LIQUIDATION_THRESHOLD: U256 = RAY;

const BPS: U256 = uint!(10_000_U256);
const HALF_BPS: U256 = uint!(5_000_U256);

/// Aggregate a user's positions into a health factor.
///
/// Collateral-enabled positions contribute `balance * price`, risk-weighted
/// by their liquidation threshold; every position with debt contributes
/// `debt * price`. Zero total debt short-circuits to the infinite sentinel
/// before any division.
pub fn compute_health_factor(positions: &[UserPosition]) -> Result<HealthFactorResult, MathError> {
    let mut total_collateral = U256::ZERO;
    let mut weighted_collateral = U256::ZERO;
    let mut total_debt = U256::ZERO;

    for position in positions {
        if position.is_collateral() {
            let value =
                math::value_in_reference(position.supply_balance, position.price, position.decimals)?;
            total_collateral = total_collateral
                .checked_add(value)
                .ok_or(MathError::Overflow)?;

            let adjusted = value
                .checked_mul(U256::from(position.liquidation_threshold))
                .ok_or(MathError::Overflow)?
                .checked_add(HALF_BPS)
                .ok_or(MathError::Overflow)?
                / BPS;
            weighted_collateral = weighted_collateral
                .checked_add(adjusted)
                .ok_or(MathError::Overflow)?;
        }

        if position.has_debt() {
            let value =
                math::value_in_reference(position.debt_balance, position.price, position.decimals)?;
            total_debt = total_debt.checked_add(value).ok_or(MathError::Overflow)?;
        }
    }

    if total_debt.is_zero() {
        return Ok(HealthFactorResult {
            health_factor: HealthFactor::Infinite,
            total_collateral,
            total_debt,
        });
    }

    let hf = math::div(weighted_collateral, total_debt, Scale::Ray)?;
    Ok(HealthFactorResult {
        health_factor: HealthFactor::Finite(hf),
        total_collateral,
        total_debt,
    })
}

/// Projected health factor after supplying `supply_amount` (Wad, reference
/// currency) of an asset with `new_asset_liquidation_threshold`, holding debt
/// unchanged.
///
/// The weighted-average threshold over the grown collateral reduces to
/// `(collateral * current_lt + supply * new_lt) / debt`, computed with a
/// single half-up rounding. Pure projection; mutates nothing.
pub fn health_factor_after_supply(
    current_collateral: U256,
    supply_amount: U256,
    current_liquidation_threshold: u16,
    new_asset_liquidation_threshold: u16,
    current_debt: U256,
) -> Result<HealthFactor, MathError> {
    if current_debt.is_zero() {
        return Ok(HealthFactor::Infinite);
    }

    let weighted = current_collateral
        .checked_mul(U256::from(current_liquidation_threshold))
        .ok_or(MathError::Overflow)?
        .checked_add(
            supply_amount
                .checked_mul(U256::from(new_asset_liquidation_threshold))
                .ok_or(MathError::Overflow)?,
        )
        .ok_or(MathError::Overflow)?;
    let denominator = current_debt.checked_mul(BPS).ok_or(MathError::Overflow)?;

    let hf = math::div(weighted, denominator, Scale::Ray)?;
    Ok(HealthFactor::Finite(hf))
}

/// Liquidation eligibility: finite health factor below the threshold and
/// positive debt.
pub fn is_liquidation_candidate(result: &HealthFactorResult, threshold_ray: U256) -> bool {
    result.health_factor.is_below(threshold_ray) && !result.total_debt.is_zero()
}
