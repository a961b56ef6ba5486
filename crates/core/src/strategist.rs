//! Collateral/debt pair selection for eligible candidates.

use crate::position::{AssetPair, LiquidationCandidate};

/// Picks which reserves to liquidate against.
///
/// The default policy takes the first reserve with positive debt and the
/// first with a positive, collateral-enabled balance. Deliberately the
/// simplest correct choice: pure, independently testable, and replaceable by
/// a profit-maximizing policy without touching the scanner or executor.
pub struct Strategist {
    min_profit_pct: f64,
}

impl Strategist {
    pub fn new(min_profit_pct: f64) -> Self {
        Self { min_profit_pct }
    }

    /// Configured profit floor. The default policy does not act on it.
    pub fn min_profit_pct(&self) -> f64 {
        self.min_profit_pct
    }

    /// Select the pair to liquidate, or `None` when the candidate has no
    /// viable combination.
    pub fn select_pair(&self, candidate: &LiquidationCandidate) -> Option<AssetPair> {
        let debt = candidate.reserves.iter().find(|p| p.has_debt())?;
        let collateral = candidate.reserves.iter().find(|p| p.is_collateral())?;

        Some(AssetPair {
            collateral_reserve: collateral.reserve_id,
            collateral_symbol: collateral.symbol.clone(),
            debt_reserve: debt.reserve_id,
            debt_symbol: debt.symbol.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WAD;
    use crate::position::{HealthFactor, UserPosition};
    use alloy::primitives::{Address, U256};
    use smallvec::smallvec;

    fn position(
        reserve_byte: u8,
        supply: u64,
        debt: u64,
        collateral_enabled: bool,
    ) -> UserPosition {
        let supply = WAD * U256::from(supply);
        let debt = WAD * U256::from(debt);
        UserPosition {
            user: Address::ZERO,
            reserve_id: Address::repeat_byte(reserve_byte),
            symbol: format!("AST{reserve_byte}"),
            decimals: 18,
            scaled_supply_balance: supply,
            scaled_debt_balance: debt,
            supply_balance: supply,
            debt_balance: debt,
            usage_as_collateral_enabled: collateral_enabled,
            ltv: 7500,
            liquidation_threshold: 8000,
            liquidation_bonus: 10_500,
            price: WAD,
        }
    }

    fn candidate(reserves: Vec<UserPosition>) -> LiquidationCandidate {
        LiquidationCandidate {
            user: Address::repeat_byte(0xee),
            health_factor: HealthFactor::Finite(U256::from(1u8)),
            reserves: reserves.into_iter().collect(),
        }
    }

    #[test]
    fn picks_first_debt_and_first_enabled_collateral() {
        let strategist = Strategist::new(0.0);
        let candidate = candidate(vec![
            position(0x01, 50, 0, false), // collateral disabled, skipped
            position(0x02, 0, 40, false),
            position(0x03, 30, 0, true),
            position(0x04, 0, 10, false), // later debt, ignored
        ]);

        let pair = strategist.select_pair(&candidate).unwrap();
        assert_eq!(pair.debt_reserve, Address::repeat_byte(0x02));
        assert_eq!(pair.collateral_reserve, Address::repeat_byte(0x03));
    }

    #[test]
    fn same_reserve_can_cover_both_sides() {
        let strategist = Strategist::new(0.0);
        let candidate = candidate(vec![position(0x01, 50, 40, true)]);

        let pair = strategist.select_pair(&candidate).unwrap();
        assert_eq!(pair.debt_reserve, pair.collateral_reserve);
    }

    #[test]
    fn no_debt_yields_none() {
        let strategist = Strategist::new(0.0);
        let candidate = candidate(vec![position(0x01, 50, 0, true)]);
        assert!(strategist.select_pair(&candidate).is_none());
    }

    #[test]
    fn no_enabled_collateral_yields_none() {
        let strategist = Strategist::new(0.0);
        let candidate = candidate(vec![
            position(0x01, 50, 0, false),
            position(0x02, 0, 40, false),
        ]);
        assert!(strategist.select_pair(&candidate).is_none());
    }

    #[test]
    fn empty_candidate_yields_none() {
        let strategist = Strategist::new(0.0);
        let candidate = LiquidationCandidate {
            user: Address::ZERO,
            health_factor: HealthFactor::Finite(U256::from(1u8)),
            reserves: smallvec![],
        };
        assert!(strategist.select_pair(&candidate).is_none());
    }
}
