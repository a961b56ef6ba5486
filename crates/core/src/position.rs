//! Value objects for reserves, user positions, and liquidation candidates.
//!
//! Everything here is an immutable snapshot of external state: produced by a
//! ledger fetch, read within one cycle, then discarded. No shared mutable
//! state, no back-references.

use std::fmt;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::math::{self, Scale};

/// One reserve's accrual state at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub reserve_id: Address,
    pub symbol: String,
    pub decimals: u8,
    /// Annual supply rate, Ray.
    pub current_liquidity_rate: U256,
    /// Annual variable borrow rate, Ray.
    pub current_variable_borrow_rate: U256,
    /// Supply accrual index, Ray.
    pub liquidity_index: U256,
    /// Variable debt accrual index, Ray.
    pub variable_borrow_index: U256,
    pub last_update_timestamp: u64,
}

/// One (user, reserve) position.
///
/// `scaled_*` balances are as stored by the protocol (divided by the accrual
/// index); `supply_balance` / `debt_balance` are the live balances after
/// multiplying by the current index, computed once at assembly time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPosition {
    pub user: Address,
    pub reserve_id: Address,
    pub symbol: String,
    pub decimals: u8,
    pub scaled_supply_balance: U256,
    pub scaled_debt_balance: U256,
    pub supply_balance: U256,
    pub debt_balance: U256,
    pub usage_as_collateral_enabled: bool,
    /// Basis points.
    pub ltv: u16,
    /// Basis points.
    pub liquidation_threshold: u16,
    /// Basis points.
    pub liquidation_bonus: u16,
    /// Wad reference currency per whole token.
    pub price: U256,
}

impl UserPosition {
    pub fn has_debt(&self) -> bool {
        !self.debt_balance.is_zero()
    }

    pub fn is_collateral(&self) -> bool {
        self.usage_as_collateral_enabled && !self.supply_balance.is_zero()
    }
}

/// Health factor with the zero-debt sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthFactor {
    /// Ray-scaled ratio of risk-weighted collateral to debt.
    Finite(U256),
    /// No debt: liquidation is impossible.
    Infinite,
}

impl HealthFactor {
    pub fn is_below(&self, threshold_ray: U256) -> bool {
        match self {
            HealthFactor::Finite(hf) => *hf < threshold_ray,
            HealthFactor::Infinite => false,
        }
    }

    pub fn as_ray(&self) -> Option<U256> {
        match self {
            HealthFactor::Finite(hf) => Some(*hf),
            HealthFactor::Infinite => None,
        }
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthFactor::Finite(hf) => write!(f, "{:.4}", math::to_f64(*hf, Scale::Ray)),
            HealthFactor::Infinite => f.write_str("inf"),
        }
    }
}

/// Point-in-time solvency projection. Computed on demand, never persisted.
#[derive(Debug, Clone)]
pub struct HealthFactorResult {
    pub health_factor: HealthFactor,
    /// Wad, reference currency, unweighted.
    pub total_collateral: U256,
    /// Wad, reference currency.
    pub total_debt: U256,
}

/// One scan cycle's liquidation candidate. Discarded after the cycle's
/// executor pass.
#[derive(Debug, Clone)]
pub struct LiquidationCandidate {
    pub user: Address,
    pub health_factor: HealthFactor,
    pub reserves: SmallVec<[UserPosition; 4]>,
}

/// Collateral/debt reserve pair chosen for a liquidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
    pub collateral_reserve: Address,
    pub collateral_symbol: String,
    pub debt_reserve: Address,
    pub debt_symbol: String,
}
