//! Wire types for the closed set of ledger operations.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Aggregate account health as reported by the node.
///
/// `health_factor` is Ray-scaled; collateral and debt are Wad values in the
/// protocol's reference currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub health_factor: U256,
    pub total_collateral: U256,
    pub total_debt: U256,
}

/// Per-reserve breakdown row for one user.
///
/// Balances are scaled (divided by the accrual index at deposit/borrow time);
/// the accompanying index and rate fields are what the engine needs to accrue
/// them back to live balances. Risk parameters are basis points, `price` is
/// Wad reference currency per whole token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReserveRecord {
    pub reserve_id: Address,
    pub symbol: String,
    pub decimals: u8,
    pub scaled_supply_balance: U256,
    pub scaled_debt_balance: U256,
    pub usage_as_collateral_enabled: bool,
    pub ltv: u16,
    pub liquidation_threshold: u16,
    pub liquidation_bonus: u16,
    pub price: U256,
    pub current_liquidity_rate: U256,
    pub current_variable_borrow_rate: U256,
    pub liquidity_index: U256,
    pub variable_borrow_index: U256,
    pub last_update_timestamp: u64,
}

/// Arguments for the liquidation call operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidationCallParams {
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub user: Address,
    /// Pass `U256::MAX` to seize as much debt as the protocol allows; the
    /// outstanding amount is re-read on-chain at execution time.
    pub debt_to_cover: U256,
    /// Receive the underlying collateral asset instead of its yield-bearing
    /// wrapper.
    pub receive_underlying: bool,
    pub liquidator: Address,
}

/// Status code carried by an operation receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Receipt returned by a side-effecting `call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReceipt {
    pub status: ReceiptStatus,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

impl CallReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}
