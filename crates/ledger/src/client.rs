//! Typed operations over the untyped transport.

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::json;

use crate::error::LedgerError;
use crate::transport::Transport;
use crate::types::{AccountData, CallReceipt, LiquidationCallParams, UserReserveRecord};

/// Query and operation names understood by the remote node. Kept in one
/// place so stringly-typed dispatch never leaks past this module.
mod op {
    pub const USERS_WITH_POSITIONS: &str = "openPositionUsers";
    pub const ACCOUNT_DATA: &str = "getUserAccountData";
    pub const USER_RESERVES: &str = "getUserReservesData";
    pub const LIQUIDATION_CALL: &str = "liquidationCall";
}

/// Read-only ledger operations the engine consumes.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// All users that currently have open debt positions.
    async fn users_with_positions(&self) -> Result<Vec<Address>, LedgerError>;

    /// Aggregate health data for one user.
    async fn account_data(&self, user: Address) -> Result<AccountData, LedgerError>;

    /// Per-reserve collateral/debt breakdown for one user.
    async fn user_reserves(&self, user: Address) -> Result<Vec<UserReserveRecord>, LedgerError>;
}

/// Side-effecting ledger operations.
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    /// Submit a liquidation call and return its receipt.
    async fn liquidation_call(
        &self,
        params: &LiquidationCallParams,
    ) -> Result<CallReceipt, LedgerError>;
}

/// Ledger client: typed request/response structs in, wire values out.
pub struct LedgerClient {
    transport: Arc<dyn Transport>,
}

impl LedgerClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, LedgerError> {
        serde_json::from_value(value).map_err(|e| LedgerError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LedgerReader for LedgerClient {
    async fn users_with_positions(&self) -> Result<Vec<Address>, LedgerError> {
        let result = self
            .transport
            .query(op::USERS_WITH_POSITIONS, json!({}))
            .await?;
        Self::decode(result)
    }

    async fn account_data(&self, user: Address) -> Result<AccountData, LedgerError> {
        let result = self
            .transport
            .query(op::ACCOUNT_DATA, json!({ "user": user }))
            .await?;
        Self::decode(result)
    }

    async fn user_reserves(&self, user: Address) -> Result<Vec<UserReserveRecord>, LedgerError> {
        let result = self
            .transport
            .query(op::USER_RESERVES, json!({ "user": user }))
            .await?;
        Self::decode(result)
    }
}

#[async_trait]
impl LedgerSubmitter for LedgerClient {
    async fn liquidation_call(
        &self,
        params: &LiquidationCallParams,
    ) -> Result<CallReceipt, LedgerError> {
        let args = serde_json::to_value(params).map_err(|e| LedgerError::Decode(e.to_string()))?;
        self.transport.call(op::LIQUIDATION_CALL, args).await
    }
}
