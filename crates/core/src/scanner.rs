//! Position scanner: one polling cycle's candidate discovery.

use std::sync::Arc;

use alloy::primitives::Address;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::assets::AssetCatalog;
use crate::config::ResolvedConfig;
use crate::health;
use crate::math::{self, MathError, Scale};
use crate::position::{HealthFactor, LiquidationCandidate, ReserveSnapshot, UserPosition};
use crate::rates;
use sentinel_ledger::{LedgerError, LedgerReader, UserReserveRecord};

/// Scan failure. Ledger failures for a single user are isolated inside the
/// cycle; arithmetic failures indicate a correctness bug and abort it.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("arithmetic failure while assembling position: {0}")]
    Math(#[from] MathError),
}

pub struct Scanner<L: ?Sized> {
    ledger: Arc<L>,
    config: Arc<ResolvedConfig>,
}

impl<L: LedgerReader + ?Sized> Scanner<L> {
    pub fn new(ledger: Arc<L>, config: Arc<ResolvedConfig>) -> Self {
        Self { ledger, config }
    }

    /// One full scan cycle at wall-clock time `now` (unix seconds).
    ///
    /// Returns the ordered candidate list for this cycle only. A single
    /// user's query failure is logged once and that user skipped; it never
    /// aborts the scan.
    #[instrument(skip(self))]
    pub async fn scan_cycle(&self, now: u64) -> Result<Vec<LiquidationCandidate>, ScanError> {
        let users = self.ledger.users_with_positions().await?;
        debug!(count = users.len(), "Fetched users with open positions");

        let mut candidates = Vec::new();
        for user in users {
            match self.evaluate_user(user, now).await {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(ScanError::Ledger(e)) => {
                    warn!(user = %user, error = %e, "Skipping user for this cycle");
                }
                Err(e @ ScanError::Math(_)) => return Err(e),
            }
        }

        Ok(candidates)
    }

    async fn evaluate_user(
        &self,
        user: Address,
        now: u64,
    ) -> Result<Option<LiquidationCandidate>, ScanError> {
        let account = self.ledger.account_data(user).await?;

        if account.total_debt.is_zero() {
            return Ok(None);
        }
        if account.health_factor >= self.config.health_factor_threshold {
            return Ok(None);
        }

        let records = self.ledger.user_reserves(user).await?;
        let mut reserves: SmallVec<[UserPosition; 4]> = SmallVec::with_capacity(records.len());
        for record in records {
            reserves.push(assemble_position(user, record, now, &self.config.assets)?);
        }

        // The node's own accounting and this engine's must agree; drift means
        // one of the two is wrong.
        let local = health::compute_health_factor(&reserves).map_err(ScanError::Math)?;
        if let Some(local_hf) = local.health_factor.as_ray() {
            if local_hf != account.health_factor {
                debug!(
                    user = %user,
                    reported = %account.health_factor,
                    local = %local_hf,
                    "Health factor drift between node and local math"
                );
            }
        }

        debug!(
            user = %user,
            hf = %account.health_factor,
            collateral = %account.total_collateral,
            debt = %account.total_debt,
            reserves = reserves.len(),
            "Candidate assembled"
        );

        Ok(Some(LiquidationCandidate {
            user,
            health_factor: HealthFactor::Finite(account.health_factor),
            reserves,
        }))
    }
}

/// Turn one wire record into a position with live, interest-accrued balances.
/// Configured asset metadata wins over the wire symbol for log names.
fn assemble_position(
    user: Address,
    record: UserReserveRecord,
    now: u64,
    assets: &AssetCatalog,
) -> Result<UserPosition, MathError> {
    let symbol = assets
        .get(&record.reserve_id)
        .map(|a| a.symbol.clone())
        .unwrap_or_else(|| record.symbol.clone());

    let snapshot = ReserveSnapshot {
        reserve_id: record.reserve_id,
        symbol: symbol.clone(),
        decimals: record.decimals,
        current_liquidity_rate: record.current_liquidity_rate,
        current_variable_borrow_rate: record.current_variable_borrow_rate,
        liquidity_index: record.liquidity_index,
        variable_borrow_index: record.variable_borrow_index,
        last_update_timestamp: record.last_update_timestamp,
    };

    let supply_balance = math::mul(
        record.scaled_supply_balance,
        rates::normalized_income(&snapshot, now)?,
        Scale::Ray,
    )?;
    let debt_balance = math::mul(
        record.scaled_debt_balance,
        rates::normalized_debt(&snapshot, now)?,
        Scale::Ray,
    )?;

    Ok(UserPosition {
        user,
        reserve_id: record.reserve_id,
        symbol,
        decimals: record.decimals,
        scaled_supply_balance: record.scaled_supply_balance,
        scaled_debt_balance: record.scaled_debt_balance,
        supply_balance,
        debt_balance,
        usage_as_collateral_enabled: record.usage_as_collateral_enabled,
        ltv: record.ltv,
        liquidation_threshold: record.liquidation_threshold,
        liquidation_bonus: record.liquidation_bonus,
        price: record.price,
    })
}
