//! Liquidation submission against the ledger.

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::{info, instrument, warn};

use crate::config::ResolvedConfig;
use crate::position::{AssetPair, LiquidationCandidate};
use sentinel_ledger::{CallReceipt, LedgerSubmitter, LiquidationCallParams};

/// Debt-to-cover sentinel: the ledger re-reads outstanding debt at execution
/// time, so ask for the maximum the protocol allows and avoid staleness races.
pub const MAX_DEBT_TO_COVER: U256 = U256::MAX;

/// Terminal state of one liquidation attempt within a cycle.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// Submitted and confirmed by the receipt.
    Confirmed(CallReceipt),
    /// Submission failed or reverted. No in-cycle retry; the position is
    /// still undercollateralized and the next poll picks it up again.
    Failed { reason: String },
    /// No viable collateral/debt pair; nothing was submitted.
    Skipped,
}

pub struct Executor<L: ?Sized> {
    ledger: Arc<L>,
    config: Arc<ResolvedConfig>,
}

impl<L: LedgerSubmitter + ?Sized> Executor<L> {
    pub fn new(ledger: Arc<L>, config: Arc<ResolvedConfig>) -> Self {
        Self { ledger, config }
    }

    /// Submit one liquidation for the chosen pair.
    #[instrument(skip(self, candidate, pair), fields(user = %candidate.user))]
    pub async fn execute(
        &self,
        candidate: &LiquidationCandidate,
        pair: &AssetPair,
    ) -> ExecutionOutcome {
        let params = LiquidationCallParams {
            collateral_asset: pair.collateral_reserve,
            debt_asset: pair.debt_reserve,
            user: candidate.user,
            debt_to_cover: MAX_DEBT_TO_COVER,
            receive_underlying: self.config.receive_underlying,
            liquidator: self.config.liquidator,
        };

        info!(
            user = %candidate.user,
            collateral = %pair.collateral_symbol,
            debt = %pair.debt_symbol,
            hf = %candidate.health_factor,
            "Submitting liquidation"
        );

        match self.ledger.liquidation_call(&params).await {
            Ok(receipt) if receipt.is_success() => {
                info!(
                    user = %candidate.user,
                    tx_hash = receipt.tx_hash.as_deref().unwrap_or("-"),
                    "Liquidation confirmed"
                );
                ExecutionOutcome::Confirmed(receipt)
            }
            Ok(receipt) => {
                warn!(
                    user = %candidate.user,
                    collateral = %pair.collateral_reserve,
                    debt = %pair.debt_reserve,
                    tx_hash = receipt.tx_hash.as_deref().unwrap_or("-"),
                    "Liquidation reverted, leaving candidate for the next poll"
                );
                ExecutionOutcome::Failed {
                    reason: "receipt reported revert".into(),
                }
            }
            Err(e) => {
                warn!(
                    user = %candidate.user,
                    collateral = %pair.collateral_reserve,
                    debt = %pair.debt_reserve,
                    error = %e,
                    "Liquidation submission failed, leaving candidate for the next poll"
                );
                ExecutionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::HealthFactor;
    use crate::scanner::tests::test_config;
    use alloy::primitives::Address;
    use async_trait::async_trait;
    use sentinel_ledger::{LedgerError, ReceiptStatus};
    use smallvec::smallvec;
    use std::sync::Mutex;

    struct RecordingSubmitter {
        calls: Mutex<Vec<LiquidationCallParams>>,
        response: fn() -> Result<CallReceipt, LedgerError>,
    }

    #[async_trait]
    impl LedgerSubmitter for RecordingSubmitter {
        async fn liquidation_call(
            &self,
            params: &LiquidationCallParams,
        ) -> Result<CallReceipt, LedgerError> {
            self.calls.lock().unwrap().push(params.clone());
            (self.response)()
        }
    }

    fn candidate() -> LiquidationCandidate {
        LiquidationCandidate {
            user: Address::repeat_byte(0x11),
            health_factor: HealthFactor::Finite(U256::from(1u8)),
            reserves: smallvec![],
        }
    }

    fn pair() -> AssetPair {
        AssetPair {
            collateral_reserve: Address::repeat_byte(0xaa),
            collateral_symbol: "WETH".into(),
            debt_reserve: Address::repeat_byte(0xbb),
            debt_symbol: "USDC".into(),
        }
    }

    #[tokio::test]
    async fn submits_max_sentinel_with_configured_identity() {
        let submitter = Arc::new(RecordingSubmitter {
            calls: Mutex::new(Vec::new()),
            response: || {
                Ok(CallReceipt {
                    status: ReceiptStatus::Success,
                    tx_hash: Some("0xdeadbeef".into()),
                })
            },
        });
        let config = test_config();
        let executor = Executor::new(submitter.clone(), config.clone());

        let outcome = executor.execute(&candidate(), &pair()).await;
        assert!(matches!(outcome, ExecutionOutcome::Confirmed(_)));

        let calls = submitter.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].debt_to_cover, U256::MAX);
        assert_eq!(calls[0].user, Address::repeat_byte(0x11));
        assert_eq!(calls[0].collateral_asset, Address::repeat_byte(0xaa));
        assert_eq!(calls[0].debt_asset, Address::repeat_byte(0xbb));
        assert_eq!(calls[0].liquidator, config.liquidator);
    }

    #[tokio::test]
    async fn reverted_receipt_is_a_failure() {
        let submitter = Arc::new(RecordingSubmitter {
            calls: Mutex::new(Vec::new()),
            response: || {
                Ok(CallReceipt {
                    status: ReceiptStatus::Reverted,
                    tx_hash: Some("0xdead".into()),
                })
            },
        });
        let executor = Executor::new(submitter, test_config());

        let outcome = executor.execute(&candidate(), &pair()).await;
        assert!(matches!(outcome, ExecutionOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn transport_error_is_a_failure_not_a_panic() {
        let submitter = Arc::new(RecordingSubmitter {
            calls: Mutex::new(Vec::new()),
            response: || {
                Err(LedgerError::Node {
                    code: -32000,
                    message: "nonce too low".into(),
                })
            },
        });
        let executor = Executor::new(submitter, test_config());

        let outcome = executor.execute(&candidate(), &pair()).await;
        match outcome {
            ExecutionOutcome::Failed { reason } => assert!(reason.contains("nonce")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
