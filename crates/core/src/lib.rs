//! Deterministic liquidation-risk engine.
//!
//! Mirrors the lending protocol's fixed-point accounting client-side:
//! - Checked Wad/Ray arithmetic with half-up rounding
//! - Linear and per-second-compounded interest accrual
//! - Health-factor aggregation and pre-flight projections
//! - A scan -> strategize -> execute polling loop over the ledger boundary
//!
//! Any drift between this engine's arithmetic and the protocol's own causes
//! mispriced liquidations or wrong displayed figures, so the math modules
//! reproduce the on-chain rounding and overflow semantics exactly.

pub mod assets;
pub mod config;
pub mod engine;
pub mod executor;
pub mod health;
pub mod math;
pub mod position;
pub mod rates;
pub mod scanner;
pub mod strategist;

pub use assets::{AssetCatalog, AssetInfo};
pub use config::{ConfigError, EngineConfig, ResolvedConfig};
pub use engine::Engine;
pub use executor::{ExecutionOutcome, Executor, MAX_DEBT_TO_COVER};
pub use health::{
    compute_health_factor, health_factor_after_supply, is_liquidation_candidate,
    HEALTH_FACTOR_LIQUIDATION_THRESHOLD,
};
pub use math::{MathError, Scale, RAY, WAD, WAD_RAY_RATIO};
pub use position::{
    AssetPair, HealthFactor, HealthFactorResult, LiquidationCandidate, ReserveSnapshot,
    UserPosition,
};
pub use rates::{
    compounded_interest, current_borrow_rate, linear_interest, normalized_debt,
    normalized_income, InterestRateStrategyParams, SECONDS_PER_YEAR,
};
pub use scanner::{ScanError, Scanner};
pub use strategist::Strategist;
