//! Engine configuration: the raw TOML surface and the validated runtime view.
//!
//! Configuration is read once at startup and resolved into [`ResolvedConfig`],
//! which is passed explicitly into every component constructor. No component
//! reads ambient global state.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{AssetCatalog, AssetInfo};
use crate::math::RAY;

/// Startup configuration failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Raw configuration as it appears in the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub liquidator: LiquidatorConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

/// Node endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Per-request timeout; a timeout fails that one fetch or submission,
    /// never the process.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8545".to_string()
}
fn default_chain_id() -> u64 {
    1
}
fn default_request_timeout_ms() -> u64 {
    5_000
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            chain_id: default_chain_id(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Liquidator identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidatorConfig {
    /// Hex-encoded signing key. `LIQUIDATOR_PRIVATE_KEY` overrides the file
    /// so the secret can stay out of it.
    #[serde(default)]
    pub signing_key: String,

    /// Receive the underlying collateral asset instead of its yield-bearing
    /// wrapper.
    #[serde(default = "default_receive_underlying")]
    pub receive_underlying: bool,
}

fn default_receive_underlying() -> bool {
    true
}

impl Default for LiquidatorConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            receive_underlying: default_receive_underlying(),
        }
    }
}

/// Scanner timing and eligibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Ray-scaled eligibility threshold; positions at or above it are never
    /// candidates.
    #[serde(default = "default_health_factor_threshold")]
    pub health_factor_threshold: U256,
}

fn default_poll_interval_ms() -> u64 {
    15_000
}
fn default_health_factor_threshold() -> U256 {
    RAY
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            health_factor_threshold: default_health_factor_threshold(),
        }
    }
}

/// Strategist settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Minimum acceptable profit percentage. Accepted by the strategist
    /// interface; the default pair-selection policy does not use it.
    #[serde(default)]
    pub min_profit_pct: f64,
}

/// One supported asset: reserve id plus metadata for log resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub reserve: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment overrides. Secrets stay out of the file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("LIQUIDATOR_PRIVATE_KEY") {
            self.liquidator.signing_key = key;
        }
        if let Ok(endpoint) = std::env::var("NODE_ENDPOINT") {
            self.node.endpoint = endpoint;
        }
    }

    /// Validate and resolve into the runtime view.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        if self.node.endpoint.is_empty() {
            return Err(ConfigError::Invalid("node endpoint is not set".into()));
        }
        if self.node.chain_id == 0 {
            return Err(ConfigError::Invalid("chain id must be nonzero".into()));
        }
        if self.node.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request timeout must be nonzero".into()));
        }
        if self.scanner.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll interval must be nonzero".into()));
        }
        if self.scanner.health_factor_threshold.is_zero() {
            return Err(ConfigError::Invalid(
                "health factor threshold must be nonzero".into(),
            ));
        }

        let key = self.liquidator.signing_key.trim();
        if key.is_empty() {
            return Err(ConfigError::Invalid(
                "liquidator signing key is not set".into(),
            ));
        }
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("liquidator signing key: {e}")))?;

        let mut seen = std::collections::HashSet::new();
        let mut assets = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            if !seen.insert(asset.reserve) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate asset entry for {}",
                    asset.reserve
                )));
            }
            assets.push(AssetInfo {
                reserve_id: asset.reserve,
                symbol: asset.symbol.clone(),
                decimals: asset.decimals,
            });
        }

        Ok(ResolvedConfig {
            endpoint: self.node.endpoint,
            chain_id: self.node.chain_id,
            request_timeout: Duration::from_millis(self.node.request_timeout_ms),
            poll_interval: Duration::from_millis(self.scanner.poll_interval_ms),
            health_factor_threshold: self.scanner.health_factor_threshold,
            min_profit_pct: self.strategy.min_profit_pct,
            receive_underlying: self.liquidator.receive_underlying,
            liquidator: signer.address(),
            assets: AssetCatalog::new(assets),
        })
    }
}

/// Validated runtime configuration. Constructed once in `main`, shared by
/// `Arc`, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub chain_id: u64,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    /// Ray.
    pub health_factor_threshold: U256,
    pub min_profit_pct: f64,
    pub receive_underlying: bool,
    /// Address derived from the signing key; the key itself never leaves the
    /// ledger boundary.
    pub liquidator: Address,
    pub assets: AssetCatalog,
}

impl ResolvedConfig {
    pub fn log_summary(&self) {
        tracing::info!(
            endpoint = %self.endpoint,
            chain_id = self.chain_id,
            liquidator = %self.liquidator,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            request_timeout_ms = self.request_timeout.as_millis() as u64,
            threshold = %self.health_factor_threshold,
            assets = self.assets.len(),
            "Configuration resolved"
        );
    }
}
