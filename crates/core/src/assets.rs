//! Asset metadata catalog for log-friendly names.

use std::collections::HashMap;

use alloy::primitives::Address;

/// Static metadata for one supported reserve asset.
#[derive(Debug, Clone)]
pub struct AssetInfo {
    pub reserve_id: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// Lookup from reserve id to asset metadata, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    by_reserve: HashMap<Address, AssetInfo>,
}

impl AssetCatalog {
    pub fn new(assets: impl IntoIterator<Item = AssetInfo>) -> Self {
        Self {
            by_reserve: assets.into_iter().map(|a| (a.reserve_id, a)).collect(),
        }
    }

    pub fn get(&self, reserve: &Address) -> Option<&AssetInfo> {
        self.by_reserve.get(reserve)
    }

    /// Human-readable name for logs; falls back to the hex id for reserves
    /// that are not in the configured list.
    pub fn symbol(&self, reserve: &Address) -> String {
        self.by_reserve
            .get(reserve)
            .map(|a| a.symbol.clone())
            .unwrap_or_else(|| reserve.to_string())
    }

    pub fn len(&self) -> usize {
        self.by_reserve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_reserve.is_empty()
    }
}
