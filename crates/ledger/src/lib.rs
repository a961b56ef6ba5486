//! Typed boundary to the external ledger node.
//!
//! The engine consumes a closed set of typed operations (`LedgerReader` for
//! reads, `LedgerSubmitter` for the liquidation call). The untyped
//! `query(name, args)` / `call(operation, args)` wire dispatch is confined to
//! the [`Transport`] seam, with a JSON-RPC HTTP adapter as the default
//! implementation.

mod client;
mod error;
mod transport;
mod types;

pub use client::{LedgerClient, LedgerReader, LedgerSubmitter};
pub use error::LedgerError;
pub use transport::{HttpTransport, Transport};
pub use types::{AccountData, CallReceipt, LiquidationCallParams, ReceiptStatus, UserReserveRecord};
