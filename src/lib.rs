//! # Hash Ledger
//!
//! A versioned key-value ledger core: a current value per key plus an
//! immutable, append-only history of every mutation, reconstructable on
//! demand as an audit trail.
//!
//! ## Core Concepts
//!
//! - **Records**: `{ key, hash }` payloads stored as the current value
//! - **History**: one immutable log entry per mutation, oldest first
//! - **Tombstones**: deletions stay in history as `isDelete` entries
//! - **Logs**: pluggable append-only backends (in-memory or journal file)
//!
//! ## Example
//!
//! ```ignore
//! use hashledger::{HashContract, MemoryLog};
//! use std::sync::Arc;
//!
//! let contract = HashContract::new(Arc::new(MemoryLog::new()));
//!
//! contract.invoke("postHash", &["ballot-1".into(), "abc123".into()])?;
//! contract.invoke("putHash", &["ballot-1".into(), "def456".into()])?;
//!
//! // Full audit trail as a JSON array, oldest first.
//! let trail = contract.invoke("getHistory", &["ballot-1".into()])?;
//! ```

pub mod contract;
pub mod error;
pub mod history;
pub mod log;
pub mod state;
pub mod types;

// Re-exports
pub use contract::HashContract;
pub use error::{LedgerError, Result};
pub use history::{HistoryReader, HistoryView};
pub use log::{HistoryIter, JournalLog, LedgerLog, MemoryLog};
pub use state::StateStore;
pub use types::{CommitTimestamp, HashRecord, HistoryEntry, TxId};
