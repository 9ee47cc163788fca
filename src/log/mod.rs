//! The append-only log abstraction and its backends.
//!
//! The ledger core never talks to storage directly: current-value reads and
//! writes and history enumeration all go through [`LedgerLog`], so any
//! backend that assigns transaction ids and commit timestamps can sit
//! underneath. Two backends ship with the crate:
//!
//! - [`MemoryLog`] — in-memory, deterministic timestamps, for tests and
//!   embedders that need no durability.
//! - [`JournalLog`] — a durable single-file journal with checksummed frames.

mod journal;
mod memory;

pub use journal::JournalLog;
pub use memory::MemoryLog;

use crate::error::Result;
use crate::types::{HistoryEntry, TxId};

/// Iterator over a key's history, oldest first.
pub type HistoryIter<'a> = Box<dyn Iterator<Item = Result<HistoryEntry>> + 'a>;

/// Append-only key-value log with per-key history.
///
/// Implementations assign a fresh [`TxId`] and commit timestamp on every
/// mutation and must enumerate history in commit order. Entries are never
/// rewritten or removed once appended.
pub trait LedgerLog: Send + Sync {
    /// Current payload for a key, or `None` if never written or deleted.
    fn get_current(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set the current payload for a key, appending one history entry.
    fn put_current(&self, key: &str, payload: &[u8]) -> Result<TxId>;

    /// Remove the current payload for a key, appending a tombstone.
    fn delete_current(&self, key: &str) -> Result<TxId>;

    /// All history entries for a key, oldest first. A key with no history
    /// yields an empty iterator.
    fn enumerate_history(&self, key: &str) -> Result<HistoryIter<'_>>;
}
