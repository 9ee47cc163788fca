//! In-memory log backend.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::log::{HistoryIter, LedgerLog};
use crate::types::{CommitTimestamp, HistoryEntry, TxId};

/// In-memory log backed by a `RwLock<HashMap>`.
///
/// Commit timestamps advance one second per commit from a fixed base, so a
/// given sequence of writes produces the same history bytes on every run.
/// Useful for tests and for embedders that need no durability.
pub struct MemoryLog {
    inner: RwLock<Inner>,
    base_seconds: i64,
}

#[derive(Default)]
struct Inner {
    current: HashMap<String, Vec<u8>>,
    history: HashMap<String, Vec<HistoryEntry>>,
    commits: u64,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::with_base_time(0)
    }

    /// Log whose first commit lands at `base_seconds` since the epoch.
    pub fn with_base_time(base_seconds: i64) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            base_seconds,
        }
    }

    fn commit(&self, key: &str, payload: Option<&[u8]>) -> Result<TxId> {
        let mut inner = self.inner.write();

        let sequence = inner.commits;
        inner.commits += 1;

        let tx_id = TxId::derive(key, sequence, payload.unwrap_or_default());
        let timestamp = CommitTimestamp {
            seconds: self.base_seconds + sequence as i64,
            nanos: 0,
        };

        match payload {
            Some(bytes) => {
                inner.current.insert(key.to_string(), bytes.to_vec());
            }
            None => {
                inner.current.remove(key);
            }
        }

        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id: tx_id.clone(),
                payload: payload.map(|b| b.to_vec()),
                timestamp,
                is_delete: payload.is_none(),
            });

        Ok(tx_id)
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerLog for MemoryLog {
    fn get_current(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.read().current.get(key).cloned())
    }

    fn put_current(&self, key: &str, payload: &[u8]) -> Result<TxId> {
        debug!(%key, size = payload.len(), "writing current value");
        self.commit(key, Some(payload))
    }

    fn delete_current(&self, key: &str) -> Result<TxId> {
        debug!(%key, "writing tombstone");
        self.commit(key, None)
    }

    fn enumerate_history(&self, key: &str) -> Result<HistoryIter<'_>> {
        let entries = self
            .inner
            .read()
            .history
            .get(key)
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(entries.into_iter().map(Ok)))
    }
}
