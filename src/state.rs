//! Current-value state over the append-only log.

use std::sync::Arc;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::log::LedgerLog;
use crate::types::HashRecord;

/// Current-value store for ledger keys.
///
/// Owns no state of its own: every read and write goes through the injected
/// log, which appends one history entry per mutation and assigns the
/// transaction id and commit timestamp.
pub struct StateStore<L: LedgerLog> {
    log: Arc<L>,
}

impl<L: LedgerLog> StateStore<L> {
    pub fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Raw current payload for a key. Absence is `Ok(None)`, not an error.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        require_non_empty(key, "key")?;
        self.log.get_current(key)
    }

    /// Unconditional upsert: writes `HashRecord { key, hash }` as the
    /// current value and returns the serialized record.
    ///
    /// No existence check; posting to a live key overwrites it.
    pub fn create(&self, key: &str, hash: &str) -> Result<Vec<u8>> {
        require_non_empty(key, "key")?;
        require_non_empty(hash, "hash")?;

        let payload = HashRecord::new(key, hash).encode()?;
        let tx_id = self.log.put_current(key, &payload)?;
        debug!(%key, %tx_id, "created record");
        Ok(payload)
    }

    /// Update through the tolerant decode: an absent or undecodable current
    /// payload merges as the default record, so updating a never-created
    /// key succeeds with an empty `key` field.
    pub fn update(&self, key: &str, hash: &str) -> Result<Vec<u8>> {
        require_non_empty(key, "key")?;

        let stored = self.log.get_current(key)?;
        let mut record = HashRecord::decode_lossy(stored.as_deref());
        record.hash = hash.to_string();

        let payload = record.encode()?;
        let tx_id = self.log.put_current(key, &payload)?;
        debug!(%key, %tx_id, "updated record");
        Ok(payload)
    }

    /// Remove the current value, appending a tombstone to the history.
    pub fn delete(&self, key: &str) -> Result<()> {
        require_non_empty(key, "key")?;

        let tx_id = self.log.delete_current(key)?;
        debug!(%key, %tx_id, "deleted record");
        Ok(())
    }
}

pub(crate) fn require_non_empty(value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LedgerError::InvalidArgument(format!(
            "{} must be non-empty",
            name
        )));
    }
    Ok(())
}
