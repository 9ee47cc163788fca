//! History reconstruction over the append-only log.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::log::LedgerLog;
use crate::state::require_non_empty;
use crate::types::{HashRecord, HistoryEntry};

/// One rendered history entry, in the external wire shape.
///
/// Field order is part of the contract, as is the quoted-string rendering
/// of `isDelete`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,

    /// Decoded record key, empty when the stored payload does not decode.
    pub key: String,

    /// Decoded hash; `None` for tombstones (rendered as JSON `null`), empty
    /// string when the stored payload does not decode.
    pub value: Option<String>,

    /// Commit time rendered as RFC 3339 UTC.
    pub timestamp: String,

    /// `"true"` or `"false"`.
    #[serde(rename = "isDelete")]
    pub is_delete: String,
}

impl HistoryView {
    /// Render one log entry. A tombstone never attempts a decode; a payload
    /// that fails to decode degrades to empty fields rather than failing
    /// the query.
    fn from_entry(entry: HistoryEntry) -> Self {
        let (key, value) = if entry.is_delete {
            (String::new(), None)
        } else {
            let record = HashRecord::decode_lossy(entry.payload.as_deref());
            (record.key, Some(record.hash))
        };

        Self {
            transaction_id: entry.tx_id.0,
            key,
            value,
            timestamp: entry.timestamp.to_rfc3339(),
            is_delete: entry.is_delete.to_string(),
        }
    }
}

/// Read-only reconstructor of a key's audit trail.
///
/// Owns no state; a pure transform over the log's ordered enumeration.
pub struct HistoryReader<L: LedgerLog> {
    log: Arc<L>,
}

impl<L: LedgerLog> HistoryReader<L> {
    pub fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Every history entry for a key, oldest first.
    ///
    /// Enumeration failure aborts the whole query with no partial results;
    /// a tombstone or an undecodable payload only degrades its own entry.
    pub fn history(&self, key: &str) -> Result<Vec<HistoryView>> {
        require_non_empty(key, "key")?;

        let mut views = Vec::new();
        for entry in self.log.enumerate_history(key)? {
            views.push(HistoryView::from_entry(entry?));
        }

        debug!(%key, entries = views.len(), "reconstructed history");
        Ok(views)
    }

    /// History as the external JSON array payload.
    pub fn history_json(&self, key: &str) -> Result<Vec<u8>> {
        let views = self.history(key)?;
        Ok(serde_json::to_vec(&views)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitTimestamp, TxId};

    fn entry(payload: Option<&[u8]>, is_delete: bool) -> HistoryEntry {
        HistoryEntry {
            tx_id: TxId("tx-1".to_string()),
            payload: payload.map(|b| b.to_vec()),
            timestamp: CommitTimestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            },
            is_delete,
        }
    }

    #[test]
    fn test_tombstone_renders_without_decode() {
        let view = HistoryView::from_entry(entry(None, true));
        assert_eq!(view.key, "");
        assert_eq!(view.value, None);
        assert_eq!(view.is_delete, "true");
    }

    #[test]
    fn test_decode_failure_degrades_to_empty_fields() {
        let view = HistoryView::from_entry(entry(Some(b"garbage"), false));
        assert_eq!(view.key, "");
        assert_eq!(view.value, Some(String::new()));
        assert_eq!(view.is_delete, "false");
    }

    #[test]
    fn test_valid_payload_renders_decoded_fields() {
        let payload = HashRecord::new("v1", "abc123").encode().unwrap();
        let view = HistoryView::from_entry(entry(Some(&payload), false));
        assert_eq!(view.key, "v1");
        assert_eq!(view.value, Some("abc123".to_string()));
        assert_eq!(view.timestamp, "2023-11-14T22:13:20.000000000Z");
    }
}
