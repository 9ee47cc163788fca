//! Core types for the ledger.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Transaction identifier assigned by the log on every commit.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl TxId {
    /// Derive an id from a key, a per-log sequence number, and the payload.
    ///
    /// The sequence number makes repeated writes of the same payload yield
    /// distinct ids.
    pub fn derive(key: &str, sequence: u64, payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update(sequence.to_be_bytes());
        hasher.update(payload);
        TxId(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = if self.0.len() > 8 { &self.0[..8] } else { &self.0 };
        write!(f, "TxId({}...)", short)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commit time recorded by the log, seconds + nanoseconds since the epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl CommitTimestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        CommitTimestamp {
            seconds: duration.as_secs() as i64,
            nanos: duration.subsec_nanos() as i32,
        }
    }

    /// Render as an RFC 3339 UTC string with nanosecond precision.
    ///
    /// Derived solely from `(seconds, nanos)`; out-of-range values render
    /// as the empty string rather than a made-up date.
    pub fn to_rfc3339(&self) -> String {
        u32::try_from(self.nanos)
            .ok()
            .and_then(|nanos| DateTime::<Utc>::from_timestamp(self.seconds, nanos))
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Nanos, true))
            .unwrap_or_default()
    }
}

impl fmt::Debug for CommitTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitTimestamp({}s {}ns)", self.seconds, self.nanos)
    }
}

/// The persisted record at a ledger key: a caller-supplied identifier and
/// an opaque hash string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub key: String,
    pub hash: String,
}

impl HashRecord {
    pub fn new(key: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            hash: hash.into(),
        }
    }

    /// Serialize to the JSON wire form.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a stored payload, tolerating absence and malformed bytes.
    ///
    /// This is the only place stored payloads are interpreted: updates merge
    /// through it and history rendering falls back to it, so an absent or
    /// undecodable payload always degrades to the default (empty-field)
    /// record in exactly one way.
    pub fn decode_lossy(payload: Option<&[u8]>) -> Self {
        payload
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
            .unwrap_or_default()
    }
}

/// One immutable entry in a key's append-only history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Transaction that committed this mutation.
    pub tx_id: TxId,

    /// Record payload as it existed after this mutation, `None` for
    /// tombstones.
    pub payload: Option<Vec<u8>>,

    /// When the mutation committed.
    pub timestamp: CommitTimestamp,

    /// Whether this entry represents a deletion.
    pub is_delete: bool,
}
