//! History reconstruction tests: ordering, tombstones, decode-failure
//! policy, and the external JSON shape.

use hashledger::{
    CommitTimestamp, HistoryEntry, HistoryIter, HistoryReader, LedgerError, LedgerLog, MemoryLog,
    Result, StateStore, TxId,
};
use std::sync::Arc;

fn components() -> (Arc<MemoryLog>, StateStore<MemoryLog>, HistoryReader<MemoryLog>) {
    let log = Arc::new(MemoryLog::with_base_time(1_700_000_000));
    let state = StateStore::new(Arc::clone(&log));
    let history = HistoryReader::new(Arc::clone(&log));
    (log, state, history)
}

#[test]
fn test_history_orders_entries_oldest_first() {
    let (_, state, history) = components();

    for hash in ["h1", "h2", "h3"] {
        state.create("ballot", hash).unwrap();
    }

    let views = history.history("ballot").unwrap();
    assert_eq!(views.len(), 3);

    let values: Vec<_> = views.iter().map(|v| v.value.clone().unwrap()).collect();
    assert_eq!(values, ["h1", "h2", "h3"]);
}

#[test]
fn test_each_write_gets_a_distinct_transaction_id() {
    let (_, state, history) = components();

    for _ in 0..4 {
        state.create("ballot", "same-hash").unwrap();
    }

    let views = history.history("ballot").unwrap();
    let mut tx_ids: Vec<_> = views.iter().map(|v| v.transaction_id.clone()).collect();
    assert_eq!(tx_ids.len(), 4);
    tx_ids.sort();
    tx_ids.dedup();
    assert_eq!(tx_ids.len(), 4);
}

#[test]
fn test_history_of_unwritten_key_is_empty() {
    let (_, _, history) = components();

    let views = history.history("never-written").unwrap();
    assert!(views.is_empty());

    let payload = history.history_json("never-written").unwrap();
    assert_eq!(payload, b"[]");
}

#[test]
fn test_tombstone_renders_null_value_and_quoted_true() {
    let (_, state, history) = components();

    state.create("ballot", "abc123").unwrap();
    state.delete("ballot").unwrap();

    let views = history.history("ballot").unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[1].value, None);
    assert_eq!(views[1].is_delete, "true");

    let payload = history.history_json("ballot").unwrap();
    let text = String::from_utf8(payload).unwrap();
    assert!(text.contains(r#""value":null"#));
    assert!(text.contains(r#""isDelete":"true""#));
}

#[test]
fn test_undecodable_payload_degrades_to_empty_fields() {
    let (log, _, history) = components();

    log.put_current("raw", b"not-a-record").unwrap();

    let views = history.history("raw").unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].key, "");
    assert_eq!(views[0].value, Some(String::new()));
    assert_eq!(views[0].is_delete, "false");
}

#[test]
fn test_timestamps_are_deterministic_calendar_renderings() {
    let (_, state, history) = components();

    state.create("ballot", "abc123").unwrap();

    let views = history.history("ballot").unwrap();
    assert_eq!(views[0].timestamp, "2023-11-14T22:13:20.000000000Z");
}

#[test]
fn test_json_shape_has_five_ordered_fields() {
    let (_, state, history) = components();

    state.create("ballot", "abc123").unwrap();

    let payload = history.history_json("ballot").unwrap();
    let text = String::from_utf8(payload).unwrap();

    let tx = text.find(r#""transactionId""#).unwrap();
    let key = text.find(r#""key""#).unwrap();
    let value = text.find(r#""value""#).unwrap();
    let timestamp = text.find(r#""timestamp""#).unwrap();
    let is_delete = text.find(r#""isDelete""#).unwrap();
    assert!(tx < key && key < value && value < timestamp && timestamp < is_delete);

    let trail: Vec<serde_json::Value> = serde_json::from_slice(text.as_bytes()).unwrap();
    assert_eq!(trail[0].as_object().unwrap().len(), 5);
}

#[test]
fn test_empty_key_is_rejected() {
    let (_, _, history) = components();

    let err = history.history("").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));
}

// --- Enumeration Failures ---

struct FailingLog;

impl LedgerLog for FailingLog {
    fn get_current(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put_current(&self, _key: &str, _payload: &[u8]) -> Result<TxId> {
        unreachable!("read-only test log")
    }

    fn delete_current(&self, _key: &str) -> Result<TxId> {
        unreachable!("read-only test log")
    }

    fn enumerate_history(&self, _key: &str) -> Result<HistoryIter<'_>> {
        Err(LedgerError::Enumeration("backend offline".to_string()))
    }
}

#[test]
fn test_enumeration_failure_aborts_the_query() {
    let history = HistoryReader::new(Arc::new(FailingLog));

    let err = history.history("any").unwrap_err();
    assert!(matches!(err, LedgerError::Enumeration(_)));
}

/// Yields one good entry, then fails mid-stream.
struct MidStreamFailLog;

impl LedgerLog for MidStreamFailLog {
    fn get_current(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put_current(&self, _key: &str, _payload: &[u8]) -> Result<TxId> {
        unreachable!("read-only test log")
    }

    fn delete_current(&self, _key: &str) -> Result<TxId> {
        unreachable!("read-only test log")
    }

    fn enumerate_history(&self, _key: &str) -> Result<HistoryIter<'_>> {
        let good = HistoryEntry {
            tx_id: TxId("tx-0".to_string()),
            payload: Some(b"{}".to_vec()),
            timestamp: CommitTimestamp {
                seconds: 0,
                nanos: 0,
            },
            is_delete: false,
        };
        Ok(Box::new(
            vec![
                Ok(good),
                Err(LedgerError::Enumeration("lost the log tail".to_string())),
            ]
            .into_iter(),
        ))
    }
}

#[test]
fn test_mid_stream_failure_returns_no_partial_results() {
    let history = HistoryReader::new(Arc::new(MidStreamFailLog));

    let err = history.history("any").unwrap_err();
    assert!(matches!(err, LedgerError::Enumeration(_)));
}
