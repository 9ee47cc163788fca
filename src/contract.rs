//! Named-operation dispatch surface.
//!
//! Mirrors the invoking environment's contract: each operation takes a flat
//! list of string arguments and returns bytes on success or an error whose
//! message goes back to the caller. Arity is checked before any state
//! access.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::history::HistoryReader;
use crate::log::LedgerLog;
use crate::state::StateStore;

/// Readiness message returned by `initLedger`.
const INIT_MESSAGE: &[u8] = b"Ledger initialized successfully";

/// The ledger operations, dispatched by name over an injected log backend.
pub struct HashContract<L: LedgerLog> {
    state: StateStore<L>,
    history: HistoryReader<L>,
}

impl<L: LedgerLog> HashContract<L> {
    pub fn new(log: Arc<L>) -> Self {
        Self {
            state: StateStore::new(Arc::clone(&log)),
            history: HistoryReader::new(log),
        }
    }

    /// Dispatch an operation by name.
    pub fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        info!(%function, args = args.len(), "invoking ledger function");

        match function {
            "initLedger" => self.init_ledger(),
            "getHash" => self.get_hash(args),
            "postHash" => self.post_hash(args),
            "putHash" => self.put_hash(args),
            "getHistory" => self.get_history(args),
            _ => Err(LedgerError::UnknownFunction(function.to_string())),
        }
    }

    /// `initLedger`: the ledger needs no seeding; reports readiness.
    pub fn init_ledger(&self) -> Result<Vec<u8>> {
        info!("initializing ledger");
        Ok(INIT_MESSAGE.to_vec())
    }

    /// `getHash(key)`: current payload for the key, empty bytes when
    /// absent.
    pub fn get_hash(&self, args: &[String]) -> Result<Vec<u8>> {
        require_arity(args, 1)?;
        Ok(self.state.read(&args[0])?.unwrap_or_default())
    }

    /// `postHash(key, hash)`: unconditional upsert.
    pub fn post_hash(&self, args: &[String]) -> Result<Vec<u8>> {
        require_arity(args, 2)?;
        self.state.create(&args[0], &args[1])
    }

    /// `putHash(key, hash)`: tolerant-decode update.
    pub fn put_hash(&self, args: &[String]) -> Result<Vec<u8>> {
        require_arity(args, 2)?;
        self.state.update(&args[0], &args[1])
    }

    /// `getHistory(key)`: the key's audit trail as a JSON array, oldest
    /// first. Extra arguments are ignored.
    pub fn get_history(&self, args: &[String]) -> Result<Vec<u8>> {
        if args.is_empty() {
            return Err(LedgerError::Arity {
                expected: 1,
                got: 0,
            });
        }

        let payload = self.history.history_json(&args[0])?;
        debug!(size = payload.len(), "history payload assembled");
        Ok(payload)
    }
}

fn require_arity(args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(LedgerError::Arity {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}
