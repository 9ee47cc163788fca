//! Durable single-file log backend.
//!
//! Entries are framed as `[u32 len][u32 crc32][json bytes]` after a
//! magic/version header. On open the journal is replayed to rebuild the
//! current-value map and a per-key offset index; history enumeration reads
//! entries back from disk by offset.

use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::log::{HistoryIter, LedgerLog};
use crate::types::{CommitTimestamp, HistoryEntry, TxId};

/// Magic bytes for the journal file.
const JOURNAL_MAGIC: &[u8; 4] = b"HLG\0";

/// Current journal format version.
const JOURNAL_VERSION: u8 = 1;

/// Header size: magic + version.
const HEADER_SIZE: u64 = 5;

/// Frame header size: payload length + CRC32.
const FRAME_HEADER_SIZE: u64 = 8;

/// One persisted journal entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct JournalEntry {
    key: String,
    tx_id: TxId,
    payload: Option<Vec<u8>>,
    timestamp: CommitTimestamp,
    is_delete: bool,
}

/// Durable append-only log over a single journal file.
///
/// Holds an exclusive advisory lock for its lifetime; a second open of the
/// same journal fails with [`LedgerError::Locked`].
pub struct JournalLog {
    path: PathBuf,

    /// Lock file for exclusive access.
    _lock_file: File,

    /// Journal file handle.
    file: Mutex<File>,

    /// Current file size (for appending).
    file_size: RwLock<u64>,

    /// Total entries appended, used as the commit sequence.
    commits: RwLock<u64>,

    /// Current value per key.
    current: RwLock<HashMap<String, Vec<u8>>>,

    /// Per-key entry offsets, in commit order.
    offsets: RwLock<HashMap<String, Vec<u64>>>,
}

impl JournalLog {
    /// Open an existing journal or create a new one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = Self::acquire_lock(&path)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len == 0 {
            file.write_all(JOURNAL_MAGIC)?;
            file.write_all(&[JOURNAL_VERSION])?;
            file.sync_all()?;
        } else {
            Self::verify_header(&mut file)?;
        }

        let journal = Self {
            path,
            _lock_file: lock_file,
            file: Mutex::new(file),
            file_size: RwLock::new(HEADER_SIZE.max(len)),
            commits: RwLock::new(0),
            current: RwLock::new(HashMap::new()),
            offsets: RwLock::new(HashMap::new()),
        };
        journal.replay()?;

        debug!(path = %journal.path.display(), commits = *journal.commits.read(), "opened journal");
        Ok(journal)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(path.with_extension("lock"))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| LedgerError::Locked)?;
        Ok(lock_file)
    }

    fn verify_header(file: &mut File) -> Result<()> {
        file.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if &magic != JOURNAL_MAGIC {
            return Err(LedgerError::InvalidFormat("bad journal magic".into()));
        }

        let mut version = [0u8; 1];
        file.read_exact(&mut version)?;
        if version[0] != JOURNAL_VERSION {
            return Err(LedgerError::InvalidFormat(format!(
                "unsupported journal version: {}",
                version[0]
            )));
        }

        Ok(())
    }

    /// Rebuild the current map and offset index from disk.
    fn replay(&self) -> Result<()> {
        let end = *self.file_size.read();
        let mut file = self.file.lock();

        let mut offset = HEADER_SIZE;
        let mut commits = 0u64;

        while offset < end {
            let (entry, next) = Self::read_frame(&mut file, offset)?;

            self.offsets
                .write()
                .entry(entry.key.clone())
                .or_default()
                .push(offset);

            if entry.is_delete {
                self.current.write().remove(&entry.key);
            } else if let Some(payload) = entry.payload {
                self.current.write().insert(entry.key, payload);
            }

            commits += 1;
            offset = next;
        }

        *self.commits.write() = commits;
        Ok(())
    }

    /// Read one framed entry at `offset`, returning it and the offset of
    /// the next frame.
    fn read_frame(file: &mut File, offset: u64) -> Result<(JournalEntry, u64)> {
        file.seek(SeekFrom::Start(offset))?;

        let mut len_bytes = [0u8; 4];
        file.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        let mut crc_bytes = [0u8; 4];
        file.read_exact(&mut crc_bytes)?;
        let expected = u32::from_le_bytes(crc_bytes);

        let mut body = vec![0u8; len];
        file.read_exact(&mut body)?;

        let got = crc32fast::hash(&body);
        if got != expected {
            return Err(LedgerError::ChecksumMismatch { expected, got });
        }

        let entry: JournalEntry = serde_json::from_slice(&body)
            .map_err(|e| LedgerError::Corruption(format!("undecodable journal entry: {}", e)))?;

        Ok((entry, offset + FRAME_HEADER_SIZE + len as u64))
    }

    fn append(&self, key: &str, payload: Option<&[u8]>) -> Result<TxId> {
        let sequence = *self.commits.read();
        let tx_id = TxId::derive(key, sequence, payload.unwrap_or_default());

        let entry = JournalEntry {
            key: key.to_string(),
            tx_id: tx_id.clone(),
            payload: payload.map(|b| b.to_vec()),
            timestamp: CommitTimestamp::now(),
            is_delete: payload.is_none(),
        };

        let body = serde_json::to_vec(&entry)?;
        let crc = crc32fast::hash(&body);

        let mut file = self.file.lock();
        let offset = *self.file_size.read();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&(body.len() as u32).to_le_bytes())?;
        file.write_all(&crc.to_le_bytes())?;
        file.write_all(&body)?;
        file.sync_all()?;

        *self.file_size.write() = offset + FRAME_HEADER_SIZE + body.len() as u64;
        *self.commits.write() = sequence + 1;

        self.offsets
            .write()
            .entry(key.to_string())
            .or_default()
            .push(offset);

        match payload {
            Some(bytes) => {
                self.current.write().insert(key.to_string(), bytes.to_vec());
            }
            None => {
                self.current.write().remove(key);
            }
        }

        debug!(%key, offset, delete = entry.is_delete, "appended journal entry");
        Ok(tx_id)
    }
}

impl LedgerLog for JournalLog {
    fn get_current(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.current.read().get(key).cloned())
    }

    fn put_current(&self, key: &str, payload: &[u8]) -> Result<TxId> {
        self.append(key, Some(payload))
    }

    fn delete_current(&self, key: &str) -> Result<TxId> {
        self.append(key, None)
    }

    fn enumerate_history(&self, key: &str) -> Result<HistoryIter<'_>> {
        let offsets = self.offsets.read().get(key).cloned().unwrap_or_default();
        Ok(Box::new(offsets.into_iter().map(move |offset| {
            let mut file = self.file.lock();
            let (entry, _) = Self::read_frame(&mut file, offset)?;
            Ok(HistoryEntry {
                tx_id: entry.tx_id,
                payload: entry.payload,
                timestamp: entry.timestamp,
                is_delete: entry.is_delete,
            })
        })))
    }
}
