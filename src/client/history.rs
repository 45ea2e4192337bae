//! Bounded, file-backed log of messages the holder has signed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::common::types::{SignedMessage, VerificationResult};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file error: {0}")]
    Io(#[from] io::Error),
    #[error("history file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct MessageHistory {
    path: PathBuf,
    limit: usize,
    entries: Vec<SignedMessage>,
}

impl MessageHistory {
    /// Opens the history at `path`. A missing file is an empty history.
    pub fn load(path: impl AsRef<Path>, limit: usize) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let mut history = Self {
            path,
            limit: limit.max(1),
            entries,
        };
        history.evict();
        Ok(history)
    }

    /// Oldest first.
    pub fn entries(&self) -> &[SignedMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&SignedMessage> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Appends an entry, dropping the oldest ones past the limit.
    pub fn append(&mut self, entry: SignedMessage) -> Result<(), HistoryError> {
        self.entries.push(entry);
        self.evict();
        self.save()
    }

    /// Stores the verifier's answer on entry `id`. Returns `false` if the
    /// entry is no longer in the history.
    pub fn record_verification(
        &mut self,
        id: Uuid,
        result: &VerificationResult,
    ) -> Result<bool, HistoryError> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(false);
        };
        entry.verified = Some(result.is_valid);
        entry.signer = Some(result.signer.clone());
        self.save()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        self.save()
    }

    fn evict(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }

    // Write to a sibling file and rename so a crash never leaves half a file.
    fn save(&self) -> Result<(), HistoryError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
