//! Per-actor conversation history.
//!
//! Two stores share one contract: [`InMemoryStore`] lives as long as the
//! process, [`FileMemoryStore`] mirrors its whole contents to a JSON file after
//! every append.

use crate::error::AgentError;
use crate::error::AgentResult;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::sync::PoisonError;
use std::sync::RwLock;

/// One exchange: what the actor was asked and what it answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

type TurnLog = BTreeMap<String, Vec<Turn>>;

pub trait MemoryStore: Send + Sync {
    fn append(&self, key: &str, user: &str, assistant: &str) -> AgentResult<()>;

    /// Turns recorded under `key`, oldest first. Unknown keys yield an empty list.
    fn get(&self, key: &str) -> Vec<Turn>;
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    turns: RwLock<TurnLog>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for InMemoryStore {
    fn append(&self, key: &str, user: &str, assistant: &str) -> AgentResult<()> {
        let mut turns = self.turns.write().unwrap_or_else(PoisonError::into_inner);
        turns
            .entry(key.to_string())
            .or_default()
            .push(Turn::new(user, assistant));
        Ok(())
    }

    fn get(&self, key: &str) -> Vec<Turn> {
        let turns = self.turns.read().unwrap_or_else(PoisonError::into_inner);
        turns.get(key).cloned().unwrap_or_default()
    }
}

/// Durable store backed by a single JSON file.
///
/// The file is read once in [`FileMemoryStore::open`] and rewritten in full on
/// every [`MemoryStore::append`]. Nothing coordinates separate processes: two
/// stores opened on the same path overwrite each other and the last rewrite
/// wins.
#[derive(Debug)]
pub struct FileMemoryStore {
    path: PathBuf,
    turns: RwLock<TurnLog>,
}

impl FileMemoryStore {
    /// Loads `path`, starting empty when the file does not exist yet. Any other
    /// read error, or content that is not a valid memory document, is returned.
    pub fn open(path: impl Into<PathBuf>) -> AgentResult<Self> {
        let path = path.into();
        let turns = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                AgentError::MemoryDecode {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => TurnLog::new(),
            Err(err) => return Err(AgentError::io(path, err)),
        };
        tracing::debug!(path = %path.display(), keys = turns.len(), "opened memory file");
        Ok(Self {
            path,
            turns: RwLock::new(turns),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, turns: &TurnLog) -> AgentResult<()> {
        let encoded =
            serde_json::to_string_pretty(turns).map_err(|source| AgentError::MemoryEncode {
                path: self.path.clone(),
                source,
            })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| AgentError::io(parent, err))?;
        }
        fs::write(&self.path, encoded).map_err(|err| AgentError::io(&self.path, err))
    }
}

impl MemoryStore for FileMemoryStore {
    fn append(&self, key: &str, user: &str, assistant: &str) -> AgentResult<()> {
        let mut turns = self.turns.write().unwrap_or_else(PoisonError::into_inner);
        turns
            .entry(key.to_string())
            .or_default()
            .push(Turn::new(user, assistant));
        let persisted = self.persist(&turns);
        if persisted.is_err() {
            // Memory must not hold a turn the file does not.
            if let Some(log) = turns.get_mut(key) {
                log.pop();
                if log.is_empty() {
                    turns.remove(key);
                }
            }
        }
        persisted
    }

    fn get(&self, key: &str) -> Vec<Turn> {
        let turns = self.turns.read().unwrap_or_else(PoisonError::into_inner);
        turns.get(key).cloned().unwrap_or_default()
    }
}
