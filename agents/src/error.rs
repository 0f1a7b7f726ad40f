use std::path::PathBuf;

use thiserror::Error;

pub type AgentResult<T, E = AgentError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("I/O error while accessing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode memory file {path:?}: {source}")]
    MemoryDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode memory file {path:?}: {source}")]
    MemoryEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("run configuration is missing required key `{0}`")]
    MissingConfigKey(&'static str),

    #[error("run configuration key `{key}` must be {expected}")]
    InvalidConfigValue {
        key: &'static str,
        expected: &'static str,
    },

    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl AgentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}
