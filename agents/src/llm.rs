//! Boundary to whatever produces actor replies.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Turns a message history into reply text. Errors are passed through to the
/// caller of the actor untouched.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, messages: &[Message]) -> anyhow::Result<String>;
}

impl<F> LanguageModel for F
where
    F: Fn(&[Message]) -> anyhow::Result<String> + Send + Sync,
{
    fn complete(&self, messages: &[Message]) -> anyhow::Result<String> {
        self(messages)
    }
}
