use crate::error::AgentResult;
use crate::llm::LanguageModel;
use crate::llm::Message;
use crate::memory::InMemoryStore;
use crate::memory::MemoryStore;
use crate::telemetry::record_actor_turn;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

/// Number of prior turns replayed to the model on every call.
pub const HISTORY_WINDOW: usize = 5;

const ECHO_PREFIX: &str = "Echo: ";

/// A named unit with an identity prompt, an optional model and bounded
/// conversational memory.
///
/// Short-term memory is always present and is keyed by the actor's name.
/// Long-term memory is optional and receives the same turns.
#[derive(Clone)]
pub struct Actor {
    name: String,
    system_prompt: String,
    model: Option<Arc<dyn LanguageModel>>,
    short_term: Arc<dyn MemoryStore>,
    long_term: Option<Arc<dyn MemoryStore>>,
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name)
            .field("has_model", &self.model.is_some())
            .field("has_long_term", &self.long_term.is_some())
            .finish_non_exhaustive()
    }
}

impl Actor {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            model: None,
            short_term: Arc::new(InMemoryStore::new()),
            long_term: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<Option<Arc<dyn LanguageModel>>>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_short_term(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.short_term = store;
        self
    }

    pub fn with_long_term(mut self, store: impl Into<Option<Arc<dyn MemoryStore>>>) -> Self {
        self.long_term = store.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn short_term(&self) -> &dyn MemoryStore {
        self.short_term.as_ref()
    }

    pub fn long_term(&self) -> Option<&dyn MemoryStore> {
        self.long_term.as_deref()
    }

    /// Identity prompt, then at most [`HISTORY_WINDOW`] recent turns oldest
    /// first, then `input`.
    pub fn build_messages(&self, input: &str) -> Vec<Message> {
        let history = self.short_term.get(&self.name);
        let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

        let mut messages = Vec::with_capacity(recent.len() * 2 + 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        for turn in recent {
            messages.push(Message::user(turn.user.as_str()));
            messages.push(Message::assistant(turn.assistant.as_str()));
        }
        messages.push(Message::user(input));
        messages
    }

    /// Produces a reply to `input` and records the exchange.
    ///
    /// Without a model the reply is a deterministic echo of the input. A model
    /// error is returned as is and nothing is recorded for the turn.
    pub fn run(&self, input: &str) -> Result<String> {
        let started = Instant::now();
        let messages = self.build_messages(input);
        let output = match &self.model {
            Some(model) => model.complete(&messages)?,
            None => format!("{ECHO_PREFIX}{input}"),
        };
        self.record(input, &output)?;

        let replayed = messages.len().saturating_sub(2) / 2;
        tracing::debug!(agent = %self.name, replayed, "actor turn recorded");
        record_actor_turn(&self.name, self.model.is_some(), replayed, started.elapsed());
        Ok(output)
    }

    /// Durable store first, so a failed save leaves short-term history as it was.
    fn record(&self, user: &str, assistant: &str) -> AgentResult<()> {
        if let Some(long_term) = &self.long_term {
            long_term.append(&self.name, user, assistant)?;
        }
        self.short_term.append(&self.name, user, assistant)
    }
}
