//! Spec-driven API generation: listing parsers, memory-backed actors and the
//! generate → verify → check pipeline that coordinates them.

mod actor;
mod checks;
mod coder;
mod error;
mod generator;
mod llm;
mod memory;
pub mod pipeline;
pub mod spec_parser;
mod telemetry;
mod tester;
mod traits;
mod verifier;

pub use actor::Actor;
pub use actor::HISTORY_WINDOW;
pub use checks::CheckOutcome;
pub use checks::PyCompileChecker;
pub use checks::PytestRunner;
pub use checks::StaticChecker;
pub use checks::TestRunner;
pub use coder::CoderAgent;
pub use error::AgentError;
pub use error::AgentResult;
pub use generator::CodeGenerator;
pub use generator::FastApiGenerator;
pub use generator::FastApiTemplates;
pub use generator::Features;
pub use generator::GenerationRequest;
pub use llm::LanguageModel;
pub use llm::Message;
pub use llm::Role;
pub use memory::FileMemoryStore;
pub use memory::InMemoryStore;
pub use memory::MemoryStore;
pub use memory::Turn;
pub use pipeline::Pipeline;
pub use pipeline::PipelineBuilder;
pub use pipeline::PipelineReport;
pub use pipeline::PipelineStage;
pub use pipeline::RunConfig;
pub use pipeline::run_workflow;
pub use tester::TesterAgent;
pub use traits::Agent;
pub use traits::StageAgent;
pub use verifier::ALL_FILES_COMPILE;
pub use verifier::VerifierAgent;
