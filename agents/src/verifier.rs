use crate::actor::Actor;
use crate::checks::PyCompileChecker;
use crate::checks::StaticChecker;
use crate::traits::Agent;
use crate::traits::StageAgent;
use anyhow::Result;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

const VERIFIER_PROMPT: &str = "You are the Verifier agent. Check the generated API code for quality, \
correctness and adherence to requirements. Provide detailed feedback.";

/// Report used when no checked file failed.
pub const ALL_FILES_COMPILE: &str = "All files compile";

/// Verification stage: statically checks every source file under a project.
/// Failing checks end up in the report, never in an error.
pub struct VerifierAgent {
    actor: Actor,
    checker: Box<dyn StaticChecker>,
}

impl VerifierAgent {
    pub const NAME: &'static str = "verifier";

    pub fn base_actor() -> Actor {
        Actor::new(Self::NAME, VERIFIER_PROMPT)
    }

    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            checker: Box::new(PyCompileChecker::default()),
        }
    }

    pub fn with_checker(mut self, checker: Box<dyn StaticChecker>) -> Self {
        self.checker = checker;
        self
    }

    fn collect_sources(&self, project: &Path) -> Result<Vec<PathBuf>> {
        let extension = self.checker.extension();
        let mut files = Vec::new();
        for entry in WalkDir::new(project).sort_by_file_name() {
            let entry = entry?;
            let matches = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == extension);
            if entry.file_type().is_file() && matches {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    pub fn verify(&self, project: &Path) -> Result<String> {
        let files = self.collect_sources(project)?;
        let mut failures = Vec::new();
        for file in &files {
            let outcome = self.checker.check(file)?;
            if !outcome.passed {
                tracing::warn!(file = %file.display(), "static check failed");
                failures.push(outcome.diagnostics);
            }
        }
        tracing::info!(
            checked = files.len(),
            failed = failures.len(),
            "verification finished"
        );

        let report = if failures.is_empty() {
            ALL_FILES_COMPILE.to_string()
        } else {
            failures.join("\n")
        };
        self.run(&format!("Verification result: {report}"))?;
        Ok(report)
    }
}

impl Default for VerifierAgent {
    fn default() -> Self {
        Self::new(Self::base_actor())
    }
}

impl Agent for VerifierAgent {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl StageAgent for VerifierAgent {
    type Input = PathBuf;
    type Output = String;

    fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        self.verify(&input)
    }
}
