use crate::actor::Actor;
use crate::checks::PytestRunner;
use crate::checks::TestRunner;
use crate::traits::Agent;
use crate::traits::StageAgent;
use anyhow::Result;
use std::path::Path;
use std::path::PathBuf;

const TESTER_PROMPT: &str =
    "You are the Tester agent. Execute the code in a sandbox, run tests and report results.";

/// Execution-check stage: runs the project's test suite once and reports its output.
pub struct TesterAgent {
    actor: Actor,
    runner: Box<dyn TestRunner>,
}

impl TesterAgent {
    pub const NAME: &'static str = "tester";

    pub fn base_actor() -> Actor {
        Actor::new(Self::NAME, TESTER_PROMPT)
    }

    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            runner: Box::new(PytestRunner::default()),
        }
    }

    pub fn with_runner(mut self, runner: Box<dyn TestRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn test(&self, project: &Path) -> Result<String> {
        let report = self.runner.run_tests(project)?;
        self.run(&format!("Test results: {report}"))?;
        Ok(report)
    }
}

impl Default for TesterAgent {
    fn default() -> Self {
        Self::new(Self::base_actor())
    }
}

impl Agent for TesterAgent {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl StageAgent for TesterAgent {
    type Input = PathBuf;
    type Output = String;

    fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        self.test(&input)
    }
}
