//! External check tools: a per-file static checker and a project test runner.

use crate::error::AgentError;
use anyhow::Result;
use std::path::Path;
use std::process::Command;
use std::process::Output;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    /// Tool diagnostics; only meaningful when the check failed.
    pub diagnostics: String,
}

impl CheckOutcome {
    pub fn passed() -> Self {
        Self {
            passed: true,
            diagnostics: String::new(),
        }
    }

    pub fn failed(diagnostics: impl Into<String>) -> Self {
        Self {
            passed: false,
            diagnostics: diagnostics.into(),
        }
    }
}

pub trait StaticChecker: Send + Sync {
    /// File extension (without the dot) of the sources this checker accepts.
    fn extension(&self) -> &str;

    fn check(&self, file: &Path) -> Result<CheckOutcome>;
}

/// Runs the test suite under a project root and returns everything it printed.
/// Pass or fail is left to whoever reads the text.
pub trait TestRunner: Send + Sync {
    fn run_tests(&self, project: &Path) -> Result<String>;
}

fn run_command(program: &str, command: &mut Command) -> Result<Output> {
    tracing::debug!(program, ?command, "running external tool");
    command
        .output()
        .map_err(|err| AgentError::spawn(program, err).into())
}

/// `python -m py_compile <file>`.
#[derive(Debug, Clone)]
pub struct PyCompileChecker {
    interpreter: String,
}

impl PyCompileChecker {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for PyCompileChecker {
    fn default() -> Self {
        Self::new("python")
    }
}

impl StaticChecker for PyCompileChecker {
    fn extension(&self) -> &str {
        "py"
    }

    fn check(&self, file: &Path) -> Result<CheckOutcome> {
        let output = run_command(
            &self.interpreter,
            Command::new(&self.interpreter)
                .args(["-m", "py_compile"])
                .arg(file),
        )?;
        if output.status.success() {
            Ok(CheckOutcome::passed())
        } else {
            Ok(CheckOutcome::failed(String::from_utf8_lossy(
                &output.stderr,
            )))
        }
    }
}

/// `pytest -q <project>`.
#[derive(Debug, Clone)]
pub struct PytestRunner {
    program: String,
    args: Vec<String>,
}

impl PytestRunner {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for PytestRunner {
    fn default() -> Self {
        Self::new("pytest", ["-q"])
    }
}

impl TestRunner for PytestRunner {
    fn run_tests(&self, project: &Path) -> Result<String> {
        let output = run_command(
            &self.program,
            Command::new(&self.program).args(&self.args).arg(project),
        )?;
        let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
        report.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(report)
    }
}
