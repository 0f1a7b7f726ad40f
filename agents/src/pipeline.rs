//! The fixed generate → verify → check workflow driven by a run configuration.
//!
//! Stages run strictly in order with no retry. Any collaborator failure ends
//! the run with an error; static-check failures and failing tests are reported
//! as text instead.

use crate::actor::Actor;
use crate::checks::StaticChecker;
use crate::checks::TestRunner;
use crate::coder::CoderAgent;
use crate::error::AgentError;
use crate::error::AgentResult;
use crate::generator::CodeGenerator;
use crate::generator::Features;
use crate::generator::GenerationRequest;
use crate::llm::LanguageModel;
use crate::memory::MemoryStore;
use crate::spec_parser::ConfigScalar;
use crate::spec_parser::ConfigTree;
use crate::spec_parser::ConfigValue;
use crate::spec_parser::read_config_tree;
use crate::tester::TesterAgent;
use crate::traits::StageAgent;
use crate::verifier::VerifierAgent;
use anyhow::Result;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_OUTPUT_DIR: &str = "build";

const OPENAPI_KEY: &str = "openapi";
const ASYNCIO_KEY: &str = "asyncio";
const FEATURES_KEY: &str = "features";
const OUTPUT_KEY: &str = "output";

/// Typed view of the run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub openapi: PathBuf,
    pub asyncio: PathBuf,
    pub features: Features,
    pub output: PathBuf,
}

impl RunConfig {
    pub fn load(path: &Path) -> AgentResult<Self> {
        Self::from_tree(&read_config_tree(path)?)
    }

    pub fn from_tree(tree: &ConfigTree) -> AgentResult<Self> {
        let openapi =
            optional_path(tree, OPENAPI_KEY)?.ok_or(AgentError::MissingConfigKey(OPENAPI_KEY))?;
        let asyncio =
            optional_path(tree, ASYNCIO_KEY)?.ok_or(AgentError::MissingConfigKey(ASYNCIO_KEY))?;
        let output =
            optional_path(tree, OUTPUT_KEY)?.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let features = match tree.get(FEATURES_KEY) {
            None => Features::default(),
            Some(ConfigValue::Map(map)) => Features::from_map(map),
            Some(ConfigValue::Scalar(_)) => {
                return Err(AgentError::InvalidConfigValue {
                    key: FEATURES_KEY,
                    expected: "a nested map",
                });
            }
        };
        Ok(Self {
            openapi,
            asyncio,
            features,
            output,
        })
    }

    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            openapi: self.openapi.clone(),
            asyncio: self.asyncio.clone(),
            output_dir: self.output.clone(),
            features: self.features,
        }
    }
}

fn optional_path(tree: &ConfigTree, key: &'static str) -> AgentResult<Option<PathBuf>> {
    match tree.get(key) {
        None => Ok(None),
        Some(ConfigValue::Scalar(ConfigScalar::Text(value))) => Ok(Some(PathBuf::from(value))),
        Some(_) => Err(AgentError::InvalidConfigValue {
            key,
            expected: "a path",
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ParseConfig,
    Generate,
    Verify,
    Check,
    Done,
}

impl PipelineStage {
    /// Following stage; `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::ParseConfig => Self::Generate,
            Self::Generate => Self::Verify,
            Self::Verify => Self::Check,
            Self::Check | Self::Done => Self::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseConfig => "parse-config",
            Self::Generate => "generate",
            Self::Verify => "verify",
            Self::Check => "check",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub project: PathBuf,
    pub verification: String,
    pub tests: String,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        format!(
            "Verification:\n{}\nTest Results:\n{}",
            self.verification, self.tests
        )
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    model: Option<Arc<dyn LanguageModel>>,
    long_term: Option<Arc<dyn MemoryStore>>,
    generator: Option<Box<dyn CodeGenerator>>,
    checker: Option<Box<dyn StaticChecker>>,
    runner: Option<Box<dyn TestRunner>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<Option<Arc<dyn LanguageModel>>>) -> Self {
        self.model = model.into();
        self
    }

    /// One durable store shared by all three agents.
    pub fn long_term_memory(mut self, store: impl Into<Option<Arc<dyn MemoryStore>>>) -> Self {
        self.long_term = store.into();
        self
    }

    pub fn generator(mut self, generator: Box<dyn CodeGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn checker(mut self, checker: Box<dyn StaticChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    pub fn runner(mut self, runner: Box<dyn TestRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    fn configure(&self, actor: Actor) -> Actor {
        actor
            .with_model(self.model.clone())
            .with_long_term(self.long_term.clone())
    }

    pub fn build(self) -> Pipeline {
        let mut coder = CoderAgent::new(self.configure(CoderAgent::base_actor()));
        let mut verifier = VerifierAgent::new(self.configure(VerifierAgent::base_actor()));
        let mut tester = TesterAgent::new(self.configure(TesterAgent::base_actor()));
        if let Some(generator) = self.generator {
            coder = coder.with_generator(generator);
        }
        if let Some(checker) = self.checker {
            verifier = verifier.with_checker(checker);
        }
        if let Some(runner) = self.runner {
            tester = tester.with_runner(runner);
        }
        Pipeline {
            coder,
            verifier,
            tester,
        }
    }
}

/// The three agents of one run. Each owns its short-term memory, so a fresh
/// pipeline starts without history.
pub struct Pipeline {
    coder: CoderAgent,
    verifier: VerifierAgent,
    tester: TesterAgent,
}

impl Pipeline {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        PipelineBuilder::new().model(model).build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn coder(&self) -> &CoderAgent {
        &self.coder
    }

    pub fn verifier(&self) -> &VerifierAgent {
        &self.verifier
    }

    pub fn tester(&self) -> &TesterAgent {
        &self.tester
    }

    pub fn run(&self, config_path: &Path) -> Result<PipelineReport> {
        tracing::info!(
            stage = %PipelineStage::ParseConfig,
            config = %config_path.display(),
            "pipeline stage started"
        );
        let config = RunConfig::load(config_path)?;
        self.run_config(&config)
    }

    pub fn run_config(&self, config: &RunConfig) -> Result<PipelineReport> {
        let project = run_stage(
            PipelineStage::Generate,
            &self.coder,
            config.generation_request(),
        )?;
        let verification = run_stage(PipelineStage::Verify, &self.verifier, project.clone())?;
        let tests = run_stage(PipelineStage::Check, &self.tester, project.clone())?;
        tracing::info!(stage = %PipelineStage::Done, project = %project.display(), "pipeline finished");
        Ok(PipelineReport {
            project,
            verification,
            tests,
        })
    }
}

fn run_stage<A: StageAgent>(stage: PipelineStage, agent: &A, input: A::Input) -> Result<A::Output> {
    tracing::info!(%stage, agent = agent.name(), "pipeline stage started");
    let output = agent.execute(input)?;
    tracing::debug!(%stage, next = %stage.next(), "pipeline stage completed");
    Ok(output)
}

/// Runs the whole workflow for the configuration at `config_path` and returns
/// the labelled summary.
pub fn run_workflow(config_path: &Path, model: Option<Arc<dyn LanguageModel>>) -> Result<String> {
    Pipeline::new(model)
        .run(config_path)
        .map(|report| report.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec_parser::parse_config_tree;
    use pretty_assertions::assert_eq;

    #[test]
    fn stages_advance_in_fixed_order() {
        let mut stage = PipelineStage::ParseConfig;
        let mut seen = vec![stage];
        while stage != PipelineStage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                PipelineStage::ParseConfig,
                PipelineStage::Generate,
                PipelineStage::Verify,
                PipelineStage::Check,
                PipelineStage::Done,
            ]
        );
        assert_eq!(PipelineStage::Done.next(), PipelineStage::Done);
    }

    #[test]
    fn run_config_defaults() {
        let tree = parse_config_tree("openapi: a.spec\nasyncio: b.spec\n");
        let config = RunConfig::from_tree(&tree).unwrap();
        assert_eq!(
            config,
            RunConfig {
                openapi: PathBuf::from("a.spec"),
                asyncio: PathBuf::from("b.spec"),
                features: Features::default(),
                output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            }
        );
    }

    #[test]
    fn run_config_reads_features_and_output() {
        let tree = parse_config_tree(
            "openapi: a.spec\nasyncio: b.spec\nfeatures:\n  observability: true\noutput: out\n",
        );
        let config = RunConfig::from_tree(&tree).unwrap();
        assert!(config.features.observability);
        assert_eq!(config.output, PathBuf::from("out"));
    }

    #[test]
    fn run_config_requires_both_listings() {
        let err = RunConfig::from_tree(&parse_config_tree("openapi: a.spec\n")).unwrap_err();
        assert!(matches!(err, AgentError::MissingConfigKey("asyncio")));
        let err = RunConfig::from_tree(&parse_config_tree("asyncio: b.spec\n")).unwrap_err();
        assert!(matches!(err, AgentError::MissingConfigKey("openapi")));
    }

    #[test]
    fn run_config_rejects_wrong_shapes() {
        let err = RunConfig::from_tree(&parse_config_tree("openapi: true\nasyncio: b\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidConfigValue { key: "openapi", .. }
        ));
        let err = RunConfig::from_tree(&parse_config_tree(
            "openapi: a\nasyncio: b\nfeatures: on\n",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidConfigValue { key: "features", .. }
        ));
    }

    #[test]
    fn summary_uses_labelled_sections() {
        let report = PipelineReport {
            project: PathBuf::from("build/generated_api"),
            verification: "All files compile".to_string(),
            tests: "1 passed".to_string(),
        };
        assert_eq!(
            report.summary(),
            "Verification:\nAll files compile\nTest Results:\n1 passed"
        );
    }
}
