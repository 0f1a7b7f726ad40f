use crate::actor::Actor;
use crate::generator::CodeGenerator;
use crate::generator::FastApiGenerator;
use crate::generator::Features;
use crate::generator::GenerationRequest;
use crate::traits::Agent;
use crate::traits::StageAgent;
use anyhow::Result;
use std::path::Path;
use std::path::PathBuf;

const CODER_PROMPT: &str = "You are the Coder agent. Generate high quality API code using the given \
OpenAPI and AsyncIO specifications. Adhere to best practices and write production ready code.";

/// Generation stage: records the request, then hands it to a [`CodeGenerator`].
pub struct CoderAgent {
    actor: Actor,
    generator: Box<dyn CodeGenerator>,
}

impl CoderAgent {
    pub const NAME: &'static str = "coder";

    pub fn base_actor() -> Actor {
        Actor::new(Self::NAME, CODER_PROMPT)
    }

    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            generator: Box::new(FastApiGenerator::default()),
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Returns the root of the generated project.
    pub fn generate(
        &self,
        openapi: &Path,
        asyncio: &Path,
        output_dir: &Path,
        features: Features,
    ) -> Result<PathBuf> {
        // The reply is only kept in memory; generation is template driven.
        self.run(&format!(
            "Generate API for {} and {}",
            openapi.display(),
            asyncio.display()
        ))?;
        self.generator.generate(&GenerationRequest {
            openapi: openapi.to_path_buf(),
            asyncio: asyncio.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            features,
        })
    }
}

impl Default for CoderAgent {
    fn default() -> Self {
        Self::new(Self::base_actor())
    }
}

impl Agent for CoderAgent {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl StageAgent for CoderAgent {
    type Input = GenerationRequest;
    type Output = PathBuf;

    fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        self.generate(
            &input.openapi,
            &input.asyncio,
            &input.output_dir,
            input.features,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Turn;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGenerator {
        requests: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    impl CodeGenerator for RecordingGenerator {
        fn generate(&self, request: &GenerationRequest) -> Result<PathBuf> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(request.output_dir.join("project"))
        }
    }

    #[test]
    fn records_turn_then_delegates() {
        let generator = RecordingGenerator::default();
        let requests = Arc::clone(&generator.requests);
        let coder = CoderAgent::default().with_generator(Box::new(generator));

        let root = coder
            .generate(
                Path::new("a.spec"),
                Path::new("b.spec"),
                Path::new("out"),
                Features { observability: true },
            )
            .unwrap();

        assert_eq!(root, Path::new("out").join("project"));
        assert_eq!(
            requests.lock().unwrap()[0].features,
            Features { observability: true }
        );
        assert_eq!(
            coder.actor().short_term().get(CoderAgent::NAME),
            vec![Turn::new(
                "Generate API for a.spec and b.spec",
                "Echo: Generate API for a.spec and b.spec"
            )]
        );
    }
}
