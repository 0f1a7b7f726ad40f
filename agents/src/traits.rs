use crate::actor::Actor;
use anyhow::Result;

/// Capability shared by every pipeline agent: a conversational turn through
/// the underlying [`Actor`].
pub trait Agent {
    fn actor(&self) -> &Actor;

    fn name(&self) -> &str {
        self.actor().name()
    }

    fn instructions(&self) -> &str {
        self.actor().system_prompt()
    }

    fn run(&self, input: &str) -> Result<String> {
        self.actor().run(input)
    }
}

/// An agent that owns one pipeline stage.
pub trait StageAgent: Agent {
    type Input;
    type Output;

    fn execute(&self, input: Self::Input) -> Result<Self::Output>;
}
