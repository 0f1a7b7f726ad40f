use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::to_string_pretty;
use specforge_agents::FileMemoryStore;
use specforge_agents::MemoryStore;
use specforge_agents::Pipeline;
use specforge_agents::spec_parser::read_config_tree;
use specforge_agents::spec_parser::read_operation_listing;
use specforge_agents::spec_parser::read_path_listing;

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Run configuration naming the route and event listings.
    pub config: PathBuf,

    /// JSON file that keeps every agent turn across runs.
    #[arg(long, short = 'm')]
    pub memory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ParseKind {
    Routes,
    Operations,
    Config,
}

#[derive(Debug, Parser)]
pub struct ParseArgs {
    #[arg(value_enum)]
    pub kind: ParseKind,

    pub file: PathBuf,
}

pub fn run(args: RunArgs) -> Result<()> {
    let RunArgs { config, memory } = args;

    let long_term = match memory {
        Some(path) => {
            tracing::debug!(memory = %path.display(), "using durable agent memory");
            let store: Arc<dyn MemoryStore> = Arc::new(FileMemoryStore::open(&path)?);
            Some(store)
        }
        None => None,
    };
    let pipeline = Pipeline::builder().long_term_memory(long_term).build();

    let report = pipeline.run(&config)?;
    tracing::info!(project = %report.project.display(), "workflow complete");
    eprintln!(
        "{} {}",
        "generated".green(),
        report.project.display().to_string().cyan()
    );
    println!("{}", report.summary());
    Ok(())
}

pub fn parse(args: ParseArgs) -> Result<()> {
    let ParseArgs { kind, file } = args;
    let json = match kind {
        ParseKind::Routes => to_string_pretty(&read_path_listing(&file)?)?,
        ParseKind::Operations => to_string_pretty(&read_operation_listing(&file)?)?,
        ParseKind::Config => to_string_pretty(&read_config_tree(&file)?)?,
    };
    println!("{json}");
    Ok(())
}
