use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::ParseArgs;
use commands::RunArgs;

#[derive(Debug, Parser)]
#[command(name = "specforge")]
#[command(about = "Generate, verify and test an API project from route and event listings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the generate, verify and check workflow for a run configuration.
    Run(RunArgs),

    /// Parse a listing or configuration file and print it as JSON.
    Parse(ParseArgs),
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("specforge={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => commands::run(args),
        Command::Parse(args) => commands::parse(args),
    }
}
