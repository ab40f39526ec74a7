//! `entigen`: keeps the property doc blocks of Nextras ORM entities in step
//! with a schema definition, and scaffolds models and services.

mod commands;
mod context;

use clap::Parser;
use entigen::{Action, Outcome};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::context::{CliError, Context, Options};

/// Schema-driven annotation synchronizer for Nextras ORM entities.
#[derive(Parser, Debug)]
#[command(name = "entigen", version)]
struct Cli {
    #[command(flatten)]
    options: Options,

    /// Log every merge decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "entigen=debug" } else { "entigen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let context = Context::load(&cli.options)?;
    for outcome in commands::execute(&cli.command, &context)? {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    let word = format!("{:>9}", outcome.action.as_str());
    match outcome.action {
        Action::Created => println!("{} {}", word.green().bold(), outcome.path),
        Action::Updated => println!("{} {}", word.cyan().bold(), outcome.path),
        Action::Removed => println!("{} {}", word.yellow().bold(), outcome.path),
        Action::Unchanged | Action::Absent => println!("{} {}", word.dimmed(), outcome.path),
    }
}
