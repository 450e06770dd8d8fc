use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use devorch::commands::{
    archive, commit_message, criteria, hash, output, phase_context, summary, tally, update_state,
    validate, verify_build, waves,
};
use devorch::completions::{write_completions, Shell};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devorch")]
#[command(about = "Plan parsing, validation and phase state for devorch workflows", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root holding .devorch/ (default: two levels above the plan's directory)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check plan structure and compute its integrity hash
    Validate {
        /// Path to the plan file
        #[arg(long)]
        plan: PathBuf,

        /// Embed the hash as a Validated marker when the plan passes
        #[arg(long)]
        stamp: bool,
    },

    /// Compare the plan hash with its embedded Validated marker
    Hash {
        #[arg(long)]
        plan: PathBuf,
    },

    /// List the waves and tasks of a phase
    Waves {
        #[arg(long)]
        plan: PathBuf,

        #[arg(long)]
        phase: u32,
    },

    /// Assemble the execution context for a phase
    PhaseContext {
        #[arg(long)]
        plan: PathBuf,

        #[arg(long)]
        phase: u32,

        /// Read the explore cache from <CACHE_ROOT>/.devorch/ instead
        #[arg(long)]
        cache_root: Option<PathBuf>,
    },

    /// Extract acceptance criteria and validation commands
    Criteria {
        #[arg(long)]
        plan: PathBuf,
    },

    /// Tally criteria against recorded progress
    Tally {
        #[arg(long)]
        plan: PathBuf,
    },

    /// Record a completed phase in .devorch/state.md
    UpdateState {
        #[arg(long)]
        plan: PathBuf,

        #[arg(long)]
        phase: u32,

        /// Summary of what the phase delivered
        #[arg(long)]
        summary: String,

        /// Status to record, e.g. "ready for next phase" or "completed"
        #[arg(long)]
        status: String,
    },

    /// Check that declared new files exist and are not stubs
    VerifyBuild {
        #[arg(long)]
        plan: PathBuf,

        /// Directory new-file paths are relative to (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Format the commit message for a phase
    CommitMessage {
        #[arg(long)]
        phase: u32,

        /// Take the goal from this plan's phase
        #[arg(long, required_unless_present = "goal")]
        plan: Option<PathBuf>,

        /// Use this goal text directly
        #[arg(long)]
        goal: Option<String>,
    },

    /// Write .devorch/build-summary.md
    Summary {
        #[arg(long)]
        plan: PathBuf,
    },

    /// Move the plan into its archive directory
    Archive {
        #[arg(long)]
        plan: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let result = match Cli::try_parse() {
        Ok(cli) => run(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(usage_error(&e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            println!("{}", output::error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// First line of a clap usage error, without its `error: ` prefix.
fn usage_error(err: &clap::Error) -> anyhow::Error {
    let rendered = err.render().to_string();
    let line = rendered.lines().next().unwrap_or_default();
    anyhow::anyhow!("{}", line.strip_prefix("error: ").unwrap_or(line).trim())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DEVORCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let pretty = cli.pretty;
    let project_root = cli
        .project_root
        .or_else(|| env::var_os("DEVORCH_PROJECT_ROOT").map(PathBuf::from));
    let root = project_root.as_deref();

    match cli.command {
        Commands::Validate { plan, stamp } => output::emit(&validate::execute(&plan, stamp)?, pretty),
        Commands::Hash { plan } => output::emit(&hash::execute(&plan)?, pretty),
        Commands::Waves { plan, phase } => output::emit(&waves::execute(&plan, phase)?, pretty),
        Commands::PhaseContext {
            plan,
            phase,
            cache_root,
        } => output::emit(
            &phase_context::execute(&plan, phase, cache_root.as_deref(), root)?,
            pretty,
        ),
        Commands::Criteria { plan } => output::emit(&criteria::execute(&plan)?, pretty),
        Commands::Tally { plan } => output::emit(&tally::execute(&plan, root)?, pretty),
        Commands::UpdateState {
            plan,
            phase,
            summary,
            status,
        } => output::emit(
            &update_state::execute(&plan, phase, &status, &summary, root)?,
            pretty,
        ),
        Commands::VerifyBuild { plan, root: files_root } => output::emit(
            &verify_build::execute(&plan, files_root.as_deref(), root)?,
            pretty,
        ),
        Commands::CommitMessage { phase, plan, goal } => output::emit(
            &commit_message::execute(phase, plan.as_deref(), goal.as_deref(), root)?,
            pretty,
        ),
        Commands::Summary { plan } => output::emit(&summary::execute(&plan, root)?, pretty),
        Commands::Archive { plan } => output::emit(&archive::execute(&plan)?, pretty),
        Commands::Completions { shell } => {
            let shell = Shell::from_str(&shell)?;
            let mut cmd = Cli::command();
            write_completions(&mut cmd, shell, &mut io::stdout());
            Ok(())
        }
    }
}
