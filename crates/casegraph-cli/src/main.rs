#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;
mod view;

use casegraph_core::config::{self, EffectiveConfig};
use casegraph_core::{CaseManager, CaseStore};
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "casegraph: track cases and the values they share",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Path to the case database (overrides CASEGRAPH_DB and config files).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self, config_output: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, config_output)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "List every case",
        after_help = "EXAMPLES:\n    casegraph list\n    casegraph list --format json"
    )]
    List,

    #[command(
        about = "Record a new case",
        after_help = "EXAMPLES:\n    casegraph add --username alice --hostname ws-01 --staff-id 007"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        about = "Rewrite a case; omitted fields keep their current value",
        after_help = "EXAMPLES:\n    casegraph edit 3 --hostname ws-02\n    casegraph edit 3 --email \"\""
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        about = "Delete a case",
        after_help = "EXAMPLES:\n    casegraph delete 3"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        about = "Show cases linked by a shared value",
        after_help = "EXAMPLES:\n    casegraph graph\n    casegraph graph --dot | dot -Tsvg > cases.svg"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(about = "Open the interactive case manager")]
    Tui,
}

/// Install the tracing subscriber on stderr.
///
/// The TUI owns the terminal, so it only logs when `CASEGRAPH_LOG` is set
/// explicitly.
fn init_tracing(verbose: bool, interactive: bool) {
    let explicit = EnvFilter::try_from_env("CASEGRAPH_LOG").ok();
    if interactive && explicit.is_none() {
        return;
    }
    let filter = explicit.unwrap_or_else(|| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "casegraph=debug,info"
        } else {
            "casegraph=info,warn"
        })
    });

    let format = env::var("CASEGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(io::stderr().is_terminal())
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EffectiveConfig> {
    let project_root = env::current_dir()?;
    Ok(config::resolve_config(&project_root, cli.db.as_deref())?)
}

fn run(command: Commands, config: &EffectiveConfig, output: OutputMode) -> anyhow::Result<()> {
    let store = CaseStore::open(&config.db_path)?;
    let manager = CaseManager::new(store);

    match command {
        Commands::List => cmd::list::run_list(&manager, output),
        Commands::Add(args) => cmd::add::run_add(&args, &manager, output),
        Commands::Edit(args) => cmd::edit::run_edit(&args, &manager, output),
        Commands::Delete(args) => cmd::delete::run_delete(&args, &manager, output),
        Commands::Graph(args) => cmd::graph::run_graph(&args, &manager, output),
        Commands::Tui => tui::run(&manager),
    }
}

fn report(output: OutputMode, err: &anyhow::Error) -> ExitCode {
    if render_error(output, &CliError::from(err)).is_err() {
        eprintln!("error: {err:#}");
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Commands::Tui));

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => return report(cli.output_mode(None), &err),
    };
    let output = cli.output_mode(config.output.as_deref());
    tracing::debug!(
        db = %config.db_path.display(),
        source = ?config.db_source,
        ?output,
        "starting"
    );

    match run(cli.command, &config, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(output, &err),
    }
}
