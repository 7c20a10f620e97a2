//! stackpr - stacked pull requests for git

mod cli;

use anstream::eprintln;
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::{ArgAction, Parser, Subcommand};
use cli::style::Stylize;
use stackpr::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const ABOUT: &str = "Stacked pull requests for git: every commit gets its own pull request.";

/// Exit code for missing or rejected credentials
const EXIT_AUTH: u8 = 3;

#[derive(Parser)]
#[command(name = "stackpr", about = ABOUT, version, styles = cli_styles())]
struct Cli {
    /// Path to the repository (defaults to the current directory)
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    /// Git remote to use (defaults to the configured remote, then origin)
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push every commit on the branch and create or update its pull request
    Update {
        /// Show what would change without pushing or touching PRs
        #[arg(long)]
        dry_run: bool,

        /// Open new pull requests as drafts
        #[arg(long)]
        draft: bool,

        /// Request review from this login on new pull requests (repeatable)
        #[arg(long = "reviewer", value_name = "LOGIN")]
        reviewers: Vec<String>,
    },

    /// Show the pull requests of the current stack
    Status,

    /// Merge the ready prefix of the stack
    Merge {
        /// Only consider the bottom N pull requests
        #[arg(long, value_name = "N")]
        count: Option<usize>,

        /// Show what would be merged without merging
        #[arg(long)]
        dry_run: bool,

        /// Preview the plan and ask before merging
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli.path.as_path();
    let remote = cli.remote.as_deref();

    let result = match cli.command {
        Commands::Update {
            dry_run,
            draft,
            reviewers,
        } => {
            cli::update::run_update(
                path,
                remote,
                cli::update::UpdateOptions {
                    dry_run,
                    draft,
                    reviewers,
                },
            )
            .await
        }
        Commands::Status => cli::status::run_status(path, remote).await,
        Commands::Merge {
            count,
            dry_run,
            confirm,
        } => {
            cli::merge::run_merge(
                path,
                remote,
                cli::merge::MergeOptions {
                    count,
                    dry_run,
                    confirm,
                },
            )
            .await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".failure());
            exit_code(&e)
        }
    }
}

fn exit_code(err: &Error) -> ExitCode {
    if err.is_auth() {
        ExitCode::from(EXIT_AUTH)
    } else {
        ExitCode::FAILURE
    }
}

/// Warnings always show; `-v` raises stackpr's own level. `RUST_LOG` wins.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,stackpr={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Styles for the CLI application.
const fn cli_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
