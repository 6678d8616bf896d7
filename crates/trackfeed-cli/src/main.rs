#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trackfeed_core::config;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tfeed: inspect activity, permission and reaction reconciliation",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Group and merge an activity page",
        long_about = "Reconcile a dumped activity page into display groups using .trackfeed/config.toml.",
        after_help = "EXAMPLES:\n    # Group a page with the configured window\n    tfeed activity page.json\n\n    # Show every field change, including hidden groups\n    tfeed activity page.json --no-merge --show-hidden --json"
    )]
    Activity(cmd::activity::ActivityArgs),

    #[command(
        about = "Evaluate a permission for an issue",
        after_help = "ACTIONS:\n    update-general-info, update-field, comment, change-comment-visibility,\n    delete-issue, attach, delete-attachment, link, tag, vote, star,\n    create-work, run-command, all\n\nEXAMPLES:\n    tfeed can comment --issue issue.json --user me.json --permissions cache.json\n    tfeed can all --issue issue.json --user me.json --permissions cache.json --field Priority"
    )]
    Can(cmd::can::CanArgs),

    #[command(
        about = "Toggle a reaction on a comment",
        after_help = "EXAMPLES:\n    tfeed react comment.json --user me.json heart"
    )]
    React(cmd::react::ReactArgs),

    #[command(about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TRACKFEED_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "trackfeed=debug,tfeed=debug,info"
        } else {
            "trackfeed=info,tfeed=info,warn"
        })
    });

    let format = env::var("TRACKFEED_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args, &mut command);
    }

    let project_root = env::current_dir()?;
    let effective = match config::resolve_config(&project_root, cli.json) {
        Ok(effective) => effective,
        Err(err) => {
            render_error(OutputMode::from_flag(cli.json), &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    let output = OutputMode::from_resolved(&effective.resolved_output);
    debug!(mode = %effective.resolved_output, root = %project_root.display(), "resolved config");

    match cli.command {
        Commands::Activity(ref args) => cmd::activity::run_activity(args, &effective.feed, output),
        Commands::Can(ref args) => cmd::can::run_can(args, output),
        Commands::React(ref args) => cmd::react::run_react(args, output),
        Commands::Completions(_) => Ok(()),
    }
}
