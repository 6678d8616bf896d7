//! `tfeed completions`: print a shell completion script.

use clap::Args;
use clap_complete::{Shell, generate};
use std::io::Write;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `command` to stdout.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(args.shell, command, &mut out);
    out.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    let bin = command.get_name().to_string();
    generate(shell, command, bin, out);
}
