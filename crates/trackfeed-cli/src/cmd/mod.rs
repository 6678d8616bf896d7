pub mod activity;
pub mod can;
pub mod completions;
pub mod react;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;
use trackfeed_core::error::{CoreError, parse_entity};

use crate::output::{CliError, OutputMode, render_error};

/// Read a JSON dump from disk.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Render a core error in the active mode and turn it into a failure.
pub fn fail(output: OutputMode, err: &CoreError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &CliError::from(err)) {
        return render_err;
    }
    anyhow::anyhow!("{err}")
}

/// Read and parse one entity payload (`issue`, `user`, `comment`).
pub fn load_entity<T: DeserializeOwned>(
    output: OutputMode,
    kind: &'static str,
    path: &Path,
) -> anyhow::Result<T> {
    let body = read_input(path)?;
    parse_entity(kind, &body).map_err(|err| fail(output, &err))
}
