use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;

use crate::activity::category::CategoryFilter;
use crate::activity::group::{DEFAULT_WINDOW_MS, GroupingOptions};
use crate::activity::FeedOrder;
use crate::error::CoreError;

/// Project-level feed configuration (`.trackfeed/config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub feed: FeedDisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Maximum gap between neighbouring activities in one group; 0 disables.
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,
    #[serde(default = "default_true")]
    pub merge_fields: bool,
    #[serde(default = "default_true")]
    pub hide_created: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            merge_fields: default_true(),
            hide_created: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDisplayConfig {
    #[serde(default)]
    pub order: FeedOrder,
    /// Category keys to display; empty shows everything.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl FeedConfig {
    #[must_use]
    pub const fn grouping_options(&self) -> GroupingOptions {
        GroupingOptions {
            window_ms: if self.grouping.window_ms > 0 {
                Some(self.grouping.window_ms)
            } else {
                None
            },
            merge_fields: self.grouping.merge_fields,
            hide_created: self.grouping.hide_created,
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::UnknownCategory`] if `feed.categories` names a
    /// category that does not exist.
    pub fn category_filter(&self) -> Result<CategoryFilter, CoreError> {
        Ok(CategoryFilter::parse(&self.feed.categories)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub feed: FeedConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

fn load_toml<T>(path: &Path) -> Result<Option<T>, CoreError>
where
    T: serde::de::DeserializeOwned,
{
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<T>(&content)
        .map(Some)
        .map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Load `.trackfeed/config.toml` under `project_root`, or defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<FeedConfig, CoreError> {
    let path = project_root.join(".trackfeed/config.toml");
    Ok(load_toml(&path)?.unwrap_or_default())
}

/// Load `<config_dir>/trackfeed/config.toml`, or defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, CoreError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    let path = config_dir.join("trackfeed/config.toml");
    Ok(load_toml(&path)?.unwrap_or_default())
}

/// # Errors
///
/// Returns an error if either config file exists but is invalid.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig, CoreError> {
    let feed = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_json,
        user.output.as_deref(),
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        feed,
        user,
        resolved_output,
    })
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }
    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }
    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }
    if is_tty { "pretty" } else { "text" }.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_window_ms() -> i64 {
    DEFAULT_WINDOW_MS
}
