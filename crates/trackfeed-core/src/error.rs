use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for the boundary operations of the crate.
///
/// The reconciliation engine itself never fails; these codes cover parsing
/// backend payloads and loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ConfigReadError,
    ActivityPageParse,
    PermissionCacheParse,
    EntityParse,
    UnknownAction,
    UnknownCategory,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ConfigReadError => "E1002",
            Self::ActivityPageParse => "E2001",
            Self::PermissionCacheParse => "E2002",
            Self::EntityParse => "E2003",
            Self::UnknownAction => "E3001",
            Self::UnknownCategory => "E3002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigReadError => "Config file could not be read",
            Self::ActivityPageParse => "Activity page is not valid JSON",
            Self::PermissionCacheParse => "Permission cache is not valid JSON",
            Self::EntityParse => "Entity payload is not valid JSON",
            Self::UnknownAction => "Unknown permission action",
            Self::UnknownCategory => "Unknown activity category",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .trackfeed/config.toml and retry."),
            Self::ConfigReadError => Some("Check that the config file exists and is readable."),
            Self::ActivityPageParse => {
                Some("Pass the raw body of the activity-page response (object or array).")
            }
            Self::PermissionCacheParse => {
                Some("Pass the permission cache as a JSON array of cache items.")
            }
            Self::EntityParse => None,
            Self::UnknownAction => Some("Run `tfeed can --help` to list supported actions."),
            Self::UnknownCategory => {
                Some("Check [feed].categories in .trackfeed/config.toml for typos.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while turning external input into engine values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid activity page: {0}")]
    ActivityPageParse(#[source] serde_json::Error),

    #[error("invalid permission cache: {0}")]
    PermissionCacheParse(#[source] serde_json::Error),

    #[error("invalid {kind} payload: {source}")]
    EntityParse {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error(transparent)]
    UnknownCategory(#[from] crate::activity::category::UnknownCategory),
}

impl CoreError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConfigRead { .. } => ErrorCode::ConfigReadError,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::ActivityPageParse(_) => ErrorCode::ActivityPageParse,
            Self::PermissionCacheParse(_) => ErrorCode::PermissionCacheParse,
            Self::EntityParse { .. } => ErrorCode::EntityParse,
            Self::UnknownAction(_) => ErrorCode::UnknownAction,
            Self::UnknownCategory(_) => ErrorCode::UnknownCategory,
        }
    }

    /// Remediation text for CLI rendering.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }
}

/// Parse a JSON entity payload, tagging failures with the entity kind.
///
/// # Errors
///
/// Returns [`CoreError::EntityParse`] when `body` does not deserialize as `T`.
pub fn parse_entity<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    body: &str,
) -> Result<T, CoreError> {
    serde_json::from_str(body).map_err(|source| CoreError::EntityParse { kind, source })
}
