//! trackfeed-core: activity feed reconciliation for an issue tracker client.
//!
//! The crate turns the raw activity stream of an issue into display groups,
//! answers "may the current user do X here" from the session's permission
//! cache, and reconciles per-comment emoji reactions.
//!
//! Everything in [`activity`], [`permissions`] and [`reaction`] is pure and
//! synchronous: inputs are borrowed, outputs are new values. Fallible work
//! (parsing payloads, loading config) lives at the edges in [`model`],
//! [`config`] and [`error`].
//!
//! # Conventions
//!
//! - **Errors**: boundary operations return [`error::CoreError`]; the engine
//!   never fails.
//! - **Logging**: `tracing` macros only (`debug!` for pipeline summaries,
//!   `trace!` for per-record detail).

pub mod activity;
pub mod config;
pub mod error;
pub mod model;
pub mod permissions;
pub mod reaction;

pub use activity::{
    ActivityGroup, Category, CategoryFilter, FeedOrder, GroupingOptions, reconcile, sort_feed,
};
pub use error::{CoreError, ErrorCode};
pub use permissions::{IssuePermissions, PermissionsStore};
pub use reaction::{ReactionToggle, toggle_reaction};
