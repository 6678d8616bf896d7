//! Permission cache indexing and action-level permission evaluation.

pub mod evaluator;
pub mod keys;
pub mod store;

pub use evaluator::{Action, IssueActions, IssuePermissions};
pub use store::{PermissionCacheItem, PermissionsStore};
