//! Indexed, read-only view over the session's permission cache.
//!
//! The store is built once after authentication and replaced wholesale on
//! re-authentication; there is no in-place update.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRef {
    pub id: String,
}

/// One entry of the backend permission cache.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionCacheItem {
    pub permission: PermissionRef,
    pub global: bool,
    pub projects: Vec<ProjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Grant {
    global: bool,
    projects: HashSet<String>,
}

/// Permission name → grant index with O(1) lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionsStore {
    grants: HashMap<String, Grant>,
}

impl PermissionsStore {
    /// Index a cache. Duplicate entries for one key are unioned.
    #[must_use]
    pub fn new(items: &[PermissionCacheItem]) -> Self {
        let mut grants: HashMap<String, Grant> = HashMap::with_capacity(items.len());
        for item in items {
            if item.permission.key.is_empty() {
                continue;
            }
            let grant = grants.entry(item.permission.key.clone()).or_default();
            grant.global |= item.global;
            grant.projects.extend(
                item.projects
                    .iter()
                    .filter(|p| !p.id.is_empty())
                    .map(|p| p.id.clone()),
            );
        }
        Self { grants }
    }

    /// Parse a JSON array of cache items and index it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PermissionCacheParse`] if `body` is not a JSON
    /// array of cache items.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let items: Vec<PermissionCacheItem> =
            serde_json::from_str(body).map_err(CoreError::PermissionCacheParse)?;
        Ok(Self::new(&items))
    }

    /// Whether `key` is held globally, or for `project_id` when given.
    ///
    /// Without a project id only global grants count.
    #[must_use]
    pub fn has(&self, key: &str, project_id: Option<&str>) -> bool {
        let Some(grant) = self.grants.get(key) else {
            return false;
        };
        if grant.global {
            return true;
        }
        project_id.is_some_and(|id| grant.projects.contains(id))
    }

    #[must_use]
    pub fn has_every(&self, keys: &[&str], project_id: Option<&str>) -> bool {
        keys.iter().all(|key| self.has(key, project_id))
    }

    #[must_use]
    pub fn has_some(&self, keys: &[&str], project_id: Option<&str>) -> bool {
        keys.iter().any(|key| self.has(key, project_id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }
}
