use serde::{Deserialize, Serialize};

/// A user reference as it appears inside backend payloads (activity author,
/// issue reporter, comment author, reaction author).
///
/// `id` is the tracker-internal identifier. `ring_id` is the identifier in the
/// external identity service, which is the same space as [`CurrentUser::id`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub guest: bool,
}

impl UserRef {
    /// Display name: full name, then login, then the raw id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.login.as_deref())
            .unwrap_or(&self.id)
    }
}

/// The signed-in user a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentUser {
    /// Identity-service id (compared against [`UserRef::ring_id`]).
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub guest: bool,
}

impl CurrentUser {
    /// Returns `true` when `user` refers to this account.
    ///
    /// Only the external identity is compared. The internal `id` of a
    /// [`UserRef`] lives in a different identifier space and never matches.
    #[must_use]
    pub fn owns(&self, user: &UserRef) -> bool {
        !self.id.is_empty() && user.ring_id.as_deref() == Some(self.id.as_str())
    }

    /// Build the [`UserRef`] used when this user authors a new local value
    /// (for example an optimistic reaction).
    ///
    /// The internal `id` is unknown locally and stays empty until the
    /// backend echoes the value back.
    #[must_use]
    pub fn as_ref_value(&self) -> UserRef {
        UserRef {
            id: String::new(),
            ring_id: Some(self.id.clone()),
            login: self.login.clone(),
            full_name: self.full_name.clone(),
            guest: self.guest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            ..CurrentUser::default()
        }
    }

    #[test]
    fn owns_compares_ring_id_not_internal_id() {
        let user = current("ring-1");
        let by_internal = UserRef {
            id: "ring-1".to_string(),
            ring_id: Some("other".to_string()),
            ..UserRef::default()
        };
        let by_ring = UserRef {
            id: "1-42".to_string(),
            ring_id: Some("ring-1".to_string()),
            ..UserRef::default()
        };
        assert!(!user.owns(&by_internal));
        assert!(user.owns(&by_ring));
    }

    #[test]
    fn empty_current_user_owns_nothing() {
        let user = current("");
        let anonymous = UserRef {
            ring_id: Some(String::new()),
            ..UserRef::default()
        };
        assert!(!user.owns(&anonymous));
    }

    #[test]
    fn as_ref_value_is_owned_by_self() {
        let user = current("ring-7");
        assert!(user.owns(&user.as_ref_value()));
    }

    #[test]
    fn as_ref_value_leaves_internal_id_empty() {
        let author = current("ring-7").as_ref_value();
        assert!(author.id.is_empty());
        assert_eq!(author.ring_id.as_deref(), Some("ring-7"));
    }

    #[test]
    fn parses_camel_case_payload() {
        let parsed: UserRef = serde_json::from_str(
            r#"{"id":"1-2","ringId":"abc","login":"jdoe","fullName":"Jane Doe","guest":false}"#,
        )
        .expect("user ref should parse");
        assert_eq!(parsed.ring_id.as_deref(), Some("abc"));
        assert_eq!(parsed.display_name(), "Jane Doe");
    }
}
