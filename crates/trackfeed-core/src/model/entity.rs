//! Issues, articles, and the nested values permission and reaction logic
//! reads from them.

use serde::{Deserialize, Serialize};

use super::user::UserRef;

/// Help-desk configuration attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelpdeskSettings {
    pub enabled: bool,
    /// Identity-service ids of users acting as agents in this project.
    pub agent_ids: Vec<String>,
}

/// Time-tracking configuration attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeTrackingSettings {
    pub enabled: bool,
    /// Project custom field that is auto-calculated from work items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_time_field_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helpdesk: Option<HelpdeskSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_tracking: Option<TimeTrackingSettings>,
}

impl Project {
    #[must_use]
    pub fn is_helpdesk(&self) -> bool {
        self.helpdesk.as_ref().is_some_and(|h| h.enabled)
    }
}

/// The field definition a project binds into its issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectCustomField {
    pub id: String,
    pub is_public: bool,
    pub field: FieldDefinition,
}

/// A custom field value slot on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueField {
    pub id: String,
    pub project_custom_field: ProjectCustomField,
}

/// One emoji reaction on a comment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reaction {
    /// Server-assigned id; `None` for an optimistic local reaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reaction: String,
    pub author: UserRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueComment {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    pub deleted: bool,
    /// Restricted visibility (group or user names); empty means public.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visibility: Vec<String>,
    pub reactions: Vec<Reaction>,
    /// Pipe-delimited reaction keys in first-use order.
    pub reaction_order: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueWorkItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Issue {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_readable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<UserRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<IssueField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_readable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<UserRef>,
}

/// Common surface of the things permissions are evaluated against.
pub trait Entity {
    fn project(&self) -> Option<&Project>;

    fn reporter(&self) -> Option<&UserRef>;

    /// Project id, if the entity carries a non-empty one.
    fn project_id(&self) -> Option<&str> {
        self.project()
            .map(|p| p.id.as_str())
            .filter(|id| !id.is_empty())
    }

    fn is_helpdesk(&self) -> bool {
        self.project().is_some_and(Project::is_helpdesk)
    }
}

impl Entity for Issue {
    fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    fn reporter(&self) -> Option<&UserRef> {
        self.reporter.as_ref()
    }
}

impl Entity for Article {
    fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    fn reporter(&self) -> Option<&UserRef> {
        self.reporter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_id_is_unresolvable() {
        let issue = Issue {
            project: Some(Project::default()),
            ..Issue::default()
        };
        assert_eq!(issue.project_id(), None);
    }

    #[test]
    fn helpdesk_requires_enabled_flag() {
        let mut project = Project {
            id: "0-1".to_string(),
            helpdesk: Some(HelpdeskSettings::default()),
            ..Project::default()
        };
        assert!(!project.is_helpdesk());
        project.helpdesk = Some(HelpdeskSettings {
            enabled: true,
            agent_ids: vec![],
        });
        assert!(project.is_helpdesk());
    }

    #[test]
    fn comment_parses_reaction_order() {
        let comment: IssueComment = serde_json::from_str(
            r#"{
                "id": "4-1",
                "text": "looks good",
                "reactions": [{"id": "r1", "reaction": "life", "author": {"id": "1-1", "ringId": "u1"}}],
                "reactionOrder": "life"
            }"#,
        )
        .expect("comment should parse");
        assert_eq!(comment.reaction_order, "life");
        assert_eq!(comment.reactions[0].author.ring_id.as_deref(), Some("u1"));
        assert!(!comment.deleted);
    }
}
