//! Action-level permission queries for one session.
//!
//! [`IssuePermissions`] is bound to a [`PermissionsStore`] snapshot and the
//! signed-in user. Every query is a pure read of those two values: nothing
//! is cached, nothing panics, and anything that cannot be resolved (no
//! project id, no current user) answers `false`.
//!
//! Switching accounts or re-authenticating means building a new evaluator.
//!
//! Reporter and ownership checks compare the entity's external (`ringId`)
//! identity with [`CurrentUser::id`]; see [`CurrentUser::owns`].

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::keys;
use super::store::PermissionsStore;
use crate::error::CoreError;
use crate::model::{
    Article, CurrentUser, Entity, Issue, IssueComment, IssueField, IssueWorkItem, UserRef,
};

#[derive(Debug, Clone)]
pub struct IssuePermissions {
    store: Arc<PermissionsStore>,
    user: Option<CurrentUser>,
}

impl IssuePermissions {
    #[must_use]
    pub const fn new(store: Arc<PermissionsStore>, user: Option<CurrentUser>) -> Self {
        Self { store, user }
    }

    #[must_use]
    pub fn store(&self) -> &PermissionsStore {
        &self.store
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    // -----------------------------------------------------------------------
    // Identity helpers
    // -----------------------------------------------------------------------

    fn has_permission_for<E: Entity>(&self, entity: &E, key: &str) -> bool {
        let Some(project_id) = entity.project_id() else {
            debug!(permission = key, "no project id on entity, denying");
            return false;
        };
        self.store.has(key, Some(project_id))
    }

    fn is_current_user(&self, user: Option<&UserRef>) -> bool {
        match (&self.user, user) {
            (Some(current), Some(user)) => current.owns(user),
            _ => false,
        }
    }

    /// Whether the signed-in user created `entity`.
    #[must_use]
    pub fn is_reporter<E: Entity>(&self, entity: &E) -> bool {
        self.is_current_user(entity.reporter())
    }

    /// Guest sessions, and sessions without a user, get no personal actions.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.user.as_ref().is_none_or(|u| u.guest)
    }

    /// Whether the signed-in user is an agent of the entity's help-desk project.
    #[must_use]
    pub fn is_agent<E: Entity>(&self, entity: &E) -> bool {
        let (Some(user), Some(project)) = (&self.user, entity.project()) else {
            return false;
        };
        project
            .helpdesk
            .as_ref()
            .is_some_and(|h| h.enabled && h.agent_ids.iter().any(|id| *id == user.id))
    }

    /// Help-desk role override: agents and the original reporter act without
    /// the blanket project permission.
    fn helpdesk_role<E: Entity>(&self, entity: &E) -> bool {
        entity.is_helpdesk()
            && entity.project_id().is_some()
            && (self.is_agent(entity) || self.is_reporter(entity))
    }

    // -----------------------------------------------------------------------
    // Issue fields
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn can_update_general_info(&self, issue: &Issue) -> bool {
        let can_update = self.has_permission_for(issue, keys::READ_ISSUE)
            && self.has_permission_for(issue, keys::UPDATE_ISSUE);
        can_update
            || (self.is_reporter(issue) && self.has_permission_for(issue, keys::CREATE_ISSUE))
    }

    fn can_update_public_field(&self, issue: &Issue) -> bool {
        (self.is_reporter(issue) && self.has_permission_for(issue, keys::CREATE_ISSUE))
            || self.has_permission_for(issue, keys::UPDATE_ISSUE)
    }

    /// The spent-time field is computed from work items while time tracking
    /// is on, so nobody edits it directly.
    #[must_use]
    pub fn is_blocked_by_time_tracking(&self, issue: &Issue, field: &IssueField) -> bool {
        issue
            .project
            .as_ref()
            .and_then(|p| p.time_tracking.as_ref())
            .is_some_and(|tt| {
                tt.enabled
                    && tt.spent_time_field_id.as_deref()
                        == Some(field.project_custom_field.id.as_str())
            })
    }

    #[must_use]
    pub fn can_update_field(&self, issue: &Issue, field: &IssueField) -> bool {
        if self.is_blocked_by_time_tracking(issue, field) {
            return false;
        }
        if field.project_custom_field.is_public {
            return self.can_update_public_field(issue);
        }
        self.has_permission_for(issue, keys::PRIVATE_UPDATE_ISSUE)
    }

    #[must_use]
    pub fn can_run_command(&self, issue: &Issue) -> bool {
        self.can_update_general_info(issue)
            || self.has_permission_for(issue, keys::PRIVATE_UPDATE_ISSUE)
    }

    #[must_use]
    pub fn can_delete_issue(&self, issue: &Issue) -> bool {
        self.has_permission_for(issue, keys::DELETE_ISSUE)
    }

    #[must_use]
    pub fn can_create_issue_in(&self, project_id: &str) -> bool {
        !project_id.is_empty() && self.store.has(keys::CREATE_ISSUE, Some(project_id))
    }

    // -----------------------------------------------------------------------
    // Issue comments
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn can_comment_on(&self, issue: &Issue) -> bool {
        self.helpdesk_role(issue) || self.has_permission_for(issue, keys::CREATE_COMMENT)
    }

    #[must_use]
    pub fn can_update_comment(&self, issue: &Issue, comment: &IssueComment) -> bool {
        if self.is_current_user(comment.author.as_ref()) {
            return self.helpdesk_role(issue)
                || self.has_permission_for(issue, keys::UPDATE_COMMENT);
        }
        self.has_permission_for(issue, keys::UPDATE_NOT_OWN_COMMENT)
    }

    #[must_use]
    pub fn can_delete_comment(&self, issue: &Issue, comment: &IssueComment) -> bool {
        if self.is_current_user(comment.author.as_ref()) {
            return self.helpdesk_role(issue)
                || self.has_permission_for(issue, keys::DELETE_COMMENT);
        }
        self.has_permission_for(issue, keys::DELETE_NOT_OWN_COMMENT)
    }

    /// Restricting who can see a comment. In help-desk projects only agents
    /// may do it, so a reporter can never hide a reply from themselves.
    #[must_use]
    pub fn can_change_comment_visibility(&self, issue: &Issue) -> bool {
        if issue.is_helpdesk() {
            return issue.project_id().is_some() && self.is_agent(issue);
        }
        self.can_comment_on(issue) && self.has_permission_for(issue, keys::PRIVATE_READ_ISSUE)
    }

    // -----------------------------------------------------------------------
    // Attachments, links, tags
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn can_add_attachment_to(&self, issue: &Issue) -> bool {
        self.has_permission_for(issue, keys::CREATE_ATTACHMENT_ISSUE)
    }

    #[must_use]
    pub fn can_delete_attachment(&self, issue: &Issue) -> bool {
        self.has_permission_for(issue, keys::UPDATE_ATTACHMENT_ISSUE)
    }

    #[must_use]
    pub fn can_link_issue(&self, issue: &Issue) -> bool {
        self.has_permission_for(issue, keys::LINK_ISSUE)
    }

    #[must_use]
    pub fn can_tag(&self, issue: &Issue) -> bool {
        !self.is_guest() && self.can_update_general_info(issue)
    }

    // -----------------------------------------------------------------------
    // Votes and stars
    // -----------------------------------------------------------------------

    /// Reporters cannot vote for their own issue; guests cannot vote at all.
    #[must_use]
    pub fn can_vote(&self, issue: &Issue) -> bool {
        if issue.id.is_empty() || self.user.is_none() {
            return false;
        }
        !self.is_reporter(issue) && !self.is_guest()
    }

    #[must_use]
    pub fn can_star(&self) -> bool {
        !self.is_guest()
    }

    // -----------------------------------------------------------------------
    // Work items
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn can_create_work(&self, issue: &Issue) -> bool {
        self.has_permission_for(issue, keys::CREATE_WORK_ITEM)
    }

    #[must_use]
    pub fn can_update_work(&self, issue: &Issue, work: &IssueWorkItem) -> bool {
        if self.is_current_user(work.author.as_ref()) {
            return self.has_permission_for(issue, keys::UPDATE_WORK_ITEM);
        }
        self.has_permission_for(issue, keys::UPDATE_NOT_OWN_WORK_ITEM)
    }

    #[must_use]
    pub fn can_delete_work(&self, issue: &Issue, work: &IssueWorkItem) -> bool {
        self.can_update_work(issue, work)
    }

    // -----------------------------------------------------------------------
    // Articles
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn can_update_article(&self, article: &Article) -> bool {
        self.has_permission_for(article, keys::UPDATE_ARTICLE)
            || (self.is_reporter(article) && self.has_permission_for(article, keys::CREATE_ARTICLE))
    }

    #[must_use]
    pub fn can_delete_article(&self, article: &Article) -> bool {
        self.has_permission_for(article, keys::DELETE_ARTICLE)
    }

    #[must_use]
    pub fn can_comment_on_article(&self, article: &Article) -> bool {
        self.has_permission_for(article, keys::CREATE_ARTICLE_COMMENT)
    }

    #[must_use]
    pub fn can_update_article_comment(&self, article: &Article, comment: &IssueComment) -> bool {
        if self.is_current_user(comment.author.as_ref()) {
            return self.has_permission_for(article, keys::UPDATE_ARTICLE_COMMENT);
        }
        self.has_permission_for(article, keys::UPDATE_NOT_OWN_ARTICLE_COMMENT)
    }

    #[must_use]
    pub fn can_delete_article_comment(&self, article: &Article, comment: &IssueComment) -> bool {
        if self.is_current_user(comment.author.as_ref()) {
            return self.has_permission_for(article, keys::DELETE_ARTICLE_COMMENT);
        }
        self.has_permission_for(article, keys::DELETE_NOT_OWN_ARTICLE_COMMENT)
    }

    // -----------------------------------------------------------------------
    // Batch evaluation
    // -----------------------------------------------------------------------

    /// Evaluate one issue-level action. `field` is consulted only by
    /// [`Action::UpdateField`]; without it that action is denied.
    #[must_use]
    pub fn evaluate(&self, action: Action, issue: &Issue, field: Option<&IssueField>) -> bool {
        match action {
            Action::UpdateGeneralInfo => self.can_update_general_info(issue),
            Action::UpdateField => field.is_some_and(|f| self.can_update_field(issue, f)),
            Action::Comment => self.can_comment_on(issue),
            Action::ChangeCommentVisibility => self.can_change_comment_visibility(issue),
            Action::DeleteIssue => self.can_delete_issue(issue),
            Action::Attach => self.can_add_attachment_to(issue),
            Action::DeleteAttachment => self.can_delete_attachment(issue),
            Action::Link => self.can_link_issue(issue),
            Action::Tag => self.can_tag(issue),
            Action::Vote => self.can_vote(issue),
            Action::Star => self.can_star(),
            Action::CreateWork => self.can_create_work(issue),
            Action::RunCommand => self.can_run_command(issue),
        }
    }

    /// Snapshot of the issue-level actions for one render pass.
    #[must_use]
    pub fn action_set(&self, issue: &Issue) -> IssueActions {
        IssueActions {
            update_general_info: self.can_update_general_info(issue),
            comment: self.can_comment_on(issue),
            change_comment_visibility: self.can_change_comment_visibility(issue),
            delete_issue: self.can_delete_issue(issue),
            attach: self.can_add_attachment_to(issue),
            delete_attachment: self.can_delete_attachment(issue),
            link: self.can_link_issue(issue),
            tag: self.can_tag(issue),
            vote: self.can_vote(issue),
            star: self.can_star(),
            create_work: self.can_create_work(issue),
            run_command: self.can_run_command(issue),
        }
    }
}

/// Issue-level verdicts, one per control the issue screen may show.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IssueActions {
    pub update_general_info: bool,
    pub comment: bool,
    pub change_comment_visibility: bool,
    pub delete_issue: bool,
    pub attach: bool,
    pub delete_attachment: bool,
    pub link: bool,
    pub tag: bool,
    pub vote: bool,
    pub star: bool,
    pub create_work: bool,
    pub run_command: bool,
}

/// Issue-level actions addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    UpdateGeneralInfo,
    UpdateField,
    Comment,
    ChangeCommentVisibility,
    DeleteIssue,
    Attach,
    DeleteAttachment,
    Link,
    Tag,
    Vote,
    Star,
    CreateWork,
    RunCommand,
}

impl Action {
    pub const ALL: [Self; 13] = [
        Self::UpdateGeneralInfo,
        Self::UpdateField,
        Self::Comment,
        Self::ChangeCommentVisibility,
        Self::DeleteIssue,
        Self::Attach,
        Self::DeleteAttachment,
        Self::Link,
        Self::Tag,
        Self::Vote,
        Self::Star,
        Self::CreateWork,
        Self::RunCommand,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateGeneralInfo => "update-general-info",
            Self::UpdateField => "update-field",
            Self::Comment => "comment",
            Self::ChangeCommentVisibility => "change-comment-visibility",
            Self::DeleteIssue => "delete-issue",
            Self::Attach => "attach",
            Self::DeleteAttachment => "delete-attachment",
            Self::Link => "link",
            Self::Tag => "tag",
            Self::Vote => "vote",
            Self::Star => "star",
            Self::CreateWork => "create-work",
            Self::RunCommand => "run-command",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAction(s.to_string()))
    }
}
