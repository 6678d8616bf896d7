//! Category classifier: map a raw activity onto one closed [`Category`].
//!
//! Classification reads three signals: the `$type` tag, the `targetMember`
//! (or `field.id`) naming the changed property, and, for custom-field
//! changes, the field's declared value type. A record can match several
//! rules; the first rule in priority order wins:
//!
//! comment > VCS > work item > tag > link > attachment > visibility >
//! field change > star > vote.
//!
//! The issue-created echo has its own explicit tag and is checked before the
//! priority chain. Anything matching nothing is [`Category::Unrecognized`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::model::Activity;

const CUSTOM_FIELD_PREFIX: &str = "__CUSTOM_FIELD__";

/// Kind of a field-change activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Summary,
    Description,
    Project,
    Resolved,
    Sprint,
    /// Custom text field (long free-form value).
    Text,
    /// Custom single-value field (enum, state, user, version, ...).
    Single,
    /// Custom multi-value field.
    Multi,
    /// Custom scalar field (date, number, period, string).
    Simple,
}

/// The semantic kind of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Comment,
    Vcs,
    Work,
    Tag,
    Link,
    Attachment,
    AttachmentRename,
    Visibility,
    Field(FieldKind),
    Star,
    Vote,
    IssueCreated,
    Unrecognized,
}

/// Grouping compatibility class. Activities only share a group when their
/// classes are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Comment,
    Work,
    Vcs,
    History,
}

impl GroupKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Work => "work",
            Self::Vcs => "vcs",
            Self::History => "history",
        }
    }
}

impl Category {
    /// Every category key in display order, used by filters and help text.
    pub const KEYS: [&'static str; 13] = [
        "comment",
        "vcs",
        "work",
        "tag",
        "link",
        "attachment",
        "attachment-rename",
        "visibility",
        "field",
        "star",
        "vote",
        "issue-created",
        "unrecognized",
    ];

    /// Stable short key (field kinds collapse to `field`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Vcs => "vcs",
            Self::Work => "work",
            Self::Tag => "tag",
            Self::Link => "link",
            Self::Attachment => "attachment",
            Self::AttachmentRename => "attachment-rename",
            Self::Visibility => "visibility",
            Self::Field(_) => "field",
            Self::Star => "star",
            Self::Vote => "vote",
            Self::IssueCreated => "issue-created",
            Self::Unrecognized => "unrecognized",
        }
    }

    #[must_use]
    pub const fn group_kind(self) -> GroupKind {
        match self {
            Self::Comment => GroupKind::Comment,
            Self::Work => GroupKind::Work,
            Self::Vcs => GroupKind::Vcs,
            _ => GroupKind::History,
        }
    }

    /// Whether several activities of this category touching the same field
    /// may collapse into one net change.
    #[must_use]
    pub const fn is_mergeable(self) -> bool {
        !matches!(
            self,
            Self::Comment | Self::Work | Self::Vcs | Self::IssueCreated | Self::Unrecognized
        )
    }

    /// Whether `added`/`removed` carry sets of items rather than one value.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            Self::Tag
                | Self::Link
                | Self::Attachment
                | Self::Visibility
                | Self::Star
                | Self::Vote
                | Self::Field(FieldKind::Multi)
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classify one activity. Total: never panics, never fails.
#[must_use]
pub fn classify(activity: &Activity) -> Category {
    let signals = Signals::of(activity);

    if signals.tag_is(&["IssueCreatedActivityItem"]) {
        return Category::IssueCreated;
    }

    if signals.tag_is(&["CommentActivityItem"]) || signals.member_is(&["comments"]) {
        return Category::Comment;
    }
    if signals.tag_is(&["VcsChangeActivityItem"]) || signals.member_is(&["vcsChanges"]) {
        return Category::Vcs;
    }
    if signals.tag_is(&["WorkItemActivityItem"]) || signals.member_is(&["workItems"]) {
        return Category::Work;
    }
    if signals.tag_is(&["TagsActivityItem"]) || signals.member_is(&["tags"]) {
        return Category::Tag;
    }
    if signals.tag_is(&["LinksActivityItem"]) || signals.member_is(&["links"]) {
        return Category::Link;
    }
    if signals.tag_is(&["AttachmentRenameActivityItem"]) || signals.member_is(&["attachments.name"])
    {
        return Category::AttachmentRename;
    }
    if signals.tag_is(&["AttachmentActivityItem"]) || signals.member_is(&["attachments"]) {
        return Category::Attachment;
    }
    if signals.tag.starts_with("Visibility")
        || signals.member_is(&["permittedGroup", "permittedGroups", "permittedUsers", "visibility"])
    {
        return Category::Visibility;
    }
    if let Some(kind) = field_kind(activity, &signals) {
        return Category::Field(kind);
    }
    if signals.tag_is(&["StarActivityItem"]) || signals.member_is(&["star", "hasStar"]) {
        return Category::Star;
    }
    if signals.tag_is(&["VotersActivityItem", "TotalVotesActivityItem"])
        || signals.member_is(&["votes", "voters"])
    {
        return Category::Vote;
    }

    debug!(
        activity_id = %activity.id,
        type_tag = signals.tag,
        member = signals.member,
        "unrecognized activity"
    );
    Category::Unrecognized
}

/// Classify, reusing a category already stamped on the record.
#[must_use]
pub fn category_of(activity: &Activity) -> Category {
    activity.category.unwrap_or_else(|| classify(activity))
}

/// Return a copy of `activity` with its derived category filled in.
#[must_use]
pub fn classified(activity: &Activity) -> Activity {
    let mut copy = activity.clone();
    copy.category = Some(category_of(activity));
    copy
}

struct Signals<'a> {
    tag: &'a str,
    member: &'a str,
}

impl<'a> Signals<'a> {
    fn of(activity: &'a Activity) -> Self {
        let member = activity
            .target_member
            .as_deref()
            .or_else(|| activity.field.as_ref().and_then(|f| f.id.as_deref()))
            .unwrap_or("");
        Self {
            tag: activity.type_tag.as_deref().unwrap_or(""),
            member,
        }
    }

    fn tag_is(&self, tags: &[&str]) -> bool {
        !self.tag.is_empty() && tags.contains(&self.tag)
    }

    fn member_is(&self, members: &[&str]) -> bool {
        !self.member.is_empty() && members.contains(&self.member)
    }
}

fn field_kind(activity: &Activity, signals: &Signals<'_>) -> Option<FieldKind> {
    let builtin = match (signals.tag, signals.member) {
        ("SummaryActivityItem", _) | (_, "summary") => Some(FieldKind::Summary),
        ("DescriptionActivityItem", _) | (_, "description") => Some(FieldKind::Description),
        ("ProjectActivityItem", _) | (_, "project") => Some(FieldKind::Project),
        ("IssueResolvedActivityItem", _) | (_, "resolved") => Some(FieldKind::Resolved),
        ("SprintActivityItem", _) | (_, "sprints") => Some(FieldKind::Sprint),
        _ => None,
    };
    if builtin.is_some() {
        return builtin;
    }

    let is_custom = signals.tag == "CustomFieldActivityItem"
        || signals.member.starts_with(CUSTOM_FIELD_PREFIX)
        || activity
            .field
            .as_ref()
            .is_some_and(|f| f.custom_field.is_some());
    if !is_custom {
        return None;
    }

    let field_type = activity
        .field
        .as_ref()
        .and_then(|f| f.custom_field.as_ref())
        .and_then(|cf| cf.field_type.as_ref());

    let Some(field_type) = field_type else {
        return Some(FieldKind::Single);
    };
    if field_type.is_multi_value {
        return Some(FieldKind::Multi);
    }
    let kind = match field_type.value_type.as_deref().unwrap_or("") {
        "text" => FieldKind::Text,
        "date" | "date and time" | "integer" | "float" | "period" | "string" => FieldKind::Simple,
        _ => FieldKind::Single,
    };
    Some(kind)
}

/// Error returned when a filter names a category that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown activity category '{raw}': expected one of {}", Category::KEYS.join(", "))]
pub struct UnknownCategory {
    pub raw: String,
}

/// A category key accepted by [`CategoryFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryKey(&'static str);

impl FromStr for CategoryKey {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::KEYS
            .iter()
            .find(|k| **k == wanted)
            .map(|k| Self(*k))
            .ok_or_else(|| UnknownCategory { raw: s.to_string() })
    }
}

/// The set of categories a host has chosen to display.
///
/// An empty filter allows everything. The issue-created echo is always
/// allowed since grouping relies on it to hide its group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    keys: Vec<CategoryKey>,
}

impl CategoryFilter {
    /// Build a filter from category keys.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] for the first key that is not in
    /// [`Category::KEYS`].
    pub fn parse<S: AsRef<str>>(keys: &[S]) -> Result<Self, UnknownCategory> {
        let mut parsed = Vec::with_capacity(keys.len());
        for key in keys {
            let key: CategoryKey = key.as_ref().parse()?;
            if !parsed.contains(&key) {
                parsed.push(key);
            }
        }
        Ok(Self { keys: parsed })
    }

    #[must_use]
    pub fn allows(&self, category: Category) -> bool {
        self.keys.is_empty()
            || category == Category::IssueCreated
            || self.keys.iter().any(|k| k.0 == category.key())
    }
}
