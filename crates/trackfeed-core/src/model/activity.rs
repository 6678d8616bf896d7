//! Raw activity records as returned by the backend's activity-page endpoint.
//!
//! The `added`/`removed` payloads are heterogeneous (scalar values, bundle
//! elements, comments, attachments, linked issues) and are kept as raw JSON.
//! Typed accessors pull out the shapes downstream stages care about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::entity::{IssueComment, IssueWorkItem};
use super::user::UserRef;
use crate::activity::category::Category;
use crate::error::CoreError;

/// Declared value type of a custom field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    pub is_multi_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFieldMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

/// Which field or built-in property an activity touched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field: Option<CustomFieldMeta>,
}

/// The entity a change applies to (the issue itself, a comment, a work item).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityTarget {
    pub id: String,
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
}

/// One raw change record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_member: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ActivityField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ActivityTarget>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub added: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub removed: Value,
    /// Derived by the classifier; never read from the wire.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Activity {
    /// An activity that cannot take part in grouping with its neighbours.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.timestamp.is_none() || self.author.as_ref().is_none_or(|a| a.id.is_empty())
    }

    /// The timestamp as a UTC instant, when present and in range.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }

    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        self.target
            .as_ref()
            .map(|t| t.id.as_str())
            .filter(|id| !id.is_empty())
    }

    #[must_use]
    pub fn added_items(&self) -> Vec<&Value> {
        payload_items(&self.added)
    }

    #[must_use]
    pub fn removed_items(&self) -> Vec<&Value> {
        payload_items(&self.removed)
    }

    /// The comment carried by a comment activity, if the payload holds one.
    #[must_use]
    pub fn added_comment(&self) -> Option<IssueComment> {
        self.added_items()
            .into_iter()
            .find_map(|v| IssueComment::deserialize(v).ok())
    }

    /// The work item carried by a work activity, if the payload holds one.
    #[must_use]
    pub fn added_work(&self) -> Option<IssueWorkItem> {
        self.added_items()
            .into_iter()
            .find_map(|v| IssueWorkItem::deserialize(v).ok())
    }
}

/// View any payload as a list: arrays expand, `null` is empty, anything else
/// is a single item.
#[must_use]
pub fn payload_items(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Identity of one payload item for set arithmetic: its `id`, then a
/// human-facing label, then the canonical JSON text.
#[must_use]
pub fn payload_item_key(item: &Value) -> String {
    if let Value::Object(map) = item {
        for key in ["id", "name", "presentation", "text", "login"] {
            if let Some(Value::String(s)) = map.get(key) {
                return format!("{key}:{s}");
            }
        }
    }
    item.to_string()
}

/// One page of the activity feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityPage {
    pub activities: Vec<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_cursor: Option<String>,
    pub has_after: bool,
}

impl ActivityPage {
    /// Parse a page body. A bare JSON array of activities is accepted too.
    ///
    /// Records are decoded one by one. A record that does not fit the
    /// activity shape is kept as a bare [`Activity`] with only its id, which
    /// makes it malformed so it stands alone in the feed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ActivityPageParse`] if the body is neither shape.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(body).map_err(CoreError::ActivityPageParse)?;
        if value.is_array() {
            let records = Vec::<Value>::deserialize(value).map_err(CoreError::ActivityPageParse)?;
            return Ok(Self {
                activities: records.iter().map(decode_record).collect(),
                ..Self::default()
            });
        }
        let raw = RawPage::deserialize(value).map_err(CoreError::ActivityPageParse)?;
        Ok(Self {
            activities: raw.activities.iter().map(decode_record).collect(),
            after_cursor: raw.after_cursor,
            has_after: raw.has_after,
        })
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawPage {
    activities: Vec<Value>,
    after_cursor: Option<String>,
    has_after: bool,
}

fn decode_record(record: &Value) -> Activity {
    match Activity::deserialize(record) {
        Ok(activity) => activity,
        Err(err) => {
            let id = match record.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };
            warn!(activity_id = %id, error = %err, "malformed activity record");
            let type_tag = record
                .get("$type")
                .and_then(Value::as_str)
                .map(str::to_string);
            Activity {
                id,
                type_tag,
                ..Activity::default()
            }
        }
    }
}
