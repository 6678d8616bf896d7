pub mod activity;
pub mod entity;
pub mod user;

pub use activity::{Activity, ActivityField, ActivityPage, ActivityTarget, CustomFieldMeta, FieldType};
pub use entity::{
    Article, Entity, FieldDefinition, HelpdeskSettings, Issue, IssueComment, IssueField,
    IssueWorkItem, Project, ProjectCustomField, Reaction, TimeTrackingSettings,
};
pub use user::{CurrentUser, UserRef};
