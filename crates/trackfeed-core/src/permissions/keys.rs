//! Permission names as they appear in the backend permission cache.

pub const READ_ISSUE: &str = "JetBrains.YouTrack.READ_ISSUE";
pub const CREATE_ISSUE: &str = "JetBrains.YouTrack.CREATE_ISSUE";
pub const UPDATE_ISSUE: &str = "JetBrains.YouTrack.UPDATE_ISSUE";
pub const DELETE_ISSUE: &str = "JetBrains.YouTrack.DELETE_ISSUE";
pub const PRIVATE_READ_ISSUE: &str = "JetBrains.YouTrack.PRIVATE_READ_ISSUE";
pub const PRIVATE_UPDATE_ISSUE: &str = "JetBrains.YouTrack.PRIVATE_UPDATE_ISSUE";

pub const CREATE_COMMENT: &str = "JetBrains.YouTrack.CREATE_COMMENT";
pub const UPDATE_COMMENT: &str = "JetBrains.YouTrack.UPDATE_COMMENT";
pub const UPDATE_NOT_OWN_COMMENT: &str = "JetBrains.YouTrack.UPDATE_NOT_OWN_COMMENT";
pub const DELETE_COMMENT: &str = "JetBrains.YouTrack.DELETE_COMMENT";
pub const DELETE_NOT_OWN_COMMENT: &str = "JetBrains.YouTrack.DELETE_NOT_OWN_COMMENT";

pub const CREATE_ATTACHMENT_ISSUE: &str = "JetBrains.YouTrack.CREATE_ATTACHMENT_ISSUE";
pub const UPDATE_ATTACHMENT_ISSUE: &str = "JetBrains.YouTrack.UPDATE_ATTACHMENT_ISSUE";

pub const LINK_ISSUE: &str = "JetBrains.YouTrack.LINK_ISSUE";

pub const CREATE_WORK_ITEM: &str = "JetBrains.YouTrack.CREATE_WORK_ITEM";
pub const UPDATE_WORK_ITEM: &str = "JetBrains.YouTrack.UPDATE_WORK_ITEM";
pub const UPDATE_NOT_OWN_WORK_ITEM: &str = "JetBrains.YouTrack.UPDATE_NOT_OWN_WORK_ITEM";

pub const READ_ARTICLE: &str = "JetBrains.YouTrack.READ_ARTICLE";
pub const CREATE_ARTICLE: &str = "JetBrains.YouTrack.CREATE_ARTICLE";
pub const UPDATE_ARTICLE: &str = "JetBrains.YouTrack.UPDATE_ARTICLE";
pub const DELETE_ARTICLE: &str = "JetBrains.YouTrack.DELETE_ARTICLE";
pub const CREATE_ARTICLE_COMMENT: &str = "JetBrains.YouTrack.CREATE_ARTICLE_COMMENT";
pub const UPDATE_ARTICLE_COMMENT: &str = "JetBrains.YouTrack.UPDATE_ARTICLE_COMMENT";
pub const UPDATE_NOT_OWN_ARTICLE_COMMENT: &str =
    "JetBrains.YouTrack.UPDATE_NOT_OWN_ARTICLE_COMMENT";
pub const DELETE_ARTICLE_COMMENT: &str = "JetBrains.YouTrack.DELETE_ARTICLE_COMMENT";
pub const DELETE_NOT_OWN_ARTICLE_COMMENT: &str =
    "JetBrains.YouTrack.DELETE_NOT_OWN_ARTICLE_COMMENT";
