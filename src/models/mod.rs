pub mod archive_types;
pub mod classify_types;
pub mod notification_types;
