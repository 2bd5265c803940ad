pub mod archive_service;
pub mod classifier;
pub mod export_service;
pub mod fs_service;
pub mod image_store;
pub mod notifier;
pub mod pipeline;
pub mod task_group;
pub mod thumbnail_service;
