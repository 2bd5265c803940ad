pub mod engine;
pub mod inference;
pub mod model_manager;
