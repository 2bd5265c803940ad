pub mod classifier;
pub mod export;
pub mod model;
