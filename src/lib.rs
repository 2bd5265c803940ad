pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::Settings;
pub use error::AppError;
pub use session::DocumentSession;

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Defaults to warnings everywhere and info for this crate. Safe to call
/// more than once; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,doc_classifier_lib=info")),
        )
        .try_init();
}
