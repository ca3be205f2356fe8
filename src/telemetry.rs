use std::sync::Once;
use thiserror::Error;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for the application.
///
/// Logs are written to the console. The default log level is `info` and can
/// be overridden with the `RUST_LOG` environment variable.
pub fn init_tracing() -> Result<(), TracingError> {
    // Set the default log level to `info` if not specified in the `RUST_LOG`
    // environment variable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    set_global_default(subscriber)?;

    Ok(())
}

/// Initializes tracing for test environments.
///
/// Call once at the beginning of tests. Set `ENABLE_TRACING=1` to view tracing output:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            init_tracing().expect("Failed to initialize tracing for tests");
        }
    });
}
