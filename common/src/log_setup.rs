use std::sync::OnceLock;

use flexi_logger::{Logger, LoggerHandle};

static LOG_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

/// Initializes the process-wide logger. `RUST_LOG` overrides `base_spec`.
/// Safe to call from multiple tests; only the first call takes effect.
pub fn setup_logging(base_spec: &str) {
    LOG_HANDLE.get_or_init(|| {
        Logger::try_with_env_or_str(base_spec)
            .unwrap_or_else(|e| panic!("Invalid log specification: {}", e))
            .log_to_stdout()
            .start()
            .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e))
    });
}
