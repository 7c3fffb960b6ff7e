use std::sync::OnceLock;

use bryte_common::observability::{LogConfig, LogFormat, init_logging};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

/// Route test events to stderr (and a temp-dir log file) once per test binary.
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let format = std::env::var("BRYTE_LOG_FORMAT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(LogFormat::Text);
        let config = LogConfig {
            app_name: "bryte-tests",
            log_dir: Some(std::env::temp_dir().join("bryte-tests")),
            emit_stderr: true,
            format,
            default_filter: "debug".to_string(),
        };
        init_logging(config).unwrap_or_default()
    });
}
