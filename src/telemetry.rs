#[cfg(feature = "telemetry")]
use std::sync::OnceLock;

#[cfg(feature = "telemetry")]
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when neither `RUST_LOG` nor the config file names one.
pub const DEFAULT_FILTER: &str = "sequence_lint=warn";

/// Initialize the tracing subscriber once per process.
///
/// `RUST_LOG` wins over `directive`; `directive` wins over [`DEFAULT_FILTER`].
/// Output goes to stderr so JSON diagnostics on stdout stay machine readable.
#[cfg(feature = "telemetry")]
pub fn init_tracing(directive: Option<&str>) {
    static INIT: OnceLock<()> = OnceLock::new();

    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(directive.unwrap_or(DEFAULT_FILTER))
        });
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(not(feature = "telemetry"))]
pub fn init_tracing(_directive: Option<&str>) {}

/// Turn a bare level name from the config (`"debug"`) into a crate-scoped filter.
pub fn filter_for_level(level: &str) -> Option<String> {
    match level.trim().to_ascii_lowercase().as_str() {
        lvl @ ("error" | "warn" | "info" | "debug" | "trace") => {
            Some(format!("sequence_lint={lvl}"))
        }
        "off" => Some("sequence_lint=off".to_string()),
        _ => None,
    }
}

/// Run an inline block inside a span named after the engine phase.
#[macro_export]
macro_rules! instrument_block {
    ($name:expr, $block:block) => {{
        let span = tracing::debug_span!("sequence_lint", phase = $name);
        let _guard = span.enter();
        (|| $block)()
    }};
}
