//! Tracing subscriber setup for the driver.
//!
//! Configuration comes from, in order of precedence:
//!
//! - `RUST_LOG` (standard `EnvFilter` directives)
//! - `--verbose` on the command line
//! - `MODDEP_LOG_LEVEL` (trace, debug, info, warn, error)
//! - `MODDEP_LOG_JSON=true` for JSON lines instead of console output
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose events the default filter lets through.
const CRATES: [&str; 5] = [
    "moddep",
    "moddep_core",
    "moddep_scan",
    "moddep_registry",
    "moddep_graph",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub use_json: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    /// Read `MODDEP_LOG_LEVEL` and `MODDEP_LOG_JSON`; `verbose` raises the
    /// level to at least `DEBUG`.
    pub fn from_env(verbose: bool) -> Self {
        let level = env::var("MODDEP_LOG_LEVEL")
            .ok()
            .and_then(|s| parse_level(&s))
            .unwrap_or(Level::WARN);
        let use_json = env::var("MODDEP_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let mut config = Self {
            level,
            use_json,
            ..Default::default()
        };
        if verbose {
            config = config.verbose();
        }
        config
    }

    fn verbose(mut self) -> Self {
        // `Level` orders TRACE as the greatest.
        if self.level < Level::DEBUG {
            self.level = Level::DEBUG;
        }
        self.include_target = true;
        self
    }

    fn filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        let directives: Vec<String> = CRATES
            .iter()
            .map(|krate| format!("{krate}={}", self.level))
            .collect();
        EnvFilter::new(format!("warn,{}", directives.join(",")))
    }
}

/// Parse a level name, case-insensitively.
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => {
            eprintln!(
                "warning: invalid log level '{level}', expected trace, debug, info, warn or error"
            );
            None
        }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();
        let registry = tracing_subscriber::registry().with(filter);
        if config.use_json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .init();
        }
    });
}
