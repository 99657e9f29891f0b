//! Logging setup for bindery
//!
//! Every event the crate emits uses the `bindery` target: container creation,
//! registration, unbinding and failures at `DEBUG`, per-resolve detail (cache
//! hits, parent fallthrough, deferred first access, resolution trees) at
//! `TRACE`. This module installs a `tracing-subscriber` to print them.
//!
//! # Features
//!
//! - `logging` - Emit events (default)
//! - `logging-json` - JSON structured output
//! - `logging-pretty` - Human-readable multi-line output
//!
//! Without either subscriber feature the `init*` functions do nothing, so an
//! application that installs its own subscriber is unaffected.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindery::logging;
//!
//! // Only bindery events, one line each, honoring RUST_LOG when set
//! logging::builder()
//!     .trace()
//!     .bindery_only()
//!     .from_env()
//!     .compact()
//!     .init();
//! ```

use tracing::Level;

/// The target every bindery event is emitted under
pub const TARGET: &str = "bindery";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON objects, one per line
    #[default]
    Json,
    /// Multi-line, colored
    Pretty,
    /// Single line per event
    Compact,
}

/// Builder for subscriber configuration
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    from_env: bool,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
    with_thread_names: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: if cfg!(feature = "logging-json") {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            target: None,
            from_env: false,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
            with_thread_names: false,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Include per-resolve events
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Only show events from `target`
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show bindery events
    pub fn bindery_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    /// Prefer the `RUST_LOG` directives when the variable is set
    pub fn from_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Filter directives the configuration turns into
    pub fn directives(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber, failing if one is already set.
    ///
    /// JSON output needs the `logging-json` feature; without it a `Json`
    /// configuration prints in the compact format.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn try_init(self) -> Result<(), tracing_subscriber::util::TryInitError> {
        use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

        let filter = if self.from_env {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
        } else {
            EnvFilter::new(self.directives())
        };

        let (file, line, thread_ids, thread_names) = (
            self.with_file,
            self.with_line_number,
            self.with_thread_ids,
            self.with_thread_names,
        );
        macro_rules! decorate {
            ($layer:expr) => {
                $layer
                    .with_file(file)
                    .with_line_number(line)
                    .with_thread_ids(thread_ids)
                    .with_thread_names(thread_names)
                    .with_target(true)
                    .boxed()
            };
        }

        let layer = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => decorate!(fmt::layer().json()),
            LogFormat::Pretty => decorate!(fmt::layer().pretty()),
            _ => decorate!(fmt::layer().compact()),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
    }

    /// Install the subscriber; a subscriber that is already set is kept
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// No-op without a subscriber feature
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install the default subscriber: JSON with `logging-json`, pretty otherwise
pub fn init() {
    builder().init();
}

/// Install JSON output at `DEBUG`.
///
/// # Example output
/// ```json
/// {"timestamp":"2026-01-01T00:00:00.000Z","level":"DEBUG","fields":{"message":"Registering binding","token":"Config","kind":"Value","lifetime":"singleton","depth":0,"binding_count":1},"target":"bindery"}
/// ```
pub fn init_json() {
    builder().json().debug().init();
}

/// Install pretty output at `DEBUG`
pub fn init_pretty() {
    builder().pretty().debug().init();
}

/// Install output for bindery events only, at `TRACE`
pub fn init_bindery_only() {
    builder().bindery_only().trace().init();
}
