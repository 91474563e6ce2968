//! Logging for umapi-cli.
//!
//! Library code only emits `tracing` events. The binary decides whether a
//! subscriber is installed, based on how many `-v` flags were given.

mod reporter;

pub use reporter::{Reporter, SilentReporter, TracingReporter, DEFAULT_PROGRESS_INTERVAL};

use tracing_subscriber::EnvFilter;

/// How much the CLI logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No log output at all.
    #[default]
    Quiet,
    /// Progress and summary information.
    Info,
    /// Per-action detail and HTTP traffic.
    Debug,
}

impl Verbosity {
    /// Map a `-v` occurrence count to a verbosity.
    #[must_use]
    pub const fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Quiet,
            1 => Self::Info,
            _ => Self::Debug,
        }
    }

    const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "off",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Install the process-wide fmt subscriber.
///
/// Does nothing when quiet. `RUST_LOG` overrides the level when set. Calling
/// it twice is harmless.
pub fn init(verbosity: Verbosity) {
    if verbosity == Verbosity::Quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(true)
        .try_init();
}
