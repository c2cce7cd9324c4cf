//! Opt-in tracing configuration for debugging generation runs.
//!
//! Supports two output formats controlled by `EG_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `json`: one JSON object per event - machine-readable, pasteable
//!
//! ## Quick start
//!
//! ```bash
//! # What did the run register, skip, and emit?
//! EG_LOG=debug host-tool build
//!
//! # JSON (for tooling or sharing full traces)
//! EG_LOG=debug EG_LOG_FORMAT=json host-tool build
//!
//! # Fine-grained filtering
//! EG_LOG="enumguard::generator=trace" host-tool build
//! ```
//!
//! The subscriber is only installed when `EG_LOG` (or `RUST_LOG`) is set, so
//! there is zero overhead in normal builds.

use tracing_subscriber::{EnvFilter, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse from the `EG_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        match std::env::var("EG_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Build an `EnvFilter` from `EG_LOG`, falling back to `RUST_LOG`.
///
/// `EG_LOG` takes precedence when both are set. Values use the same syntax as
/// `RUST_LOG` (e.g. `debug`, `enumguard::generator=trace`).
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("EG_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber if `EG_LOG` or `RUST_LOG` is set.
///
/// Safe to call more than once; only the first installation wins.
pub fn init_tracing() {
    if std::env::var("EG_LOG").is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    let result = match LogFormat::from_env() {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    // A host may have installed its own subscriber already.
    let _ = result;
}
