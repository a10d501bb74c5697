//! Log setup and JSON line output. Logs go to stderr so stdout carries only
//! command output (one JSON object per line).

use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber, level from RUST_LOG or `default_level`.
    /// A second call is a no-op.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let registry = tracing_subscriber::registry().with(filter);
        let installed = if json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::NONE)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        if installed.is_err() {
            tracing::debug!("subscriber already installed");
        }
    }

    /// Write `event` as a single JSON line.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
