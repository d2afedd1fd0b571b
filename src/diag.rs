//! Diagnostic output
//!
//! Library code logs through `tracing`. `init` installs a subscriber that
//! prints one line per event on stdout, prefixed with the emitting thread:
//!
//! ```text
//! [conn-3] > Request processed in 1 ms
//! ```
//!
//! The level filter is read from `RUST_LOG` and defaults to `info`.

use std::fmt;
use std::io;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "info";

/// Event format: `[<thread name or id>] > <message> <fields>`
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerFormat;

impl<S, N> FormatEvent<S, N> for WorkerFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let thread = std::thread::current();
        match thread.name() {
            Some(name) => write!(writer, "[{}] > ", name)?,
            None => write!(writer, "[{:?}] > ", thread.id())?,
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the stdout diagnostic subscriber as the global default
///
/// Fails if a global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stdout)
        .event_format(WorkerFormat)
        .try_init()
}
