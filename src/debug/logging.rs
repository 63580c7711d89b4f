//! Console logging and panic reporting.

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::panic::{self, PanicHookInfo};
use std::str::FromStr;
use std::sync::{Mutex, Once, OnceLock};
use std::thread;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Target of the events logged by the panic hook.
pub const PANIC_TARGET: &str = "arbor::panic";
/// Level used when `RUST_LOG` is unset and [`set_log_level`] was not called.
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;
const MAX_PANIC_LINES: usize = 8;

// ============================================================================
// Global State
// ============================================================================

static PANIC_HOOK_INSTALLED: Once = Once::new();
static TRACING_INSTALLED: Once = Once::new();
static LOG_LEVEL: OnceLock<Mutex<LevelFilter>> = OnceLock::new();

fn log_level_slot() -> &'static Mutex<LevelFilter> {
    LOG_LEVEL.get_or_init(|| Mutex::new(DEFAULT_LOG_LEVEL))
}

/// Sets the level used when `RUST_LOG` is not set.
///
/// Accepts `off`, `error`, `warn`, `info`, `debug`, `trace` or a number; anything else
/// selects [`DEFAULT_LOG_LEVEL`]. Only takes effect if called before [`install_tracing`].
pub fn set_log_level(level: &str) {
    let parsed = LevelFilter::from_str(level).unwrap_or(DEFAULT_LOG_LEVEL);
    if let Ok(mut guard) = log_level_slot().lock() {
        *guard = parsed;
    }
}

/// The fallback level [`install_tracing`] will use.
#[must_use]
pub fn log_level() -> LevelFilter {
    log_level_slot()
        .lock()
        .map(|guard| *guard)
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

// ============================================================================
// Installation
// ============================================================================

/// Installs the console subscriber (idempotent).
///
/// Events are filtered by `RUST_LOG` when it is set, and by [`log_level`] otherwise.
/// Does nothing if another global subscriber is already installed.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(log_level().into()));

        let console = fmt::layer()
            .event_format(PanicAwareFormatter)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("a global subscriber is already installed");
        }
    });
}

/// Installs a panic hook that logs the panic before running the previous hook
/// (idempotent).
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            log_panic(info);
            previous(info);
        }));
    });
}

// ============================================================================
// Panic Reporting
// ============================================================================

fn log_panic(info: &PanicHookInfo<'_>) {
    let message = panic_message(info);
    let location = info
        .location()
        .map(|location| format!("{}:{}", location.file(), location.line()))
        .unwrap_or_default();
    let thread_name = thread::current().name().unwrap_or("unnamed").to_string();
    let backtrace = Backtrace::force_capture().to_string();

    tracing::error!(
        target: PANIC_TARGET,
        message = %message,
        location = %location,
        thread = %thread_name,
        backtrace = %backtrace
    );
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic".to_string()
    }
}

// ============================================================================
// Console Output Formatter
// ============================================================================

#[derive(Clone, Copy, Default)]
struct PanicAwareFormatter;

impl<S, N> FormatEvent<S, N> for PanicAwareFormatter
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let target = event.metadata().target();

        if target == PANIC_TARGET {
            let mut visitor = PanicFieldVisitor::default();
            event.record(&mut visitor);
            writeln!(writer, "{}", visitor.render())
        } else {
            let level = event.metadata().level();
            write!(writer, "{level} {target}: ")?;
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            writeln!(writer)
        }
    }
}

#[derive(Default)]
struct PanicFieldVisitor {
    message: Option<String>,
    location: Option<String>,
    backtrace: Option<String>,
}

impl PanicFieldVisitor {
    /// Renders the panic with a truncated backtrace.
    fn render(&self) -> String {
        let mut out = format!("PANIC: {}", self.message.as_deref().unwrap_or("panic"));
        if let Some(location) = self.location.as_deref().filter(|location| !location.is_empty()) {
            let _ = write!(out, " at {location}");
        }
        if let Some(backtrace) = self.backtrace.as_deref() {
            out.push_str("\nStack:");
            for line in backtrace.lines().take(MAX_PANIC_LINES) {
                let _ = write!(out, "\n  {line}");
            }
            if backtrace.lines().count() > MAX_PANIC_LINES {
                out.push_str("\n  ... (truncated)");
            }
        }
        out
    }

    fn record(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "location" => self.location = Some(value),
            "backtrace" => self.backtrace = Some(value),
            _ => {}
        }
    }
}

impl tracing::field::Visit for PanicFieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.record(field.name(), value.to_string());
    }
}
