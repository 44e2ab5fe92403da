//! Log formatting keyed to simulated time.
//!
//! The engine publishes the tick it is working on through a thread-local;
//! [`SimFormat`] stamps every `tracing` event with it in place of
//! wall-clock time, so logs line up with the trace.

use std::cell::Cell;
use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::types::Tick;

thread_local! {
    static SIM_TICK: Cell<Option<Tick>> = const { Cell::new(None) };
}

/// Publish the tick being simulated on this thread; `None` outside a run.
pub fn set_sim_tick(tick: Option<Tick>) {
    SIM_TICK.with(|t| t.set(tick));
}

/// The tick being simulated on this thread, if any.
pub fn sim_tick() -> Option<Tick> {
    SIM_TICK.with(Cell::get)
}

/// Event formatter that shows the simulated tick instead of wall-clock
/// time and uses plain colored text (no italic/background).
pub struct SimFormat;

impl<S, N> FormatEvent<S, N> for SimFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        match sim_tick() {
            Some(tick) => write!(writer, "[t={tick:>6}] ")?,
            None => write!(writer, "[t=     -] ")?,
        }

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::ERROR => "\x1b[31m",
                Level::WARN => "\x1b[33m",
                Level::INFO => "\x1b[32m",
                Level::DEBUG => "\x1b[34m",
                Level::TRACE => "\x1b[35m",
            };
            write!(writer, "{color}{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, "{level:>5} ")?;
        }

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        write!(writer, "{}", visitor.message)?;
        for (key, value) in &visitor.fields {
            write!(writer, " {key}={value}")?;
        }
        writeln!(writer)
    }
}

/// Visitor that collects the message and key-value fields from an event.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`, writing to
/// stderr through [`SimFormat`]. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}
