//! Tracing setup for the node binary.
//!
//! Lines look like `[15:04:05] [INFO] [node-a] [127.0.0.1:7000] message`.
//! File output goes to `<dir>/<id>/<YYYY-MM-DD>.log` so the console keeps stdout.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stdout,
    Dir(PathBuf),
}

/// Prefixes every event with time, level, node id and peer address.
pub struct NodeFormat {
    id: String,
    addr: String,
}

impl NodeFormat {
    pub fn new(id: &str, addr: &str) -> Self {
        Self {
            id: id.to_string(),
            addr: addr.to_string(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for NodeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "[{}] [{}] [{}] [{}] ",
            chrono::Local::now().format("%H:%M:%S"),
            event.metadata().level(),
            self.id,
            self.addr
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn log_file_path(dir: &Path, id: &str, date: chrono::NaiveDate) -> PathBuf {
    dir.join(id).join(format!("{}.log", date.format("%Y-%m-%d")))
}

/// Installs the global subscriber. Filter comes from `RUST_LOG`, default `info`.
pub fn init(id: &str, addr: &str, target: &LogTarget) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = NodeFormat::new(id, addr);

    match target {
        LogTarget::Stdout => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .event_format(format)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e)),
        LogTarget::Dir(dir) => {
            let path = log_file_path(dir, id, chrono::Local::now().date_naive());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create logs directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .event_format(format)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))
        }
    }
}
