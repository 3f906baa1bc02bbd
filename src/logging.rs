//! Logging setup
//!
//! Everything goes through `tracing`. Records are written to stderr (text or
//! JSON) and also kept in a bounded in-memory [`LogBuffer`], which the
//! Support action attaches to feedback emails.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Source of buffered log data, oldest first
pub trait LogSource {
    fn all_entries(&self) -> Vec<Vec<u8>>;
}

struct Ring {
    entries: VecDeque<Vec<u8>>,
    capacity: usize,
}

/// Bounded, thread-safe buffer of formatted log records
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Ring>>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ring {
                entries: VecDeque::with_capacity(capacity.min(4096)),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Append one record, dropping the oldest ones past capacity
    pub fn push(&self, record: Vec<u8>) {
        if let Ok(mut ring) = self.inner.lock() {
            ring.entries.push_back(record);
            while ring.entries.len() > ring.capacity {
                ring.entries.pop_front();
            }
        }
    }
}

impl LogSource for LogBuffer {
    fn all_entries(&self) -> Vec<Vec<u8>> {
        self.inner
            .lock()
            .map(|ring| ring.entries.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Writer handed out per event; the finished record lands in the buffer on drop
pub struct LogRecordWriter {
    buffer: LogBuffer,
    bytes: Vec<u8>,
}

impl io::Write for LogRecordWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogRecordWriter {
    fn drop(&mut self) {
        if !self.bytes.is_empty() {
            self.buffer.push(std::mem::take(&mut self.bytes));
        }
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogRecordWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogRecordWriter {
            buffer: self.clone(),
            bytes: Vec::new(),
        }
    }
}

/// Map the CLI `--log-level` spellings onto tracing levels
fn normalize_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "verbose" | "debug" => "debug",
        "warning" | "warn" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `--log-level`, which wins over `--verbose`.
pub fn init(verbose: bool, json: bool, log_level: Option<&str>, buffer: LogBuffer) -> anyhow::Result<()> {
    let default_level = match log_level {
        Some(level) => normalize_level(level),
        None if verbose => "debug",
        None => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_layer = json.then(|| fmt::layer().json().with_writer(io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(io::stderr));
    let buffer_layer = fmt::layer().with_ansi(false).with_writer(buffer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(buffer_layer)
        .try_init()?;

    Ok(())
}
