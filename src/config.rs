//! Reader configuration and the per-task context.
//!
//! [`ReaderConfig`] is the opaque settings object the host framework hands
//! down with each task; this crate passes it through to the underlying
//! readers unmodified. [`TaskContext`] bundles the config with the shared
//! task-level state (metrics, when enabled) and is what every
//! `initialize` receives.

use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier for the line format an underlying reader decodes.
///
/// This replaces dynamic class lookup: the reader factory is selected by
/// matching on this value (see [`open_partition`](crate::open_partition)),
/// and the value itself round-trips through configuration as a string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineFormat {
    /// Plain lines: key = byte offset of the line, value = line contents.
    #[default]
    Text,
    /// Delimiter-separated key/value lines, tab-separated by default.
    KeyValueText,
}

impl LineFormat {
    /// The stable string identifier for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineFormat::Text => "text",
            LineFormat::KeyValueText => "key-value-text",
        }
    }
}

impl FromStr for LineFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LineFormat::Text),
            "key-value-text" => Ok(LineFormat::KeyValueText),
            other => bail!("unknown line format {other:?} (expected \"text\" or \"key-value-text\")"),
        }
    }
}

/// Settings passed through to the underlying single-file readers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Which underlying reader [`open_partition`](crate::open_partition)
    /// builds.
    pub format: LineFormat,
    /// Byte separating key from value in key/value text lines. Must be
    /// ASCII so it never lands mid-character in UTF-8 input.
    pub key_value_separator: u8,
    /// Capacity of the buffered file reader, in bytes.
    pub buffer_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            format: LineFormat::default(),
            key_value_separator: b'\t',
            buffer_capacity: 64 * 1024,
        }
    }
}

/// Per-task context handed to every reader `initialize`.
#[derive(Clone, Debug, Default)]
pub struct TaskContext {
    /// Settings for the underlying readers, passed through unmodified.
    pub config: ReaderConfig,
    /// Shared counters updated by the readers driven under this task.
    #[cfg(feature = "metrics")]
    pub metrics: crate::metrics::ReaderMetrics,
}

impl TaskContext {
    /// A context carrying the given config and fresh task-level state.
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "metrics")]
            metrics: crate::metrics::ReaderMetrics::default(),
        }
    }
}
