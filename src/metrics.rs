//! Reader-side counters, the analogue of host-framework task counters.
//!
//! [`ReaderMetrics`] is a cheaply clonable handle to shared atomic
//! counters. One handle lives on the [`TaskContext`](crate::TaskContext);
//! every reader initialized under that context clones it and bumps the
//! counters as it delivers records. The host can snapshot the counters at
//! any point, or export them as JSON for its own reporting.
//!
//! # Example
//!
//! ```no_run
//! use smallfiles::{open_partition, CombineSplit, TaskContext};
//! # fn main() -> anyhow::Result<()> {
//! let split = CombineSplit::from_whole_files(["a.txt", "b.txt"])?;
//! let context = TaskContext::default();
//!
//! for partition in 0..split.num_partitions() {
//!     let mut reader = open_partition(&split, &context, partition)?;
//!     while reader.next_key_value()? {}
//!     reader.close()?;
//! }
//!
//! println!("{}", context.metrics.to_json());
//! # Ok(())
//! # }
//! ```

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters for records and bytes delivered by readers.
#[derive(Clone, Debug, Default)]
pub struct ReaderMetrics {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    records_read: AtomicU64,
    bytes_read: AtomicU64,
    splits_opened: AtomicU64,
}

impl ReaderMetrics {
    /// Fresh counters, all zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one delivered record and the raw bytes it consumed.
    pub(crate) fn add_record(&self, bytes: u64) {
        self.inner.records_read.fetch_add(1, Ordering::Relaxed);
        self.inner.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record one split initialization.
    pub(crate) fn add_split(&self) {
        self.inner.splits_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Records delivered so far across all readers sharing this handle.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.inner.records_read.load(Ordering::Relaxed)
    }

    /// Bytes of delivered records so far, line terminators included.
    /// Bytes skipped while aligning to a line boundary are not counted.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.inner.bytes_read.load(Ordering::Relaxed)
    }

    /// Splits initialized so far.
    #[must_use]
    pub fn splits_opened(&self) -> u64 {
        self.inner.splits_opened.load(Ordering::Relaxed)
    }

    /// All counters as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "records_read": self.records_read(),
            "bytes_read": self.bytes_read(),
            "splits_opened": self.splits_opened(),
        })
    }
}
