//! # Smallfiles
//!
//! **Combined-split record readers** for batch-processing workers, in the
//! mold of Hadoop's `CombineFileInputFormat` family.
//!
//! Batch frameworks normally assign one split (one contiguous byte range
//! of one file) per worker task. Many small files are pathological under
//! that model: one split per tiny file wastes scheduling overhead and
//! starves I/O. The usual fix is a split planner that aggregates several
//! small-file ranges into one *combined split*. This crate is the reader
//! side of that fix: given a combined split and a partition index, it
//! produces a record reader that behaves exactly like the reader that
//! would have read that file range standalone.
//!
//! ## Key pieces
//!
//! - [`CombineSplit`] / [`FileFragment`] - the aggregate split descriptor
//!   and its constituent byte ranges
//! - [`CombineSplit::file_split`] - reconstructs the standalone
//!   [`FileSplit`] for one partition
//! - [`CombineRecordReader`] - owns one underlying single-file reader per
//!   partition and forwards every operation to it
//! - [`LineRecordReader`] / [`KeyValueLineRecordReader`] - the two
//!   underlying line formats (plain text, and separator-delimited
//!   key/value text)
//! - [`open_partition`] - configuration-driven factory selecting the
//!   format from [`ReaderConfig`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use smallfiles::{
//!     CombineRecordReader, CombineSplit, RecordReader, TaskContext, TextInputFormat,
//! };
//! # fn main() -> anyhow::Result<()> {
//! // Normally the split planner builds this and ships it to the worker.
//! let split = CombineSplit::from_whole_files(["logs/a.txt", "logs/b.txt"])?;
//! let context = TaskContext::default();
//!
//! // One reader per partition, driven by the host's outer iterator.
//! for partition in 0..split.num_partitions() {
//!     let mut reader = CombineRecordReader::new(&split, &context, partition, &TextInputFormat)?;
//!     while reader.next_key_value()? {
//!         if let (Some(offset), Some(line)) = (reader.current_key(), reader.current_value()) {
//!             println!("{offset}: {line}");
//!         }
//!     }
//!     reader.close()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## What this crate deliberately does not do
//!
//! The split planner (which files go into which combined split), the
//! outer iterator that advances across partitions, and any aggregation of
//! per-partition progress all belong to the host framework. Reader
//! progress here is always local to one partition, and the delegating
//! reader adds no buffering or transformation of its own; transparency
//! is the contract.
//!
//! ## Feature Flags
//!
//! - `compression-gzip` / `compression-zstd` / `compression-bzip2` /
//!   `compression-xz` - transparent decoding of compressed input files
//!   (whole-file fragments only; codec streams are not splittable)
//! - `metrics` - shared records/bytes counters on [`TaskContext`]
//!
//! ## Module Overview
//!
//! - [`split`] - split descriptors and the combined-to-single translation
//! - [`reader`] - the [`RecordReader`] contract and [`InputFormat`] factory seam
//! - [`text`] / [`key_value`] - the underlying single-file readers
//! - [`combine`] - the delegating partition reader
//! - [`config`] - reader configuration and per-task context
//! - [`compression`] - pluggable decompression codecs
//! - [`metrics`] - reader-side counters (feature `metrics`)

pub mod combine;
pub mod compression;
pub mod config;
pub mod key_value;
pub mod reader;
pub mod split;
pub mod text;

#[cfg(feature = "metrics")]
pub mod metrics;

// General re-exports
pub use combine::{
    CombineKeyValueTextReader, CombineRecordReader, CombineTextReader, PartitionReader,
    open_partition,
};
pub use compression::{CompressionCodec, register_codec};
pub use config::{LineFormat, ReaderConfig, TaskContext};
pub use key_value::{KeyValueLineRecordReader, KeyValueTextInputFormat};
pub use reader::{InputFormat, RecordReader, read_all};
pub use split::{CombineSplit, FileFragment, FileSplit, InputSplit};
pub use text::{LineRecordReader, TextInputFormat};

// Gated re-exports
#[cfg(feature = "metrics")]
pub use metrics::ReaderMetrics;
