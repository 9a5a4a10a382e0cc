//! The delegating partition reader: one partition of a combined split,
//! read through the ordinary single-file machinery.
//!
//! [`CombineRecordReader`] is the piece that makes combined splits
//! transparent. Construction translates a `(combined split, partition)`
//! pair into a standalone [`FileSplit`](crate::FileSplit) and initializes
//! an underlying single-file reader with it; every reader operation after
//! that is a pure pass-through. No buffering, no caching, no progress
//! rescaling happens here. That is exactly why a file read as part of a
//! combined split decodes byte-for-byte like a file read alone.
//!
//! The host's outer iterator drives one of these per partition, in
//! sequence; this type never spans partitions, and per-partition progress
//! aggregation stays with that outer iterator.

use crate::config::{LineFormat, TaskContext};
use crate::key_value::KeyValueTextInputFormat;
use crate::reader::{InputFormat, RecordReader};
use crate::split::{CombineSplit, InputSplit};
use crate::text::TextInputFormat;
use anyhow::{Context, Result};

/// Reader for one partition of a [`CombineSplit`], delegating every
/// operation to an underlying single-file reader built by `F`.
pub struct CombineRecordReader<F: InputFormat> {
    inner: F::Reader,
}

/// [`CombineRecordReader`] over plain-line text.
pub type CombineTextReader = CombineRecordReader<TextInputFormat>;

/// [`CombineRecordReader`] over separator-delimited key/value text.
pub type CombineKeyValueTextReader = CombineRecordReader<KeyValueTextInputFormat>;

impl<F: InputFormat> CombineRecordReader<F> {
    /// Open the reader for `partition` of `split`.
    ///
    /// Reconstructs the partition's single-file split, obtains a fresh
    /// reader from `format`, and initializes it, so the returned reader
    /// is ready to advance. Failures to create or initialize the
    /// underlying reader (unreadable path, bad range) surface here; retry
    /// policy belongs to the host's task-retry layer, not this one.
    ///
    /// # Panics
    /// Panics if `partition` is out of range for `split`, like
    /// [`CombineSplit::file_split`].
    ///
    /// # Errors
    /// Returns an error if the underlying reader cannot be created or
    /// initialized.
    pub fn new(
        split: &CombineSplit,
        context: &TaskContext,
        partition: usize,
        format: &F,
    ) -> Result<Self> {
        let file_split = split.file_split(partition);
        let inner = format
            .create_reader(context)
            .with_context(|| format!("create reader for partition {partition}"))?;
        let mut reader = Self { inner };
        reader
            .initialize(&InputSplit::File(file_split), context)
            .with_context(|| format!("initialize reader for partition {partition}"))?;
        Ok(reader)
    }
}

impl<F: InputFormat> RecordReader for CombineRecordReader<F> {
    type Key = <F::Reader as RecordReader>::Key;
    type Value = <F::Reader as RecordReader>::Value;

    /// Forwards to the underlying reader for single-file splits.
    ///
    /// Generic instantiation paths may hand this reader the aggregate
    /// split it was constructed from; that is tolerated as a no-op, since
    /// the underlying reader was already initialized with the
    /// reconstructed single-file split at construction time.
    fn initialize(&mut self, split: &InputSplit, context: &TaskContext) -> Result<()> {
        match split {
            InputSplit::File(_) => self.inner.initialize(split, context),
            InputSplit::Combine(_) => Ok(()),
        }
    }

    fn next_key_value(&mut self) -> Result<bool> {
        self.inner.next_key_value()
    }

    fn current_key(&self) -> Option<&Self::Key> {
        self.inner.current_key()
    }

    fn current_value(&self) -> Option<&Self::Value> {
        self.inner.current_value()
    }

    /// Progress through this partition's own range, not the aggregate's.
    fn progress(&self) -> f32 {
        self.inner.progress()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

/// A partition reader whose format was chosen from configuration.
///
/// Produced by [`open_partition`]. Format-independent operations are
/// available directly; match the enum to reach the typed keys and values
/// of the concrete reader.
pub enum PartitionReader {
    /// Plain-line reader: keys are byte offsets.
    Text(CombineTextReader),
    /// Key/value reader: keys and values are the split line halves.
    KeyValueText(CombineKeyValueTextReader),
}

/// Open a reader for `partition` of `split`, with the line format taken
/// from [`ReaderConfig::format`](crate::ReaderConfig).
///
/// This is the configuration-driven entry point for hosts that bind the
/// format at runtime; hosts with the format fixed at compile time can use
/// [`CombineRecordReader::new`] directly.
///
/// # Panics
/// Panics if `partition` is out of range for `split`.
///
/// # Errors
/// Returns an error if the underlying reader cannot be created or
/// initialized.
pub fn open_partition(
    split: &CombineSplit,
    context: &TaskContext,
    partition: usize,
) -> Result<PartitionReader> {
    match context.config.format {
        LineFormat::Text => Ok(PartitionReader::Text(CombineRecordReader::new(
            split,
            context,
            partition,
            &TextInputFormat,
        )?)),
        LineFormat::KeyValueText => Ok(PartitionReader::KeyValueText(CombineRecordReader::new(
            split,
            context,
            partition,
            &KeyValueTextInputFormat,
        )?)),
    }
}

impl PartitionReader {
    /// The format this reader decodes.
    pub fn format(&self) -> LineFormat {
        match self {
            PartitionReader::Text(_) => LineFormat::Text,
            PartitionReader::KeyValueText(_) => LineFormat::KeyValueText,
        }
    }

    /// Advance to the next record. See [`RecordReader::next_key_value`].
    ///
    /// # Errors
    /// Propagated unchanged from the underlying reader.
    pub fn next_key_value(&mut self) -> Result<bool> {
        match self {
            PartitionReader::Text(r) => r.next_key_value(),
            PartitionReader::KeyValueText(r) => r.next_key_value(),
        }
    }

    /// Progress through this partition's range. See
    /// [`RecordReader::progress`].
    pub fn progress(&self) -> f32 {
        match self {
            PartitionReader::Text(r) => r.progress(),
            PartitionReader::KeyValueText(r) => r.progress(),
        }
    }

    /// Release the underlying resources. See [`RecordReader::close`].
    ///
    /// # Errors
    /// Propagated unchanged from the underlying reader.
    pub fn close(&mut self) -> Result<()> {
        match self {
            PartitionReader::Text(r) => r.close(),
            PartitionReader::KeyValueText(r) => r.close(),
        }
    }
}
