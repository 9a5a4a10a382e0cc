//! The record reader contract and the reader factory seam.
//!
//! [`RecordReader`] is the five-operation contract the host framework
//! drives: initialize, advance, current key/value, progress, close. It is
//! a cooperative pull model: one caller thread per reader, sequential
//! calls, no internal concurrency.
//!
//! [`InputFormat`] is the factory that produces fresh, uninitialized
//! readers for a line format. Construction is cheap and infallible in
//! practice; all I/O (and therefore all construction failure) happens in
//! `initialize`.

use crate::config::TaskContext;
use crate::split::InputSplit;
use anyhow::Result;

/// A pull-based reader producing (key, value) records from one split.
///
/// # Call protocol
/// `initialize` once, then repeat `next_key_value` until it returns
/// `Ok(false)`, reading `current_key`/`current_value` after each
/// successful advance, then `close` exactly once. `current_*` return
/// `None` before the first successful advance and once the reader is
/// exhausted; calling them then is a caller protocol violation, not an
/// I/O error.
pub trait RecordReader {
    /// Key type produced by this reader.
    type Key;
    /// Value type produced by this reader.
    type Value;

    /// Bind the reader to a split and open its resources.
    ///
    /// # Errors
    /// Returns an error if the split cannot be opened or is malformed
    /// (unreadable path, range past end of file, unsupported codec use).
    fn initialize(&mut self, split: &InputSplit, context: &TaskContext) -> Result<()>;

    /// Advance to the next record. Returns `Ok(false)` at end of split.
    ///
    /// # Errors
    /// Returns an error on I/O failure, or if the reader was never
    /// initialized or has been closed.
    fn next_key_value(&mut self) -> Result<bool>;

    /// Key of the current record, if positioned on one.
    fn current_key(&self) -> Option<&Self::Key>;

    /// Value of the current record, if positioned on one.
    fn current_value(&self) -> Option<&Self::Value>;

    /// Fraction of this reader's own range consumed, in `[0, 1]`.
    ///
    /// Monotone non-decreasing across successive advances. For readers
    /// over one partition of a combined split, the value is local to that
    /// partition; cross-partition aggregation is the host's concern.
    fn progress(&self) -> f32;

    /// Release the underlying resources.
    ///
    /// After `close`, any further `next_key_value` fails rather than
    /// returning stale data. Call it once; the host owns the reader's
    /// whole lifecycle and must close on every exit path.
    fn close(&mut self) -> Result<()>;
}

/// Factory producing fresh single-file readers for one line format.
///
/// This is the explicit, type-safe replacement for instantiating reader
/// classes by name: the host binds a format value once and gets readers
/// from it, one per partition.
pub trait InputFormat {
    /// Concrete reader type this format produces.
    type Reader: RecordReader;

    /// Create a new, uninitialized reader.
    ///
    /// # Errors
    /// Returns an error if the configuration carried by `context` is
    /// unusable for this format.
    fn create_reader(&self, context: &TaskContext) -> Result<Self::Reader>;
}

/// Drain a reader into owned `(key, value)` pairs, closing it on every
/// exit path.
///
/// # Errors
/// Returns the first error from the reader; the reader is still closed
/// (close errors after a read error are ignored in favor of the read
/// error).
pub fn read_all<R>(mut reader: R) -> Result<Vec<(R::Key, R::Value)>>
where
    R: RecordReader,
    R::Key: Clone,
    R::Value: Clone,
{
    let mut records = Vec::new();
    let result = drain(&mut reader, &mut records);
    match result {
        Ok(()) => {
            reader.close()?;
            Ok(records)
        }
        Err(e) => {
            let _ = reader.close();
            Err(e)
        }
    }
}

fn drain<R>(reader: &mut R, out: &mut Vec<(R::Key, R::Value)>) -> Result<()>
where
    R: RecordReader,
    R::Key: Clone,
    R::Value: Clone,
{
    while reader.next_key_value()? {
        if let (Some(k), Some(v)) = (reader.current_key(), reader.current_value()) {
            out.push((k.clone(), v.clone()));
        }
    }
    Ok(())
}
