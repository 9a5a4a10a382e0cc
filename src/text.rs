//! Plain-line reading of single-file splits.
//!
//! [`LineRecordReader`] delivers one record per line: key = byte offset of
//! the line's first byte, value = line contents without the terminator.
//! Both `\n` and `\r\n` terminators are handled; input must be UTF-8.
//!
//! # Split boundaries
//!
//! A split reads exactly the lines that *start* inside `[start, end)`. A
//! line straddling `end` is read in full by this split; the adjacent split
//! beginning at `end` sees that the byte before its `start` is not a
//! newline and discards the partial head. A split whose `start` lands on a
//! line boundary begins exactly at that line. Adjacent splits over one
//! file therefore reproduce the standalone line sequence with no duplicate
//! and no loss.
//!
//! # Compressed inputs
//!
//! When [`codec_for_path`] recognizes the file extension, the stream is
//! decoded transparently. Codec streams cannot be entered mid-file, so a
//! compressed split must start at offset 0 (its length is the compressed
//! file length, and reading continues to end of stream). Progress is then
//! reported in compressed-stream position.

use crate::compression::{CountingReader, codec_for_path};
use crate::config::TaskContext;
use crate::reader::{InputFormat, RecordReader};
use crate::split::InputSplit;
use anyhow::{Context, Result, bail, ensure};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Factory for [`LineRecordReader`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TextInputFormat;

impl InputFormat for TextInputFormat {
    type Reader = LineRecordReader;

    fn create_reader(&self, _context: &TaskContext) -> Result<LineRecordReader> {
        Ok(LineRecordReader::new())
    }
}

/// Record reader producing `(byte offset, line)` pairs from one
/// single-file split.
pub struct LineRecordReader {
    stream: Option<BufReader<Box<dyn Read + Send>>>,
    closed: bool,
    start: u64,
    end: u64,
    /// Offset of the next unread byte, in decoded-stream coordinates.
    pos: u64,
    /// Compressed-stream progress source: (raw bytes consumed, raw length).
    compressed: Option<(Arc<AtomicU64>, u64)>,
    key: u64,
    value: String,
    have_record: bool,
    #[cfg(feature = "metrics")]
    metrics: Option<crate::metrics::ReaderMetrics>,
}

impl LineRecordReader {
    /// A reader in the uninitialized state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: None,
            closed: false,
            start: 0,
            end: 0,
            pos: 0,
            compressed: None,
            key: 0,
            value: String::new(),
            have_record: false,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }
}

impl Default for LineRecordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReader for LineRecordReader {
    type Key = u64;
    type Value = String;

    fn initialize(&mut self, split: &InputSplit, context: &TaskContext) -> Result<()> {
        ensure!(!self.closed, "record reader cannot be reinitialized after close");
        let InputSplit::File(split) = split else {
            bail!("LineRecordReader requires a single-file split");
        };

        let mut file =
            File::open(&split.path).with_context(|| format!("open {}", split.path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("stat {}", split.path.display()))?
            .len();
        let capacity = context.config.buffer_capacity.max(1);

        if let Some(codec) = codec_for_path(&split.path) {
            ensure!(
                split.start == 0,
                "{} stream {} cannot be read from offset {}: codec streams are not splittable",
                codec.name(),
                split.path.display(),
                split.start,
            );
            let consumed = Arc::new(AtomicU64::new(0));
            let counting = CountingReader::new(file, Arc::clone(&consumed));
            let decoded = codec
                .wrap_reader(Box::new(counting))
                .with_context(|| format!("open {} decoder for {}", codec.name(), split.path.display()))?;
            self.stream = Some(BufReader::with_capacity(capacity, decoded));
            self.start = 0;
            self.pos = 0;
            // Decoded length is unknown up front; end of stream terminates.
            self.end = u64::MAX;
            self.compressed = Some((consumed, file_len.max(1)));
        } else {
            ensure!(
                split.end() <= file_len,
                "split range {}..{} is past the end of {} ({} bytes)",
                split.start,
                split.end(),
                split.path.display(),
                file_len,
            );
            self.start = split.start;
            self.end = split.end();
            self.pos = split.start;
            self.compressed = None;
            if split.start > 0 {
                // Peek at the byte before the split to tell whether start
                // lands on a line boundary.
                file.seek(SeekFrom::Start(split.start - 1))
                    .with_context(|| format!("seek {} to {}", split.path.display(), split.start - 1))?;
                let mut before = [0u8; 1];
                file.read_exact(&mut before)
                    .with_context(|| format!("read {} at {}", split.path.display(), split.start - 1))?;
                let mut stream =
                    BufReader::with_capacity(capacity, Box::new(file) as Box<dyn Read + Send>);
                if before[0] != b'\n' {
                    // Mid-line start: the previous split reads this line in
                    // full, so skip its tail.
                    let mut partial = Vec::new();
                    let n = stream
                        .read_until(b'\n', &mut partial)
                        .with_context(|| format!("skip partial line in {}", split.path.display()))?;
                    self.pos += n as u64;
                }
                self.stream = Some(stream);
            } else {
                self.stream = Some(BufReader::with_capacity(
                    capacity,
                    Box::new(file) as Box<dyn Read + Send>,
                ));
            }
        }

        self.have_record = false;
        #[cfg(feature = "metrics")]
        {
            context.metrics.add_split();
            self.metrics = Some(context.metrics.clone());
        }
        Ok(())
    }

    fn next_key_value(&mut self) -> Result<bool> {
        let Some(stream) = self.stream.as_mut() else {
            if self.closed {
                bail!("record reader used after close");
            }
            bail!("record reader used before initialize");
        };
        self.have_record = false;
        if self.pos >= self.end {
            return Ok(false);
        }

        let mut line = Vec::new();
        let n = stream
            .read_until(b'\n', &mut line)
            .with_context(|| format!("read line at offset {}", self.pos))?;
        if n == 0 {
            return Ok(false);
        }
        self.key = self.pos;
        self.pos += n as u64;

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        self.value = String::from_utf8(line)
            .with_context(|| format!("line at offset {} is not valid UTF-8", self.key))?;
        self.have_record = true;
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.add_record(n as u64);
        }
        Ok(true)
    }

    fn current_key(&self) -> Option<&u64> {
        self.have_record.then_some(&self.key)
    }

    fn current_value(&self) -> Option<&String> {
        self.have_record.then_some(&self.value)
    }

    fn progress(&self) -> f32 {
        if let Some((consumed, raw_len)) = &self.compressed {
            return (consumed.load(Ordering::Relaxed) as f32 / *raw_len as f32).clamp(0.0, 1.0);
        }
        if self.end <= self.start {
            return 0.0;
        }
        // pos may pass end when the final line straddles the boundary.
        (((self.pos - self.start) as f32) / ((self.end - self.start) as f32)).clamp(0.0, 1.0)
    }

    fn close(&mut self) -> Result<()> {
        self.stream = None;
        self.compressed = None;
        self.have_record = false;
        self.closed = true;
        Ok(())
    }
}
