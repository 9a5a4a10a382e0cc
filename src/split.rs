//! Split descriptors: combined splits, single-file splits, and the
//! translation between them.
//!
//! A *combined split* aggregates byte ranges from several small files into
//! one schedulable unit. Each constituent range is a [`FileFragment`];
//! fragment index = partition index. [`CombineSplit::file_split`] turns one
//! fragment back into a standalone [`FileSplit`], which is exactly what the
//! single-file record readers consume; that translation is the only thing
//! that differs between reading a file alone and reading it as part of an
//! aggregate.
//!
//! Descriptors are plain data: no I/O, no open handles. They derive Serde
//! so a split planner can ship them to worker tasks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One constituent byte range of a [`CombineSplit`].
///
/// `start` and `length` are byte coordinates into the file at `path`.
/// A whole small file is the common case (`start == 0`,
/// `length == file size`), but any sub-range is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFragment {
    /// Source file path.
    pub path: PathBuf,
    /// Byte offset where this fragment begins.
    pub start: u64,
    /// Number of bytes assigned to this fragment.
    pub length: u64,
}

impl FileFragment {
    /// A fragment covering `[start, start + length)` of `path`.
    pub fn new(path: impl Into<PathBuf>, start: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            start,
            length,
        }
    }

    /// A fragment covering all `length` bytes of `path`.
    pub fn whole_file(path: impl Into<PathBuf>, length: u64) -> Self {
        Self::new(path, 0, length)
    }
}

/// An aggregate split spanning multiple small files.
///
/// Built by an external split planner; consumed one fragment (partition)
/// at a time by [`CombineRecordReader`](crate::CombineRecordReader).
/// Locality hints apply to the aggregate as a whole, not per fragment:
/// the planner groups files that share locality, so per-fragment hints
/// would be redundant in the common case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombineSplit {
    fragments: Vec<FileFragment>,
    locations: Vec<String>,
}

impl CombineSplit {
    /// Build a combined split from explicit fragments and locality hints.
    pub fn new(fragments: Vec<FileFragment>, locations: Vec<String>) -> Self {
        Self {
            fragments,
            locations,
        }
    }

    /// Build a combined split of whole files, stating each path for its size.
    ///
    /// This is the usual shape for small-file aggregation: one fragment per
    /// file, covering it entirely. No locality hints are attached.
    ///
    /// # Errors
    /// Returns an error if any path cannot be stated.
    pub fn from_whole_files<P, I>(paths: I) -> Result<Self>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        let mut fragments = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let meta = std::fs::metadata(path)
                .with_context(|| format!("stat {}", path.display()))?;
            fragments.push(FileFragment::whole_file(path, meta.len()));
        }
        Ok(Self::new(fragments, Vec::new()))
    }

    /// Number of fragments, which is also the number of partitions.
    pub fn num_partitions(&self) -> usize {
        self.fragments.len()
    }

    /// Whether this split contains no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The constituent fragments, in partition order.
    pub fn fragments(&self) -> &[FileFragment] {
        &self.fragments
    }

    /// Locality hints for the whole aggregate.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Total byte length across all fragments.
    pub fn total_length(&self) -> u64 {
        self.fragments.iter().map(|f| f.length).sum()
    }

    /// Reconstruct the standalone single-file split for one partition.
    ///
    /// Path, start, and length are copied verbatim from the fragment;
    /// locality hints are those of the whole aggregate. Pure and safe to
    /// call repeatedly.
    ///
    /// # Panics
    /// Panics if `partition >= self.num_partitions()`. Partition indices
    /// come from the host's outer iterator, which derives them from this
    /// split; an out-of-range index is a bug in that caller.
    pub fn file_split(&self, partition: usize) -> FileSplit {
        let fragment = &self.fragments[partition];
        FileSplit {
            path: fragment.path.clone(),
            start: fragment.start,
            length: fragment.length,
            locations: self.locations.clone(),
        }
    }
}

/// A contiguous byte range of a single file, with locality hints.
///
/// This is the split shape the single-file record readers understand.
/// Reconstructed ones are ephemeral: created per partition, owned by that
/// partition's reader, discarded when it closes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileSplit {
    /// Source file path.
    pub path: PathBuf,
    /// Byte offset where the split begins.
    pub start: u64,
    /// Number of bytes assigned to the split.
    pub length: u64,
    /// Hosts holding the data, for scheduler placement.
    pub locations: Vec<String>,
}

impl FileSplit {
    /// A split over `[start, start + length)` of `path`, with no hints.
    pub fn new(path: impl Into<PathBuf>, start: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            start,
            length,
            locations: Vec::new(),
        }
    }

    /// One past the last byte offset assigned to this split.
    ///
    /// Saturates at `u64::MAX`, so a descriptor whose range overflows reads
    /// as past the end of any real file and fails the range check at
    /// initialize rather than wrapping.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }
}

/// Any split a record reader may be initialized with.
///
/// Readers in this crate only do real work for [`InputSplit::File`];
/// carrying the combined variant in the same enum lets generic
/// instantiation paths hand a reader the wrong kind without the reader
/// having to crash (see
/// [`CombineRecordReader::initialize`](crate::CombineRecordReader)).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputSplit {
    /// A standalone single-file byte range.
    File(FileSplit),
    /// An aggregate of small-file byte ranges.
    Combine(CombineSplit),
}
