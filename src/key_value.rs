//! Delimiter-separated key/value reading of single-file splits.
//!
//! [`KeyValueLineRecordReader`] wraps a [`LineRecordReader`] and splits
//! each line at the first occurrence of the configured separator byte
//! (tab by default): key = text before the separator, value = text after
//! it. A line without the separator becomes `(whole_line, "")`.
//!
//! Split-boundary and compression behavior are those of the wrapped line
//! reader.

use crate::config::TaskContext;
use crate::reader::{InputFormat, RecordReader};
use crate::split::InputSplit;
use crate::text::LineRecordReader;
use anyhow::{Result, ensure};

/// Factory for [`KeyValueLineRecordReader`].
///
/// The separator comes from
/// [`ReaderConfig::key_value_separator`](crate::ReaderConfig).
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyValueTextInputFormat;

impl InputFormat for KeyValueTextInputFormat {
    type Reader = KeyValueLineRecordReader;

    fn create_reader(&self, context: &TaskContext) -> Result<KeyValueLineRecordReader> {
        Ok(KeyValueLineRecordReader::new(
            context.config.key_value_separator,
        ))
    }
}

/// Record reader producing `(key, value)` string pairs from one
/// single-file split of separator-delimited text.
pub struct KeyValueLineRecordReader {
    line: LineRecordReader,
    separator: u8,
    key: String,
    value: String,
    have_record: bool,
}

impl KeyValueLineRecordReader {
    /// A reader splitting lines at `separator`, in the uninitialized state.
    #[must_use]
    pub fn new(separator: u8) -> Self {
        Self {
            line: LineRecordReader::new(),
            separator,
            key: String::new(),
            value: String::new(),
            have_record: false,
        }
    }
}

impl RecordReader for KeyValueLineRecordReader {
    type Key = String;
    type Value = String;

    fn initialize(&mut self, split: &InputSplit, context: &TaskContext) -> Result<()> {
        ensure!(
            self.separator.is_ascii(),
            "key/value separator {:#04x} is not ASCII",
            self.separator,
        );
        self.line.initialize(split, context)
    }

    fn next_key_value(&mut self) -> Result<bool> {
        self.have_record = false;
        if !self.line.next_key_value()? {
            return Ok(false);
        }
        let Some(text) = self.line.current_value() else {
            return Ok(false);
        };
        // Separator is ASCII, so the byte position is a char boundary.
        match text.bytes().position(|b| b == self.separator) {
            Some(i) => {
                self.key = text[..i].to_string();
                self.value = text[i + 1..].to_string();
            }
            None => {
                self.key = text.clone();
                self.value = String::new();
            }
        }
        self.have_record = true;
        Ok(true)
    }

    fn current_key(&self) -> Option<&String> {
        self.have_record.then_some(&self.key)
    }

    fn current_value(&self) -> Option<&String> {
        self.have_record.then_some(&self.value)
    }

    fn progress(&self) -> f32 {
        self.line.progress()
    }

    fn close(&mut self) -> Result<()> {
        self.have_record = false;
        self.line.close()
    }
}
