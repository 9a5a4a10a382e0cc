use anyhow::Result;
use smallfiles::{
    FileSplit, InputSplit, KeyValueLineRecordReader, KeyValueTextInputFormat, ReaderConfig,
    RecordReader, TaskContext,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(contents: &str) -> Result<(TempDir, PathBuf)> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("data.tsv");
    fs::write(&path, contents)?;
    Ok((tmp, path))
}

fn pairs(path: &PathBuf, length: u64, separator: u8) -> Result<Vec<(String, String)>> {
    let context = TaskContext::default();
    let mut reader = KeyValueLineRecordReader::new(separator);
    reader.initialize(&InputSplit::File(FileSplit::new(path, 0, length)), &context)?;
    smallfiles::read_all(reader)
}

#[test]
fn tab_separated_pairs() -> Result<()> {
    let (_tmp, path) = write_file("a\t1\nb\t2\n")?;
    let records = pairs(&path, 8, b'\t')?;
    assert_eq!(
        records,
        vec![("a".into(), "1".into()), ("b".into(), "2".into())]
    );
    Ok(())
}

#[test]
fn advance_returns_false_after_last_pair() -> Result<()> {
    let (_tmp, path) = write_file("a\t1\nb\t2\n")?;
    let context = TaskContext::default();
    let mut reader = KeyValueLineRecordReader::new(b'\t');
    reader.initialize(&InputSplit::File(FileSplit::new(&path, 0, 8)), &context)?;
    assert!(reader.next_key_value()?);
    assert!(reader.next_key_value()?);
    assert!(!reader.next_key_value()?);
    assert_eq!(reader.current_key(), None);
    reader.close()?;
    Ok(())
}

#[test]
fn custom_separator() -> Result<()> {
    let (_tmp, path) = write_file("x=10\ny=20\n")?;
    let records = pairs(&path, 10, b'=')?;
    assert_eq!(
        records,
        vec![("x".into(), "10".into()), ("y".into(), "20".into())]
    );
    Ok(())
}

#[test]
fn only_first_separator_splits_the_line() -> Result<()> {
    let (_tmp, path) = write_file("k\tv1\tv2\n")?;
    let records = pairs(&path, 8, b'\t')?;
    assert_eq!(records, vec![("k".into(), "v1\tv2".into())]);
    Ok(())
}

#[test]
fn line_without_separator_becomes_key_with_empty_value() -> Result<()> {
    let (_tmp, path) = write_file("loner\na\t1\n")?;
    let records = pairs(&path, 10, b'\t')?;
    assert_eq!(
        records,
        vec![("loner".into(), String::new()), ("a".into(), "1".into())]
    );
    Ok(())
}

#[test]
fn non_ascii_separator_fails_at_initialize() -> Result<()> {
    let (_tmp, path) = write_file("a\t1\n")?;
    let context = TaskContext::default();
    let mut reader = KeyValueLineRecordReader::new(0xC3);
    let result = reader.initialize(&InputSplit::File(FileSplit::new(&path, 0, 4)), &context);
    assert!(result.is_err());
    Ok(())
}

#[test]
fn factory_takes_separator_from_config() -> Result<()> {
    use smallfiles::InputFormat;

    let (_tmp, path) = write_file("x=10\n")?;
    let context = TaskContext::new(ReaderConfig {
        key_value_separator: b'=',
        ..ReaderConfig::default()
    });
    let mut reader = KeyValueTextInputFormat.create_reader(&context)?;
    reader.initialize(&InputSplit::File(FileSplit::new(&path, 0, 5)), &context)?;
    assert!(reader.next_key_value()?);
    assert_eq!(reader.current_key(), Some(&"x".to_string()));
    assert_eq!(reader.current_value(), Some(&"10".to_string()));
    reader.close()?;
    Ok(())
}

#[test]
fn progress_forwards_to_wrapped_line_reader() -> Result<()> {
    let (_tmp, path) = write_file("a\t1\nb\t2\nc\t3\n")?;
    let context = TaskContext::default();
    let mut reader = KeyValueLineRecordReader::new(b'\t');
    reader.initialize(&InputSplit::File(FileSplit::new(&path, 0, 12)), &context)?;

    let mut last = reader.progress();
    while reader.next_key_value()? {
        let p = reader.progress();
        assert!((0.0..=1.0).contains(&p));
        assert!(p >= last);
        last = p;
    }
    assert_eq!(reader.progress(), 1.0);
    reader.close()?;
    Ok(())
}
