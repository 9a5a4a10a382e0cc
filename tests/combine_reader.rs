use anyhow::Result;
use smallfiles::{
    CombineKeyValueTextReader, CombineSplit, CombineTextReader, FileFragment, FileSplit,
    InputSplit, KeyValueLineRecordReader, KeyValueTextInputFormat, LineFormat, LineRecordReader,
    PartitionReader, ReaderConfig, RecordReader, TaskContext, TextInputFormat, open_partition,
    read_all,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Ten 8-byte lines: "line-01\n" .. "line-10\n".
fn ten_line_file() -> Result<(TempDir, PathBuf)> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("ten.txt");
    let contents: String = (1..=10).map(|i| format!("line-{i:02}\n")).collect();
    fs::write(&path, contents)?;
    Ok((tmp, path))
}

/// Fragments covering lines 1-4, 5-7, and 8-10 of the ten-line file.
fn three_way_split(path: &Path) -> CombineSplit {
    CombineSplit::new(
        vec![
            FileFragment::new(path, 0, 32),
            FileFragment::new(path, 32, 24),
            FileFragment::new(path, 56, 24),
        ],
        vec!["node-a".into()],
    )
}

fn standalone_lines(path: &Path, start: u64, length: u64) -> Result<Vec<(u64, String)>> {
    let context = TaskContext::default();
    let mut reader = LineRecordReader::new();
    reader.initialize(&InputSplit::File(FileSplit::new(path, start, length)), &context)?;
    read_all(reader)
}

#[test]
fn middle_partition_yields_exactly_its_lines() -> Result<()> {
    let (_tmp, path) = ten_line_file()?;
    let split = three_way_split(&path);
    let context = TaskContext::default();

    let reader = CombineTextReader::new(&split, &context, 1, &TextInputFormat)?;
    let records = read_all(reader)?;
    assert_eq!(
        records,
        vec![
            (32, "line-05".into()),
            (40, "line-06".into()),
            (48, "line-07".into()),
        ]
    );
    Ok(())
}

#[test]
fn every_partition_matches_a_standalone_read_of_the_same_range() -> Result<()> {
    let (_tmp, path) = ten_line_file()?;
    let split = three_way_split(&path);
    let context = TaskContext::default();

    for partition in 0..split.num_partitions() {
        let fragment = &split.fragments()[partition];
        let expected = standalone_lines(&path, fragment.start, fragment.length)?;
        let reader = CombineTextReader::new(&split, &context, partition, &TextInputFormat)?;
        assert_eq!(read_all(reader)?, expected, "partition {partition}");
    }
    Ok(())
}

#[test]
fn partitions_together_reproduce_the_whole_file() -> Result<()> {
    let (_tmp, path) = ten_line_file()?;
    let split = three_way_split(&path);
    let context = TaskContext::default();

    let mut combined = Vec::new();
    for partition in 0..split.num_partitions() {
        let reader = CombineTextReader::new(&split, &context, partition, &TextInputFormat)?;
        combined.extend(read_all(reader)?);
    }
    assert_eq!(combined, standalone_lines(&path, 0, 80)?);
    Ok(())
}

#[test]
fn whole_small_files_read_in_partition_order() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write(&a, "from-a\n")?;
    fs::write(&b, "from-b1\nfrom-b2\n")?;
    let split = CombineSplit::from_whole_files([&a, &b])?;
    let context = TaskContext::default();

    let first = read_all(CombineTextReader::new(&split, &context, 0, &TextInputFormat)?)?;
    let second = read_all(CombineTextReader::new(&split, &context, 1, &TextInputFormat)?)?;
    assert_eq!(first, vec![(0, "from-a".into())]);
    assert_eq!(
        second,
        vec![(0, "from-b1".into()), (8, "from-b2".into())]
    );
    Ok(())
}

#[test]
fn key_value_partition_matches_standalone_read() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("pairs.tsv");
    fs::write(&path, "a\t1\nb\t2\n")?;
    let split = CombineSplit::from_whole_files([&path])?;
    let context = TaskContext::default();

    let combined = read_all(CombineKeyValueTextReader::new(
        &split,
        &context,
        0,
        &KeyValueTextInputFormat,
    )?)?;

    let mut standalone = KeyValueLineRecordReader::new(b'\t');
    standalone.initialize(&InputSplit::File(FileSplit::new(&path, 0, 8)), &context)?;
    assert_eq!(combined, read_all(standalone)?);
    assert_eq!(
        combined,
        vec![("a".into(), "1".into()), ("b".into(), "2".into())]
    );
    Ok(())
}

#[test]
fn key_value_fragment_exhausts_after_its_pairs() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("pairs.tsv");
    fs::write(&path, "a\t1\nb\t2\n")?;
    let split = CombineSplit::from_whole_files([&path])?;
    let context = TaskContext::default();

    let mut reader =
        CombineKeyValueTextReader::new(&split, &context, 0, &KeyValueTextInputFormat)?;
    assert!(reader.next_key_value()?);
    assert_eq!(reader.current_key(), Some(&"a".to_string()));
    assert_eq!(reader.current_value(), Some(&"1".to_string()));
    assert!(reader.next_key_value()?);
    assert_eq!(reader.current_key(), Some(&"b".to_string()));
    assert_eq!(reader.current_value(), Some(&"2".to_string()));
    assert!(!reader.next_key_value()?);
    reader.close()?;
    Ok(())
}

#[test]
fn initialize_with_combine_split_is_a_noop() -> Result<()> {
    let (_tmp, path) = ten_line_file()?;
    let split = three_way_split(&path);
    let context = TaskContext::default();

    let mut reader = CombineTextReader::new(&split, &context, 1, &TextInputFormat)?;
    // Generic instantiation paths may re-initialize with the aggregate
    // split; the already-initialized underlying reader must be untouched.
    reader.initialize(&InputSplit::Combine(split.clone()), &context)?;

    assert!(reader.next_key_value()?);
    assert_eq!(reader.current_value(), Some(&"line-05".to_string()));
    reader.close()?;
    Ok(())
}

#[test]
fn progress_is_local_to_the_partition() -> Result<()> {
    let (_tmp, path) = ten_line_file()?;
    let split = three_way_split(&path);
    let context = TaskContext::default();

    // Each partition runs 0 -> 1 on its own; no rescaling by the
    // partition's share of the aggregate.
    for partition in 0..split.num_partitions() {
        let mut reader = CombineTextReader::new(&split, &context, partition, &TextInputFormat)?;
        assert_eq!(reader.progress(), 0.0);
        let mut last = 0.0f32;
        while reader.next_key_value()? {
            let p = reader.progress();
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
        assert_eq!(reader.progress(), 1.0);
        reader.close()?;
    }
    Ok(())
}

#[test]
fn construction_fails_for_unreadable_fragment() {
    let split = CombineSplit::new(
        vec![FileFragment::new("/no/such/dir/gone.txt", 0, 10)],
        Vec::new(),
    );
    let context = TaskContext::default();
    assert!(CombineTextReader::new(&split, &context, 0, &TextInputFormat).is_err());
}

#[test]
#[should_panic]
fn construction_panics_for_out_of_range_partition() {
    let split = CombineSplit::new(vec![FileFragment::new("a.txt", 0, 1)], Vec::new());
    let context = TaskContext::default();
    let _ = CombineTextReader::new(&split, &context, 1, &TextInputFormat);
}

#[test]
fn open_partition_selects_format_from_config() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("pairs.tsv");
    fs::write(&path, "a\t1\nb\t2\n")?;
    let split = CombineSplit::from_whole_files([&path])?;

    let text_ctx = TaskContext::default();
    let reader = open_partition(&split, &text_ctx, 0)?;
    assert_eq!(reader.format(), LineFormat::Text);

    let kv_ctx = TaskContext::new(ReaderConfig {
        format: "key-value-text".parse()?,
        ..ReaderConfig::default()
    });
    let mut reader = open_partition(&split, &kv_ctx, 0)?;
    assert_eq!(reader.format(), LineFormat::KeyValueText);

    let mut keys = Vec::new();
    while reader.next_key_value()? {
        if let PartitionReader::KeyValueText(r) = &reader {
            keys.extend(r.current_key().cloned());
        }
    }
    reader.close()?;
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    Ok(())
}
