//! Unit tests for the snapshot store

use crate::common::{at, sample_data, snapshot, TestFixture};
use scorediff::store::load_snapshot;
use scorediff::{ScorediffError, Series, SnapshotStore};
use std::fs;

#[test]
fn test_open_creates_directory() {
    let fixture = TestFixture::new().unwrap();
    let nested = fixture.root().join("a").join("b");

    let store = SnapshotStore::open(nested.clone()).unwrap();
    assert!(nested.is_dir());
    assert!(store.list(Series::Standard).unwrap().is_empty());
}

#[test]
fn test_list_missing_directory_is_empty() {
    let fixture = TestFixture::new().unwrap();
    let store = SnapshotStore::new(fixture.root().join("nowhere"));
    assert!(store.list(Series::Custom).unwrap().is_empty());
    assert!(store.latest_pair(Series::Custom).unwrap().is_none());
}

#[test]
fn test_write_and_load_back() {
    let fixture = TestFixture::new().unwrap();
    let original = snapshot(&sample_data::week_two());

    let stored = fixture.store.write(Series::Standard, &original, at(3, 9)).unwrap();
    assert_eq!(stored.series, Series::Standard);
    assert_eq!(stored.captured, at(3, 9));
    assert_eq!(
        stored.path.file_name().unwrap(),
        "codingbat_scores_2024-09-03_09-00-00.csv"
    );

    let text = fs::read_to_string(&stored.path).unwrap();
    assert!(text.starts_with("User ID,Memo,Warmup-1,String-1,Logic-1,Total\n"));
    assert!(text.contains("bob@example.com,Bob,0,4,0,4\n"));

    assert_eq!(fixture.store.load(&stored).unwrap(), original);
    assert_eq!(load_snapshot(&stored.path).unwrap(), original);
}

#[test]
fn test_write_never_overwrites() {
    let fixture = TestFixture::new().unwrap();
    let first = snapshot(&sample_data::week_one());
    let second = snapshot(&sample_data::week_two());

    fixture.store.write(Series::Standard, &first, at(3, 9)).unwrap();
    let err = fixture.store.write(Series::Standard, &second, at(3, 9)).unwrap_err();
    assert!(matches!(err, ScorediffError::Store { .. }));

    let listed = fixture.store.list(Series::Standard).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(fixture.store.load(&listed[0]).unwrap(), first);
}

#[test]
fn test_list_is_newest_first_and_per_series() {
    let fixture = TestFixture::new().unwrap();
    let data = sample_data::week_one();

    fixture.write_snapshot_csv(Series::Standard, at(2, 8), &data).unwrap();
    fixture.write_snapshot_csv(Series::Standard, at(10, 8), &data).unwrap();
    fixture.write_snapshot_csv(Series::Standard, at(5, 8), &data).unwrap();
    fixture.write_snapshot_csv(Series::Custom, at(6, 8), &data).unwrap();
    fs::write(fixture.store.root.join("notes.txt"), "unrelated").unwrap();
    fs::write(fixture.store.root.join("codingbat_scores_report_2024-09-10_08-00-00.txt"), "").unwrap();

    let standard: Vec<_> = fixture
        .store
        .list(Series::Standard)
        .unwrap()
        .into_iter()
        .map(|s| s.captured)
        .collect();
    assert_eq!(standard, vec![at(10, 8), at(5, 8), at(2, 8)]);

    let custom = fixture.store.list(Series::Custom).unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].captured, at(6, 8));
}

#[test]
fn test_latest_pair() {
    let fixture = TestFixture::new().unwrap();
    let data = sample_data::week_one();

    fixture.write_snapshot_csv(Series::Standard, at(1, 8), &data).unwrap();
    let pair = fixture.store.latest_pair(Series::Standard).unwrap().unwrap();
    assert_eq!(pair.newer.captured, at(1, 8));
    assert!(pair.older.is_none());

    fixture.write_snapshot_csv(Series::Standard, at(2, 8), &data).unwrap();
    fixture.write_snapshot_csv(Series::Standard, at(3, 8), &data).unwrap();
    let pair = fixture.store.latest_pair(Series::Standard).unwrap().unwrap();
    assert_eq!(pair.newer.captured, at(3, 8));
    assert_eq!(pair.older.unwrap().captured, at(2, 8));
}

#[test]
fn test_write_report() {
    let fixture = TestFixture::new().unwrap();
    let lines = vec!["first line".to_string(), String::new(), "last".to_string()];

    let path = fixture.store.write_report(Series::Custom, at(4, 7), &lines).unwrap();
    assert_eq!(
        path.file_name().unwrap(),
        "codingbat_scores_report_2024-09-04_07-00-00_custom.txt"
    );
    assert_eq!(fs::read_to_string(path).unwrap(), "first line\n\nlast\n");
}
