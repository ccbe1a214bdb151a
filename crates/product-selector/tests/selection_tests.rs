//! Selection tests against real temporary directories.

use std::fs;

use chrono::{Duration, TimeZone, Utc};
use product_selector::ProductSelector;
use test_utils::{write_artifact, write_artifact_series};
use viewer_common::EndTime;

// ============================================================================
// Window tests
// ============================================================================

#[test]
fn test_realtime_window_keeps_recent_frames_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    // 10 frames, 5 minutes apart, newest 1 minute ago
    write_artifact_series(dir.path(), "CTI_VEL", now - Duration::minutes(1), Duration::minutes(5), 10).unwrap();

    let selected = ProductSelector::default()
        .select("CTI_VEL", dir.path(), 1800, &EndTime::Now, now)
        .unwrap();

    // 11:59, 11:54, ..., 11:34 fall inside [11:30, 12:00]
    assert_eq!(selected.len(), 6);
    assert!(selected.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(selected.last().unwrap().timestamp, now - Duration::minutes(1));
}

#[test]
fn test_window_bounds_are_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    write_artifact(dir.path(), "K", end).unwrap();
    write_artifact(dir.path(), "K", end - Duration::seconds(600)).unwrap();
    write_artifact(dir.path(), "K", end - Duration::seconds(601)).unwrap();
    write_artifact(dir.path(), "K", end + Duration::seconds(1)).unwrap();

    let selected = ProductSelector::default()
        .select("K", dir.path(), 600, &EndTime::At(end), Utc::now())
        .unwrap();

    let stamps: Vec<_> = selected.iter().map(|a| a.timestamp).collect();
    assert_eq!(stamps, vec![end - Duration::seconds(600), end]);
}

#[test]
fn test_archive_end_time_ignores_wall_clock() {
    let dir = tempfile::tempdir().unwrap();
    let pinned = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    write_artifact_series(dir.path(), "K", pinned, Duration::minutes(10), 4).unwrap();

    let selected = ProductSelector::default()
        .select("K", dir.path(), 3600, &EndTime::At(pinned), Utc::now())
        .unwrap();
    assert_eq!(selected.len(), 4);
}

// ============================================================================
// Filtering tests
// ============================================================================

#[test]
fn test_ignores_other_keys_extensions_and_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    write_artifact(dir.path(), "K", now).unwrap();
    write_artifact(dir.path(), "OTHER", now).unwrap();
    fs::write(dir.path().join("K_20240601_115900.txt"), b"not an image").unwrap();
    write_artifact(&dir.path().join("nested"), "K", now - Duration::minutes(1)).unwrap();

    let selected = ProductSelector::default()
        .select("K", dir.path(), 3600, &EndTime::Now, now)
        .unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].timestamp, now);
}

#[test]
fn test_empty_directory_yields_empty_selection() {
    let dir = tempfile::tempdir().unwrap();
    let selected = ProductSelector::default()
        .select("K", dir.path(), 3600, &EndTime::Now, Utc::now())
        .unwrap();
    assert!(selected.is_empty());
}

// ============================================================================
// Best file / limits
// ============================================================================

#[test]
fn test_best_file_is_newest() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let paths = write_artifact_series(dir.path(), "K", now, Duration::minutes(2), 3).unwrap();

    let best = ProductSelector::default()
        .best_file("K", dir.path(), 3600, &EndTime::Now, now)
        .unwrap()
        .unwrap();
    assert_eq!(&best.path, paths.last().unwrap());
}

#[test]
fn test_max_frames_keeps_newest() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    write_artifact_series(dir.path(), "K", now, Duration::minutes(1), 8).unwrap();

    let selected = ProductSelector::default()
        .with_max_frames(3)
        .select("K", dir.path(), 3600, &EndTime::Now, now)
        .unwrap();
    assert_eq!(selected.len(), 3);
    assert_eq!(selected[0].timestamp, now - Duration::minutes(2));
    assert_eq!(selected[2].timestamp, now);
}

#[test]
fn test_selection_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    write_artifact_series(dir.path(), "K", now, Duration::minutes(1), 5).unwrap();
    let selector = ProductSelector::default();

    let first = selector.select("K", dir.path(), 3600, &EndTime::Now, now).unwrap();
    let second = selector.select("K", dir.path(), 3600, &EndTime::Now, now).unwrap();
    assert_eq!(first, second);
}
