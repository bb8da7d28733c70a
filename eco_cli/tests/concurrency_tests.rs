//! Concurrency tests for the ecolog binary.
//!
//! These tests verify that concurrent submissions:
//! - Never produce two journal entries for the same (user, date)
//! - Never double-count points or streaks
//! - Keep the journal valid JSON-lines under load

use assert_cmd::Command;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ecolog"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_same_day_submissions_single_winner() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Hammer the same (user, date) from several processes at once
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(i * 3));
                cli()
                    .arg("log")
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .arg("--name")
                    .arg("asha")
                    .arg("--travel-km")
                    .arg("10")
                    .arg("--date")
                    .arg("2025-06-01")
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Exactly one submission won
    let journal_path = data_dir.join("journal/entries.jsonl");
    let journal = std::fs::read_to_string(&journal_path).expect("Failed to read journal");
    assert_eq!(
        journal.lines().count(),
        1,
        "Expected a single journal entry, got: {}",
        journal
    );

    // And points were awarded exactly once (10 km by car, veg -> 2.9 kg -> 97)
    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--name")
        .arg("asha")
        .assert()
        .success()
        .stdout(predicates::str::contains("Points: 97"))
        .stdout(predicates::str::contains("Streak: 1"));
}

#[test]
fn test_concurrent_distinct_users_all_logged() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(i * 3));
                cli()
                    .arg("log")
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .arg("--name")
                    .arg(format!("user{}", i))
                    .arg("--date")
                    .arg("2025-06-01")
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let journal_path = data_dir.join("journal/entries.jsonl");
    let journal = std::fs::read_to_string(&journal_path).expect("Failed to read journal");
    assert_eq!(journal.lines().count(), 5);

    // Every user's row landed in the roster
    for i in 0..5 {
        cli()
            .arg("stats")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--name")
            .arg(format!("user{}", i))
            .assert()
            .success();
    }
}

#[test]
fn test_no_journal_corruption_under_load() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Distinct dates so every submission is accepted
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(i * 3));
                cli()
                    .arg("log")
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .arg("--name")
                    .arg("asha")
                    .arg("--date")
                    .arg(format!("2025-06-{:02}", i + 1))
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Give filesystem a moment to settle
    thread::sleep(Duration::from_millis(100));

    // Verify the journal is valid JSON-lines
    let journal_path = data_dir.join("journal/entries.jsonl");
    let journal = std::fs::read_to_string(&journal_path).expect("Failed to read journal");

    let mut valid_count = 0;
    for line in journal.lines() {
        if line.is_empty() {
            continue;
        }
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(line);
        assert!(parsed.is_ok(), "Journal contains invalid JSON line: {}", line);
        valid_count += 1;
    }

    assert_eq!(valid_count, 10, "Expected 10 valid entries in journal");
}

#[test]
fn test_rollup_while_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Seed some entries
    for day in 1..=3 {
        cli()
            .arg("log")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--name")
            .arg("asha")
            .arg("--date")
            .arg(format!("2025-06-{:02}", day))
            .assert()
            .success();
    }

    // Start rollup in background
    let data_dir_rollup = data_dir.clone();
    let rollup_handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        cli()
            .arg("rollup")
            .arg("--data-dir")
            .arg(&data_dir_rollup)
            .assert()
            .success();
    });

    // Log more days while the rollup might be running
    for day in 4..=5 {
        cli()
            .arg("log")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--name")
            .arg("asha")
            .arg("--date")
            .arg(format!("2025-06-{:02}", day))
            .assert()
            .success();
        thread::sleep(Duration::from_millis(5));
    }

    rollup_handle.join().expect("Rollup thread panicked");

    // Whatever the interleaving, all five days are visible exactly once
    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--name")
        .arg("asha")
        .assert()
        .success()
        .stdout(predicates::str::contains("2025-06-01"))
        .stdout(predicates::str::contains("2025-06-05"));
}
