//! Integration tests for the `frontdesk` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to drive the check, book,
//! cancel, availability, suggest and audit subcommands against JSON ledger
//! fixtures, including exit codes for rejected bookings.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper: path to the ledger.json fixture (three appointments on 2024-01-10).
fn ledger_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ledger.json")
}

/// Helper: path to a ledger that already contains a doctor double-booking.
fn double_booked_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/double_booked.json")
}

/// Helper: `frontdesk` with "today" pinned to 2024-01-01.
fn frontdesk() -> Command {
    let mut cmd = Command::cargo_bin("frontdesk").unwrap();
    cmd.env_remove("FRONTDESK_CONFIG")
        .env_remove("FRONTDESK_LOG")
        .args(["--today", "2024-01-01"]);
    cmd
}

/// Helper: copy the ledger fixture into a scratch directory.
fn scratch_ledger() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::copy(ledger_path(), &path).unwrap();
    (dir, path)
}

fn appointment_count(path: &PathBuf) -> usize {
    let raw = std::fs::read_to_string(path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    value["appointments"].as_array().unwrap().len()
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_overlapping_doctor_slot_is_rejected() {
    frontdesk()
        .args(["check", "-l", ledger_path()])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "09:15", "--end", "09:45"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("DoctorConflict"))
        .stdout(predicate::str::contains("09:00-09:30"));
}

#[test]
fn check_back_to_back_slot_is_admissible() {
    frontdesk()
        .args(["check", "-l", ledger_path()])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "11:00", "--end", "11:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Admissible"));
}

#[test]
fn check_patient_conflict_names_other_doctor() {
    frontdesk()
        .args(["check", "-l", ledger_path()])
        .args(["--doctor", "1", "--patient", "102", "--date", "2024-01-10"])
        .args(["--start", "14:30", "--end", "15:00"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Dr. Tomas Lindqvist"));
}

#[test]
fn check_far_future_date_is_rejected() {
    frontdesk()
        .args(["check", "-l", ledger_path()])
        .args(["--doctor", "1", "--patient", "200", "--date", "2025-02-05"])
        .args(["--start", "09:00", "--end", "09:30"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("DateTooFarInFuture"));
}

#[test]
fn check_weekend_from_availability_is_rejected() {
    frontdesk()
        .args(["check", "-l", ledger_path(), "--from-availability"])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-13"])
        .args(["--start", "09:00", "--end", "09:30"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("WeekendRejected"));
}

#[test]
fn check_weekend_allowed_by_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"restrict_to_weekdays": false}"#).unwrap();

    frontdesk()
        .args(["--config", config.to_str().unwrap()])
        .args(["check", "-l", ledger_path(), "--from-availability"])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-13"])
        .args(["--start", "09:00", "--end", "09:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Admissible"));
}

#[test]
fn check_json_output_reports_rejection() {
    let output = frontdesk()
        .args(["check", "-l", ledger_path(), "--format", "json"])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "10:00", "--end", "09:00"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["admissible"], false);
    assert_eq!(value["rejection"]["kind"], "InvalidTimeRange");
}

#[test]
fn check_reads_ledger_from_stdin() {
    let ledger = std::fs::read_to_string(ledger_path()).unwrap();

    frontdesk()
        .arg("check")
        .args(["--doctor", "2", "--patient", "300", "--date", "2024-01-10"])
        .args(["--start", "14:45", "--end", "15:15"])
        .write_stdin(ledger)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("DoctorConflict"));
}

#[test]
fn check_unknown_doctor_fails() {
    frontdesk()
        .args(["check", "-l", ledger_path()])
        .args(["--doctor", "9", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "09:00", "--end", "09:30"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown doctor"));
}

#[test]
fn check_malformed_time_fails() {
    frontdesk()
        .args(["check", "-l", ledger_path()])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "9am", "--end", "09:30"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid time"));
}

// ─────────────────────────────────────────────────────────────────────────────
// book / cancel
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn book_writes_new_appointment_to_ledger() {
    let (_dir, path) = scratch_ledger();

    frontdesk()
        .args(["book", "-l", path.to_str().unwrap()])
        .args(["--doctor", "2", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "15:00", "--end", "15:30", "--diagnosis", "Follow-up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Booked appointment #4"));

    assert_eq!(appointment_count(&path), 4);
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Follow-up"));
}

#[test]
fn rejected_booking_leaves_ledger_unchanged() {
    let (_dir, path) = scratch_ledger();
    let before = std::fs::read_to_string(&path).unwrap();

    frontdesk()
        .args(["book", "-l", path.to_str().unwrap()])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-10"])
        .args(["--start", "10:00", "--end", "10:30"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Rejected (DoctorConflict)"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn book_to_separate_output_file() {
    let (dir, path) = scratch_ledger();
    let output = dir.path().join("updated.json");

    frontdesk()
        .args(["book", "-l", path.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .args(["--doctor", "1", "--patient", "200", "--date", "2024-01-11"])
        .args(["--start", "08:00", "--end", "08:30"])
        .assert()
        .success();

    assert_eq!(appointment_count(&path), 3);
    assert_eq!(appointment_count(&output), 4);
}

#[test]
fn cancel_removes_appointment() {
    let (_dir, path) = scratch_ledger();

    frontdesk()
        .args(["cancel", "-l", path.to_str().unwrap(), "--id", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled appointment #2"));

    assert_eq!(appointment_count(&path), 2);
}

#[test]
fn cancel_unknown_id_fails() {
    let (_dir, path) = scratch_ledger();

    frontdesk()
        .args(["cancel", "-l", path.to_str().unwrap(), "--id", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No appointment with id 42"));

    assert_eq!(appointment_count(&path), 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// availability / suggest
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn availability_text_for_one_doctor() {
    frontdesk()
        .args(["availability", "-l", ledger_path(), "--date", "2024-01-10"])
        .args(["--doctor", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dr. Amara Okafor (#1)"))
        .stdout(predicate::str::contains("busy 90 min, free 510 min, 15.0% utilized"))
        .stdout(predicate::str::contains("free 08:00-09:00 (60 min)"))
        .stdout(predicate::str::contains("free 11:00-18:00 (420 min)"))
        .stdout(predicate::str::contains("Lindqvist").not());
}

#[test]
fn availability_json_for_roster() {
    let output = frontdesk()
        .args(["availability", "-l", ledger_path(), "--date", "2024-01-10"])
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1]["doctor_id"], 2);
    assert_eq!(reports[1]["busy_minutes"], 60);
    assert_eq!(reports[1]["free_intervals"][1]["start"], "15:00");
}

#[test]
fn availability_on_weekend_is_closed() {
    frontdesk()
        .args(["availability", "-l", ledger_path(), "--date", "2024-01-13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("closed"));
}

#[test]
fn availability_defaults_to_today() {
    Command::cargo_bin("frontdesk")
        .unwrap()
        .env_remove("FRONTDESK_CONFIG")
        .args(["--today", "2024-01-10"])
        .args(["availability", "-l", ledger_path(), "--doctor", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-10"))
        .stdout(predicate::str::contains("busy 60 min"));
}

#[test]
fn suggest_hour_slots_for_doctor() {
    frontdesk()
        .args(["suggest", "-l", ledger_path(), "--doctor", "1"])
        .args(["--date", "2024-01-10", "--duration", "60"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("08:00-09:00\n"))
        .stdout(predicate::str::contains("11:00-12:00"))
        .stdout(predicate::str::contains("17:00-18:00"))
        .stdout(predicate::str::contains("09:00-10:00").not());
}

#[test]
fn suggest_rejects_durations_longer_than_a_day() {
    for duration in ["1470", "9223372036854775807", "0"] {
        frontdesk()
            .args(["suggest", "-l", ledger_path(), "--doctor", "1"])
            .args(["--date", "2024-01-10", "--duration", duration])
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("invalid value"));
    }
}

#[test]
fn suggest_whole_afternoon_fits_only_the_long_gap() {
    frontdesk()
        .args(["suggest", "-l", ledger_path(), "--doctor", "1"])
        .args(["--date", "2024-01-10", "--duration", "420"])
        .assert()
        .success()
        .stdout(predicate::str::diff("11:00-18:00\n"));
}

#[test]
fn suggest_on_closed_day_reports_none() {
    frontdesk()
        .args(["suggest", "-l", ledger_path(), "--doctor", "1"])
        .args(["--date", "2024-01-13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No 30-minute slots available"));
}

// ─────────────────────────────────────────────────────────────────────────────
// audit
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn audit_clean_ledger() {
    frontdesk()
        .args(["audit", "-l", ledger_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No double bookings"));
}

#[test]
fn audit_reports_double_booking() {
    frontdesk()
        .args(["audit", "-l", double_booked_path()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Doctor double booking"))
        .stdout(predicate::str::contains("overlap by 20 min"));
}

#[test]
fn audit_json_from_stdin() {
    let ledger = std::fs::read_to_string(double_booked_path()).unwrap();

    let output = frontdesk()
        .args(["audit", "--format", "json"])
        .write_stdin(ledger)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let conflicts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(conflicts[0]["kind"], "doctor");
    assert_eq!(conflicts[0]["overlap_minutes"], 20);
}
