//! Append-only guarantees of the truth ledger

use opentruth::engine::{Ledger, ProofDetails, ProofRecord, ProofStatus, Role};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn missing_hook_proof(target: &str, role: Role) -> ProofRecord {
    ProofRecord::build(
        Path::new(target),
        role,
        role.action(),
        ProofStatus::Failure,
        ProofDetails::missing_hook(role.check_name(), ".truth", vec![]),
    )
}

#[test]
fn test_sequential_appends_keep_call_order() {
    let temp_dir = tempdir().unwrap();
    let ledger = Ledger::new(temp_dir.path().join("truth_ledger"));

    for i in 0..25 {
        let record = missing_hook_proof(&format!("/rigs/rig-{i:02}"), Role::Gauger);
        ledger.append(&record).unwrap();
    }

    let content = fs::read_to_string(ledger.log_path(Role::Gauger)).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 25);

    for (i, line) in lines.iter().enumerate() {
        let record: ProofRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.target_rig, format!("rig-{i:02}"));
    }
}

#[test]
fn test_prior_lines_are_never_rewritten() {
    let temp_dir = tempdir().unwrap();
    let ledger = Ledger::new(temp_dir.path());

    ledger
        .append(&missing_hook_proof("/rigs/first", Role::Spotter))
        .unwrap();
    let before = fs::read_to_string(ledger.log_path(Role::Spotter)).unwrap();

    ledger
        .append(&missing_hook_proof("/rigs/second", Role::Spotter))
        .unwrap();
    let after = fs::read_to_string(ledger.log_path(Role::Spotter)).unwrap();

    assert!(after.starts_with(&before));
    assert_eq!(after.lines().count(), 2);
}

#[test]
fn test_concurrent_writers_do_not_interleave_lines() {
    let temp_dir = tempdir().unwrap();
    let ledger = Arc::new(Ledger::new(temp_dir.path()));
    let writers = 8;
    let per_writer = 50;
    // Large payloads make torn writes visible if they happen
    let padding = "x".repeat(4096);

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let ledger = Arc::clone(&ledger);
            let padding = padding.clone();
            thread::spawn(move || {
                for i in 0..per_writer {
                    let record = ProofRecord::build(
                        Path::new(&format!("/rigs/writer-{w}")),
                        Role::Gauger,
                        Role::Gauger.action(),
                        ProofStatus::Success,
                        ProofDetails::Executed {
                            hook: "verify_logic".to_string(),
                            exit_code: 0,
                            stdout: format!("{w}-{i}"),
                            stderr: padding.clone(),
                        },
                    );
                    ledger.append(&record).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(ledger.log_path(Role::Gauger)).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), writers * per_writer);

    for line in lines {
        let record: ProofRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.status, ProofStatus::Success);
    }
}
