#[path = "../src/error.rs"]
mod error;
#[path = "../src/record.rs"]
mod record;
#[path = "../src/roster.rs"]
mod roster;
#[path = "../src/store.rs"]
mod store;

use error::{RosterError, ValidationError};
use roster::{Roster, StudentDraft};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn draft(code: &str, name: &str, cw: [i64; 3], exam: i64) -> StudentDraft {
    StudentDraft {
        code: code.to_string(),
        name: name.to_string(),
        course_work: cw,
        exam,
    }
}

fn open_seeded(prefix: &str, text: &str) -> (PathBuf, Roster) {
    let dir = temp_dir(prefix);
    let path = dir.join("studentMarks.txt");
    std::fs::write(&path, text).expect("seed roster");
    let (roster, _) = Roster::open(&path).expect("open roster");
    (dir, roster)
}

fn codes(roster: &Roster) -> Vec<String> {
    roster.students().iter().map(|s| s.code.clone()).collect()
}

fn validation(e: RosterError) -> ValidationError {
    match e {
        RosterError::Validation(v) => v,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn open_repairs_and_persists_duplicate_codes() {
    let (dir, roster) = open_seeded(
        "studentd-roster-dupes",
        "2\n1000,Ann,1,1,1,1\n1000,Bob,2,2,2,2\n",
    );
    assert_eq!(codes(&roster), vec!["1000", "1001"]);
    let text = std::fs::read_to_string(dir.join("studentMarks.txt")).expect("read roster");
    assert_eq!(text, "2\n1000,Ann,1,1,1,1\n1001,Bob,2,2,2,2\n");

    let (_, report) = Roster::open(dir.join("studentMarks.txt")).expect("reopen");
    assert!(!report.codes_repaired);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn add_rejects_invalid_fields() {
    let (dir, mut roster) = open_seeded("studentd-roster-add-invalid", "1\n1001,Ann,18,19,20,90\n");

    let e = validation(roster.add(draft("12345", "Five Digits", [1, 1, 1], 1)).unwrap_err());
    assert!(matches!(e, ValidationError::CodeOutOfRange { .. }));
    let e = validation(roster.add(draft("0999", "Low", [1, 1, 1], 1)).unwrap_err());
    assert!(matches!(e, ValidationError::CodeOutOfRange { .. }));
    let e = validation(roster.add(draft("12a4", "Letters", [1, 1, 1], 1)).unwrap_err());
    assert!(matches!(e, ValidationError::CodeOutOfRange { .. }));
    for padded in ["01001", "001234"] {
        let e = validation(roster.add(draft(padded, "Padded", [1, 1, 1], 1)).unwrap_err());
        assert_eq!(
            e,
            ValidationError::CodeOutOfRange {
                code: padded.to_string()
            }
        );
    }
    let e = validation(roster.add(draft("1002", "Over", [21, 0, 0], 0)).unwrap_err());
    assert_eq!(
        e,
        ValidationError::MarksOutOfRange {
            field: "cw1",
            value: 21
        }
    );
    let e = validation(roster.add(draft("1002", "Neg", [0, 0, -1], 0)).unwrap_err());
    assert!(matches!(e, ValidationError::MarksOutOfRange { field: "cw3", .. }));
    let e = validation(roster.add(draft("1002", "Exam", [0, 0, 0], 101)).unwrap_err());
    assert!(matches!(e, ValidationError::MarksOutOfRange { field: "exam", .. }));
    let e = validation(roster.add(draft("1001", "Copy", [0, 0, 0], 0)).unwrap_err());
    assert_eq!(
        e,
        ValidationError::DuplicateCode {
            code: "1001".to_string()
        }
    );

    assert_eq!(codes(&roster), vec!["1001"]);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn add_appends_and_persists() {
    let (dir, mut roster) = open_seeded("studentd-roster-add", "1\n1001,Ann,18,19,20,90\n");
    let added = roster
        .add(draft("9999", "Zed", [20, 20, 20], 100))
        .expect("add student");
    assert_eq!(added.code, "9999");

    let text = std::fs::read_to_string(dir.join("studentMarks.txt")).expect("read roster");
    assert_eq!(text, "2\n1001,Ann,18,19,20,90\n9999,Zed,20,20,20,100\n");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn line_breaks_in_names_are_rejected_before_writing() {
    let (dir, mut roster) = open_seeded("studentd-roster-newline", "1\n1001,Ann,18,19,20,90\n");

    for name in ["Ann\n1001,Evil,20,20,20,100", "Bob\rJones"] {
        let d = StudentDraft::parse("1002", name, ["1", "1", "1"], "1").expect("parse");
        let e = validation(roster.add(d).unwrap_err());
        assert_eq!(e.reason(), "name_has_line_break");
    }
    let e = validation(
        roster
            .update_by_key("1001", draft("1001", "Ann\nLee", [1, 1, 1], 1))
            .unwrap_err(),
    );
    assert!(matches!(e, ValidationError::NameHasLineBreak { .. }));

    let text = std::fs::read_to_string(dir.join("studentMarks.txt")).expect("read roster");
    assert_eq!(text, "1\n1001,Ann,18,19,20,90\n");
    roster.refresh().expect("refresh");
    assert_eq!(roster.students()[0].name, "Ann");
    assert_eq!(codes(&roster), vec!["1001"]);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn huge_marks_in_file_never_reach_metrics() {
    let (dir, roster) = open_seeded(
        "studentd-roster-huge",
        "1\n1001,Big,9223372036854775807,0,0,0\n1002,Ann,18,19,20,90\n",
    );
    assert_eq!(codes(&roster), vec!["1002"]);
    assert_eq!(roster.class_average(), 91.88);
    assert_eq!(roster.highest().expect("highest").code, "1002");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn draft_parsing_rejects_non_integer_marks_first() {
    let e = StudentDraft::parse("12345", "Ann", ["1", "x", "3"], "4").unwrap_err();
    assert_eq!(
        e,
        ValidationError::MarksNotInteger {
            field: "cw2",
            value: "x".to_string()
        }
    );
    let e = StudentDraft::parse("1001", "Ann", ["1", "2", "3"], "").unwrap_err();
    assert!(matches!(e, ValidationError::MarksNotInteger { field: "exam", .. }));

    let d = StudentDraft::parse(" 1001 ", "  Ann Lee ", [" 1", "2 ", "3"], " 40 ").expect("parse");
    assert_eq!(d, draft("1001", "Ann Lee", [1, 2, 3], 40));
}

#[test]
fn find_by_key_priority() {
    let (dir, roster) = open_seeded(
        "studentd-roster-find",
        "4\n1001,Smithers,1,1,1,1\n1002,John Smith,2,2,2,2\n1003,Smith,3,3,3,3\n1004,1001,4,4,4,4\n",
    );

    // exact code beats a record whose name equals the key
    assert_eq!(roster.find_by_key("1001").map(|s| s.code.as_str()), Some("1001"));
    // exact name beats earlier substring hits
    assert_eq!(roster.find_by_key("SMITH").map(|s| s.code.as_str()), Some("1003"));
    // substring, first in roster order
    assert_eq!(roster.find_by_key("smi").map(|s| s.code.as_str()), Some("1001"));
    assert_eq!(roster.find_by_key("john").map(|s| s.code.as_str()), Some("1002"));
    assert!(roster.find_by_key("nobody").is_none());
    assert!(roster.find_by_key("   ").is_none());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn substring_match_on_full_name() {
    let (dir, roster) = open_seeded("studentd-roster-smith", "1\n1001,John Smith,1,1,1,1\n");
    let found = roster.find_by_key("smi").expect("substring match");
    assert_eq!(found.name, "John Smith");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn highest_and_lowest_break_ties_by_order() {
    let (dir, roster) = open_seeded(
        "studentd-roster-extremes",
        "4\n1001,A,10,10,10,50\n1002,B,20,20,20,100\n1003,C,20,20,20,100\n1004,D,10,10,10,50\n",
    );
    assert_eq!(roster.highest().expect("highest").code, "1002");
    assert_eq!(roster.lowest().expect("lowest").code, "1001");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn empty_roster_reports_instead_of_failing() {
    let dir = temp_dir("studentd-roster-empty");
    let (roster, report) = Roster::open(dir.join("studentMarks.txt")).expect("open empty");
    assert_eq!(report.student_count, 0);
    assert!(matches!(roster.highest(), Err(RosterError::EmptyRoster)));
    assert!(matches!(roster.lowest(), Err(RosterError::EmptyRoster)));
    assert_eq!(roster.class_average(), 0.0);
    assert_eq!(roster.class_summary().class_size, 0);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn sort_reorders_and_persists() {
    let (dir, mut roster) = open_seeded(
        "studentd-roster-sort",
        "3\n1001,A,10,10,10,50\n1002,B,20,20,20,100\n1003,C,0,0,0,0\n",
    );
    roster.sort(true).expect("sort ascending");
    assert_eq!(codes(&roster), vec!["1003", "1001", "1002"]);

    roster.sort(false).expect("sort descending");
    assert_eq!(codes(&roster), vec!["1002", "1001", "1003"]);
    let text = std::fs::read_to_string(dir.join("studentMarks.txt")).expect("read roster");
    assert!(text.starts_with("3\n1002,"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn update_allows_own_code_and_rejects_others() {
    let (dir, mut roster) = open_seeded(
        "studentd-roster-update",
        "2\n1001,Ann,1,1,1,1\n1002,Bob,2,2,2,2\n",
    );

    let updated = roster
        .update_by_key("ann", draft("1001", "Ann Lee", [5, 5, 5], 60))
        .expect("update keeps own code");
    assert_eq!(updated.name, "Ann Lee");

    let e = validation(
        roster
            .update_by_key("1001", draft("1002", "Ann Lee", [5, 5, 5], 60))
            .unwrap_err(),
    );
    assert!(matches!(e, ValidationError::DuplicateCode { .. }));

    // substring keys never address a record for update
    assert!(matches!(
        roster.update_by_key("Bo", draft("1003", "Bo", [0, 0, 0], 0)),
        Err(RosterError::NotFound(_))
    ));

    let text = std::fs::read_to_string(dir.join("studentMarks.txt")).expect("read roster");
    assert_eq!(text, "2\n1001,Ann Lee,5,5,5,60\n1002,Bob,2,2,2,2\n");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn delete_by_key_removes_and_persists() {
    let (dir, mut roster) = open_seeded(
        "studentd-roster-delete",
        "2\n1001,Ann,1,1,1,1\n1002,Bob,2,2,2,2\n",
    );
    let removed = roster.delete_by_key("BOB").expect("delete bob");
    assert_eq!(removed.code, "1002");
    assert!(matches!(
        roster.delete_by_key("1002"),
        Err(RosterError::NotFound(_))
    ));

    let text = std::fs::read_to_string(dir.join("studentMarks.txt")).expect("read roster");
    assert_eq!(text, "1\n1001,Ann,1,1,1,1\n");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn class_average_rounds_to_two_decimals() {
    let (dir, roster) = open_seeded(
        "studentd-roster-average",
        "4\n1001,A,18,19,20,90\n1002,B,10,10,10,50\n1003,C,0,0,1,0\n1004,D,7,0,0,0\n",
    );
    // 91.88 + 50.0 + 0.62 + 4.38
    assert_eq!(roster.class_average(), 36.72);
    let summary = roster.class_summary();
    assert_eq!(summary.class_size, 4);
    assert_eq!(summary.class_average, 36.72);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn refresh_picks_up_external_edits() {
    let (dir, mut roster) = open_seeded("studentd-roster-refresh", "1\n1001,Ann,1,1,1,1\n");
    std::fs::write(
        dir.join("studentMarks.txt"),
        "1001,Ann,1,1,1,1\n1001,Ann Twin,1,1,1,1\n",
    )
    .expect("edit roster");
    let report = roster.refresh().expect("refresh");
    assert_eq!(report.student_count, 2);
    assert!(report.codes_repaired);
    assert_eq!(codes(&roster), vec!["1001", "1002"]);
    let _ = std::fs::remove_dir_all(dir);
}
