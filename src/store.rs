use anyhow::Context;
use log::{debug, warn};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::record::{Student, CODE_MIN, COURSE_WORK_MAX, EXAM_MAX};

pub const DEFAULT_DATA_FILE: &str = "studentMarks.txt";
const FIELD_COUNT: usize = 6;

/// Reads the roster file. A missing file is an empty roster.
pub fn load_students(path: &Path) -> anyhow::Result<Vec<Student>> {
    if !path.exists() {
        debug!("no roster file at {}, starting empty", path.to_string_lossy());
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read roster file {}", path.to_string_lossy()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_students(&text))
}

/// Parses `code,name,cw1,cw2,cw3,exam` lines. A leading count line is
/// skipped when it parses as an integer. Short rows, rows with
/// non-integer marks and rows with marks outside 0-20 / 0-100 are dropped.
pub fn parse_students(text: &str) -> Vec<Student> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some(first) = lines.first() else {
        return Vec::new();
    };
    let data_lines = if first.parse::<i64>().is_ok() {
        &lines[1..]
    } else {
        &lines[..]
    };

    let mut students = Vec::with_capacity(data_lines.len());
    for (i, line) in data_lines.iter().enumerate() {
        match parse_student_line(line) {
            Some(s) => students.push(s),
            None => debug!("dropping malformed roster row {}: {:?}", i + 1, line),
        }
    }
    students
}

fn parse_student_line(line: &str) -> Option<Student> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < FIELD_COUNT {
        return None;
    }
    let cw1 = parts[2].parse::<i64>().ok()?;
    let cw2 = parts[3].parse::<i64>().ok()?;
    let cw3 = parts[4].parse::<i64>().ok()?;
    let exam = parts[5].parse::<i64>().ok()?;
    let marks_ok = [cw1, cw2, cw3]
        .iter()
        .all(|m| (0..=COURSE_WORK_MAX).contains(m))
        && (0..=EXAM_MAX).contains(&exam);
    if !marks_ok {
        return None;
    }
    Some(Student {
        code: parts[0].to_string(),
        name: parts[1].to_string(),
        course_work: [cw1, cw2, cw3],
        exam,
    })
}

pub fn serialize_students(students: &[Student]) -> String {
    let mut out = format!("{}\n", students.len());
    for s in students {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            s.code, s.name, s.course_work[0], s.course_work[1], s.course_work[2], s.exam
        ));
    }
    out
}

/// Rewrites the whole roster file through a sibling temp file.
pub fn save_students(students: &[Student], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, serialize_students(students))
        .with_context(|| format!("failed to write temp roster {}", tmp.to_string_lossy()))?;
    std::fs::rename(&tmp, path).with_context(|| {
        format!(
            "failed to move temp roster to {}",
            path.to_string_lossy()
        )
    })?;
    debug!(
        "saved {} students to {}",
        students.len(),
        path.to_string_lossy()
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from(DEFAULT_DATA_FILE));
    name.push(".saving");
    path.with_file_name(name)
}

/// Gives every repeated code the next free code at or above its own value
/// (or above 1000 when it isn't numeric). Returns whether anything changed;
/// persisting is up to the caller.
pub fn ensure_unique_codes(students: &mut [Student]) -> bool {
    let mut used: HashSet<String> = HashSet::with_capacity(students.len());
    let mut changed = false;
    for s in students.iter_mut() {
        if used.contains(&s.code) {
            let mut base = numeric_code(&s.code).unwrap_or(u64::from(CODE_MIN));
            let mut new_code = base.to_string();
            while used.contains(&new_code) {
                base = base.checked_add(1).unwrap_or(u64::from(CODE_MIN));
                new_code = base.to_string();
            }
            warn!(
                "duplicate student code {} for {:?}, reassigned to {}",
                s.code, s.name, new_code
            );
            s.code = new_code;
            changed = true;
        }
        used.insert(s.code.clone());
    }
    changed
}

/// Digit-only codes too long for `u64` count as non-numeric, so their
/// repair starts from 1000 rather than from the code's own value.
fn numeric_code(code: &str) -> Option<u64> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse::<u64>().ok()
}
