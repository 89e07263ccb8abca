use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{RosterError, ValidationError};
use crate::record::{
    overall_percentage, round_2dp, Student, CODE_MAX, CODE_MIN, COURSE_WORK_MAX, EXAM_MAX,
};
use crate::store::{ensure_unique_codes, load_students, save_students};

/// Student fields as submitted by the UI, marks already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub code: String,
    pub name: String,
    pub course_work: [i64; 3],
    pub exam: i64,
}

impl StudentDraft {
    /// Parses raw form text. Mark parsing is checked before any range rule.
    pub fn parse(
        code: &str,
        name: &str,
        course_work: [&str; 3],
        exam: &str,
    ) -> Result<Self, ValidationError> {
        const CW_FIELDS: [&str; 3] = ["cw1", "cw2", "cw3"];
        let mut cw = [0i64; 3];
        for (i, raw) in course_work.iter().enumerate() {
            cw[i] = parse_mark(CW_FIELDS[i], raw)?;
        }
        Ok(StudentDraft {
            code: code.trim().to_string(),
            name: name.trim().to_string(),
            course_work: cw,
            exam: parse_mark("exam", exam)?,
        })
    }

    fn into_student(self) -> Student {
        Student {
            code: self.code,
            name: self.name,
            course_work: self.course_work,
            exam: self.exam,
        }
    }
}

fn parse_mark(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::MarksNotInteger {
            field,
            value: raw.to_string(),
        })
}

/// Field rules shared by add and update. Uniqueness is checked separately.
pub fn validate_fields(draft: &StudentDraft) -> Result<(), ValidationError> {
    let code_ok = draft.code.len() == 4
        && draft.code.bytes().all(|b| b.is_ascii_digit())
        && draft
            .code
            .parse::<u32>()
            .map(|c| (CODE_MIN..=CODE_MAX).contains(&c))
            .unwrap_or(false);
    if !code_ok {
        return Err(ValidationError::CodeOutOfRange {
            code: draft.code.clone(),
        });
    }
    if draft.name.contains(&['\r', '\n'][..]) {
        return Err(ValidationError::NameHasLineBreak {
            name: draft.name.clone(),
        });
    }

    const CW_FIELDS: [&str; 3] = ["cw1", "cw2", "cw3"];
    for (&field, &mark) in CW_FIELDS.iter().zip(draft.course_work.iter()) {
        if !(0..=COURSE_WORK_MAX).contains(&mark) {
            return Err(ValidationError::MarksOutOfRange { field, value: mark });
        }
    }
    if !(0..=EXAM_MAX).contains(&draft.exam) {
        return Err(ValidationError::MarksOutOfRange {
            field: "exam",
            value: draft.exam,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_size: usize,
    pub class_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub student_count: usize,
    pub codes_repaired: bool,
}

/// In-memory roster bound to its data file. Every mutation is written
/// through before returning.
#[derive(Debug)]
pub struct Roster {
    data_path: PathBuf,
    students: Vec<Student>,
}

impl Roster {
    pub fn open(data_path: impl Into<PathBuf>) -> Result<(Self, LoadReport), RosterError> {
        let mut roster = Roster {
            data_path: data_path.into(),
            students: Vec::new(),
        };
        let report = roster.refresh()?;
        Ok((roster, report))
    }

    /// Reloads from disk, repairing duplicate codes (and saving the repair).
    pub fn refresh(&mut self) -> Result<LoadReport, RosterError> {
        let mut students = load_students(&self.data_path)?;
        let codes_repaired = ensure_unique_codes(&mut students);
        if codes_repaired {
            save_students(&students, &self.data_path)?;
        }
        self.students = students;
        info!(
            "loaded {} students from {}",
            self.students.len(),
            self.data_path.to_string_lossy()
        );
        Ok(LoadReport {
            student_count: self.students.len(),
            codes_repaired,
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    fn persist(&self) -> Result<(), RosterError> {
        save_students(&self.students, &self.data_path)?;
        Ok(())
    }

    /// Exact code, then exact name, then name substring (names compared
    /// case-insensitively). First hit in roster order wins at each tier.
    pub fn find_by_key(&self, key: &str) -> Option<&Student> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let key_lower = key.to_lowercase();
        self.students
            .iter()
            .find(|s| s.code == key)
            .or_else(|| {
                self.students
                    .iter()
                    .find(|s| s.name.to_lowercase() == key_lower)
            })
            .or_else(|| {
                self.students
                    .iter()
                    .find(|s| s.name.to_lowercase().contains(&key_lower))
            })
    }

    /// Index of the record an exact code or exact (case-insensitive) name
    /// names. Used by update and delete, which never match on substrings.
    pub fn find_exact(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let key_lower = key.to_lowercase();
        self.students
            .iter()
            .position(|s| s.code == key)
            .or_else(|| {
                self.students
                    .iter()
                    .position(|s| s.name.to_lowercase() == key_lower)
            })
    }

    pub fn highest(&self) -> Result<&Student, RosterError> {
        let mut iter = self.students.iter();
        let mut best = iter.next().ok_or(RosterError::EmptyRoster)?;
        let mut best_p = overall_percentage(best);
        for s in iter {
            let p = overall_percentage(s);
            if p > best_p {
                best = s;
                best_p = p;
            }
        }
        Ok(best)
    }

    pub fn lowest(&self) -> Result<&Student, RosterError> {
        let mut iter = self.students.iter();
        let mut worst = iter.next().ok_or(RosterError::EmptyRoster)?;
        let mut worst_p = overall_percentage(worst);
        for s in iter {
            let p = overall_percentage(s);
            if p < worst_p {
                worst = s;
                worst_p = p;
            }
        }
        Ok(worst)
    }

    /// Stable sort by overall percentage; the new order is saved.
    pub fn sort(&mut self, ascending: bool) -> Result<(), RosterError> {
        if ascending {
            self.students
                .sort_by(|a, b| overall_percentage(a).total_cmp(&overall_percentage(b)));
        } else {
            self.students
                .sort_by(|a, b| overall_percentage(b).total_cmp(&overall_percentage(a)));
        }
        self.persist()?;
        info!(
            "sorted {} students ({})",
            self.students.len(),
            if ascending { "ascending" } else { "descending" }
        );
        Ok(())
    }

    pub fn add(&mut self, draft: StudentDraft) -> Result<&Student, RosterError> {
        validate_fields(&draft)?;
        if self.students.iter().any(|s| s.code == draft.code) {
            return Err(ValidationError::DuplicateCode { code: draft.code }.into());
        }
        self.students.push(draft.into_student());
        self.persist()?;
        let added = &self.students[self.students.len() - 1];
        info!("added student {} ({})", added.code, added.name);
        Ok(added)
    }

    pub fn update(&mut self, index: usize, draft: StudentDraft) -> Result<&Student, RosterError> {
        if index >= self.students.len() {
            return Err(RosterError::NotFound(format!("#{index}")));
        }
        validate_fields(&draft)?;
        let clash = self
            .students
            .iter()
            .enumerate()
            .any(|(i, s)| i != index && s.code == draft.code);
        if clash {
            return Err(ValidationError::DuplicateCode { code: draft.code }.into());
        }
        self.students[index] = draft.into_student();
        self.persist()?;
        let updated = &self.students[index];
        info!("updated student {} ({})", updated.code, updated.name);
        Ok(updated)
    }

    pub fn update_by_key(
        &mut self,
        key: &str,
        draft: StudentDraft,
    ) -> Result<&Student, RosterError> {
        let index = self
            .find_exact(key)
            .ok_or_else(|| RosterError::NotFound(key.trim().to_string()))?;
        self.update(index, draft)
    }

    pub fn delete(&mut self, index: usize) -> Result<Student, RosterError> {
        if index >= self.students.len() {
            return Err(RosterError::NotFound(format!("#{index}")));
        }
        let removed = self.students.remove(index);
        self.persist()?;
        info!("deleted student {} ({})", removed.code, removed.name);
        Ok(removed)
    }

    pub fn delete_by_key(&mut self, key: &str) -> Result<Student, RosterError> {
        let index = self
            .find_exact(key)
            .ok_or_else(|| RosterError::NotFound(key.trim().to_string()))?;
        self.delete(index)
    }

    /// Mean overall percentage, 0.0 when the roster is empty.
    pub fn class_average(&self) -> f64 {
        if self.students.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.students.iter().map(overall_percentage).sum();
        round_2dp(sum / self.students.len() as f64)
    }

    pub fn class_summary(&self) -> ClassSummary {
        ClassSummary {
            class_size: self.students.len(),
            class_average: self.class_average(),
        }
    }
}
