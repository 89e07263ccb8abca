use serde::Serialize;
use std::fmt;

pub const CODE_MIN: u32 = 1000;
pub const CODE_MAX: u32 = 9999;
pub const COURSE_WORK_MAX: i64 = 20;
pub const EXAM_MAX: i64 = 100;
/// Three coursework pieces out of 20 plus an exam out of 100.
pub const TOTAL_MARKS: i64 = 160;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub code: String,
    pub name: String,
    pub course_work: [i64; 3],
    pub exam: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-decimal rounding. Exact binary ties go to even: 91.875 -> 91.88,
/// 0.625 -> 0.62.
pub fn round_2dp(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Saturates instead of overflowing; in-range marks never get near the limit.
pub fn course_work_total(s: &Student) -> i64 {
    s.course_work
        .iter()
        .fold(0i64, |acc, &m| acc.saturating_add(m))
}

pub fn overall_percentage(s: &Student) -> f64 {
    let total = course_work_total(s).saturating_add(s.exam);
    // 100 * total / 160 is exact in binary for integer totals; dividing first is not.
    round_2dp(total.saturating_mul(100) as f64 / TOTAL_MARKS as f64)
}

pub fn grade_from_percent(p: f64) -> Grade {
    if p >= 70.0 {
        Grade::A
    } else if p >= 60.0 {
        Grade::B
    } else if p >= 50.0 {
        Grade::C
    } else if p >= 40.0 {
        Grade::D
    } else {
        Grade::F
    }
}

pub fn grade(s: &Student) -> Grade {
    grade_from_percent(overall_percentage(s))
}

/// Shortest float text, keeping one decimal for whole numbers ("90.0", "91.88").
pub fn format_percent(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("{:.1}", p)
    } else {
        format!("{}", p)
    }
}

/// The six-line record block shown by the student panel.
pub fn format_summary(s: &Student) -> String {
    let percent = overall_percentage(s);
    [
        format!("Student Name: {}", s.name),
        format!("Student Number: {}", s.code),
        format!("Total coursework mark (out of 60): {}", course_work_total(s)),
        format!("Exam mark (out of 100): {}", s.exam),
        format!(
            "Overall percentage (out of 160): {}%",
            format_percent(percent)
        ),
        format!("Grade: {}", grade_from_percent(percent)),
    ]
    .join("\n")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub code: String,
    pub name: String,
    pub coursework: [i64; 3],
    pub coursework_total: i64,
    pub exam: i64,
    pub overall_percentage: f64,
    pub grade: Grade,
    pub summary: String,
}

impl From<&Student> for StudentView {
    fn from(s: &Student) -> Self {
        StudentView {
            code: s.code.clone(),
            name: s.name.clone(),
            coursework: s.course_work,
            coursework_total: course_work_total(s),
            exam: s.exam,
            overall_percentage: overall_percentage(s),
            grade: grade(s),
            summary: format_summary(s),
        }
    }
}
