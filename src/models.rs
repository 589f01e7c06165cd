use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DashboardError, Result};

/// Date layout written back to the store ("Jan 28, 2026").
pub const STORED_DATE_FORMAT: &str = "%b %-d, %Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const STORED_DATE_PARSE_FORMAT: &str = "%b %d, %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentName {
    pub first: String,
    pub last: String,
}

impl StudentName {
    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    /// Page header greeting.
    pub fn welcome(&self) -> String {
        format!("Welcome back, {}", self.first)
    }

    /// Avatar text: first letter of each name part.
    pub fn initials(&self) -> String {
        self.first
            .chars()
            .take(1)
            .chain(self.last.chars().take(1))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attendance {
    pub classes_attended: u32,
    pub total_classes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectScore {
    pub label: String,
    pub score: u32,
}

impl SubjectScore {
    pub fn new(label: impl Into<String>, score: u32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "progress", alias = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl AssignmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::InProgress => "In Progress",
            AssignmentStatus::Completed => "Completed",
        }
    }

    /// Pending and in-progress work both count as outstanding.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            AssignmentStatus::Pending | AssignmentStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub title: String,
    pub subject: String,
    pub due_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub student_id: Option<String>,
    pub name: StudentName,
    pub grade: String,
    pub attendance: Attendance,
    pub subject_scores: Vec<SubjectScore>,
    pub participation_score: u32,
    pub behavior_score: u32,
    pub assignments: Vec<Assignment>,
}

impl StudentRecord {
    /// Parses the JSON blob held by the record store.
    pub fn from_json(raw: &str) -> Result<Self> {
        let stored: StoredRecord =
            serde_json::from_str(raw).map_err(|err| DashboardError::malformed(err.to_string()))?;
        stored.try_into()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&StoredRecord::from(self))
    }

    pub fn scores(&self) -> Vec<u32> {
        self.subject_scores.iter().map(|s| s.score).collect()
    }
}

/// Flat camelCase layout the data-entry form writes into the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_classes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes_attended: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_score: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior_score: Option<Value>,
    #[serde(default)]
    pub assignments: Option<Vec<StoredAssignment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAssignment {
    pub title: String,
    pub subject: String,
    #[serde(default, alias = "date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: AssignmentStatus,
}

impl TryFrom<StoredRecord> for StudentRecord {
    type Error = DashboardError;

    fn try_from(stored: StoredRecord) -> Result<Self> {
        let first = required_text("firstName", stored.first_name)?;
        let last = required_text("lastName", stored.last_name)?;
        let grade = required_text("grade", stored.grade)?;

        let subjects = stored
            .subjects
            .ok_or_else(|| DashboardError::malformed("missing field `subjects`"))?;
        if subjects.is_empty() {
            return Err(DashboardError::malformed("`subjects` has no entries"));
        }
        let subject_scores = subjects
            .iter()
            .map(|(key, value)| {
                coerce_score(&format!("subjects.{key}"), Some(value))
                    .map(|score| SubjectScore::new(key.clone(), score))
            })
            .collect::<Result<Vec<_>>>()?;

        let assignments = stored
            .assignments
            .unwrap_or_default()
            .into_iter()
            .map(|raw| {
                Ok(Assignment {
                    due_date: parse_due_date(raw.due_date.as_deref())?,
                    title: raw.title,
                    subject: raw.subject,
                    status: raw.status,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StudentRecord {
            student_id: stored.student_id.filter(|id| !id.trim().is_empty()),
            name: StudentName { first, last },
            grade,
            attendance: Attendance {
                classes_attended: coerce_count("classesAttended", stored.classes_attended.as_ref())?,
                total_classes: coerce_count("totalClasses", stored.total_classes.as_ref())?,
            },
            subject_scores,
            participation_score: coerce_score(
                "participationScore",
                stored.participation_score.as_ref(),
            )?,
            behavior_score: coerce_score("behaviorScore", stored.behavior_score.as_ref())?,
            assignments,
        })
    }
}

impl From<&StudentRecord> for StoredRecord {
    fn from(record: &StudentRecord) -> Self {
        let subjects = record
            .subject_scores
            .iter()
            .map(|s| (s.label.clone(), Value::from(s.score)))
            .collect::<Map<String, Value>>();

        let assignments = record
            .assignments
            .iter()
            .map(|a| StoredAssignment {
                title: a.title.clone(),
                subject: a.subject.clone(),
                due_date: a
                    .due_date
                    .map(|date| date.format(STORED_DATE_FORMAT).to_string()),
                status: a.status,
            })
            .collect();

        StoredRecord {
            first_name: Some(record.name.first.clone()),
            last_name: Some(record.name.last.clone()),
            grade: Some(record.grade.clone()),
            student_id: record.student_id.clone(),
            total_classes: Some(Value::from(record.attendance.total_classes)),
            classes_attended: Some(Value::from(record.attendance.classes_attended)),
            subjects: Some(subjects),
            participation_score: Some(Value::from(record.participation_score)),
            behavior_score: Some(Value::from(record.behavior_score)),
            assignments: Some(assignments),
        }
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| DashboardError::malformed(format!("missing field `{field}`")))
}

/// Integer coercion in the spirit of form input parsing: floats truncate,
/// numeric strings parse.
fn coerce_int(field: &str, value: Option<&Value>) -> Result<i64> {
    let value =
        value.ok_or_else(|| DashboardError::malformed(format!("missing field `{field}`")))?;
    let not_numeric = || DashboardError::malformed(format!("field `{field}` is not numeric"));

    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(not_numeric),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
            .ok_or_else(not_numeric),
        _ => Err(not_numeric()),
    }
}

fn coerce_score(field: &str, value: Option<&Value>) -> Result<u32> {
    Ok(coerce_int(field, value)?.clamp(0, 100) as u32)
}

fn coerce_count(field: &str, value: Option<&Value>) -> Result<u32> {
    Ok(coerce_int(field, value)?.clamp(0, i64::from(u32::MAX)) as u32)
}

/// Accepts both `2024-10-15` and `Oct 15, 2024`; blank means no due date.
pub fn parse_due_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, STORED_DATE_PARSE_FORMAT))
        .map(Some)
        .map_err(|_| DashboardError::malformed(format!("unparseable due date `{raw}`")))
}

pub fn subject_display_name(key: &str) -> String {
    match key {
        "math" | "mathematics" => "Mathematics".to_string(),
        "computer" | "computerScience" => "Computer Science".to_string(),
        "MySQL" => "MySQL".to_string(),
        _ => split_camel_case(key),
    }
}

/// Three-letter axis label ("mathematics" -> "Mat").
pub fn subject_short_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.take(2)).collect(),
        None => String::new(),
    }
}

fn split_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut word_start = true;
    let mut prev_lower = false;

    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            word_start = true;
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            out.push(' ');
            word_start = true;
        }
        if word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        word_start = false;
        prev_lower = ch.is_lowercase();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_JSON: &str = r#"{
        "firstName": "Alex",
        "lastName": "Johnson",
        "grade": "10th Grade",
        "studentId": "STU001",
        "totalClasses": 100,
        "classesAttended": "92",
        "subjects": {"math": 88, "science": 75.6, "english": 92, "history": 84, "computer": 140},
        "participationScore": 85,
        "behaviorScore": 95,
        "assignments": [
            {"title": "Algebra Worksheet", "subject": "Math", "date": "2024-10-15", "status": "completed"},
            {"title": "Lab Report", "subject": "Science", "dueDate": "Jan 28, 2026", "status": "progress"},
            {"title": "Essay", "subject": "English", "dueDate": "", "status": "pending"}
        ]
    }"#;

    #[test]
    fn parses_form_layout_with_coercion() {
        let record = StudentRecord::from_json(FORM_JSON).unwrap();
        assert_eq!(record.name.full(), "Alex Johnson");
        assert_eq!(record.name.initials(), "AJ");
        assert_eq!(record.name.welcome(), "Welcome back, Alex");
        assert_eq!(record.student_id.as_deref(), Some("STU001"));
        assert_eq!(record.attendance.classes_attended, 92);

        let labels: Vec<&str> = record
            .subject_scores
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, ["math", "science", "english", "history", "computer"]);
        assert_eq!(record.scores(), vec![88, 75, 92, 84, 100]);

        assert_eq!(record.assignments.len(), 3);
        assert_eq!(
            record.assignments[0].due_date,
            NaiveDate::from_ymd_opt(2024, 10, 15)
        );
        assert_eq!(
            record.assignments[1].due_date,
            NaiveDate::from_ymd_opt(2026, 1, 28)
        );
        assert_eq!(record.assignments[1].status, AssignmentStatus::InProgress);
        assert_eq!(record.assignments[2].due_date, None);
    }

    #[test]
    fn missing_subjects_is_malformed() {
        let raw = r#"{"firstName": "A", "lastName": "B", "grade": "9",
            "totalClasses": 10, "classesAttended": 5,
            "participationScore": 50, "behaviorScore": 50}"#;
        let err = StudentRecord::from_json(raw).unwrap_err();
        assert_eq!(err, DashboardError::malformed("missing field `subjects`"));
    }

    #[test]
    fn non_numeric_score_is_malformed() {
        let raw = r#"{"firstName": "A", "lastName": "B", "grade": "9",
            "totalClasses": 10, "classesAttended": 5,
            "subjects": {"math": "lots"},
            "participationScore": 50, "behaviorScore": 50}"#;
        let err = StudentRecord::from_json(raw).unwrap_err();
        assert_eq!(
            err,
            DashboardError::malformed("field `subjects.math` is not numeric")
        );
    }

    #[test]
    fn unknown_status_is_malformed() {
        let raw = FORM_JSON.replace("\"progress\"", "\"archived\"");
        assert!(matches!(
            StudentRecord::from_json(&raw),
            Err(DashboardError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn stored_layout_survives_a_save() {
        let record = StudentRecord::from_json(FORM_JSON).unwrap();
        let json = record.to_json().unwrap();
        assert!(json.contains("\"dueDate\":\"Oct 15, 2024\""));
        assert!(json.contains("\"status\":\"progress\""));
        assert_eq!(StudentRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn display_names_cover_known_and_camel_case_keys() {
        assert_eq!(subject_display_name("math"), "Mathematics");
        assert_eq!(subject_display_name("machineLearning"), "Machine Learning");
        assert_eq!(subject_display_name("MySQL"), "MySQL");
        assert_eq!(subject_display_name("english"), "English");
        assert_eq!(subject_display_name("social_studies"), "Social Studies");
        assert_eq!(subject_short_label("mathematics"), "Mat");
        assert_eq!(subject_short_label("history"), "His");
    }
}
