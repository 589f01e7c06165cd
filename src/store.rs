use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    parse_due_date, Assignment, AssignmentStatus, Attendance, StudentName, StudentRecord,
    SubjectScore,
};

/// Key holding the record the dashboard pages read.
pub const CURRENT_RECORD_KEY: &str = "studentData";

pub fn student_key(student_id: &str) -> String {
    format!("{CURRENT_RECORD_KEY}_{student_id}")
}

pub fn record_key(student_id: Option<&str>) -> String {
    student_id.map_or_else(|| CURRENT_RECORD_KEY.to_string(), student_key)
}

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url `{database_url}`"))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("failed to open the record store")
}

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, key: &str) -> anyhow::Result<Option<String>> {
    let row = sqlx::query("SELECT value FROM records WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("value")))
}

pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO records (id, key, value, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (key) DO UPDATE
        SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    debug!(key, bytes = value.len(), "record stored");
    Ok(())
}

/// Writes the record as the current one and, when it has an id, under its own key.
pub async fn save_record(pool: &SqlitePool, record: &StudentRecord) -> anyhow::Result<()> {
    let json = record.to_json().context("failed to encode student record")?;
    set(pool, CURRENT_RECORD_KEY, &json).await?;
    if let Some(student_id) = record.student_id.as_deref() {
        set(pool, &student_key(student_id), &json).await?;
    }
    Ok(())
}

pub async fn load_record(pool: &SqlitePool, key: &str) -> anyhow::Result<Option<StudentRecord>> {
    let Some(raw) = get(pool, key).await? else {
        return Ok(None);
    };
    let record = StudentRecord::from_json(&raw)
        .with_context(|| format!("stored record `{key}` could not be read"))?;
    Ok(Some(record))
}

pub async fn load_or_sample(pool: &SqlitePool, key: &str) -> anyhow::Result<StudentRecord> {
    match load_record(pool, key).await? {
        Some(record) => Ok(record),
        None => {
            info!(key, "no stored record; using sample data");
            Ok(sample_record())
        }
    }
}

pub async fn seed(pool: &SqlitePool) -> anyhow::Result<()> {
    save_record(pool, &sample_record()).await
}

pub fn sample_record() -> StudentRecord {
    let assignment = |title: &str, subject: &str, due: (i32, u32, u32), status| Assignment {
        title: title.to_string(),
        subject: subject.to_string(),
        due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
        status,
    };

    StudentRecord {
        student_id: Some("STU12345".to_string()),
        name: StudentName {
            first: "Alice".to_string(),
            last: "Smith".to_string(),
        },
        grade: "12th Grade".to_string(),
        attendance: Attendance {
            classes_attended: 92,
            total_classes: 100,
        },
        subject_scores: vec![
            SubjectScore::new("mathematics", 88),
            SubjectScore::new("MySQL", 75),
            SubjectScore::new("english", 92),
            SubjectScore::new("machineLearning", 84),
            SubjectScore::new("computerScience", 96),
        ],
        participation_score: 85,
        behavior_score: 95,
        assignments: vec![
            assignment(
                "Algebra Worksheet",
                "Math",
                (2024, 10, 15),
                AssignmentStatus::Completed,
            ),
            assignment("DBMS Project", "MySQL", (2024, 10, 20), AssignmentStatus::Pending),
            assignment(
                "Essay: AI Revolution",
                "machineLearning",
                (2024, 10, 12),
                AssignmentStatus::Completed,
            ),
            assignment("React Project", "CS", (2024, 10, 25), AssignmentStatus::InProgress),
        ],
    }
}

/// Reads `title,subject,due_date,status` rows.
pub fn parse_assignments_csv<R: Read>(input: R) -> anyhow::Result<Vec<Assignment>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        title: String,
        subject: String,
        due_date: Option<String>,
        status: AssignmentStatus,
    }

    let mut reader = csv::Reader::from_reader(input);
    let mut assignments = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid assignment row {}", index + 1))?;
        let due_date = parse_due_date(row.due_date.as_deref())
            .with_context(|| format!("invalid assignment row {}", index + 1))?;
        assignments.push(Assignment {
            title: row.title,
            subject: row.subject,
            due_date,
            status: row.status,
        });
    }

    Ok(assignments)
}

/// Appends assignments not already present (matched on title and subject).
pub fn merge_assignments(record: &mut StudentRecord, incoming: Vec<Assignment>) -> usize {
    let mut inserted = 0usize;
    for assignment in incoming {
        let exists = record
            .assignments
            .iter()
            .any(|a| a.title == assignment.title && a.subject == assignment.subject);
        if !exists {
            record.assignments.push(assignment);
            inserted += 1;
        }
    }
    inserted
}

pub async fn import_assignments(
    pool: &SqlitePool,
    key: &str,
    csv_path: &Path,
) -> anyhow::Result<usize> {
    let mut record = load_record(pool, key)
        .await?
        .with_context(|| format!("no record stored under `{key}`; run `seed` or `save` first"))?;

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let incoming = parse_assignments_csv(file)?;
    let inserted = merge_assignments(&mut record, incoming);

    if inserted > 0 {
        save_record(pool, &record).await?;
    }
    info!(key, inserted, "assignments imported");
    Ok(inserted)
}
