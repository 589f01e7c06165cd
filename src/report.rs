use std::fmt::Write;

use chrono::NaiveDate;

use crate::error::Result;
use crate::metrics::{pending_detail, DerivedMetrics};
use crate::models::{subject_display_name, Assignment, StudentRecord};
use crate::recommend;

/// Due dates first in ascending order, undated assignments last.
pub fn sort_assignments(assignments: &[Assignment]) -> Vec<&Assignment> {
    let mut sorted: Vec<&Assignment> = assignments.iter().collect();
    sorted.sort_by_key(|a| (a.due_date.is_none(), a.due_date));
    sorted
}

fn due_line(due_date: Option<NaiveDate>) -> String {
    match due_date {
        Some(date) => format!("Due {}", date.format("%m/%d/%Y")),
        None => "No due date".to_string(),
    }
}

pub fn build_report(
    record: &StudentRecord,
    metrics: &DerivedMetrics,
    today: NaiveDate,
) -> Result<String> {
    let recommendations = build_recommendations(record, today)?;
    let mut output = String::new();

    let _ = writeln!(output, "# ClassPulse Student Report");
    let _ = writeln!(output, "{}", record.name.welcome());
    let _ = writeln!(
        output,
        "Generated for {} ({}) on {}",
        record.name.full(),
        record.grade,
        today
    );
    if let Some(student_id) = record.student_id.as_deref() {
        let _ = writeln!(output, "Student ID: {student_id}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");
    match metrics.attendance_rate {
        Some(rate) => {
            let _ = writeln!(
                output,
                "- Attendance: {rate}% ({} of {} classes)",
                record.attendance.classes_attended, record.attendance.total_classes
            );
        }
        None => {
            let _ = writeln!(output, "- Attendance: no classes recorded");
        }
    }
    let _ = writeln!(
        output,
        "- Participation: {} ({})",
        record.participation_score, metrics.participation_rank
    );
    let _ = writeln!(
        output,
        "- Behavior: {} ({})",
        record.behavior_score, metrics.behavior_status
    );
    let _ = writeln!(
        output,
        "- Pending assignments: {} ({})",
        metrics.pending_count,
        pending_detail(metrics.pending_count)
    );
    let _ = writeln!(output, "- Completion rate: {}%", metrics.completion_rate);
    let _ = writeln!(output, "- Quiz accuracy: {}%", metrics.quiz_accuracy);
    let _ = writeln!(
        output,
        "- ClassPulse Risk Analysis: {} (score {:.1})",
        metrics.risk_tier, metrics.risk_score
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subject Scores");
    for subject in &record.subject_scores {
        let _ = writeln!(
            output,
            "- {}: {}",
            subject_display_name(&subject.label),
            subject.score
        );
    }
    let _ = writeln!(
        output,
        "Average {:.1}; strongest {} ({}), weakest {} ({})",
        metrics.average_subject_score,
        subject_display_name(&metrics.strongest_subject.label),
        metrics.strongest_subject.score,
        subject_display_name(&metrics.weakest_subject.label),
        metrics.weakest_subject.score
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignments");
    if record.assignments.is_empty() {
        let _ = writeln!(output, "No assignments added yet.");
    } else {
        for assignment in sort_assignments(&record.assignments) {
            let _ = writeln!(
                output,
                "- {} ({}): {}, {}",
                assignment.title,
                assignment.subject,
                due_line(assignment.due_date),
                assignment.status.label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    output.push_str(&recommendations);

    Ok(output)
}

/// Main recommendation, priority cards, study habits and the tip of the day.
pub fn build_recommendations(record: &StudentRecord, today: NaiveDate) -> Result<String> {
    let analysis = recommend::analyze(record)?;
    let main = recommend::main_recommendation(&analysis);
    let cards = recommend::priority_cards(&analysis);
    let habits = recommend::study_habits(record, &analysis);

    let mut output = String::new();
    let _ = writeln!(output, "### {} [{}]", main.title, main.priority.label());
    let _ = writeln!(output, "{}", main.description);
    let _ = writeln!(output, "Focus: {}", main.focus);
    for action in &main.actions {
        let _ = writeln!(output, "- {action}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Priorities");
    for card in &cards {
        let _ = writeln!(
            output,
            "- [{}] {}: {}. {}",
            card.priority.label(),
            card.category,
            card.title,
            card.description
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Study Habits");
    for habit in &habits.working {
        let _ = writeln!(output, "- Working: {habit}");
    }
    for habit in &habits.needs_attention {
        let _ = writeln!(output, "- Needs attention: {habit}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Tip of the day: {}", recommend::daily_tip(today));

    Ok(output)
}
