//! Property-based tests for the metrics engine.

use classpulse_dashboard::metrics::{
    attendance_percent, compute_attendance_rate, compute_average, compute_completion_rate,
    derive_metrics, find_extreme_subject, Extreme, RiskTier,
};
use classpulse_dashboard::models::{
    Assignment, AssignmentStatus, Attendance, StudentName, StudentRecord, SubjectScore,
};
use proptest::prelude::*;

fn status() -> impl Strategy<Value = AssignmentStatus> {
    prop_oneof![
        Just(AssignmentStatus::Pending),
        Just(AssignmentStatus::InProgress),
        Just(AssignmentStatus::Completed),
    ]
}

fn record() -> impl Strategy<Value = StudentRecord> {
    (
        (0u32..=200, 0u32..=200),
        prop::collection::vec(0u32..=100, 1..8),
        0u32..=100,
        0u32..=100,
        prop::collection::vec(status(), 0..6),
    )
        .prop_map(|((attended, total), scores, participation, behavior, statuses)| {
            StudentRecord {
                student_id: None,
                name: StudentName {
                    first: "Test".to_string(),
                    last: "Student".to_string(),
                },
                grade: "10th Grade".to_string(),
                attendance: Attendance {
                    classes_attended: attended,
                    total_classes: total,
                },
                subject_scores: scores
                    .into_iter()
                    .enumerate()
                    .map(|(i, score)| SubjectScore::new(format!("subject{i}"), score))
                    .collect(),
                participation_score: participation,
                behavior_score: behavior,
                assignments: statuses
                    .into_iter()
                    .enumerate()
                    .map(|(i, status)| Assignment {
                        title: format!("Task {i}"),
                        subject: "Math".to_string(),
                        due_date: None,
                        status,
                    })
                    .collect(),
            }
        })
}

proptest! {
    /// Attendance stays within 0..=100 even when attended exceeds total.
    #[test]
    fn attendance_is_a_percentage(attended in 0u32..=10_000, total in 1u32..=10_000) {
        let percent = attendance_percent(attended, total).unwrap();
        prop_assert!((0.0..=100.0).contains(&percent));
        prop_assert!(compute_attendance_rate(attended, total).unwrap() <= 100);
    }

    #[test]
    fn zero_total_is_undefined(attended in 0u32..=10_000) {
        prop_assert!(attendance_percent(attended, 0).is_err());
    }

    /// The mean lies between the extremes it was built from.
    #[test]
    fn average_is_bounded_by_extremes(scores in prop::collection::vec(0u32..=100, 1..12)) {
        let subjects: Vec<SubjectScore> = scores
            .iter()
            .map(|&score| SubjectScore::new("s", score))
            .collect();
        let average = compute_average(&scores).unwrap();
        let min = find_extreme_subject(&subjects, Extreme::Min).unwrap().score;
        let max = find_extreme_subject(&subjects, Extreme::Max).unwrap().score;
        prop_assert!(f64::from(min) <= average + 1e-9);
        prop_assert!(average <= f64::from(max) + 1e-9);
    }

    #[test]
    fn completion_rate_is_a_percentage(statuses in prop::collection::vec(status(), 0..20)) {
        let assignments: Vec<Assignment> = statuses
            .into_iter()
            .map(|status| Assignment {
                title: "Task".to_string(),
                subject: "Math".to_string(),
                due_date: None,
                status,
            })
            .collect();
        prop_assert!(compute_completion_rate(&assignments) <= 100);
    }

    /// Deriving twice gives the same answer and the tier agrees with the score.
    #[test]
    fn derivation_is_deterministic(record in record()) {
        let first = derive_metrics(&record).unwrap();
        let second = derive_metrics(&record).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.risk_tier, RiskTier::classify(first.risk_score));
        prop_assert!(first.pending_progress <= 100);
        prop_assert!(first.risk_score >= 0.0 && first.risk_score <= 100.0 + 1e-9);
    }
}
