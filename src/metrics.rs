use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::models::{Assignment, AssignmentStatus, StudentRecord, SubjectScore};

/// Completion rate reported when a student has no assignments yet.
pub const DEFAULT_COMPLETION_RATE: u32 = 92;

pub const ATTENDANCE_WEIGHT: f64 = 0.3;
pub const AVERAGE_WEIGHT: f64 = 0.4;
pub const PARTICIPATION_WEIGHT: f64 = 0.15;
pub const BEHAVIOR_WEIGHT: f64 = 0.15;

/// Offsets subtracted from the current average to build the weekly trend.
pub const TREND_OFFSETS: [f64; 6] = [10.0, 8.0, 5.0, 3.0, 1.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn classify(risk_score: f64) -> Self {
        if risk_score >= 80.0 {
            RiskTier::Low
        } else if risk_score >= 60.0 {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticipationRank {
    Top5,
    Top10,
    Top25,
    BelowAverage,
}

impl ParticipationRank {
    pub fn classify(score: u32) -> Self {
        match score {
            90.. => ParticipationRank::Top5,
            80..=89 => ParticipationRank::Top10,
            70..=79 => ParticipationRank::Top25,
            _ => ParticipationRank::BelowAverage,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticipationRank::Top5 => "Top 5% of class",
            ParticipationRank::Top10 => "Top 10% of class",
            ParticipationRank::Top25 => "Top 25% of class",
            ParticipationRank::BelowAverage => "Below average",
        }
    }
}

impl fmt::Display for ParticipationRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BehaviorStatus {
    Excellent,
    Good,
    NeedsImprovement,
    RequiresAttention,
}

impl BehaviorStatus {
    pub fn classify(score: u32) -> Self {
        match score {
            90.. => BehaviorStatus::Excellent,
            75..=89 => BehaviorStatus::Good,
            60..=74 => BehaviorStatus::NeedsImprovement,
            _ => BehaviorStatus::RequiresAttention,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BehaviorStatus::Excellent => "Excellent record",
            BehaviorStatus::Good => "Good standing",
            BehaviorStatus::NeedsImprovement => "Needs improvement",
            BehaviorStatus::RequiresAttention => "Requires attention",
        }
    }
}

impl fmt::Display for BehaviorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

/// Everything the dashboard pages display for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub average_subject_score: f64,
    pub attendance_rate: Option<u32>,
    pub completion_rate: u32,
    pub pending_count: usize,
    pub pending_progress: u32,
    pub risk_score: f64,
    pub risk_tier: RiskTier,
    pub participation_rank: ParticipationRank,
    pub behavior_status: BehaviorStatus,
    pub quiz_accuracy: u32,
    pub strongest_subject: SubjectScore,
    pub weakest_subject: SubjectScore,
}

/// Unrounded attendance percentage, capped at 100.
pub fn attendance_percent(attended: u32, total: u32) -> Result<f64> {
    if total == 0 {
        return Err(DashboardError::UndefinedRate);
    }
    Ok((100.0 * f64::from(attended) / f64::from(total)).min(100.0))
}

pub fn compute_attendance_rate(attended: u32, total: u32) -> Result<u32> {
    Ok(attendance_percent(attended, total)?.round() as u32)
}

pub fn compute_average(scores: &[u32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    Some(sum as f64 / scores.len() as f64)
}

pub fn compute_completion_rate(assignments: &[Assignment]) -> u32 {
    if assignments.is_empty() {
        return DEFAULT_COMPLETION_RATE;
    }
    let completed = assignments
        .iter()
        .filter(|a| a.status == AssignmentStatus::Completed)
        .count();
    (100.0 * completed as f64 / assignments.len() as f64).round() as u32
}

pub fn count_pending(assignments: &[Assignment]) -> usize {
    assignments.iter().filter(|a| a.status.is_open()).count()
}

/// Width of the pending-assignments progress bar: 20 points per item.
pub fn pending_progress(pending: usize) -> u32 {
    (pending.min(5) * 20) as u32
}

/// Caption under the pending-assignments count.
pub fn pending_detail(pending: usize) -> &'static str {
    if pending == 0 {
        "All caught up!"
    } else {
        "Due this week"
    }
}

pub fn compute_risk_score(
    attendance_rate: f64,
    average_score: f64,
    participation: f64,
    behavior: f64,
) -> f64 {
    ATTENDANCE_WEIGHT * attendance_rate
        + AVERAGE_WEIGHT * average_score
        + PARTICIPATION_WEIGHT * participation
        + BEHAVIOR_WEIGHT * behavior
}

pub fn compute_quiz_accuracy(average_score: f64) -> u32 {
    (average_score * 0.9).round().max(0.0) as u32
}

/// Linear scan; on ties the earliest subject wins.
pub fn find_extreme_subject(scores: &[SubjectScore], extreme: Extreme) -> Option<&SubjectScore> {
    let mut iter = scores.iter();
    let mut best = iter.next()?;
    for candidate in iter {
        let better = match extreme {
            Extreme::Min => candidate.score < best.score,
            Extreme::Max => candidate.score > best.score,
        };
        if better {
            best = candidate;
        }
    }
    Some(best)
}

pub fn weekly_trend(average_score: f64) -> [f64; 6] {
    TREND_OFFSETS.map(|offset| average_score - offset)
}

pub fn derive_metrics(record: &StudentRecord) -> Result<DerivedMetrics> {
    let scores = record.scores();
    let average = compute_average(&scores)
        .ok_or_else(|| DashboardError::malformed("record has no subject scores"))?;

    let attendance = &record.attendance;
    let attendance_rate =
        match compute_attendance_rate(attendance.classes_attended, attendance.total_classes) {
            Ok(rate) => Some(rate),
            Err(err) => {
                warn!(error = %err, "attendance rate unavailable; scoring attendance as 0");
                None
            }
        };

    let risk_score = compute_risk_score(
        f64::from(attendance_rate.unwrap_or(0)),
        average,
        f64::from(record.participation_score),
        f64::from(record.behavior_score),
    );

    let strongest = find_extreme_subject(&record.subject_scores, Extreme::Max)
        .cloned()
        .ok_or_else(|| DashboardError::malformed("record has no subject scores"))?;
    let weakest = find_extreme_subject(&record.subject_scores, Extreme::Min)
        .cloned()
        .ok_or_else(|| DashboardError::malformed("record has no subject scores"))?;

    let pending_count = count_pending(&record.assignments);
    let metrics = DerivedMetrics {
        average_subject_score: average,
        attendance_rate,
        completion_rate: compute_completion_rate(&record.assignments),
        pending_count,
        pending_progress: pending_progress(pending_count),
        risk_score,
        risk_tier: RiskTier::classify(risk_score),
        participation_rank: ParticipationRank::classify(record.participation_score),
        behavior_status: BehaviorStatus::classify(record.behavior_score),
        quiz_accuracy: compute_quiz_accuracy(average),
        strongest_subject: strongest,
        weakest_subject: weakest,
    };

    debug!(
        risk_score = metrics.risk_score,
        tier = %metrics.risk_tier,
        "derived metrics"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendance, StudentName};

    fn assignment(status: AssignmentStatus) -> Assignment {
        Assignment {
            title: "Worksheet".to_string(),
            subject: "Math".to_string(),
            due_date: None,
            status,
        }
    }

    fn sample_record() -> StudentRecord {
        StudentRecord {
            student_id: Some("STU001".to_string()),
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
                assignment(AssignmentStatus::Completed),
                assignment(AssignmentStatus::Pending),
                assignment(AssignmentStatus::Completed),
                assignment(AssignmentStatus::InProgress),
            ],
        }
    }

    #[test]
    fn attendance_rate_rounds_and_caps() {
        assert_eq!(compute_attendance_rate(92, 100), Ok(92));
        assert_eq!(compute_attendance_rate(2, 3), Ok(67));
        assert_eq!(compute_attendance_rate(120, 100), Ok(100));
        assert_eq!(
            compute_attendance_rate(5, 0),
            Err(DashboardError::UndefinedRate)
        );
    }

    #[test]
    fn average_divides_by_actual_count() {
        assert_eq!(compute_average(&[88, 75, 92, 84, 96]), Some(87.0));
        assert_eq!(compute_average(&[88, 75, 92, 84]), Some(84.75));
        assert_eq!(compute_average(&[]), None);
    }

    #[test]
    fn completion_rate_defaults_when_empty() {
        assert_eq!(compute_completion_rate(&[]), DEFAULT_COMPLETION_RATE);
        assert_eq!(count_pending(&[]), 0);

        let record = sample_record();
        assert_eq!(compute_completion_rate(&record.assignments), 50);
        assert_eq!(count_pending(&record.assignments), 2);
    }

    #[test]
    fn pending_progress_caps_at_full_bar() {
        assert_eq!(pending_progress(0), 0);
        assert_eq!(pending_progress(2), 40);
        assert_eq!(pending_progress(9), 100);
    }

    #[test]
    fn pending_detail_reports_caught_up() {
        assert_eq!(pending_detail(0), "All caught up!");
        assert_eq!(pending_detail(1), "Due this week");
        assert_eq!(pending_detail(4), "Due this week");
    }

    #[test]
    fn risk_score_matches_weighted_sum() {
        let score = compute_risk_score(92.0, 87.0, 85.0, 95.0);
        assert!((score - 89.4).abs() < 1e-9);
        assert_eq!(RiskTier::classify(score), RiskTier::Low);
    }

    #[test]
    fn risk_tiers_are_inclusive_on_lower_bound() {
        assert_eq!(RiskTier::classify(80.0), RiskTier::Low);
        assert_eq!(RiskTier::classify(79.999), RiskTier::Medium);
        assert_eq!(RiskTier::classify(60.0), RiskTier::Medium);
        assert_eq!(RiskTier::classify(59.999), RiskTier::High);
    }

    #[test]
    fn participation_and_behavior_thresholds() {
        assert_eq!(ParticipationRank::classify(90), ParticipationRank::Top5);
        assert_eq!(ParticipationRank::classify(89), ParticipationRank::Top10);
        assert_eq!(ParticipationRank::classify(70), ParticipationRank::Top25);
        assert_eq!(
            ParticipationRank::classify(69),
            ParticipationRank::BelowAverage
        );

        assert_eq!(BehaviorStatus::classify(90), BehaviorStatus::Excellent);
        assert_eq!(BehaviorStatus::classify(75), BehaviorStatus::Good);
        assert_eq!(
            BehaviorStatus::classify(60),
            BehaviorStatus::NeedsImprovement
        );
        assert_eq!(
            BehaviorStatus::classify(59),
            BehaviorStatus::RequiresAttention
        );
    }

    #[test]
    fn extreme_subject_keeps_first_on_ties() {
        let scores = vec![
            SubjectScore::new("math", 70),
            SubjectScore::new("science", 95),
            SubjectScore::new("english", 70),
            SubjectScore::new("history", 95),
        ];
        assert_eq!(
            find_extreme_subject(&scores, Extreme::Min).map(|s| s.label.as_str()),
            Some("math")
        );
        assert_eq!(
            find_extreme_subject(&scores, Extreme::Max).map(|s| s.label.as_str()),
            Some("science")
        );
        assert_eq!(find_extreme_subject(&[], Extreme::Max), None);
    }

    #[test]
    fn weekly_trend_climbs_to_current_average() {
        assert_eq!(
            weekly_trend(87.0),
            [77.0, 79.0, 82.0, 84.0, 86.0, 87.0]
        );
    }

    #[test]
    fn derives_dashboard_metrics() {
        let metrics = derive_metrics(&sample_record()).unwrap();
        assert_eq!(metrics.average_subject_score, 87.0);
        assert_eq!(metrics.attendance_rate, Some(92));
        assert_eq!(metrics.completion_rate, 50);
        assert_eq!(metrics.pending_count, 2);
        assert_eq!(metrics.risk_tier, RiskTier::Low);
        assert_eq!(metrics.participation_rank, ParticipationRank::Top10);
        assert_eq!(metrics.behavior_status, BehaviorStatus::Excellent);
        assert_eq!(metrics.quiz_accuracy, 78);
        assert_eq!(metrics.strongest_subject.label, "computerScience");
        assert_eq!(metrics.weakest_subject.label, "MySQL");
    }

    #[test]
    fn zero_total_classes_scores_attendance_as_zero() {
        let mut record = sample_record();
        record.attendance.total_classes = 0;
        let metrics = derive_metrics(&record).unwrap();
        assert_eq!(metrics.attendance_rate, None);
        let expected = compute_risk_score(0.0, 87.0, 85.0, 95.0);
        assert!((metrics.risk_score - expected).abs() < 1e-9);
        assert_eq!(metrics.risk_tier, RiskTier::Medium);
    }

    #[test]
    fn record_without_subjects_is_malformed() {
        let mut record = sample_record();
        record.subject_scores.clear();
        assert!(matches!(
            derive_metrics(&record),
            Err(DashboardError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn derivation_is_idempotent() {
        let record = sample_record();
        assert_eq!(derive_metrics(&record), derive_metrics(&record));
    }
}
