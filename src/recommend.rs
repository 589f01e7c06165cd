use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::metrics::{attendance_percent, compute_average, find_extreme_subject, Extreme};
use crate::models::{subject_display_name, AssignmentStatus, StudentRecord, SubjectScore};

const MAX_HABITS: usize = 3;

const DAILY_TIPS: [&str; 8] = [
    "Spaced repetition is key. Review your notes 10 minutes after class, then again 24 hours later.",
    "Take regular breaks during study sessions. The Pomodoro Technique (25 min work, 5 min break) can boost focus.",
    "Teach someone else what you've learned. Explaining concepts reinforces your own understanding.",
    "Stay hydrated and eat brain-healthy foods. Your mental performance depends on physical wellness.",
    "Get adequate sleep. Studies show that 7-9 hours improves memory consolidation and problem-solving.",
    "Active recall is more effective than re-reading. Test yourself regularly on the material.",
    "Create a dedicated study space free from distractions. Your environment affects your focus.",
    "Set specific, achievable goals for each study session. Clear objectives improve productivity.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium Priority",
            Priority::Low => "Low Priority",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceAnalysis {
    pub lowest: SubjectScore,
    pub highest: SubjectScore,
    pub average: f64,
    /// Unrounded; zero when no classes have been held.
    pub attendance_rate: f64,
    pub participation_score: u32,
    pub behavior_score: u32,
}

impl PerformanceAnalysis {
    fn lowest_name(&self) -> String {
        subject_display_name(&self.lowest.label)
    }

    fn highest_name(&self) -> String {
        subject_display_name(&self.highest.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub focus: String,
    pub priority: Priority,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityCard {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StudyHabits {
    pub working: Vec<String>,
    pub needs_attention: Vec<String>,
}

pub fn analyze(record: &StudentRecord) -> Result<PerformanceAnalysis> {
    let no_subjects = || DashboardError::malformed("record has no subject scores");
    let lowest = find_extreme_subject(&record.subject_scores, Extreme::Min).ok_or_else(no_subjects)?;
    let highest =
        find_extreme_subject(&record.subject_scores, Extreme::Max).ok_or_else(no_subjects)?;
    let average = compute_average(&record.scores()).ok_or_else(no_subjects)?;

    let attendance_rate = attendance_percent(
        record.attendance.classes_attended,
        record.attendance.total_classes,
    )
    .unwrap_or(0.0);

    Ok(PerformanceAnalysis {
        lowest: lowest.clone(),
        highest: highest.clone(),
        average,
        attendance_rate,
        participation_score: record.participation_score,
        behavior_score: record.behavior_score,
    })
}

pub fn main_recommendation(analysis: &PerformanceAnalysis) -> Recommendation {
    if analysis.lowest.score < 80 {
        let subject = analysis.lowest_name();
        Recommendation {
            title: format!("Boost your {subject} scores"),
            description: format!(
                "We've noticed a slight dip in your {subject} performance. Dedicating 30 minutes extra this week could bring your average back up to an A."
            ),
            actions: vec![
                format!("Review key concepts in {subject}"),
                "Take a practice quiz to identify weak areas".to_string(),
                "Watch educational videos on challenging topics".to_string(),
            ],
            focus: subject,
            priority: Priority::High,
        }
    } else if analysis.attendance_rate < 90.0 {
        Recommendation {
            title: "Improve Your Attendance".to_string(),
            description: "Your attendance has room for improvement. Consistent attendance is crucial for staying on track with lessons and assignments.".to_string(),
            focus: "Attendance".to_string(),
            priority: Priority::High,
            actions: vec![
                "Set morning alarms earlier".to_string(),
                "Prepare materials the night before".to_string(),
                "Review class schedules weekly".to_string(),
            ],
        }
    } else if analysis.participation_score < 85 {
        Recommendation {
            title: "Increase Class Participation".to_string(),
            description: "Your academic scores are strong, but increasing participation could enhance your learning and class engagement.".to_string(),
            focus: "Participation".to_string(),
            priority: Priority::Medium,
            actions: vec![
                "Prepare questions before each class".to_string(),
                "Volunteer to answer at least once per class".to_string(),
                "Join study groups for collaborative learning".to_string(),
            ],
        }
    } else {
        Recommendation {
            title: "Maintain Your Excellent Performance".to_string(),
            description: "You're doing great! Keep up the consistent study habits and consider helping classmates to reinforce your knowledge.".to_string(),
            focus: "Excellence".to_string(),
            priority: Priority::Low,
            actions: vec![
                "Continue your current study routine".to_string(),
                "Consider tutoring peers in your strong subjects".to_string(),
                "Challenge yourself with advanced materials".to_string(),
            ],
        }
    }
}

/// One high, one medium and one low priority card, in that order.
pub fn priority_cards(analysis: &PerformanceAnalysis) -> Vec<PriorityCard> {
    let lowest = analysis.lowest_name();
    let highest = analysis.highest_name();

    let high = if analysis.lowest.score < 85 {
        PriorityCard {
            priority: Priority::High,
            category: "Academic".to_string(),
            title: format!("Focus on {lowest}"),
            description: format!(
                "Your recent {lowest} scores show room for improvement. Dedicating extra time this week could boost your grade."
            ),
        }
    } else if analysis.attendance_rate < 90.0 {
        PriorityCard {
            priority: Priority::High,
            category: "Attendance".to_string(),
            title: "Improve Attendance Rate".to_string(),
            description: format!(
                "Current attendance is {}%. Aim for 95% or higher to stay on track with all lessons.",
                analysis.attendance_rate.round()
            ),
        }
    } else {
        PriorityCard {
            priority: Priority::High,
            category: "Academic".to_string(),
            title: format!("Maintain {highest} Excellence"),
            description: format!(
                "You're excelling at {highest}! Consider advanced topics or helping peers to deepen your understanding."
            ),
        }
    };

    let medium = if analysis.participation_score < 80 {
        PriorityCard {
            priority: Priority::Medium,
            category: "Participation".to_string(),
            title: "Increase Class Participation".to_string(),
            description: "Active participation helps reinforce learning. Try contributing at least once per class session.".to_string(),
        }
    } else {
        PriorityCard {
            priority: Priority::Medium,
            category: "Habit".to_string(),
            title: "Consistent Study Time".to_string(),
            description: "Establish a regular study schedule. Try dedicating specific hours each day for focused study sessions.".to_string(),
        }
    };

    let venue = if analysis.lowest.score < analysis.highest.score {
        lowest
    } else {
        "class discussions".to_string()
    };
    let low = PriorityCard {
        priority: Priority::Low,
        category: "Participation".to_string(),
        title: "Speak Up More".to_string(),
        description: format!(
            "Consider contributing more during {venue}. Your insights could help both you and your classmates."
        ),
    };

    vec![high, medium, low]
}

pub fn study_habits(record: &StudentRecord, analysis: &PerformanceAnalysis) -> StudyHabits {
    let mut working = Vec::new();
    if analysis.highest.score >= 90 {
        working.push(format!("Excelling in {}", analysis.highest_name()));
    }
    if analysis.attendance_rate >= 90.0 {
        working.push("Consistent morning attendance".to_string());
    }
    if analysis.behavior_score >= 90 {
        working.push("Excellent classroom behavior".to_string());
    }
    if record
        .assignments
        .iter()
        .any(|a| a.status == AssignmentStatus::Completed)
    {
        working.push("Completing assignments on time".to_string());
    }
    if working.len() < 2 {
        working.push("Maintaining regular study schedule".to_string());
        working.push("Active participation in class".to_string());
    }

    let mut needs_attention = Vec::new();
    if analysis.lowest.score < 80 {
        needs_attention.push(format!(
            "{} performance needs improvement",
            analysis.lowest_name()
        ));
    }
    if analysis.participation_score < 80 {
        needs_attention.push("Low participation in class discussions".to_string());
    }
    if analysis.attendance_rate < 90.0 {
        needs_attention.push("Inconsistent attendance pattern".to_string());
    }
    if needs_attention.len() < 2 {
        needs_attention.push("Late night study sessions impacting focus".to_string());
        needs_attention.push("Could improve time management for assignments".to_string());
    }

    working.truncate(MAX_HABITS);
    needs_attention.truncate(MAX_HABITS);
    StudyHabits {
        working,
        needs_attention,
    }
}

/// Same tip for the whole day, rotating through the list by day of year.
pub fn daily_tip(date: NaiveDate) -> &'static str {
    DAILY_TIPS[date.ordinal0() as usize % DAILY_TIPS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Attendance, StudentName};

    fn record(scores: &[(&str, u32)], attended: u32, participation: u32) -> StudentRecord {
        StudentRecord {
            student_id: None,
            name: StudentName {
                first: "Alice".to_string(),
                last: "Smith".to_string(),
            },
            grade: "12th Grade".to_string(),
            attendance: Attendance {
                classes_attended: attended,
                total_classes: 100,
            },
            subject_scores: scores
                .iter()
                .map(|(label, score)| SubjectScore::new(*label, *score))
                .collect(),
            participation_score: participation,
            behavior_score: 95,
            assignments: Vec::new(),
        }
    }

    #[test]
    fn analysis_finds_extremes_and_average() {
        let rec = record(&[("mathematics", 88), ("MySQL", 75), ("english", 92)], 92, 85);
        let analysis = analyze(&rec).unwrap();
        assert_eq!(analysis.lowest.label, "MySQL");
        assert_eq!(analysis.highest.label, "english");
        assert!((analysis.average - 85.0).abs() < 1e-9);
        assert_eq!(analysis.attendance_rate, 92.0);
    }

    #[test]
    fn weak_subject_drives_main_recommendation() {
        let rec = record(&[("mathematics", 88), ("MySQL", 75)], 92, 85);
        let rec = main_recommendation(&analyze(&rec).unwrap());
        assert_eq!(rec.title, "Boost your MySQL scores");
        assert_eq!(rec.priority, Priority::High);
        assert_eq!(rec.actions[0], "Review key concepts in MySQL");
    }

    #[test]
    fn main_recommendation_falls_through_in_order() {
        let attendance = analyze(&record(&[("math", 88)], 85, 70)).unwrap();
        assert_eq!(main_recommendation(&attendance).title, "Improve Your Attendance");

        let participation = analyze(&record(&[("math", 88)], 95, 84)).unwrap();
        assert_eq!(
            main_recommendation(&participation).priority,
            Priority::Medium
        );

        let excellent = analyze(&record(&[("math", 88)], 95, 90)).unwrap();
        assert_eq!(
            main_recommendation(&excellent).title,
            "Maintain Your Excellent Performance"
        );
    }

    #[test]
    fn priority_cards_cover_three_levels() {
        let analysis = analyze(&record(&[("math", 90), ("history", 95)], 80, 70)).unwrap();
        let cards = priority_cards(&analysis);
        let levels: Vec<Priority> = cards.iter().map(|c| c.priority).collect();
        assert_eq!(levels, [Priority::High, Priority::Medium, Priority::Low]);

        assert_eq!(cards[0].title, "Improve Attendance Rate");
        assert!(cards[0].description.starts_with("Current attendance is 80%."));
        assert_eq!(cards[1].category, "Participation");
        assert!(cards[2].description.contains("during Mathematics."));
    }

    #[test]
    fn equal_scores_talk_about_class_discussions() {
        let analysis = analyze(&record(&[("math", 90), ("history", 90)], 95, 90)).unwrap();
        let cards = priority_cards(&analysis);
        assert_eq!(cards[0].title, "Maintain Mathematics Excellence");
        assert!(cards[2].description.contains("during class discussions."));
    }

    #[test]
    fn habits_pad_and_truncate() {
        let mut rec = record(&[("math", 95), ("english", 70)], 95, 70);
        rec.assignments.push(Assignment {
            title: "Essay".to_string(),
            subject: "English".to_string(),
            due_date: None,
            status: AssignmentStatus::Completed,
        });
        let analysis = analyze(&rec).unwrap();
        let habits = study_habits(&rec, &analysis);

        assert_eq!(
            habits.working,
            [
                "Excelling in Mathematics",
                "Consistent morning attendance",
                "Excellent classroom behavior",
            ]
        );
        assert_eq!(
            habits.needs_attention,
            [
                "English performance needs improvement",
                "Low participation in class discussions",
            ]
        );

        let quiet = record(&[("math", 85)], 95, 85);
        let habits = study_habits(&quiet, &analyze(&quiet).unwrap());
        assert_eq!(habits.needs_attention.len(), 2);
        assert_eq!(
            habits.needs_attention[0],
            "Late night study sessions impacting focus"
        );
    }

    #[test]
    fn daily_tip_is_stable_within_a_day() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(daily_tip(date), DAILY_TIPS[0]);
        assert_eq!(daily_tip(date), daily_tip(date));
        let next = date.succ_opt().unwrap();
        assert_eq!(daily_tip(next), DAILY_TIPS[1]);
    }
}
