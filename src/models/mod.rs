// Core entity rows as they come out of SQLite. Timestamps are RFC 3339 TEXT.

use serde::{Deserialize, Serialize};

/// The seven question types the game understands. Stored in the DB as the
/// snake_case string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    YesNo,
    Identification,
    FillInTheBlanks,
    Enumeration,
    ProblemSolving,
    Essay,
}

impl QuestionKind {
    pub fn parse(s: &str) -> Option<QuestionKind> {
        match s {
            "multiple_choice" => Some(QuestionKind::MultipleChoice),
            "yes_no" => Some(QuestionKind::YesNo),
            "identification" => Some(QuestionKind::Identification),
            "fill_in_the_blanks" => Some(QuestionKind::FillInTheBlanks),
            "enumeration" => Some(QuestionKind::Enumeration),
            "problem_solving" => Some(QuestionKind::ProblemSolving),
            "essay" => Some(QuestionKind::Essay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::YesNo => "yes_no",
            QuestionKind::Identification => "identification",
            QuestionKind::FillInTheBlanks => "fill_in_the_blanks",
            QuestionKind::Enumeration => "enumeration",
            QuestionKind::ProblemSolving => "problem_solving",
            QuestionKind::Essay => "essay",
        }
    }

    /// Choice types carry an options list in the game payload.
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionKind::MultipleChoice | QuestionKind::YesNo)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Teacher {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub section: Option<String>,
    pub class_code: String,
    pub teacher_id: i64,
    pub created_at: String,
    pub is_archived: bool,
    pub archived_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub created_at: String,
    pub is_archived: bool,
    pub archived_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,
    pub assignment_id: i64,
    pub question_text: String,
    pub question_type: QuestionKind,
    pub points: i64,
    pub help_video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub device_id: Option<String>,
    pub grade_level: Option<String>,
    pub avatar_url: Option<String>,
    pub total_points: i64,
    pub last_active: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub enrolled_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub submitted_at: String,
    pub score: i64,
    pub total_points: i64,
    pub answers_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_round_trips_through_db_strings() {
        for kind in [
            QuestionKind::MultipleChoice,
            QuestionKind::YesNo,
            QuestionKind::Identification,
            QuestionKind::FillInTheBlanks,
            QuestionKind::Enumeration,
            QuestionKind::ProblemSolving,
            QuestionKind::Essay,
        ] {
            assert_eq!(QuestionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(QuestionKind::parse("short_answer"), None);
    }

    #[test]
    fn only_choice_kinds_carry_options() {
        assert!(QuestionKind::MultipleChoice.has_options());
        assert!(QuestionKind::YesNo.has_options());
        assert!(!QuestionKind::Enumeration.has_options());
        assert!(!QuestionKind::Essay.has_options());
    }
}
