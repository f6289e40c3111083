//! Subject-name heuristics for the Unity client: which minigame a subject maps
//! to, and fuzzy matching between the subject string the game sends and the
//! class names teachers typed in.

use serde::Serialize;

/// Unity gameplay modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameplayType {
    MultipleChoice,
    FillInBlank,
    Enumeration,
    YesNo,
}

impl GameplayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameplayType::MultipleChoice => "MultipleChoice",
            GameplayType::FillInBlank => "FillInBlank",
            GameplayType::Enumeration => "Enumeration",
            GameplayType::YesNo => "YesNo",
        }
    }
}

fn contains_any(subject: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| subject.contains(k))
}

/// Pick a gameplay mode from a free-form subject name. Unknown subjects fall
/// back to MultipleChoice.
pub fn gameplay_type(subject_name: &str) -> GameplayType {
    let subject = subject_name.trim().to_lowercase();
    if subject.is_empty() {
        return GameplayType::MultipleChoice;
    }

    if contains_any(
        &subject,
        &[
            "math", "algebra", "geometry", "calculus", "arithmetic", "statistics",
            "trigonometry", "numerical",
        ],
    ) || contains_any(
        &subject,
        &[
            "science", "biology", "chemistry", "physics", "laboratory", "environmental",
            "anatomy", "botany", "zoology",
        ],
    ) || contains_any(
        &subject,
        &[
            "computer", "programming", "coding", "technology", "software", "robotics",
            "digital",
        ],
    ) || contains_any(
        &subject,
        &[
            "art", "music", "drama", "theater", "painting", "sculpture", "band", "choir",
            "orchestra",
        ],
    ) || contains_any(
        &subject,
        &[
            "business", "accounting", "finance", "marketing", "management", "economics",
            "entrepreneurship",
        ],
    ) {
        return GameplayType::MultipleChoice;
    }

    if contains_any(
        &subject,
        &[
            "english", "language", "literature", "reading", "writing", "grammar",
            "vocabulary", "spelling", "composition", "linguistics", "spanish", "french",
            "german", "chinese", "japanese", "latin", "esl", "mandarin",
        ],
    ) {
        return GameplayType::FillInBlank;
    }

    if contains_any(
        &subject,
        &[
            "history", "social", "geography", "civics", "government", "political",
            "anthropology", "psychology", "philosophy", "sociology", "ethics",
        ],
    ) {
        return GameplayType::Enumeration;
    }

    if contains_any(
        &subject,
        &["physical", "health", "sports", "fitness", "nutrition", "wellness", "athletics"],
    ) || subject == "pe"
    {
        return GameplayType::YesNo;
    }

    GameplayType::MultipleChoice
}

/// Reduce a subject name to a coarse bucket so "Math 101" and "Mathematics"
/// compare equal.
fn normalize_subject(name: &str) -> String {
    let s = name.trim().to_lowercase();
    if contains_any(&s, &["math", "algebra", "geometry", "calc", "arithmetic", "trig", "statistics"]) {
        return "math".into();
    }
    if contains_any(&s, &["science", "biology", "chemistry", "physics", "anatomy", "botany", "zoology"]) {
        return "science".into();
    }
    if contains_any(&s, &["english", "language", "literature", "grammar", "vocab", "spelling"]) {
        return "english".into();
    }
    if s == "pe" || contains_any(&s, &["physical education", "physical", "health", "fitness", "sports"]) {
        return "pe".into();
    }
    if contains_any(&s, &["art", "painting", "music", "drama", "theater"]) {
        return "art".into();
    }
    s
}

pub fn subjects_match(a: &str, b: &str) -> bool {
    if a.trim().is_empty() || b.trim().is_empty() {
        return false;
    }
    normalize_subject(a) == normalize_subject(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_and_science_play_multiple_choice() {
        assert_eq!(gameplay_type("Mathematics"), GameplayType::MultipleChoice);
        assert_eq!(gameplay_type("General Biology"), GameplayType::MultipleChoice);
    }

    #[test]
    fn languages_play_fill_in_blank() {
        assert_eq!(gameplay_type("English 7"), GameplayType::FillInBlank);
        assert_eq!(gameplay_type("Spanish"), GameplayType::FillInBlank);
    }

    #[test]
    fn history_enumerates_and_pe_answers_yes_no() {
        assert_eq!(gameplay_type("World History"), GameplayType::Enumeration);
        assert_eq!(gameplay_type("PE"), GameplayType::YesNo);
        assert_eq!(gameplay_type("Health and Wellness"), GameplayType::YesNo);
    }

    #[test]
    fn unknown_subjects_default_to_multiple_choice() {
        assert_eq!(gameplay_type(""), GameplayType::MultipleChoice);
        assert_eq!(gameplay_type("Homeroom"), GameplayType::MultipleChoice);
    }

    #[test]
    fn matching_ignores_naming_variants() {
        assert!(subjects_match("Math 101", "Mathematics"));
        assert!(subjects_match("ENGLISH", "English Literature"));
        assert!(!subjects_match("Math 101", "World History"));
        assert!(!subjects_match("", "Math"));
    }
}
