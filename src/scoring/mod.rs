//! Answer scoring: one independent comparison routine per question type.
//!
//! Every routine takes the raw answer string the game sent, the stored answer
//! key, and the question's point value. An absent or empty answer is wrong.
//! Essays are never auto-scored; their correctness stays pending.

use crate::models::QuestionKind;
use serde::Serialize;

/// Result of scoring one answer. `correct` is `None` for answers that need
/// manual grading (essays).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub correct: Option<bool>,
    pub points_earned: i64,
}

impl ScoreOutcome {
    fn wrong() -> Self {
        ScoreOutcome { correct: Some(false), points_earned: 0 }
    }

    fn full(points: i64) -> Self {
        ScoreOutcome { correct: Some(true), points_earned: points }
    }

    fn pending() -> Self {
        ScoreOutcome { correct: None, points_earned: 0 }
    }
}

/// Score a single answer against the stored answer key.
pub fn score_answer(
    kind: QuestionKind,
    answer: &str,
    correct_answers: &[String],
    max_points: i64,
) -> ScoreOutcome {
    if kind == QuestionKind::Essay {
        return ScoreOutcome::pending();
    }
    if answer.trim().is_empty() {
        return ScoreOutcome::wrong();
    }

    match kind {
        QuestionKind::MultipleChoice => score_exact_any(answer, correct_answers, max_points),
        QuestionKind::YesNo => score_exact_first(answer, correct_answers, max_points),
        QuestionKind::Identification | QuestionKind::ProblemSolving => {
            score_folded_first(answer, correct_answers, max_points)
        }
        QuestionKind::FillInTheBlanks => score_blanks(answer, correct_answers, max_points),
        QuestionKind::Enumeration => score_enumeration(answer, correct_answers, max_points),
        QuestionKind::Essay => unreachable!("handled above"),
    }
}

/// Trimmed answer equals any stored answer.
fn score_exact_any(answer: &str, correct: &[String], max_points: i64) -> ScoreOutcome {
    let given = answer.trim();
    if correct.iter().any(|c| c.trim() == given) {
        ScoreOutcome::full(max_points)
    } else {
        ScoreOutcome::wrong()
    }
}

/// Trimmed answer equals the first stored answer (yes/no keys hold one entry).
fn score_exact_first(answer: &str, correct: &[String], max_points: i64) -> ScoreOutcome {
    match correct.first() {
        Some(key) if key.trim() == answer.trim() => ScoreOutcome::full(max_points),
        _ => ScoreOutcome::wrong(),
    }
}

/// Case-insensitive trimmed equality against the first stored answer.
fn score_folded_first(answer: &str, correct: &[String], max_points: i64) -> ScoreOutcome {
    match correct.first() {
        Some(key) if fold(key) == fold(answer) => ScoreOutcome::full(max_points),
        _ => ScoreOutcome::wrong(),
    }
}

/// Pipe-delimited blanks compared position by position; every blank must match
/// and the counts must agree.
fn score_blanks(answer: &str, correct: &[String], max_points: i64) -> ScoreOutcome {
    if correct.is_empty() {
        return ScoreOutcome::wrong();
    }
    let given: Vec<String> = answer.split('|').map(|p| fold(p)).collect();
    if given.len() != correct.len() {
        return ScoreOutcome::wrong();
    }
    let all_match = given.iter().zip(correct.iter()).all(|(g, c)| *g == fold(c));
    if all_match {
        ScoreOutcome::full(max_points)
    } else {
        ScoreOutcome::wrong()
    }
}

/// Pipe-delimited enumeration with partial credit: each distinct entry that
/// appears in the answer key counts, and points scale with the fraction of the
/// key that was named. Rounded to the nearest point.
fn score_enumeration(answer: &str, correct: &[String], max_points: i64) -> ScoreOutcome {
    if correct.is_empty() {
        return ScoreOutcome::wrong();
    }
    let key: Vec<String> = correct.iter().map(|c| fold(c)).collect();
    let mut matched: std::collections::HashSet<usize> = std::collections::HashSet::new();
    for part in answer.split('|') {
        let entry = fold(part);
        if entry.is_empty() {
            continue;
        }
        if let Some(idx) = key.iter().position(|k| *k == entry) {
            matched.insert(idx);
        }
    }
    if matched.is_empty() {
        return ScoreOutcome::wrong();
    }
    let earned =
        ((max_points as f64) * (matched.len() as f64) / (key.len() as f64)).round() as i64;
    ScoreOutcome {
        correct: Some(matched.len() == key.len()),
        points_earned: earned,
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Percentage score rounded to two decimals, as the payloads report it.
pub fn percent(score: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    ((score as f64) * 10000.0 / (total as f64)).round() / 100.0
}

/// Letter grade for a percentage score.
pub fn letter_grade(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A"
    } else if percentage >= 80.0 {
        "B"
    } else if percentage >= 70.0 {
        "C"
    } else if percentage >= 60.0 {
        "D"
    } else {
        "F"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_answer_is_wrong_for_scored_kinds() {
        for kind in [
            QuestionKind::MultipleChoice,
            QuestionKind::YesNo,
            QuestionKind::Identification,
            QuestionKind::FillInTheBlanks,
            QuestionKind::Enumeration,
            QuestionKind::ProblemSolving,
        ] {
            let out = score_answer(kind, "  ", &key(&["x"]), 5);
            assert_eq!(out, ScoreOutcome { correct: Some(false), points_earned: 0 });
        }
    }

    #[test]
    fn multiple_choice_matches_any_stored_answer() {
        let k = key(&["Mitochondria", "The mitochondria"]);
        let out = score_answer(QuestionKind::MultipleChoice, "Mitochondria", &k, 2);
        assert_eq!(out.points_earned, 2);
        // case matters for choice text, it is copied verbatim from the option
        let out = score_answer(QuestionKind::MultipleChoice, "mitochondria", &k, 2);
        assert_eq!(out.points_earned, 0);
    }

    #[test]
    fn yes_no_compares_against_the_single_key() {
        let k = key(&["Yes"]);
        assert_eq!(score_answer(QuestionKind::YesNo, " Yes ", &k, 1).points_earned, 1);
        assert_eq!(score_answer(QuestionKind::YesNo, "No", &k, 1).points_earned, 0);
    }

    #[test]
    fn identification_is_case_insensitive() {
        let k = key(&["Photosynthesis"]);
        let out = score_answer(QuestionKind::Identification, "  photosynthesis ", &k, 3);
        assert_eq!(out, ScoreOutcome { correct: Some(true), points_earned: 3 });
    }

    #[test]
    fn problem_solving_matches_first_key_only() {
        let k = key(&["42", "forty-two"]);
        assert_eq!(score_answer(QuestionKind::ProblemSolving, "42", &k, 4).points_earned, 4);
        assert_eq!(
            score_answer(QuestionKind::ProblemSolving, "forty-two", &k, 4).points_earned,
            0
        );
    }

    #[test]
    fn blanks_require_every_position_to_match() {
        let k = key(&["red", "blue"]);
        let full = score_answer(QuestionKind::FillInTheBlanks, "RED | blue", &k, 6);
        assert_eq!(full.points_earned, 6);
        let swapped = score_answer(QuestionKind::FillInTheBlanks, "blue|red", &k, 6);
        assert_eq!(swapped.points_earned, 0);
        let short = score_answer(QuestionKind::FillInTheBlanks, "red", &k, 6);
        assert_eq!(short.points_earned, 0);
    }

    #[test]
    fn enumeration_awards_partial_credit() {
        let k = key(&["Luzon", "Visayas", "Mindanao"]);
        let two = score_answer(QuestionKind::Enumeration, "luzon | MINDANAO", &k, 6);
        assert_eq!(two, ScoreOutcome { correct: Some(false), points_earned: 4 });
        let all = score_answer(QuestionKind::Enumeration, "Visayas|Luzon|Mindanao", &k, 6);
        assert_eq!(all, ScoreOutcome { correct: Some(true), points_earned: 6 });
        let none = score_answer(QuestionKind::Enumeration, "Palawan", &k, 6);
        assert_eq!(none, ScoreOutcome { correct: Some(false), points_earned: 0 });
    }

    #[test]
    fn enumeration_ignores_duplicate_entries() {
        let k = key(&["a", "b"]);
        let out = score_answer(QuestionKind::Enumeration, "a|a|a", &k, 4);
        assert_eq!(out.points_earned, 2);
    }

    #[test]
    fn essay_stays_pending() {
        let out = score_answer(QuestionKind::Essay, "my thoughts...", &[], 10);
        assert_eq!(out, ScoreOutcome { correct: None, points_earned: 0 });
    }

    #[test]
    fn empty_key_never_awards_points() {
        for kind in [
            QuestionKind::MultipleChoice,
            QuestionKind::YesNo,
            QuestionKind::Identification,
            QuestionKind::FillInTheBlanks,
            QuestionKind::Enumeration,
        ] {
            assert_eq!(score_answer(kind, "anything", &[], 5).points_earned, 0);
        }
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(6, 6), 100.0);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn letter_grades_use_standard_cutoffs() {
        assert_eq!(letter_grade(95.0), "A");
        assert_eq!(letter_grade(90.0), "A");
        assert_eq!(letter_grade(89.9), "B");
        assert_eq!(letter_grade(71.2), "C");
        assert_eq!(letter_grade(60.0), "D");
        assert_eq!(letter_grade(12.0), "F");
    }
}
