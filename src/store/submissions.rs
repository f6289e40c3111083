//! Submission recording and grading. A submission is graded in one pass
//! against the stored answer key, persisted with its per-question breakdown,
//! and the awarded points are credited to the student.

use crate::error::ApiError;
use crate::models::{QuestionKind, Submission};
use crate::scoring;
use crate::store::{assignments, db, students};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::collections::BTreeMap;

fn submission_from_row(row: &Row) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get("id")?,
        assignment_id: row.get("assignment_id")?,
        student_id: row.get("student_id")?,
        submitted_at: row.get("submitted_at")?,
        score: row.get("score")?,
        total_points: row.get("total_points")?,
        answers_json: row.get("answers_json")?,
    })
}

const COLS: &str = "id, assignment_id, student_id, submitted_at, score, total_points, answers_json";

/// One graded question within a submission.
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionKind,
    pub answer: Option<String>,
    /// None while the answer awaits manual grading.
    pub correct: Option<bool>,
    pub points_earned: i64,
    pub points_possible: i64,
}

/// Outcome of grading a full submission.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub submission_id: i64,
    pub score: i64,
    pub total_points: i64,
    /// Score after the points multiplier, as credited to the student.
    pub points_awarded: i64,
    pub percentage: f64,
    pub grade: &'static str,
    pub pending_review: i64,
    pub answers: Vec<GradedAnswer>,
}

pub fn find(
    conn: &Connection,
    assignment_id: i64,
    student_id: i64,
) -> Result<Option<Submission>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM submissions WHERE assignment_id = ?1 AND student_id = ?2"),
            params![assignment_id, student_id],
            submission_from_row,
        )
        .optional()?)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Submission>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM submissions WHERE id = ?1"),
            params![id],
            submission_from_row,
        )
        .optional()?)
}

/// Remove a prior submission and its per-question rows; the points it
/// credited are clawed back from the student.
pub fn delete(conn: &Connection, submission_id: i64) -> Result<(), ApiError> {
    let prior = get(conn, submission_id)?;
    let Some(prior) = prior else {
        return Err(ApiError::not_found("Submission"));
    };
    conn.execute(
        "DELETE FROM submission_answers WHERE submission_id = ?1",
        params![submission_id],
    )?;
    conn.execute("DELETE FROM submissions WHERE id = ?1", params![submission_id])?;
    students::add_points(conn, prior.student_id, -prior.score)?;
    Ok(())
}

/// Grade and persist a submission. `answers` maps question id (as the JSON
/// object key string) to the raw answer text. Unknown question ids are
/// ignored; unanswered questions are graded as wrong.
pub fn record(
    conn: &Connection,
    assignment_id: i64,
    student_id: i64,
    answers: &BTreeMap<String, String>,
    multiplier: f64,
) -> Result<GradeReport, ApiError> {
    let questions = assignments::questions_for(conn, assignment_id)?;

    let mut graded: Vec<GradedAnswer> = Vec::with_capacity(questions.len());
    let mut score: i64 = 0;
    let mut total: i64 = 0;
    let mut pending: i64 = 0;
    for q in &questions {
        total += q.points;
        let answer = answers.get(&q.id.to_string()).map(|s| s.as_str());
        let key = assignments::answer_key_for(conn, q.id)?;
        let outcome = scoring::score_answer(q.question_type, answer.unwrap_or(""), &key, q.points);
        if outcome.correct.is_none() {
            pending += 1;
        }
        score += outcome.points_earned;
        graded.push(GradedAnswer {
            question_id: q.id,
            question_text: q.question_text.clone(),
            question_type: q.question_type,
            answer: answer.map(str::to_string),
            correct: outcome.correct,
            points_earned: outcome.points_earned,
            points_possible: q.points,
        });
    }

    let answers_json = serde_json::to_string(answers)
        .map_err(|e| ApiError::Internal(format!("failed to encode answers: {e}")))?;
    conn.execute(
        "INSERT INTO submissions (assignment_id, student_id, submitted_at, score, total_points, answers_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![assignment_id, student_id, db::now(), score, total, answers_json],
    )?;
    let submission_id = conn.last_insert_rowid();
    for g in &graded {
        conn.execute(
            "INSERT INTO submission_answers (submission_id, question_id, answer_text, is_correct, points_earned)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![submission_id, g.question_id, g.answer, g.correct, g.points_earned],
        )?;
    }

    let awarded = ((score as f64) * multiplier).round() as i64;
    students::add_points(conn, student_id, awarded)?;

    let percentage = scoring::percent(score, total);
    Ok(GradeReport {
        submission_id,
        score,
        total_points: total,
        points_awarded: awarded,
        percentage,
        grade: scoring::letter_grade(percentage),
        pending_review: pending,
        answers: graded,
    })
}

/// Submissions for an assignment with the submitting student's name, newest
/// first. Feeds the teacher's results view.
pub fn list_for_assignment(
    conn: &Connection,
    assignment_id: i64,
) -> Result<Vec<(Submission, String)>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.assignment_id, s.student_id, s.submitted_at, s.score, s.total_points,
                s.answers_json, st.name AS student_name
         FROM submissions s
         JOIN students st ON st.id = s.student_id
         WHERE s.assignment_id = ?1
         ORDER BY s.submitted_at DESC",
    )?;
    let rows = stmt.query_map(params![assignment_id], |row| {
        Ok((submission_from_row(row)?, row.get::<_, String>("student_name")?))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Graded per-question rows of a stored submission, joined with question
/// text for display.
pub fn answers_for(conn: &Connection, submission_id: i64) -> Result<Vec<GradedAnswer>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT sa.question_id, sa.answer_text, sa.is_correct, sa.points_earned,
                q.question_text, q.question_type, q.points
         FROM submission_answers sa
         JOIN questions q ON q.id = sa.question_id
         WHERE sa.submission_id = ?1
         ORDER BY sa.question_id",
    )?;
    let rows = stmt.query_map(params![submission_id], |row| {
        let kind: String = row.get("question_type")?;
        Ok(GradedAnswer {
            question_id: row.get("question_id")?,
            question_text: row.get("question_text")?,
            question_type: QuestionKind::parse(&kind).unwrap_or(QuestionKind::Essay),
            answer: row.get("answer_text")?,
            correct: row.get("is_correct")?,
            points_earned: row.get("points_earned")?,
            points_possible: row.get("points")?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub student_id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub points: i64,
}

fn rank(rows: Vec<(i64, String, Option<String>, i64)>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(i, (student_id, name, avatar_url, points))| LeaderboardEntry {
            rank: (i + 1) as i64,
            student_id,
            name,
            avatar_url,
            points,
        })
        .collect()
}

/// Top students by lifetime points across all classes.
pub fn global_leaderboard(conn: &Connection, limit: i64) -> Result<Vec<LeaderboardEntry>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, avatar_url, total_points FROM students
         ORDER BY total_points DESC, name ASC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rank(rows))
}

/// Top students within one class, ranked by the sum of their submission
/// scores on that class's assignments.
pub fn class_leaderboard(
    conn: &Connection,
    class_id: i64,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT st.id, st.name, st.avatar_url, COALESCE(SUM(s.score), 0) AS pts
         FROM enrollments e
         JOIN students st ON st.id = e.student_id
         LEFT JOIN submissions s ON s.student_id = st.id
              AND s.assignment_id IN (SELECT id FROM assignments WHERE class_id = ?1)
         WHERE e.class_id = ?1
         GROUP BY st.id
         ORDER BY pts DESC, st.name ASC LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![class_id, limit], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rank(rows))
}

/// Number of assignments in a class the student has already submitted.
pub fn completed_in_class(
    conn: &Connection,
    student_id: i64,
    class_id: i64,
) -> Result<i64, ApiError> {
    Ok(conn.query_row(
        "SELECT COUNT(DISTINCT s.assignment_id) FROM submissions s
         JOIN assignments a ON a.id = s.assignment_id
         WHERE s.student_id = ?1 AND a.class_id = ?2",
        params![student_id, class_id],
        |row| row.get(0),
    )?)
}

pub fn submitted_assignment_ids(
    conn: &Connection,
    student_id: i64,
) -> Result<Vec<i64>, ApiError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT assignment_id FROM submissions WHERE student_id = ?1")?;
    let rows = stmt.query_map(params![student_id], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn count(conn: &Connection) -> Result<i64, ApiError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?)
}
