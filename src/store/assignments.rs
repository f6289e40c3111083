use crate::error::ApiError;
use crate::models::{Assignment, Question, QuestionKind};
use crate::store::{classes, db};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;

fn assignment_from_row(row: &Row) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get("id")?,
        class_id: row.get("class_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        created_at: row.get("created_at")?,
        is_archived: row.get("is_archived")?,
        archived_at: row.get("archived_at")?,
    })
}

fn question_from_row(row: &Row) -> rusqlite::Result<Question> {
    let kind: String = row.get("question_type")?;
    Ok(Question {
        id: row.get("id")?,
        assignment_id: row.get("assignment_id")?,
        question_text: row.get("question_text")?,
        // unknown strings can only appear through manual DB edits; treat them
        // as manually-graded
        question_type: QuestionKind::parse(&kind).unwrap_or(QuestionKind::Essay),
        points: row.get("points")?,
        help_video_url: row.get("help_video_url")?,
    })
}

const COLS: &str =
    "id, class_id, title, description, due_date, created_at, is_archived, archived_at";

fn default_points() -> i64 {
    1
}

/// One question as submitted by the assignment editor. Mirrors the payload
/// the dashboard builds: `type` selects the kind, choice types carry
/// `options`, keyed types carry `correct_answers` or a single
/// `correct_answer`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionSpec {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_points")]
    pub points: i64,
    #[serde(default)]
    pub help_video_url: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl QuestionSpec {
    fn answer_key(&self, kind: QuestionKind) -> Vec<String> {
        let single = || -> Vec<String> {
            self.correct_answer
                .iter()
                .chain(self.correct_answers.first())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(1)
                .collect()
        };
        match kind {
            QuestionKind::MultipleChoice | QuestionKind::Enumeration | QuestionKind::FillInTheBlanks => self
                .correct_answers
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            QuestionKind::Identification | QuestionKind::ProblemSolving | QuestionKind::YesNo => single(),
            QuestionKind::Essay => Vec::new(),
        }
    }
}

pub fn create(
    conn: &Connection,
    class_id: i64,
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
    questions: &[QuestionSpec],
) -> Result<Assignment, ApiError> {
    conn.execute(
        "INSERT INTO assignments (class_id, title, description, due_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![class_id, title, description, due_date, db::now()],
    )?;
    let assignment_id = conn.last_insert_rowid();
    insert_questions(conn, assignment_id, questions)?;
    get(conn, assignment_id)?.ok_or_else(|| ApiError::not_found("Assignment"))
}

/// Replace the title, description, and full question set of an assignment.
pub fn update(
    conn: &Connection,
    assignment_id: i64,
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
    questions: &[QuestionSpec],
) -> Result<Assignment, ApiError> {
    let changed = conn.execute(
        "UPDATE assignments SET title = ?1, description = ?2, due_date = ?3 WHERE id = ?4",
        params![title, description, due_date, assignment_id],
    )?;
    if changed == 0 {
        return Err(ApiError::not_found("Assignment"));
    }
    delete_questions(conn, assignment_id)?;
    insert_questions(conn, assignment_id, questions)?;
    get(conn, assignment_id)?.ok_or_else(|| ApiError::not_found("Assignment"))
}

/// Insert the valid questions; entries with empty text or an unknown type are
/// skipped, matching the dashboard's lenient editor.
fn insert_questions(
    conn: &Connection,
    assignment_id: i64,
    questions: &[QuestionSpec],
) -> Result<(), ApiError> {
    for spec in questions {
        let text = spec.text.trim();
        let Some(kind) = QuestionKind::parse(&spec.kind) else {
            tracing::debug!(kind = %spec.kind, "skipping question with unknown type");
            continue;
        };
        if text.is_empty() {
            continue;
        }
        conn.execute(
            "INSERT INTO questions (assignment_id, question_text, question_type, points, help_video_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                assignment_id,
                text,
                kind.as_str(),
                spec.points.max(0),
                spec.help_video_url.as_deref().filter(|s| !s.trim().is_empty()),
            ],
        )?;
        let question_id = conn.last_insert_rowid();

        let options: Vec<String> = if kind == QuestionKind::YesNo && spec.options.is_empty() {
            vec!["Yes".into(), "No".into()]
        } else {
            spec.options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        };
        if kind.has_options() {
            for opt in &options {
                conn.execute(
                    "INSERT INTO question_options (question_id, option_text) VALUES (?1, ?2)",
                    params![question_id, opt],
                )?;
            }
        }
        for ans in spec.answer_key(kind) {
            conn.execute(
                "INSERT INTO correct_answers (question_id, answer_text) VALUES (?1, ?2)",
                params![question_id, ans],
            )?;
        }
    }
    Ok(())
}

fn delete_questions(conn: &Connection, assignment_id: i64) -> Result<(), ApiError> {
    conn.execute(
        "DELETE FROM question_options WHERE question_id IN
             (SELECT id FROM questions WHERE assignment_id = ?1)",
        params![assignment_id],
    )?;
    conn.execute(
        "DELETE FROM correct_answers WHERE question_id IN
             (SELECT id FROM questions WHERE assignment_id = ?1)",
        params![assignment_id],
    )?;
    conn.execute("DELETE FROM questions WHERE assignment_id = ?1", params![assignment_id])?;
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Assignment>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM assignments WHERE id = ?1"),
            params![id],
            assignment_from_row,
        )
        .optional()?)
}

/// Assignment lookup for gameplay. Refuses archived assignments and
/// assignments whose owning class is archived, even if the assignment itself
/// was individually restored.
pub fn get_playable(conn: &Connection, id: i64) -> Result<Assignment, ApiError> {
    let a = get(conn, id)?.ok_or_else(|| ApiError::not_found("Assignment"))?;
    if a.is_archived {
        return Err(ApiError::Forbidden("Assignment is archived".into()));
    }
    let class =
        classes::get(conn, a.class_id)?.ok_or_else(|| ApiError::not_found("Class"))?;
    if class.is_archived {
        return Err(ApiError::Forbidden("This class has been archived".into()));
    }
    Ok(a)
}

pub fn list_for_class(conn: &Connection, class_id: i64, active_only: bool) -> Result<Vec<Assignment>, ApiError> {
    let sql = if active_only {
        format!("SELECT {COLS} FROM assignments WHERE class_id = ?1 AND is_archived = 0 ORDER BY created_at DESC")
    } else {
        format!("SELECT {COLS} FROM assignments WHERE class_id = ?1 ORDER BY created_at DESC")
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![class_id], assignment_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn set_archived(conn: &Connection, assignment_id: i64, archived: bool) -> Result<(), ApiError> {
    let archived_at: Option<String> = if archived { Some(db::now()) } else { None };
    let changed = conn.execute(
        "UPDATE assignments SET is_archived = ?1, archived_at = ?2 WHERE id = ?3",
        params![archived, archived_at, assignment_id],
    )?;
    if changed == 0 {
        return Err(ApiError::not_found("Assignment"));
    }
    Ok(())
}

pub fn delete_cascade(conn: &Connection, assignment_id: i64) -> Result<(), ApiError> {
    if get(conn, assignment_id)?.is_none() {
        return Err(ApiError::not_found("Assignment"));
    }
    conn.execute(
        "DELETE FROM submission_answers WHERE submission_id IN
             (SELECT id FROM submissions WHERE assignment_id = ?1)",
        params![assignment_id],
    )?;
    conn.execute("DELETE FROM submissions WHERE assignment_id = ?1", params![assignment_id])?;
    delete_questions(conn, assignment_id)?;
    conn.execute("DELETE FROM assignments WHERE id = ?1", params![assignment_id])?;
    Ok(())
}

pub fn questions_for(conn: &Connection, assignment_id: i64) -> Result<Vec<Question>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, assignment_id, question_text, question_type, points, help_video_url
         FROM questions WHERE assignment_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![assignment_id], question_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn options_for(conn: &Connection, question_id: i64) -> Result<Vec<String>, ApiError> {
    let mut stmt = conn
        .prepare("SELECT option_text FROM question_options WHERE question_id = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![question_id], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn answer_key_for(conn: &Connection, question_id: i64) -> Result<Vec<String>, ApiError> {
    let mut stmt =
        conn.prepare("SELECT answer_text FROM correct_answers WHERE question_id = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![question_id], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn total_points(conn: &Connection, assignment_id: i64) -> Result<i64, ApiError> {
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(points), 0) FROM questions WHERE assignment_id = ?1",
        params![assignment_id],
        |row| row.get(0),
    )?)
}

pub fn question_count(conn: &Connection, assignment_id: i64) -> Result<i64, ApiError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM questions WHERE assignment_id = ?1",
        params![assignment_id],
        |row| row.get(0),
    )?)
}

pub fn count_for_class(conn: &Connection, class_id: i64) -> Result<i64, ApiError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE class_id = ?1",
        params![class_id],
        |row| row.get(0),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{classes, teachers};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::store::db::init_schema(&conn).unwrap();
        conn
    }

    fn seed_class(conn: &Connection) -> i64 {
        let tid = teachers::create(conn, "t@s.ph", "pw", "T", "S").unwrap().id;
        classes::create(conn, "Math", None, tid).unwrap().id
    }

    fn spec(kind: &str, text: &str) -> QuestionSpec {
        QuestionSpec {
            text: text.into(),
            kind: kind.into(),
            points: 2,
            help_video_url: None,
            options: Vec::new(),
            correct_answers: Vec::new(),
            correct_answer: None,
        }
    }

    #[test]
    fn create_skips_invalid_questions() {
        let conn = test_conn();
        let class_id = seed_class(&conn);

        let mut mc = spec("multiple_choice", "2 + 2 = ?");
        mc.options = vec!["3".into(), "4".into()];
        mc.correct_answers = vec!["4".into()];
        let unknown = spec("short_answer", "not a supported type");
        let blank = spec("essay", "   ");

        let a = create(&conn, class_id, "Quiz 1", None, None, &[mc, unknown, blank]).unwrap();
        let questions = questions_for(&conn, a.id).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type, QuestionKind::MultipleChoice);
        assert_eq!(options_for(&conn, questions[0].id).unwrap(), vec!["3", "4"]);
        assert_eq!(answer_key_for(&conn, questions[0].id).unwrap(), vec!["4"]);
        assert_eq!(total_points(&conn, a.id).unwrap(), 2);
    }

    #[test]
    fn yes_no_defaults_its_options() {
        let conn = test_conn();
        let class_id = seed_class(&conn);
        let mut q = spec("yes_no", "Is the sky blue?");
        q.correct_answer = Some("Yes".into());
        let a = create(&conn, class_id, "Quiz", None, None, &[q]).unwrap();
        let questions = questions_for(&conn, a.id).unwrap();
        assert_eq!(options_for(&conn, questions[0].id).unwrap(), vec!["Yes", "No"]);
        assert_eq!(answer_key_for(&conn, questions[0].id).unwrap(), vec!["Yes"]);
    }

    #[test]
    fn update_replaces_the_question_set() {
        let conn = test_conn();
        let class_id = seed_class(&conn);
        let mut q1 = spec("identification", "Largest planet?");
        q1.correct_answer = Some("Jupiter".into());
        let a = create(&conn, class_id, "Quiz", None, None, &[q1]).unwrap();

        let mut q2 = spec("enumeration", "Name two primary colors");
        q2.correct_answers = vec!["red".into(), "blue".into(), "yellow".into()];
        let updated =
            update(&conn, a.id, "Quiz v2", Some("revised"), None, &[q2]).unwrap();
        assert_eq!(updated.title, "Quiz v2");

        let questions = questions_for(&conn, a.id).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type, QuestionKind::Enumeration);
        assert_eq!(answer_key_for(&conn, questions[0].id).unwrap().len(), 3);
    }

    #[test]
    fn restored_assignment_stays_locked_while_class_is_archived() {
        let conn = test_conn();
        let class_id = seed_class(&conn);
        let a = create(&conn, class_id, "Quiz", None, None, &[]).unwrap();

        classes::set_archived(&conn, class_id, true).unwrap();
        set_archived(&conn, a.id, false).unwrap();

        assert!(matches!(get_playable(&conn, a.id), Err(ApiError::Forbidden(_))));

        classes::set_archived(&conn, class_id, false).unwrap();
        assert_eq!(get_playable(&conn, a.id).unwrap().id, a.id);
    }

    #[test]
    fn archive_and_delete() {
        let conn = test_conn();
        let class_id = seed_class(&conn);
        let a = create(&conn, class_id, "Quiz", None, None, &[]).unwrap();

        set_archived(&conn, a.id, true).unwrap();
        assert!(list_for_class(&conn, class_id, true).unwrap().is_empty());
        assert_eq!(list_for_class(&conn, class_id, false).unwrap().len(), 1);

        delete_cascade(&conn, a.id).unwrap();
        assert!(get(&conn, a.id).unwrap().is_none());
        assert!(matches!(set_archived(&conn, a.id, true), Err(ApiError::NotFound(_))));
    }
}
