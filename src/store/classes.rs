use crate::error::ApiError;
use crate::models::Class;
use crate::store::db;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CODE_LEN: usize = 7;
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn class_from_row(row: &Row) -> rusqlite::Result<Class> {
    Ok(Class {
        id: row.get("id")?,
        name: row.get("name")?,
        section: row.get("section")?,
        class_code: row.get("class_code")?,
        teacher_id: row.get("teacher_id")?,
        created_at: row.get("created_at")?,
        is_archived: row.get("is_archived")?,
        archived_at: row.get("archived_at")?,
    })
}

const COLS: &str = "id, name, section, class_code, teacher_id, created_at, is_archived, archived_at";

/// Random 7-char uppercase alphanumeric code, retried until unused.
pub fn generate_class_code(conn: &Connection) -> Result<String, ApiError> {
    loop {
        let mut rng = rand::rng();
        let code: String = (0..CODE_LEN)
            .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
            .collect();
        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM classes WHERE class_code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_none() {
            return Ok(code);
        }
    }
}

pub fn create(
    conn: &Connection,
    name: &str,
    section: Option<&str>,
    teacher_id: i64,
) -> Result<Class, ApiError> {
    let code = generate_class_code(conn)?;
    conn.execute(
        "INSERT INTO classes (name, section, class_code, teacher_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, section, code, teacher_id, db::now()],
    )?;
    get(conn, conn.last_insert_rowid())?.ok_or_else(|| ApiError::not_found("Class"))
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Class>, ApiError> {
    Ok(conn
        .query_row(&format!("SELECT {COLS} FROM classes WHERE id = ?1"), params![id], class_from_row)
        .optional()?)
}

pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<Class>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM classes WHERE class_code = ?1"),
            params![code],
            class_from_row,
        )
        .optional()?)
}

pub fn list_active(conn: &Connection) -> Result<Vec<Class>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM classes WHERE is_archived = 0 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map([], class_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_for_teacher(conn: &Connection, teacher_id: i64, archived: bool) -> Result<Vec<Class>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM classes WHERE teacher_id = ?1 AND is_archived = ?2
         ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![teacher_id, archived], class_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Archive or restore a class; the flag cascades to its assignments.
pub fn set_archived(conn: &Connection, class_id: i64, archived: bool) -> Result<(), ApiError> {
    let archived_at: Option<String> = if archived { Some(db::now()) } else { None };
    let changed = conn.execute(
        "UPDATE classes SET is_archived = ?1, archived_at = ?2 WHERE id = ?3",
        params![archived, archived_at, class_id],
    )?;
    if changed == 0 {
        return Err(ApiError::not_found("Class"));
    }
    conn.execute(
        "UPDATE assignments SET is_archived = ?1, archived_at = ?2 WHERE class_id = ?3",
        params![archived, archived_at, class_id],
    )?;
    Ok(())
}

/// Delete the class and everything hanging off it, children first.
pub fn delete_cascade(conn: &Connection, class_id: i64) -> Result<(), ApiError> {
    if get(conn, class_id)?.is_none() {
        return Err(ApiError::not_found("Class"));
    }
    conn.execute_batch(&format!(
        "BEGIN;
         DELETE FROM submission_answers WHERE submission_id IN
             (SELECT s.id FROM submissions s
              JOIN assignments a ON a.id = s.assignment_id WHERE a.class_id = {class_id});
         DELETE FROM submissions WHERE assignment_id IN
             (SELECT id FROM assignments WHERE class_id = {class_id});
         DELETE FROM question_options WHERE question_id IN
             (SELECT q.id FROM questions q
              JOIN assignments a ON a.id = q.assignment_id WHERE a.class_id = {class_id});
         DELETE FROM correct_answers WHERE question_id IN
             (SELECT q.id FROM questions q
              JOIN assignments a ON a.id = q.assignment_id WHERE a.class_id = {class_id});
         DELETE FROM questions WHERE assignment_id IN
             (SELECT id FROM assignments WHERE class_id = {class_id});
         DELETE FROM assignments WHERE class_id = {class_id};
         DELETE FROM enrollments WHERE class_id = {class_id};
         DELETE FROM classes WHERE id = {class_id};
         COMMIT;"
    ))?;
    Ok(())
}

pub fn count_active(conn: &Connection) -> Result<i64, ApiError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM classes WHERE is_archived = 0", [], |r| r.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::teachers;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::store::db::init_schema(&conn).unwrap();
        conn
    }

    fn seed_teacher(conn: &Connection) -> i64 {
        teachers::create(conn, "t@s.ph", "pw", "T", "S").unwrap().id
    }

    #[test]
    fn codes_are_seven_chars_and_unique_per_class() {
        let conn = test_conn();
        let tid = seed_teacher(&conn);
        let a = create(&conn, "Math 7", Some("A"), tid).unwrap();
        let b = create(&conn, "Math 7", Some("B"), tid).unwrap();
        assert_eq!(a.class_code.len(), 7);
        assert_ne!(a.class_code, b.class_code);
        assert!(a.class_code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn lookup_by_code() {
        let conn = test_conn();
        let tid = seed_teacher(&conn);
        let c = create(&conn, "Science", None, tid).unwrap();
        let found = find_by_code(&conn, &c.class_code).unwrap().unwrap();
        assert_eq!(found.id, c.id);
        assert!(find_by_code(&conn, "NOPE123").unwrap().is_none());
    }

    #[test]
    fn archive_cascades_to_assignments() {
        let conn = test_conn();
        let tid = seed_teacher(&conn);
        let c = create(&conn, "English", None, tid).unwrap();
        conn.execute(
            "INSERT INTO assignments (class_id, title, created_at) VALUES (?1, 'Quiz 1', ?2)",
            params![c.id, db::now()],
        )
        .unwrap();

        set_archived(&conn, c.id, true).unwrap();
        let archived: bool = conn
            .query_row("SELECT is_archived FROM assignments WHERE class_id = ?1", params![c.id], |r| {
                r.get(0)
            })
            .unwrap();
        assert!(archived);
        assert_eq!(list_active(&conn).unwrap().len(), 0);

        set_archived(&conn, c.id, false).unwrap();
        assert_eq!(list_active(&conn).unwrap().len(), 1);
    }

    #[test]
    fn delete_takes_dependents_with_it() {
        let conn = test_conn();
        let tid = seed_teacher(&conn);
        let c = create(&conn, "History", None, tid).unwrap();
        conn.execute(
            "INSERT INTO assignments (class_id, title, created_at) VALUES (?1, 'Quiz', ?2)",
            params![c.id, db::now()],
        )
        .unwrap();
        delete_cascade(&conn, c.id).unwrap();
        assert!(get(&conn, c.id).unwrap().is_none());
        let n: i64 =
            conn.query_row("SELECT COUNT(*) FROM assignments", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 0);
        assert!(matches!(delete_cascade(&conn, c.id), Err(ApiError::NotFound(_))));
    }
}
