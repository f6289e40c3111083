use crate::auth;
use crate::error::ApiError;
use crate::models::Teacher;
use crate::store::db;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn teacher_from_row(row: &Row) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get("id")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        created_at: row.get("created_at")?,
    })
}

const COLS: &str = "id, email, first_name, last_name, created_at";

pub fn create(
    conn: &Connection,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Teacher, ApiError> {
    if find_by_email(conn, email)?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".into()));
    }
    conn.execute(
        "INSERT INTO teachers (email, password_hash, first_name, last_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![email, auth::hash_password(password), first_name, last_name, db::now()],
    )?;
    get(conn, conn.last_insert_rowid())?.ok_or_else(|| ApiError::not_found("Teacher"))
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Teacher>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM teachers WHERE id = ?1"),
            params![id],
            teacher_from_row,
        )
        .optional()?)
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<Teacher>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM teachers WHERE email = ?1"),
            params![email],
            teacher_from_row,
        )
        .optional()?)
}

/// Password check for login; does not reveal which part failed.
pub fn verify_login(conn: &Connection, email: &str, password: &str) -> Result<Teacher, ApiError> {
    let stored: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM teachers WHERE email = ?1",
            params![email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((id, hash)) = stored else {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    };
    if !auth::verify_password(password, &hash) {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }
    get(conn, id)?.ok_or_else(|| ApiError::not_found("Teacher"))
}

pub fn count(conn: &Connection) -> Result<i64, ApiError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM teachers", [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::store::db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn create_and_login() {
        let conn = test_conn();
        let t = create(&conn, "ms.cruz@school.ph", "pw123", "Maria", "Cruz").unwrap();
        assert_eq!(t.full_name(), "Maria Cruz");

        let back = verify_login(&conn, "ms.cruz@school.ph", "pw123").unwrap();
        assert_eq!(back.id, t.id);

        assert!(matches!(
            verify_login(&conn, "ms.cruz@school.ph", "wrong"),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            verify_login(&conn, "nobody@school.ph", "pw123"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = test_conn();
        create(&conn, "a@b.c", "x", "A", "B").unwrap();
        assert!(matches!(
            create(&conn, "a@b.c", "y", "C", "D"),
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(count(&conn).unwrap(), 1);
    }
}
