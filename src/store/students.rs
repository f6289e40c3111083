use crate::auth;
use crate::error::ApiError;
use crate::models::{Class, Student};
use crate::store::db;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn student_from_row(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        device_id: row.get("device_id")?,
        grade_level: row.get("grade_level")?,
        avatar_url: row.get("avatar_url")?,
        total_points: row.get("total_points")?,
        last_active: row.get("last_active")?,
        created_at: row.get("created_at")?,
    })
}

const COLS: &str =
    "id, name, email, device_id, grade_level, avatar_url, total_points, last_active, created_at";

pub struct NewStudent<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: Option<&'a str>,
    pub device_id: Option<&'a str>,
    pub grade_level: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

pub fn create(conn: &Connection, new: &NewStudent) -> Result<Student, ApiError> {
    if find_by_email(conn, new.email)?.is_some() {
        return Err(ApiError::BadRequest("Email already exists".into()));
    }
    let hash = new.password.map(auth::hash_password);
    conn.execute(
        "INSERT INTO students (name, email, password_hash, device_id, grade_level, avatar_url,
                               total_points, last_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
        params![new.name, new.email, hash, new.device_id, new.grade_level, new.avatar_url, db::now()],
    )?;
    get(conn, conn.last_insert_rowid())?.ok_or_else(|| ApiError::not_found("Student"))
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Student>, ApiError> {
    Ok(conn
        .query_row(&format!("SELECT {COLS} FROM students WHERE id = ?1"), params![id], student_from_row)
        .optional()?)
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<Student>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLS} FROM students WHERE email = ?1"),
            params![email],
            student_from_row,
        )
        .optional()?)
}

pub fn verify_login(conn: &Connection, email: &str, password: &str) -> Result<Student, ApiError> {
    let student =
        find_by_email(conn, email)?.ok_or_else(|| ApiError::not_found("Student account"))?;
    let hash: Option<String> = conn.query_row(
        "SELECT password_hash FROM students WHERE id = ?1",
        params![student.id],
        |row| row.get(0),
    )?;
    match hash {
        Some(h) if auth::verify_password(password, &h) => Ok(student),
        _ => Err(ApiError::Unauthorized("Invalid email or password".into())),
    }
}

/// Refresh mutable profile bits a re-registration may carry.
pub fn refresh_profile(
    conn: &Connection,
    id: i64,
    device_id: Option<&str>,
    grade_level: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE students SET
             device_id = COALESCE(?1, device_id),
             grade_level = COALESCE(?2, grade_level),
             avatar_url = COALESCE(?3, avatar_url),
             last_active = ?4
         WHERE id = ?5",
        params![device_id, grade_level, avatar_url, db::now(), id],
    )?;
    Ok(())
}

pub fn touch_last_active(conn: &Connection, id: i64) -> Result<(), ApiError> {
    conn.execute("UPDATE students SET last_active = ?1 WHERE id = ?2", params![db::now(), id])?;
    Ok(())
}

pub fn set_avatar(conn: &Connection, id: i64, avatar_url: &str) -> Result<(), ApiError> {
    let changed = conn.execute(
        "UPDATE students SET avatar_url = ?1, last_active = ?2 WHERE id = ?3",
        params![avatar_url, db::now(), id],
    )?;
    if changed == 0 {
        return Err(ApiError::not_found("Student"));
    }
    Ok(())
}

pub fn add_points(conn: &Connection, id: i64, points: i64) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE students SET total_points = total_points + ?1, last_active = ?2 WHERE id = ?3",
        params![points, db::now(), id],
    )?;
    Ok(())
}

/// Enroll the student; returns false when the enrollment already existed.
pub fn enroll(conn: &Connection, student_id: i64, class_id: i64) -> Result<bool, ApiError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO enrollments (student_id, class_id, enrolled_at) VALUES (?1, ?2, ?3)",
        params![student_id, class_id, db::now()],
    )?;
    Ok(inserted > 0)
}

pub fn is_enrolled(conn: &Connection, student_id: i64, class_id: i64) -> Result<bool, ApiError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM enrollments WHERE student_id = ?1 AND class_id = ?2",
            params![student_id, class_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Classes the student is enrolled in, joined with the owning teacher's name.
/// Returns `(class, teacher_full_name)` pairs, newest enrollment first.
pub fn enrolled_classes(conn: &Connection, student_id: i64) -> Result<Vec<(Class, String)>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.section, c.class_code, c.teacher_id, c.created_at,
                c.is_archived, c.archived_at,
                t.first_name || ' ' || t.last_name AS teacher_name
         FROM enrollments e
         JOIN classes c ON c.id = e.class_id
         JOIN teachers t ON t.id = c.teacher_id
         WHERE e.student_id = ?1
         ORDER BY e.enrolled_at DESC",
    )?;
    let rows = stmt.query_map(params![student_id], |row| {
        Ok((
            Class {
                id: row.get("id")?,
                name: row.get("name")?,
                section: row.get("section")?,
                class_code: row.get("class_code")?,
                teacher_id: row.get("teacher_id")?,
                created_at: row.get("created_at")?,
                is_archived: row.get("is_archived")?,
                archived_at: row.get("archived_at")?,
            },
            row.get::<_, String>("teacher_name")?,
        ))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn count(conn: &Connection) -> Result<i64, ApiError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?)
}

pub fn enrollment_count(conn: &Connection) -> Result<i64, ApiError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM enrollments", [], |row| row.get(0))?)
}
