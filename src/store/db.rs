use crate::error::ApiError;
use actix_web::web;
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Handle to the SQLite database. Connections are short-lived: every
/// operation opens one, runs, and drops it. Cheap to clone into handlers.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
}

// load .env once per lookup; dotenv ignores repeat calls
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

impl Db {
    /// Resolve the DB path from `CLASSROOM_DB_PATH` (also honors a
    /// `sqlite://` / `file://` prefixed `CLASSROOM_DB_URL`), defaulting to
    /// `data/classroom.db`.
    pub fn from_env() -> Self {
        load_dotenv();
        if let Ok(p) = env::var("CLASSROOM_DB_PATH") {
            return Db { path: PathBuf::from(p) };
        }
        if let Ok(url) = env::var("CLASSROOM_DB_URL") {
            if let Some(p) = url.strip_prefix("sqlite://") {
                return Db { path: PathBuf::from(p) };
            }
            if let Some(p) = url.strip_prefix("file://") {
                return Db { path: PathBuf::from(p) };
            }
        }
        Db { path: PathBuf::from("data/classroom.db") }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Db { path: path.into() }
    }

    pub fn open(&self) -> Result<Connection, ApiError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| ApiError::Internal(format!("failed to create db dir: {e}")))?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Create the schema if it is not there yet.
    pub fn init(&self) -> Result<(), ApiError> {
        let conn = self.open()?;
        init_schema(&conn)
    }

    /// Run a blocking store operation off the actix worker threads.
    pub async fn call<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        web::block(move || {
            let conn = db.open()?;
            f(&conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
    }
}

pub fn init_schema(conn: &Connection) -> Result<(), ApiError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS teachers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            section TEXT,
            class_code TEXT NOT NULL UNIQUE,
            teacher_id INTEGER NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            is_archived INTEGER NOT NULL DEFAULT 0,
            archived_at TEXT
        );

        CREATE TABLE IF NOT EXISTS assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_id INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            due_date TEXT,
            created_at TEXT NOT NULL,
            is_archived INTEGER NOT NULL DEFAULT 0,
            archived_at TEXT
        );

        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id INTEGER NOT NULL REFERENCES assignments(id) ON DELETE CASCADE,
            question_text TEXT NOT NULL,
            question_type TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 1,
            help_video_url TEXT
        );

        CREATE TABLE IF NOT EXISTS question_options (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            option_text TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS correct_answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            answer_text TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            device_id TEXT,
            grade_level TEXT,
            avatar_url TEXT,
            total_points INTEGER NOT NULL DEFAULT 0,
            last_active TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            class_id INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            enrolled_at TEXT NOT NULL,
            UNIQUE(student_id, class_id)
        );

        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id INTEGER NOT NULL REFERENCES assignments(id) ON DELETE CASCADE,
            student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            submitted_at TEXT NOT NULL,
            score INTEGER NOT NULL DEFAULT 0,
            total_points INTEGER NOT NULL DEFAULT 0,
            answers_json TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS submission_answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            answer_text TEXT,
            is_correct INTEGER,
            points_earned INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS app_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assignments_class ON assignments(class_id);
        CREATE INDEX IF NOT EXISTS idx_questions_assignment ON questions(assignment_id);
        CREATE INDEX IF NOT EXISTS idx_submissions_assignment ON submissions(assignment_id);
        CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id);",
    )?;
    Ok(())
}

/// Current timestamp in the TEXT format the schema stores.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
