//! Mobile endpoints the Unity client calls. All of them pass the access
//! guard first, so maintenance mode blanks the whole surface at once.

use crate::api::handlers::assignments::assignment_payload;
use crate::error::ApiError;
use crate::models::{Class, Student};
use crate::store::students::NewStudent;
use crate::store::{assignments, classes, settings, students, submissions, Db};
use crate::subjects;
use actix_web::{web, HttpResponse};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub class_code: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimpleRegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub grade_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinClassRequest {
    pub student_id: i64,
    pub class_code: String,
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar_url: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentRef {
    pub student_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubjectAssignmentsRequest {
    pub student_id: i64,
    pub subject: String,
}

fn student_json(s: &Student) -> serde_json::Value {
    json!({
        "id": s.id,
        "name": s.name,
        "email": s.email,
        "grade_level": s.grade_level,
        "avatar_url": s.avatar_url,
        "total_points": s.total_points,
        "last_active": s.last_active,
    })
}

fn enrolled_classes_json(
    conn: &Connection,
    student_id: i64,
) -> Result<Vec<serde_json::Value>, ApiError> {
    let mut out = Vec::new();
    for (class, teacher_name) in students::enrolled_classes(conn, student_id)? {
        let assignment_count = assignments::count_for_class(conn, class.id)?;
        let completed = submissions::completed_in_class(conn, student_id, class.id)?;
        out.push(json!({
            "id": class.id,
            "name": class.name,
            "section": class.section,
            "class_code": class.class_code,
            "teacher_name": teacher_name,
            "is_archived": class.is_archived,
            "gameplay_type": subjects::gameplay_type(&class.name).as_str(),
            "assignment_count": assignment_count,
            "completed_count": completed,
        }));
    }
    Ok(out)
}

fn lookup_class(conn: &Connection, code: &str) -> Result<Class, ApiError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::BadRequest("Class code is required".into()));
    }
    classes::find_by_code(conn, &code)?.ok_or_else(|| ApiError::not_found("Class"))
}

/// Register (or re-register) through a class code. An existing email is not
/// an error: the profile is refreshed and the enrollment added if missing.
pub async fn register(
    db: web::Data<Db>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and email are required".into()));
    }
    let (student, class, already_registered) = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            let class = lookup_class(conn, &req.class_code)?;
            if class.is_archived {
                return Err(ApiError::BadRequest("This class has been archived".into()));
            }
            let email = req.email.trim().to_lowercase();
            let (student, existing) = match students::find_by_email(conn, &email)? {
                Some(s) => {
                    students::refresh_profile(
                        conn,
                        s.id,
                        req.device_id.as_deref(),
                        req.grade_level.as_deref(),
                        req.avatar_url.as_deref(),
                    )?;
                    (students::get(conn, s.id)?.ok_or_else(|| ApiError::not_found("Student"))?, true)
                }
                None => {
                    let s = students::create(
                        conn,
                        &NewStudent {
                            name: req.name.trim(),
                            email: &email,
                            password: None,
                            device_id: req.device_id.as_deref(),
                            grade_level: req.grade_level.as_deref(),
                            avatar_url: req.avatar_url.as_deref(),
                        },
                    )?;
                    (s, false)
                }
            };
            students::enroll(conn, student.id, class.id)?;
            Ok((student, class, existing))
        })
        .await?;
    tracing::info!(student_id = student.id, class_id = class.id, "student registered");
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "already_registered": already_registered,
        "student": student_json(&student),
        "class": {
            "id": class.id,
            "name": class.name,
            "class_code": class.class_code,
            "gameplay_type": subjects::gameplay_type(&class.name).as_str(),
        }
    })))
}

/// Account-only registration, no class code. Used by the game's title
/// screen; joining classes comes later.
pub async fn simple_register(
    db: web::Data<Db>,
    body: web::Json<SimpleRegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Name, email and password are required".into()));
    }
    let student = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            students::create(
                conn,
                &NewStudent {
                    name: req.name.trim(),
                    email: &req.email.trim().to_lowercase(),
                    password: Some(&req.password),
                    device_id: None,
                    grade_level: req.grade_level.as_deref(),
                    avatar_url: None,
                },
            )
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success", "student": student_json(&student)})))
}

pub async fn login(
    db: web::Data<Db>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let (student, enrolled) = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            let student =
                students::verify_login(conn, &req.email.trim().to_lowercase(), &req.password)?;
            students::refresh_profile(conn, student.id, req.device_id.as_deref(), None, None)?;
            let student =
                students::get(conn, student.id)?.ok_or_else(|| ApiError::not_found("Student"))?;
            let enrolled = enrolled_classes_json(conn, student.id)?;
            Ok((student, enrolled))
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "student": student_json(&student),
        "classes": enrolled,
    })))
}

pub async fn join_class(
    db: web::Data<Db>,
    body: web::Json<JoinClassRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let class = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            if students::get(conn, req.student_id)?.is_none() {
                return Err(ApiError::not_found("Student"));
            }
            let class = lookup_class(conn, &req.class_code)?;
            if class.is_archived {
                return Err(ApiError::BadRequest("This class has been archived".into()));
            }
            if !students::enroll(conn, req.student_id, class.id)? {
                return Err(ApiError::BadRequest("Already enrolled in this class".into()));
            }
            students::touch_last_active(conn, req.student_id)?;
            Ok(class)
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "class": {
            "id": class.id,
            "name": class.name,
            "section": class.section,
            "class_code": class.class_code,
            "subject": class.name,
            "gameplay_type": subjects::gameplay_type(&class.name).as_str(),
        }
    })))
}

pub async fn profile(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    let (student, enrolled) = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            let student =
                students::get(conn, student_id)?.ok_or_else(|| ApiError::not_found("Student"))?;
            let enrolled = enrolled_classes_json(conn, student_id)?;
            Ok((student, enrolled))
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "student": student_json(&student),
        "classes": enrolled,
    })))
}

pub async fn set_avatar(
    db: web::Data<Db>,
    path: web::Path<i64>,
    body: web::Json<AvatarRequest>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    let url = body.into_inner().avatar_url;
    if url.trim().is_empty() {
        return Err(ApiError::BadRequest("avatar_url is required".into()));
    }
    db.call(move |conn| {
        settings::api_guard(conn)?;
        students::set_avatar(conn, student_id, url.trim())
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success"})))
}

/// Distinct subjects across the student's classes, with the gameplay mode
/// the game should launch for each.
pub async fn subjects_list(
    db: web::Data<Db>,
    body: web::Json<StudentRef>,
) -> Result<HttpResponse, ApiError> {
    let student_id = body.into_inner().student_id;
    let names = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            if students::get(conn, student_id)?.is_none() {
                return Err(ApiError::not_found("Student"));
            }
            let mut names: Vec<String> = Vec::new();
            for (class, _) in students::enrolled_classes(conn, student_id)? {
                if class.is_archived {
                    continue;
                }
                if !names.iter().any(|n| subjects::subjects_match(n, &class.name)) {
                    names.push(class.name);
                }
            }
            Ok(names)
        })
        .await?;
    let payload: Vec<_> = names
        .iter()
        .map(|n| json!({"subject": n, "gameplay_type": subjects::gameplay_type(n).as_str()}))
        .collect();
    Ok(HttpResponse::Ok().json(json!({"subjects": payload})))
}

/// Active assignments for one subject, with full question payloads. Sorted
/// by due date (undated last), then id.
pub async fn assignments_for_subject(
    db: web::Data<Db>,
    body: web::Json<SubjectAssignmentsRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    subject_assignments(db, req.student_id, req.subject).await
}

#[derive(Debug, Deserialize)]
pub struct SubjectAssignmentsQuery {
    pub student_id: i64,
    pub subject: String,
}

pub async fn assignments_for_subject_get(
    db: web::Data<Db>,
    query: web::Query<SubjectAssignmentsQuery>,
) -> Result<HttpResponse, ApiError> {
    let q = query.into_inner();
    subject_assignments(db, q.student_id, q.subject).await
}

async fn subject_assignments(
    db: web::Data<Db>,
    student_id: i64,
    subject: String,
) -> Result<HttpResponse, ApiError> {
    if subject.trim().is_empty() {
        return Err(ApiError::BadRequest("Subject is required".into()));
    }
    let payload = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            if students::get(conn, student_id)?.is_none() {
                return Err(ApiError::not_found("Student"));
            }
            let submitted = submissions::submitted_assignment_ids(conn, student_id)?;
            let mut rows: Vec<(crate::models::Assignment, serde_json::Value)> = Vec::new();
            for (class, _) in students::enrolled_classes(conn, student_id)? {
                if class.is_archived || !subjects::subjects_match(&class.name, &subject) {
                    continue;
                }
                for a in assignments::list_for_class(conn, class.id, true)? {
                    let mut v = assignment_payload(conn, &a)?;
                    v["class_name"] = json!(class.name);
                    v["class_code"] = json!(class.class_code);
                    v["already_submitted"] = json!(submitted.contains(&a.id));
                    rows.push((a, v));
                }
            }
            rows.sort_by(|(a, _), (b, _)| match (&a.due_date, &b.due_date) {
                (Some(x), Some(y)) => x.cmp(y).then(a.id.cmp(&b.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.id.cmp(&b.id),
            });
            Ok(rows.into_iter().map(|(_, v)| v).collect::<Vec<_>>())
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({"assignments": payload})))
}
