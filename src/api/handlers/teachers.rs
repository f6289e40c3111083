use crate::error::ApiError;
use crate::store::{classes, settings, teachers, Db};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn teacher_json(t: &crate::models::Teacher) -> serde_json::Value {
    json!({
        "id": t.id,
        "email": t.email,
        "first_name": t.first_name,
        "last_name": t.last_name,
        "name": t.full_name(),
    })
}

pub async fn register(
    db: web::Data<Db>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }
    let teacher = db
        .call(move |conn| {
            if !settings::get_bool(conn, "access.enable_registration")? {
                return Err(ApiError::Forbidden("Registration is currently disabled".into()));
            }
            teachers::create(
                conn,
                req.email.trim(),
                &req.password,
                req.first_name.trim(),
                req.last_name.trim(),
            )
        })
        .await?;
    tracing::info!(teacher_id = teacher.id, "teacher registered");
    Ok(HttpResponse::Ok().json(json!({"status": "success", "teacher": teacher_json(&teacher)})))
}

pub async fn login(
    db: web::Data<Db>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let teacher = db
        .call(move |conn| teachers::verify_login(conn, req.email.trim(), &req.password))
        .await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success", "teacher": teacher_json(&teacher)})))
}

/// Active classes for a teacher, with the archived count for the dashboard
/// badge.
pub async fn list_classes(
    db: web::Data<Db>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();
    let (teacher, active, archived_count) = db
        .call(move |conn| {
            let teacher =
                teachers::get(conn, teacher_id)?.ok_or_else(|| ApiError::not_found("Teacher"))?;
            let active = classes::list_for_teacher(conn, teacher_id, false)?;
            let archived = classes::list_for_teacher(conn, teacher_id, true)?;
            Ok((teacher, active, archived.len()))
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "teacher": teacher_json(&teacher),
        "classes": active,
        "archived_count": archived_count,
    })))
}
