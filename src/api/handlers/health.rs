use crate::error::ApiError;
use crate::store::{classes, students, submissions, teachers, Db};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "online",
        "service": "classquest",
        "endpoints": {
            "student": [
                "POST /student/register",
                "POST /student/simple-register",
                "POST /student/login",
                "POST /student/join-class",
                "GET /student/{id}/profile",
                "PUT /student/{id}/avatar",
                "POST /student/subjects",
                "POST /student/assignments"
            ],
            "game": [
                "POST /submit/{assignment_id}",
                "GET /leaderboard/{class_code}",
                "POST /events/navigation"
            ],
            "classes": [
                "GET /classes",
                "POST /classes",
                "GET /class/{code}/assignments",
                "POST /class/{id}/assignments"
            ],
            "assignments": [
                "GET /assignment/{id}",
                "GET /assignment/{id}/results",
                "GET /assignment/{id}/monitor"
            ],
            "teacher": [
                "POST /teacher/register",
                "POST /teacher/login",
                "GET /teacher/{id}/classes"
            ],
            "admin": ["GET /stats", "GET /settings", "PUT /settings"]
        }
    }))
}

pub async fn stats(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    let (teachers, students, classes, enrollments, submissions) = db
        .call(|conn| {
            Ok((
                teachers::count(conn)?,
                students::count(conn)?,
                classes::count_active(conn)?,
                students::enrollment_count(conn)?,
                submissions::count(conn)?,
            ))
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "teachers": teachers,
        "students": students,
        "active_classes": classes,
        "enrollments": enrollments,
        "submissions": submissions,
    })))
}
