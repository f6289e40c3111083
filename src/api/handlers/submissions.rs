use crate::error::ApiError;
use crate::store::{assignments, settings, students, submissions, Db};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub student_id: i64,
    /// Question id (as a string key) to raw answer text.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

pub async fn submit(
    db: web::Data<Db>,
    path: web::Path<i64>,
    body: web::Json<SubmitRequest>,
) -> Result<HttpResponse, ApiError> {
    let assignment_id = path.into_inner();
    let req = body.into_inner();
    let report = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            assignments::get_playable(conn, assignment_id)?;
            if students::get(conn, req.student_id)?.is_none() {
                return Err(ApiError::not_found("Student"));
            }
            if let Some(prior) = submissions::find(conn, assignment_id, req.student_id)? {
                if !settings::get_bool(conn, "game.allow_multiple_submissions")? {
                    return Err(ApiError::BadRequest(
                        "Assignment already submitted".into(),
                    ));
                }
                submissions::delete(conn, prior.id)?;
            }
            let multiplier = settings::get_f64(conn, "game.points_multiplier", 1.0)?;
            submissions::record(conn, assignment_id, req.student_id, &req.answers, multiplier)
        })
        .await?;
    tracing::info!(
        submission_id = report.submission_id,
        score = report.score,
        total = report.total_points,
        "submission graded"
    );
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "submission_id": report.submission_id,
        "score": report.score,
        "total_points": report.total_points,
        "points_awarded": report.points_awarded,
        "percentage": report.percentage,
        "grade": report.grade,
        "pending_review": report.pending_review,
        "answers": report.answers,
    })))
}
