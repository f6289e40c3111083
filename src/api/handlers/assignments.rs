use crate::error::ApiError;
use crate::models::Question;
use crate::scoring;
use crate::store::assignments::QuestionSpec;
use crate::store::{assignments, submissions, Db};
use actix_web::{web, HttpResponse};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

/// Question as the game consumes it: options with the index of the correct
/// one for choice types, the answer list for text types.
pub fn question_payload(conn: &Connection, q: &Question) -> Result<serde_json::Value, ApiError> {
    let key = assignments::answer_key_for(conn, q.id)?;
    let mut v = json!({
        "id": q.id,
        "text": q.question_text,
        "type": q.question_type.as_str(),
        "points": q.points,
        "help_video_url": q.help_video_url,
    });
    if q.question_type.has_options() {
        let options = assignments::options_for(conn, q.id)?;
        let correct_index = key
            .first()
            .and_then(|ans| options.iter().position(|o| o.trim() == ans.trim()));
        v["options"] = json!(options);
        v["correct_answer_index"] = json!(correct_index);
    } else {
        v["correct_answers"] = json!(key);
    }
    Ok(v)
}

pub fn assignment_payload(
    conn: &Connection,
    a: &crate::models::Assignment,
) -> Result<serde_json::Value, ApiError> {
    let questions = assignments::questions_for(conn, a.id)?;
    let mut payloads = Vec::with_capacity(questions.len());
    for q in &questions {
        payloads.push(question_payload(conn, q)?);
    }
    Ok(json!({
        "id": a.id,
        "class_id": a.class_id,
        "title": a.title,
        "description": a.description,
        "due_date": a.due_date,
        "created_at": a.created_at,
        "is_archived": a.is_archived,
        "total_points": assignments::total_points(conn, a.id)?,
        "questions": payloads,
    }))
}

pub async fn get(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let payload = db
        .call(move |conn| {
            let a = assignments::get_playable(conn, id)?;
            assignment_payload(conn, &a)
        })
        .await?;
    Ok(HttpResponse::Ok().json(payload))
}

pub async fn update(
    db: web::Data<Db>,
    path: web::Path<i64>,
    body: web::Json<UpdateAssignmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let req = body.into_inner();
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Assignment title is required".into()));
    }
    let payload = db
        .call(move |conn| {
            let a = assignments::update(
                conn,
                id,
                &title,
                req.description.as_deref(),
                req.due_date.as_deref(),
                &req.questions,
            )?;
            assignment_payload(conn, &a)
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success", "assignment": payload})))
}

pub async fn delete(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    db.call(move |conn| assignments::delete_cascade(conn, id)).await?;
    tracing::info!(assignment_id = id, "assignment deleted");
    Ok(HttpResponse::Ok().json(json!({"status": "success"})))
}

pub async fn archive(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    set_archived(db, path.into_inner(), true).await
}

pub async fn restore(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    set_archived(db, path.into_inner(), false).await
}

async fn set_archived(db: web::Data<Db>, id: i64, archived: bool) -> Result<HttpResponse, ApiError> {
    db.call(move |conn| assignments::set_archived(conn, id, archived)).await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success", "is_archived": archived})))
}

/// Submissions for the assignment, newest first, with student names.
pub async fn results(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (a, rows) = db
        .call(move |conn| {
            let a = assignments::get(conn, id)?.ok_or_else(|| ApiError::not_found("Assignment"))?;
            let rows = submissions::list_for_assignment(conn, id)?;
            Ok((a, rows))
        })
        .await?;
    let payload: Vec<_> = rows
        .iter()
        .map(|(s, name)| {
            let pct = scoring::percent(s.score, s.total_points);
            json!({
                "submission_id": s.id,
                "student_id": s.student_id,
                "student_name": name,
                "submitted_at": s.submitted_at,
                "score": s.score,
                "total_points": s.total_points,
                "percentage": pct,
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "assignment": {"id": a.id, "title": a.title},
        "submissions": payload,
    })))
}

/// Per-student view for the live monitor: every enrolled student, whether
/// they submitted, and the graded answers when they did.
pub async fn monitor(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let payload = db
        .call(move |conn| {
            let a = assignments::get(conn, id)?.ok_or_else(|| ApiError::not_found("Assignment"))?;
            let total = assignments::total_points(conn, a.id)?;

            let mut stmt = conn.prepare(
                "SELECT st.id, st.name FROM enrollments e
                 JOIN students st ON st.id = e.student_id
                 WHERE e.class_id = ?1 ORDER BY st.name",
            )?;
            let roster = stmt
                .query_map([a.class_id], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut students_out = Vec::with_capacity(roster.len());
            let mut submitted = 0i64;
            let mut pct_sum = 0.0f64;
            for (student_id, name) in roster {
                match submissions::find(conn, a.id, student_id)? {
                    Some(s) => {
                        submitted += 1;
                        let pct = scoring::percent(s.score, s.total_points);
                        pct_sum += pct;
                        let answers = submissions::answers_for(conn, s.id)?;
                        students_out.push(json!({
                            "student_id": student_id,
                            "name": name,
                            "submitted": true,
                            "submitted_at": s.submitted_at,
                            "score": s.score,
                            "total_points": s.total_points,
                            "percentage": pct,
                            "answers": answers,
                        }));
                    }
                    None => students_out.push(json!({
                        "student_id": student_id,
                        "name": name,
                        "submitted": false,
                    })),
                }
            }
            let enrolled = students_out.len() as i64;
            let average = if submitted > 0 {
                (pct_sum / (submitted as f64) * 100.0).round() / 100.0
            } else {
                0.0
            };
            Ok(json!({
                "assignment": {"id": a.id, "title": a.title, "total_points": total},
                "stats": {
                    "enrolled": enrolled,
                    "submitted": submitted,
                    "missing": enrolled - submitted,
                    "average_percentage": average,
                },
                "students": students_out,
            }))
        })
        .await?;
    Ok(HttpResponse::Ok().json(payload))
}
