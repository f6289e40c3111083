use crate::error::ApiError;
use crate::store::assignments::QuestionSpec;
use crate::store::{assignments, classes, teachers, Db};
use crate::subjects;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    pub teacher_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

fn class_json(c: &crate::models::Class, teacher_name: Option<&str>) -> serde_json::Value {
    let mut v = json!({
        "id": c.id,
        "name": c.name,
        "section": c.section,
        "class_code": c.class_code,
        "teacher_id": c.teacher_id,
        "created_at": c.created_at,
        "is_archived": c.is_archived,
        "gameplay_type": subjects::gameplay_type(&c.name).as_str(),
    });
    if let Some(name) = teacher_name {
        v["teacher_name"] = json!(name);
    }
    v
}

pub async fn list(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    let rows = db
        .call(|conn| {
            let mut out = Vec::new();
            for class in classes::list_active(conn)? {
                let teacher_name =
                    teachers::get(conn, class.teacher_id)?.map(|t| t.full_name());
                out.push((class, teacher_name));
            }
            Ok(out)
        })
        .await?;
    let payload: Vec<_> =
        rows.iter().map(|(c, t)| class_json(c, t.as_deref())).collect();
    Ok(HttpResponse::Ok().json(json!({"classes": payload})))
}

pub async fn create(
    db: web::Data<Db>,
    body: web::Json<CreateClassRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Class name is required".into()));
    }
    let class = db
        .call(move |conn| {
            if teachers::get(conn, req.teacher_id)?.is_none() {
                return Err(ApiError::not_found("Teacher"));
            }
            classes::create(conn, &name, req.section.as_deref().filter(|s| !s.trim().is_empty()), req.teacher_id)
        })
        .await?;
    tracing::info!(class_id = class.id, code = %class.class_code, "class created");
    Ok(HttpResponse::Ok().json(json!({"status": "success", "class": class_json(&class, None)})))
}

/// Class info plus its active assignments, looked up by join code. An
/// archived class still resolves but exposes an empty list.
pub async fn assignments_by_code(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner().trim().to_uppercase();
    let (class, rows) = db
        .call(move |conn| {
            let class =
                classes::find_by_code(conn, &code)?.ok_or_else(|| ApiError::not_found("Class"))?;
            let rows = if class.is_archived {
                Vec::new()
            } else {
                let mut rows = Vec::new();
                for a in assignments::list_for_class(conn, class.id, true)? {
                    let count = assignments::question_count(conn, a.id)?;
                    let total = assignments::total_points(conn, a.id)?;
                    rows.push((a, count, total));
                }
                rows
            };
            Ok((class, rows))
        })
        .await?;
    let payload: Vec<_> = rows
        .iter()
        .map(|(a, count, total)| {
            json!({
                "id": a.id,
                "title": a.title,
                "description": a.description,
                "due_date": a.due_date,
                "created_at": a.created_at,
                "question_count": count,
                "total_points": total,
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "class": class_json(&class, None),
        "assignments": payload,
    })))
}

pub async fn archive(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    set_archived(db, path.into_inner(), true).await
}

pub async fn restore(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    set_archived(db, path.into_inner(), false).await
}

async fn set_archived(db: web::Data<Db>, class_id: i64, archived: bool) -> Result<HttpResponse, ApiError> {
    db.call(move |conn| classes::set_archived(conn, class_id, archived)).await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success", "is_archived": archived})))
}

pub async fn delete(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let class_id = path.into_inner();
    db.call(move |conn| classes::delete_cascade(conn, class_id)).await?;
    tracing::info!(class_id, "class deleted");
    Ok(HttpResponse::Ok().json(json!({"status": "success"})))
}

pub async fn create_assignment(
    db: web::Data<Db>,
    path: web::Path<i64>,
    body: web::Json<CreateAssignmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let class_id = path.into_inner();
    let req = body.into_inner();
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Assignment title is required".into()));
    }
    let (assignment, question_count) = db
        .call(move |conn| {
            if classes::get(conn, class_id)?.is_none() {
                return Err(ApiError::not_found("Class"));
            }
            let a = assignments::create(
                conn,
                class_id,
                &title,
                req.description.as_deref(),
                req.due_date.as_deref(),
                &req.questions,
            )?;
            let count = assignments::question_count(conn, a.id)?;
            Ok((a, count))
        })
        .await?;
    tracing::info!(assignment_id = assignment.id, question_count, "assignment created");
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "assignment": {
            "id": assignment.id,
            "class_id": assignment.class_id,
            "title": assignment.title,
            "question_count": question_count,
        }
    })))
}
