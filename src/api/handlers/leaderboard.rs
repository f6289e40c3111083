use crate::error::ApiError;
use crate::store::{classes, settings, submissions, Db};
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Leaderboard for a class code, or the all-time board when the code is
/// `global`. Truncated to `game.leaderboard_size`.
pub async fn get(db: web::Data<Db>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner().trim().to_uppercase();
    let payload = db
        .call(move |conn| {
            settings::api_guard(conn)?;
            let limit = settings::get_i64(conn, "game.leaderboard_size", 10)?.max(1);
            if code.eq_ignore_ascii_case("global") {
                let entries = submissions::global_leaderboard(conn, limit)?;
                return Ok(json!({"scope": "global", "entries": entries}));
            }
            let class =
                classes::find_by_code(conn, &code)?.ok_or_else(|| ApiError::not_found("Class"))?;
            let entries = submissions::class_leaderboard(conn, class.id, limit)?;
            Ok(json!({
                "scope": "class",
                "class": {"id": class.id, "name": class.name, "class_code": class.class_code},
                "entries": entries,
            }))
        })
        .await?;
    Ok(HttpResponse::Ok().json(payload))
}
