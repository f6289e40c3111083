use crate::error::ApiError;
use crate::store::{students, Db};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct NavigationEvent {
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Fire-and-forget navigation telemetry from the game. Never fails the
/// client; a known student gets their `last_active` bumped.
pub async fn navigation(
    db: web::Data<Db>,
    body: web::Json<NavigationEvent>,
) -> Result<HttpResponse, ApiError> {
    let event = body.into_inner();
    tracing::info!(
        student_id = event.student_id,
        screen = event.screen.as_deref().unwrap_or("-"),
        action = event.action.as_deref().unwrap_or("-"),
        "navigation event"
    );
    if let Some(student_id) = event.student_id {
        let _ = db
            .call(move |conn| {
                if students::get(conn, student_id)?.is_some() {
                    students::touch_last_active(conn, student_id)?;
                }
                Ok(())
            })
            .await;
    }
    Ok(HttpResponse::Ok().json(json!({"status": "logged"})))
}
