use crate::error::ApiError;
use crate::store::{settings, Db};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub key: String,
    pub value: String,
}

pub async fn get(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    let map = db.call(settings::settings_map).await?;
    Ok(HttpResponse::Ok().json(json!({"settings": map})))
}

pub async fn update(
    db: web::Data<Db>,
    body: web::Json<UpdateSettingRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let key = req.key.trim().to_string();
    if !settings::is_known_key(&key) {
        return Err(ApiError::BadRequest(format!("Unknown setting: {key}")));
    }
    let map = db
        .call(move |conn| {
            settings::set_setting(conn, &key, req.value.trim())?;
            settings::settings_map(conn)
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({"status": "success", "settings": map})))
}
