use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Serialize, JsonSchema)]
pub struct Health {
    pub status: String,
    pub service: String,
}

pub async fn health_handler() -> Json<Health> {
    Json(Health {
        status: String::from("ok"),
        service: String::from("courier"),
    })
}
