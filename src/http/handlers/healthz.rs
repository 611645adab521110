use axum::Json;

use crate::model::todo::HealthzResponse;

pub async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse {
        message: "OK".to_string(),
    })
}
