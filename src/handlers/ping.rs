use axum::Json;
use crate::models::PingResponse;

pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse { success: true })
}
