use crate::error::ApiError;

pub async fn metrics_handler() -> Result<String, ApiError> {
    crate::metrics::render().map_err(ApiError::Internal)
}
