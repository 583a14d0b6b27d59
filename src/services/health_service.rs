use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: ServingStatus,
}

/// Liveness probe. Answers as long as the process can serve HTTP.
pub async fn check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: ServingStatus::Serving,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_reports_serving() {
        let Json(response) = check().await;
        assert_eq!(response.status, ServingStatus::Serving);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "status": "SERVING" })
        );
    }
}
