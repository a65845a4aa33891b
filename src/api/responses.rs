use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingRouteData,
    NoData,
    UpstreamUnavailable,
    WeatherDisabled,
    InternalError,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub weather_enabled: bool,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_response_uses_screaming_snake_case_code() {
        let response = ErrorResponse {
            error_code: ErrorCode::MissingRouteData,
            error_message: "route data has no usable duration".to_string(),
            timestamp: "2026-10-19T12:32:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize error response");
        assert_eq!(
            value,
            json!({
                "errorCode": "MISSING_ROUTE_DATA",
                "errorMessage": "route data has no usable duration",
                "timestamp": "2026-10-19T12:32:00Z"
            })
        );
    }

    #[test]
    fn health_response_serializes_status() {
        let response = HealthResponse {
            status: HealthStatus::Ok,
            weather_enabled: false,
            timestamp: "2026-10-19T12:33:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize health response");
        assert_eq!(
            value,
            json!({
                "status": "ok",
                "weatherEnabled": false,
                "timestamp": "2026-10-19T12:33:00Z"
            })
        );
    }
}
