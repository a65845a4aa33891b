use crate::api::requests::{AssessmentRequest, CoordinatesQuery};
use crate::api::responses::{ErrorCode, ErrorResponse, HealthResponse, HealthStatus};
use crate::error::AppError;
use crate::prediction::{AdvisoryModel, TripMetrics, fallback};
use crate::state::AppState;
use crate::weather::source::CachedWeather;
use crate::weather::{Coordinates, LiveWeather, WeatherError, WeatherObservation, WeeklyForecast};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, warn};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

type SharedState = Arc<RwLock<AppState>>;

#[derive(Debug)]
enum TimestampError {
    Format(time::error::Format),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Format(err) => write!(f, "timestamp format error: {err}"),
        }
    }
}

pub enum ApiResponse<T> {
    Success(T),
    Error {
        status: StatusCode,
        body: ErrorResponse,
    },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<SharedState>) -> impl IntoResponse {
    build_health_response(&state, SystemTime::now())
}

pub async fn post_assessment(
    State(state): State<SharedState>,
    Json(request): Json<AssessmentRequest>,
) -> impl IntoResponse {
    assess(&state, request, SystemTime::now()).await
}

/// A missing route is answered by the fallback before any weather lookup.
async fn assess(
    state: &SharedState,
    request: AssessmentRequest,
    now: SystemTime,
) -> ApiResponse<AdvisoryModel> {
    let weather = match request.route {
        Some(_) => resolve_weather(state, &request).await,
        None => None,
    };
    build_assessment_response(state, request, weather, now)
}

pub async fn get_latest(State(state): State<SharedState>) -> impl IntoResponse {
    build_latest_response(&state, SystemTime::now())
}

pub async fn get_live_weather(
    State(state): State<SharedState>,
    Query(query): Query<CoordinatesQuery>,
) -> impl IntoResponse {
    let coordinates = Coordinates::from(query);
    let result = match weather_handle(&state) {
        Ok(weather) => run_blocking(move || weather.live(coordinates))
            .await
            .map(|current| LiveWeather { current }),
        Err(err) => Err(err),
    };
    build_weather_response(result, SystemTime::now())
}

pub async fn get_weekly_weather(
    State(state): State<SharedState>,
    Query(query): Query<CoordinatesQuery>,
) -> impl IntoResponse {
    let coordinates = Coordinates::from(query);
    let result: Result<WeeklyForecast, WeatherError> = match weather_handle(&state) {
        Ok(weather) => run_blocking(move || weather.weekly(coordinates)).await,
        Err(err) => Err(err),
    };
    build_weather_response(result, SystemTime::now())
}

fn weather_handle(state: &SharedState) -> Result<CachedWeather, WeatherError> {
    let guard = state.read().map_err(|_| AppError::StateLock)?;
    guard.weather().cloned().ok_or(WeatherError::Disabled)
}

async fn run_blocking<T, F>(task: F) -> Result<T, WeatherError>
where
    F: FnOnce() -> Result<T, WeatherError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| WeatherError::Task(err.to_string()))?
}

/// Weather supplied by the caller wins; otherwise the origin's live weather
/// is looked up. Lookup failures degrade to "no weather".
async fn resolve_weather(
    state: &SharedState,
    request: &AssessmentRequest,
) -> Option<WeatherObservation> {
    if let Some(observation) = request.weather.as_ref() {
        return Some(observation.clone());
    }
    let origin = request.origin?;
    let weather = match weather_handle(state) {
        Ok(weather) => weather,
        Err(WeatherError::Disabled) => return None,
        Err(err) => {
            warn!(error = %err, "Weather lookup unavailable");
            return None;
        }
    };
    match run_blocking(move || weather.live(origin)).await {
        Ok(observation) => Some(observation),
        Err(err) => {
            warn!(error = %err, "Continuing assessment without weather");
            None
        }
    }
}

fn build_assessment_response(
    state: &SharedState,
    request: AssessmentRequest,
    weather: Option<WeatherObservation>,
    now: SystemTime,
) -> ApiResponse<AdvisoryModel> {
    let assembler = match state.read() {
        Ok(guard) => guard.assembler().clone(),
        Err(_) => {
            return internal_error("state lock poisoned while reading assembler");
        }
    };

    let advisory = match request.route {
        Some(leg) => {
            let metrics = TripMetrics::from_leg(&leg, request.mode, request.departure);
            match assembler.assemble(&metrics, weather.as_ref()) {
                Ok(advisory) => advisory,
                Err(err) => {
                    return error_response(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        ErrorCode::MissingRouteData,
                        &err.to_string(),
                        now,
                    );
                }
            }
        }
        None => {
            warn!(mode = ?request.mode, "Route data unavailable, using fallback advisory");
            fallback::synthesize(request.mode, request.departure)
        }
    };

    match state.write() {
        Ok(mut guard) => {
            if let Err(err) = guard.set_latest(advisory.clone()) {
                debug!(error = %err, "No subscribers for latest advisory");
            }
        }
        Err(_) => {
            return internal_error("state lock poisoned while storing advisory");
        }
    }

    ApiResponse::Success(advisory)
}

fn build_latest_response(state: &SharedState, now: SystemTime) -> ApiResponse<AdvisoryModel> {
    let latest = match state.read() {
        Ok(guard) => guard.latest().cloned(),
        Err(_) => {
            return internal_error("state lock poisoned while reading latest advisory");
        }
    };

    match latest {
        Some(advisory) => ApiResponse::Success(advisory),
        None => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::NoData,
            "No advisory available yet",
            now,
        ),
    }
}

fn build_weather_response<T>(result: Result<T, WeatherError>, now: SystemTime) -> ApiResponse<T> {
    match result {
        Ok(body) => ApiResponse::Success(body),
        Err(WeatherError::Disabled) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::WeatherDisabled,
            "Weather lookups are disabled",
            now,
        ),
        Err(WeatherError::Cache(err)) => internal_error(&err.to_string()),
        Err(err) => {
            warn!(error = %err, "Weather upstream unavailable");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::UpstreamUnavailable,
                "Weather service unavailable",
                now,
            )
        }
    }
}

fn build_health_response(state: &SharedState, now: SystemTime) -> ApiResponse<HealthResponse> {
    let weather_enabled = match state.read() {
        Ok(guard) => guard.weather().is_some(),
        Err(_) => {
            return internal_error("state lock poisoned while reading health");
        }
    };

    match format_timestamp(now) {
        Ok(timestamp) => ApiResponse::Success(HealthResponse {
            status: HealthStatus::Ok,
            weather_enabled,
            timestamp,
        }),
        Err(_) => internal_error("timestamp formatting failure"),
    }
}

fn error_response<T>(
    status: StatusCode,
    error_code: ErrorCode,
    message: &str,
    now: SystemTime,
) -> ApiResponse<T> {
    match format_timestamp(now) {
        Ok(timestamp) => ApiResponse::Error {
            status,
            body: ErrorResponse {
                error_code,
                error_message: message.to_string(),
                timestamp,
            },
        },
        Err(_) => internal_error("timestamp formatting failure"),
    }
}

fn internal_error<T>(message: &str) -> ApiResponse<T> {
    error!(message = message, "Internal error while handling request");
    let formatted = format_timestamp(SystemTime::now()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format internal error timestamp");
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    });
    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error_code: ErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: formatted,
        },
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, TimestampError> {
    let datetime = OffsetDateTime::from(timestamp);
    datetime.format(&Rfc3339).map_err(TimestampError::Format)
}
