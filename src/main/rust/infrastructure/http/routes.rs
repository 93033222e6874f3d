use std::convert::Infallible;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::application::services::SessionOrchestrator;
use crate::domain::entities::SessionSummary;
use crate::domain::errors::{DomainError, Result};
use crate::domain::value_objects::{AuthToken, CameraId, StreamQuality};
use crate::infrastructure::metrics::PrometheusReporter;

#[derive(Debug, Default, Deserialize)]
pub struct StartQuery {
    pub quality: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    success: bool,
    #[serde(flatten)]
    session: SessionSummary,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct StopResponse {
    success: bool,
    vid: String,
    stopped: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

/// Management API served to the media consumer
pub fn routes(
    orchestrator: Arc<SessionOrchestrator>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_orchestrator = warp::any().map(move || orchestrator.clone());

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_orchestrator.clone())
        .then(|orchestrator: Arc<SessionOrchestrator>| async move {
            warp::reply::json(&orchestrator.health().await)
        });

    let start = warp::path!("stream" / String)
        .and(warp::get())
        .and(warp::query::<StartQuery>())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_orchestrator.clone())
        .then(start_stream);

    let stop = warp::path!("stream" / String)
        .and(warp::delete())
        .and(with_orchestrator.clone())
        .then(stop_stream);

    let sessions = warp::path("sessions")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_orchestrator)
        .then(|orchestrator: Arc<SessionOrchestrator>| async move {
            warp::reply::json(&orchestrator.list_active().await)
        });

    let metrics = warp::path("metrics").and(warp::get()).map(|| {
        let body = PrometheusReporter::gather_metrics();
        warp::reply::with_header(body, "content-type", "text/plain; version=0.0.4; charset=utf-8")
    });

    // Liveness probe endpoint (minimal check - is the process running?)
    let liveness = warp::path("livez").map(|| warp::reply::with_status("OK", StatusCode::OK));

    health
        .or(start)
        .or(stop)
        .or(sessions)
        .or(metrics)
        .or(liveness)
        .recover(handle_rejection)
}

async fn start_stream(
    vid: String,
    query: StartQuery,
    authorization: Option<String>,
    orchestrator: Arc<SessionOrchestrator>,
) -> Response {
    let request = match parse_start_request(vid, query, authorization) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };
    let (vid, token, quality) = request;

    match orchestrator.start(vid, token, quality).await {
        Ok(session) => warp::reply::json(&StartResponse {
            success: true,
            session,
            message: "Camera is awake, stream ready",
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn stop_stream(vid: String, orchestrator: Arc<SessionOrchestrator>) -> Response {
    let vid = match CameraId::new(vid) {
        Ok(vid) => vid,
        Err(e) => return error_response(&e),
    };

    match orchestrator.stop(&vid).await {
        Ok(session) => warp::reply::json(&StopResponse {
            success: true,
            vid: session.vid.to_string(),
            stopped: true,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Quality defaults to high when absent; unknown values are refused.
/// The token comes from the query string or the Authorization header.
fn parse_start_request(
    vid: String,
    query: StartQuery,
    authorization: Option<String>,
) -> Result<(CameraId, AuthToken, StreamQuality)> {
    let vid = CameraId::new(vid)?;
    let quality = match query.quality.as_deref() {
        None => StreamQuality::High,
        Some(raw) => raw.parse()?,
    };
    let token = match (query.auth_token, authorization) {
        (Some(token), _) if !token.trim().is_empty() => AuthToken::new(token)?,
        (_, Some(header)) => AuthToken::from_authorization_header(&header)?,
        _ => return Err(DomainError::MissingAuthToken),
    };
    Ok((vid, token, quality))
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::MissingAuthToken => StatusCode::UNAUTHORIZED,
        DomainError::InvalidQuality(_) | DomainError::InvalidCameraId(_) => StatusCode::BAD_REQUEST,
        DomainError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::CameraBusy(_) => StatusCode::CONFLICT,
        DomainError::WakeFailed { .. } | DomainError::AddressUnresolved { .. } => {
            StatusCode::BAD_GATEWAY
        }
        DomainError::ReadinessTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &DomainError) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        code: error.code(),
    };
    warp::reply::with_status(warp::reply::json(&body), status_for(error)).into_response()
}

async fn handle_rejection(rejection: Rejection) -> std::result::Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };

    let body = ErrorResponse {
        error: message,
        code: "http_error",
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}
