use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use super::{
    error::ApiError,
    models::{PARSE_OK, ParseBody, SAVE_OK, SaveBody},
    state::AppState,
    utils::{parse_json_object, read_body},
    validation::{validate_parse_request, validate_save_request},
};

/// Work dispatch endpoint (POST /parse)
///
/// ## Flow:
/// 1. Validate `urls` (non-empty string array) and `bundle`
/// 2. Reject the bundle if `saved/<bundle>` exists or it is mid-dispatch
/// 3. Re-read `servers.json` and `sessions.json`
/// 4. Partition `urls` across the roster and POST every share concurrently
/// 5. Respond 200 once every send has been attempted
///
/// Individual worker failures are only logged; the caller learns that the
/// requests were sent, not whether they succeeded.
pub async fn parse(
    State(state): State<AppState>,
    body: axum::body::Body,
) -> Result<impl IntoResponse, ApiError> {
    let result = dispatch_bundle(&state, body).await;
    if result.is_err() {
        state.metrics.dispatch_rejected();
    }
    result
}

async fn dispatch_bundle(
    state: &AppState,
    body: axum::body::Body,
) -> Result<(StatusCode, &'static str), ApiError> {
    let data = read_body(body, state.config.server.max_payload_bytes).await?;
    let request = validate_parse_request(parse_json_object::<ParseBody>(&data)?)?;

    let _claim = state
        .claims
        .claim(&request.bundle)
        .ok_or_else(|| ApiError::DuplicateBundle(request.bundle.clone()))?;

    if state.sink.bundle_exists(&request.bundle).await? {
        return Err(ApiError::DuplicateBundle(request.bundle));
    }

    let report = state
        .dispatcher
        .dispatch_from_files(&state.config.roster, &request.urls, &request.bundle)
        .await?;

    state.metrics.dispatch_accepted();
    state
        .metrics
        .tasks_delivered(report.attempted, report.failed());

    info!(
        dispatch_id = %report.dispatch_id,
        bundle = %request.bundle,
        attempted = report.attempted,
        "Requests sent"
    );

    Ok((StatusCode::OK, PARSE_OK))
}

/// Result write-back endpoint (POST /{bundle}/save)
///
/// Stores `jsonData` as `saved/<bundle>/<caller-ip>.json`, replacing any
/// earlier result from the same caller.
pub async fn save_result(
    State(state): State<AppState>,
    Path(bundle): Path<String>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    body: axum::body::Body,
) -> Result<impl IntoResponse, ApiError> {
    let ip = remote.ip();
    info!(%ip, bundle = %bundle, "Handling save request");

    let data = read_body(body, state.config.server.max_payload_bytes).await?;
    let payload = validate_save_request(&bundle, parse_json_object::<SaveBody>(&data)?)?;

    state.sink.save(&bundle, ip, &payload).await?;
    state.metrics.result_saved();

    Ok((StatusCode::OK, SAVE_OK))
}

/// Liveness check (GET /health)
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
