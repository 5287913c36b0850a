use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use viralscout_pipeline::{
    AnalyzeRequest, AnalyzeResponse, ArchiveRequest, ArchiveResponse, DiscoverRequest,
    DiscoverResponse, EnrichRequest, EnrichResponse,
};

use crate::middleware::RequestId;

use super::{json_body, map_pipeline_error, ApiError, ApiResponse, AppState};

type StageResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(super) async fn discover_and_save_creators(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<DiscoverRequest>, JsonRejection>,
) -> StageResult<DiscoverResponse> {
    let body = json_body(&req_id.0, payload)?;
    tracing::info!(request_id = %req_id.0, terms = body.search_terms.len(), "discover request");

    let data = viralscout_pipeline::discover_creators(&state.services, &body)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn update_follower_counts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<EnrichRequest>, JsonRejection>,
) -> StageResult<EnrichResponse> {
    let body = json_body(&req_id.0, payload)?;
    tracing::info!(request_id = %req_id.0, sheet = %body.sheet_name, "enrich request");

    let data = viralscout_pipeline::update_follower_counts(&state.services, &body)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn analyze_and_generate_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> StageResult<AnalyzeResponse> {
    let body = json_body(&req_id.0, payload)?;
    tracing::info!(request_id = %req_id.0, sheet = %body.sheet_name, "analyze request");

    let data = viralscout_pipeline::analyze_and_report(&state.services, &body)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn download_videos_to_drive(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ArchiveRequest>, JsonRejection>,
) -> StageResult<ArchiveResponse> {
    let body = json_body(&req_id.0, payload)?;
    tracing::info!(request_id = %req_id.0, videos = body.video_ids.len(), "archive request");

    let data = viralscout_pipeline::archive_videos(&state.services, &body)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
