//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to
//! [`Dashboard`](crate::dashboard::Dashboard) for the view itself.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Local;

use super::dto::{
    DirectionsResponse, HealthResponse, LinesResponse, OverviewResponse, SlotsResponse,
    StationsResponse, ViewQuery,
};
use super::error::AppError;
use super::extract::ApiQuery;
use super::state::AppState;
use crate::analysis::{HeatmapMatrix, StationProfile};
use crate::dashboard::{CompareView, RankingView};
use crate::output::{ranking_csv_string, ranking_file_name};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health & catalog
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let table = state.dashboard.table();
    Json(HealthResponse {
        status: "ok".to_string(),
        observations: table.len(),
        stations: table.station_count(),
        lines: table.lines().len(),
    })
}

/// GET /v1/lines
pub async fn list_lines(State(state): State<AppState>) -> Json<LinesResponse> {
    Json(LinesResponse {
        lines: state.dashboard.table().lines(),
    })
}

/// GET /v1/lines/{line}/stations
pub async fn list_stations(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> HandlerResult<StationsResponse> {
    let stations = state.dashboard.table().stations(Some(&line));
    if stations.is_empty() {
        return Err(AppError::NotFound(format!("unknown line `{}`", line)));
    }
    Ok(Json(StationsResponse { line, stations }))
}

/// GET /v1/lines/{line}/directions
pub async fn list_directions(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> HandlerResult<DirectionsResponse> {
    let directions = state.dashboard.table().directions(Some(&line));
    if directions.is_empty() {
        return Err(AppError::NotFound(format!("unknown line `{}`", line)));
    }
    Ok(Json(DirectionsResponse { line, directions }))
}

/// GET /v1/slots
pub async fn list_slots(State(state): State<AppState>) -> Json<SlotsResponse> {
    let slots = state.dashboard.table().slots();
    Json(SlotsResponse {
        slots: slots.as_slice().to_vec(),
        canonical: slots.is_canonical(),
    })
}

// =============================================================================
// Views
// =============================================================================

/// GET /v1/ranking
pub async fn get_ranking(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> HandlerResult<RankingView> {
    let view = state.dashboard.ranking(&query.filter_params(), query.top_n)?;
    Ok(Json(view))
}

/// GET /v1/ranking.csv
///
/// Same ranking as `/v1/ranking`, as a CSV attachment.
pub async fn get_ranking_csv(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> Result<Response, AppError> {
    let view = state.dashboard.ranking(&query.filter_params(), query.top_n)?;
    let body = ranking_csv_string(&view.entries)?;
    let file_name = ranking_file_name(view.line.as_deref(), Local::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        body,
    )
        .into_response())
}

/// GET /v1/overview
pub async fn get_overview(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> HandlerResult<OverviewResponse> {
    let overview = state.dashboard.overview(&query.filter_params())?;
    Ok(Json(OverviewResponse { overview }))
}

/// GET /v1/heatmap
pub async fn get_heatmap(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> HandlerResult<HeatmapMatrix> {
    let matrix = state
        .dashboard
        .heatmap(&query.filter_params(), query.sort.as_deref(), query.limit)?;
    Ok(Json(matrix))
}

/// GET /v1/stations/{station}
pub async fn get_station(
    State(state): State<AppState>,
    Path(station): Path<String>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> HandlerResult<StationProfile> {
    state
        .dashboard
        .station(&query.filter_params(), &station)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no data for station `{}` under this filter", station)))
}

/// GET /v1/compare?stations=a,b,c
pub async fn get_compare(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> HandlerResult<CompareView> {
    let view = state
        .dashboard
        .compare(&query.filter_params(), &query.station_list())?;
    Ok(Json(view))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", ascii, encoded)
}
