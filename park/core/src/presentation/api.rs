// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP API
//!
//! Every response carries the same envelope:
//!
//! - success: HTTP 200, `{"statusCode": 200, "data": ...}`
//! - failure: HTTP 400, `{"statusCode": 400, "error": "..."}`
//!
//! Lookup misses, validation failures, malformed ids and unreadable bodies
//! all use the failure form.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::application::{
    CageService, CreateCageRequest, CreateSpeciesRequest, ParkError, SpeciesService,
    UpdateCageRequest, UpdateSpeciesRequest,
};
use crate::domain::cage::{Cage, CageId, CageStatus, CageWithSpecies};
use crate::domain::species::{Species, SpeciesId};

pub struct AppState {
    pub cage_service: Arc<dyn CageService>,
    pub species_service: Arc<dyn SpeciesService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(cage_service: Arc<dyn CageService>, species_service: Arc<dyn SpeciesService>) -> Self {
        Self {
            cage_service,
            species_service,
            start_time: Instant::now(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/species", get(list_species).post(create_species))
        // GET matches by name; PATCH and DELETE address a single row by id
        .route(
            "/species/{key}",
            get(find_species).patch(update_species).delete(delete_species),
        )
        .route("/cages", get(list_cages).post(create_cage))
        .route("/cages/{status}", get(list_cages_by_status))
        .route("/cage/{id}", get(get_cage).patch(update_cage).delete(delete_cage))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status_code: u16,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub error: String,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        status_code: StatusCode::OK.as_u16(),
        data,
    })
}

/// Any failure, rendered as the 400 envelope
#[derive(Debug)]
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            status_code: StatusCode::BAD_REQUEST.as_u16(),
            error: self.0,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<ParkError> for ApiError {
    fn from(err: ParkError) -> Self {
        match &err {
            ParkError::Store(inner) if !err.is_not_found() => error!("Store failure: {}", inner),
            _ => warn!("Request rejected: {}", err),
        }
        ApiError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!("Rejected path: {}", rejection.body_text());
        ApiError(rejection.body_text())
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

fn parse_species_id(raw: &str) -> Result<SpeciesId, ApiError> {
    raw.parse::<i64>()
        .map(SpeciesId)
        .map_err(|_| ApiError(format!("Invalid species id: {}", raw)))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn list_species(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Species>> {
    Ok(ok(state.species_service.list_species().await?))
}

async fn find_species(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Vec<Species>> {
    Ok(ok(state.species_service.find_species_by_name(&name).await?))
}

async fn create_species(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSpeciesRequest>, JsonRejection>,
) -> ApiResult<Species> {
    let Json(request) = payload?;
    Ok(ok(state.species_service.create_species(request).await?))
}

async fn update_species(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    payload: Result<Json<UpdateSpeciesRequest>, JsonRejection>,
) -> ApiResult<Species> {
    let id = parse_species_id(&key)?;
    let Json(request) = payload?;
    Ok(ok(state.species_service.update_species(id, request).await?))
}

async fn delete_species(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> ApiResult<bool> {
    let id = parse_species_id(&key)?;
    state.species_service.delete_species(id).await?;
    Ok(ok(true))
}

async fn list_cages(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Cage>> {
    Ok(ok(state.cage_service.list_cages().await?))
}

async fn list_cages_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> ApiResult<Vec<Cage>> {
    let status = status
        .parse::<CageStatus>()
        .map_err(|e| ApiError::from(ParkError::from(e)))?;
    Ok(ok(state.cage_service.list_cages_by_status(status).await?))
}

async fn create_cage(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCageRequest>, JsonRejection>,
) -> ApiResult<CageWithSpecies> {
    let Json(request) = payload?;
    Ok(ok(state.cage_service.create_cage(request).await?))
}

async fn get_cage(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<CageWithSpecies> {
    let Path(id) = id?;
    Ok(ok(state.cage_service.get_cage(CageId(id)).await?))
}

async fn update_cage(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCageRequest>, JsonRejection>,
) -> ApiResult<Cage> {
    let Path(id) = id?;
    let Json(request) = payload?;
    Ok(ok(state.cage_service.update_cage(CageId(id), request).await?))
}

async fn delete_cage(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<bool> {
    let Path(id) = id?;
    state.cage_service.delete_cage(CageId(id)).await?;
    Ok(ok(true))
}
