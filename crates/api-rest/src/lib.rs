//! # API REST
//!
//! REST API implementation for ZahaniFlow.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, API-key checks)
//!
//! Uses `api-shared` for request/response bodies and `zahani-core` for every workflow decision.
//! Handlers only translate between HTTP and the core service.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    validate_api_key, ErrorRes, HealthRes, HealthService, ListSectionsRes, OverviewRes,
    PatientContextReq, ProgressRes, SectionInfo, SubmitSectionReq, SubmitSectionRes,
    ValidateSectionReq, ValidateSectionRes, VisibleSectionsRes, API_KEY_HEADER,
};
use zahani_core::apoc::{sections, validate_section as run_validation, visible_sections, SectionId};
use zahani_core::{CaseId, WorkflowError, WorkflowService};

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state for the REST API server
///
/// Holds the workflow service and, when authentication is enabled, the expected API key.
#[derive(Clone)]
pub struct AppState {
    workflow_service: WorkflowService,
    api_key: Option<Arc<str>>,
}

impl AppState {
    /// Creates the shared state. `api_key` of `None` leaves every route open.
    pub fn new(workflow_service: WorkflowService, api_key: Option<String>) -> Self {
        Self {
            workflow_service,
            api_key: api_key.map(Arc::from),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_sections,
        list_visible_sections,
        validate_section,
        start_workflow,
        get_progress,
        workflow_overview,
        submit_section,
    ),
    components(schemas(
        HealthRes,
        SectionInfo,
        ListSectionsRes,
        PatientContextReq,
        VisibleSectionsRes,
        ValidateSectionReq,
        ValidateSectionRes,
        SubmitSectionReq,
        SubmitSectionRes,
        ProgressRes,
        OverviewRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and CORS.
///
/// `/health` and the documentation routes are always open; every workflow route sits behind the
/// API-key check.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/sections", get(list_sections))
        .route("/sections/visible", post(list_visible_sections))
        .route("/sections/:section_id/validate", post(validate_section))
        .route("/workflows/:case_id", post(start_workflow).get(get_progress))
        .route("/workflows/:case_id/overview", post(workflow_overview))
        .route(
            "/workflows/:case_id/sections/:section_id",
            post(submit_section),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.api_key.as_deref() {
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if let Err(e) = validate_api_key(provided, expected) {
            tracing::warn!("rejected request to {}: {}", req.uri().path(), e);
            return Err((StatusCode::UNAUTHORIZED, Json(ErrorRes::new(e.to_string()))));
        }
    }
    Ok(next.run(req).await)
}

/// Maps a core error onto an HTTP status and body.
///
/// Storage failures are logged and reported without detail.
fn error_response(err: WorkflowError) -> ApiError {
    let status = match &err {
        WorkflowError::InvalidInput(_)
        | WorkflowError::UnknownSection(_)
        | WorkflowError::InvalidCaseId(_) => StatusCode::BAD_REQUEST,
        WorkflowError::WorkflowNotFound(_) => StatusCode::NOT_FOUND,
        WorkflowError::SectionNotVisible(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::StorageDirCreation(_)
        | WorkflowError::FileWrite(_)
        | WorkflowError::FileRead(_)
        | WorkflowError::YamlSerialization(_)
        | WorkflowError::YamlDeserialization(_)
        | WorkflowError::StoreLock => {
            tracing::error!("workflow store error: {:?}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes::new("Internal error")),
            );
        }
    };
    (status, Json(ErrorRes::new(err.to_string())))
}

fn parse_case_id(raw: &str) -> Result<CaseId, ApiError> {
    CaseId::parse(raw).map_err(|e| error_response(e.into()))
}

fn parse_section_id(raw: &str) -> Result<SectionId, ApiError> {
    raw.parse::<SectionId>().map_err(error_response)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Never requires an API key.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/sections",
    responses(
        (status = 200, description = "Every section in workflow order", body = ListSectionsRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes)
    )
)]
/// Lists the full section registry, conditional sections included.
#[axum::debug_handler]
async fn list_sections(State(_state): State<AppState>) -> Json<ListSectionsRes> {
    Json(ListSectionsRes {
        sections: sections().iter().map(SectionInfo::from).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/sections/visible",
    request_body = PatientContextReq,
    responses(
        (status = 200, description = "Sections that apply to the patient and case", body = VisibleSectionsRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes)
    )
)]
/// Resolves which sections apply to a patient and case.
#[axum::debug_handler]
async fn list_visible_sections(
    State(_state): State<AppState>,
    Json(req): Json<PatientContextReq>,
) -> Json<VisibleSectionsRes> {
    let sections = visible_sections(&req.patient, &req.case)
        .into_iter()
        .map(SectionInfo::from)
        .collect();
    Json(VisibleSectionsRes { sections })
}

#[utoipa::path(
    post,
    path = "/sections/{section_id}/validate",
    params(("section_id" = String, Path, description = "Section identifier, e.g. vital_signs")),
    request_body = ValidateSectionReq,
    responses(
        (status = 200, description = "Validation outcome; failures are reported in the body", body = ValidateSectionRes),
        (status = 400, description = "Unknown section", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes)
    )
)]
/// Validates a section payload without recording anything.
#[axum::debug_handler]
async fn validate_section(
    State(_state): State<AppState>,
    Path(section_id): Path<String>,
    Json(req): Json<ValidateSectionReq>,
) -> Result<Json<ValidateSectionRes>, ApiError> {
    let section = parse_section_id(&section_id)?;
    Ok(Json(run_validation(section, &req.data).into()))
}

#[utoipa::path(
    post,
    path = "/workflows/{case_id}",
    params(("case_id" = String, Path, description = "Case identifier (32 lowercase hex)")),
    responses(
        (status = 200, description = "Workflow started, or the existing progress", body = ProgressRes),
        (status = 400, description = "Invalid case id", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Starts the documentation workflow for a case. Starting twice returns the existing progress.
#[axum::debug_handler]
async fn start_workflow(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<ProgressRes>, ApiError> {
    let case_id = parse_case_id(&case_id)?;
    let progress = state
        .workflow_service
        .start(&case_id)
        .map_err(error_response)?;
    Ok(Json(ProgressRes::new(&case_id, progress)))
}

#[utoipa::path(
    get,
    path = "/workflows/{case_id}",
    params(("case_id" = String, Path, description = "Case identifier (32 lowercase hex)")),
    responses(
        (status = 200, description = "Stored progress", body = ProgressRes),
        (status = 400, description = "Invalid case id", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 404, description = "Workflow not started", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Returns the stored progress record for a case.
#[axum::debug_handler]
async fn get_progress(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<ProgressRes>, ApiError> {
    let case_id = parse_case_id(&case_id)?;
    let progress = state
        .workflow_service
        .progress(&case_id)
        .map_err(error_response)?;
    Ok(Json(ProgressRes::new(&case_id, progress)))
}

#[utoipa::path(
    post,
    path = "/workflows/{case_id}/overview",
    params(("case_id" = String, Path, description = "Case identifier (32 lowercase hex)")),
    request_body = PatientContextReq,
    responses(
        (status = 200, description = "Progress indicator data", body = OverviewRes),
        (status = 400, description = "Invalid case id", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 404, description = "Workflow not started", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Computes progress indicator data for a case as seen for the given patient and case.
#[axum::debug_handler]
async fn workflow_overview(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(req): Json<PatientContextReq>,
) -> Result<Json<OverviewRes>, ApiError> {
    let case_id = parse_case_id(&case_id)?;
    let overview = state
        .workflow_service
        .overview(&case_id, &req.patient, &req.case)
        .map_err(error_response)?;
    Ok(Json(OverviewRes { overview }))
}

#[utoipa::path(
    post,
    path = "/workflows/{case_id}/sections/{section_id}",
    params(
        ("case_id" = String, Path, description = "Case identifier (32 lowercase hex)"),
        ("section_id" = String, Path, description = "Section identifier, e.g. vital_signs")
    ),
    request_body = SubmitSectionReq,
    responses(
        (status = 200, description = "Submission outcome; rejected payloads leave progress unchanged", body = SubmitSectionRes),
        (status = 400, description = "Invalid case or section id", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 404, description = "Workflow not started", body = ErrorRes),
        (status = 422, description = "Section does not apply to this patient and case", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Validates a section and, if valid, records it as completed.
#[axum::debug_handler]
async fn submit_section(
    State(state): State<AppState>,
    Path((case_id, section_id)): Path<(String, String)>,
    Json(req): Json<SubmitSectionReq>,
) -> Result<Json<SubmitSectionRes>, ApiError> {
    let case_id = parse_case_id(&case_id)?;
    let section = parse_section_id(&section_id)?;
    let outcome = state
        .workflow_service
        .submit_section(&case_id, section, &req.data, &req.patient, &req.case)
        .map_err(error_response)?;
    Ok(Json(outcome.into()))
}
