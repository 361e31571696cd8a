//! REST API endpoints for case analyses

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use utoipa::OpenApi;

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{
    AnalysisDelta, AnalysisVersion, AnalysisVersionSummary, CaseMomentum, CorrespondenceTimeline,
    DeltaReport, DimensionResult, EvidenceStrengthResult, MomentumAssessment,
};
use crate::service::AnalysisService;

/// Longest case id the version table accepts
const MAX_CASE_ID_LEN: usize = 64;

fn validate_case_id(id: &str) -> Result<String, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_CASE_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "case id must be 1 to {} characters",
            MAX_CASE_ID_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Run a new analysis of a case
#[utoipa::path(
    post,
    path = "/v1/cases/{case_id}/analyses",
    params(("case_id" = String, Path, description = "Case identifier")),
    responses(
        (status = 201, description = "Analysis created", body = AnalysisVersion),
        (status = 400, description = "Invalid case id", body = ErrorResponse),
        (status = 503, description = "Version number could not be assigned", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[post("/v1/cases/{case_id}/analyses")]
pub async fn create_analysis(
    service: web::Data<AnalysisService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let case_id = validate_case_id(&path.into_inner())?;
    let version = service.analyze_case(&case_id, Utc::now()).await?;
    Ok(HttpResponse::Created().json(version))
}

/// List the analysis versions of a case, newest first
#[utoipa::path(
    get,
    path = "/v1/cases/{case_id}/analyses",
    params(("case_id" = String, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Version summaries", body = Vec<AnalysisVersionSummary>),
        (status = 400, description = "Invalid case id", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[get("/v1/cases/{case_id}/analyses")]
pub async fn list_analyses(
    service: web::Data<AnalysisService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let case_id = validate_case_id(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(service.list_versions(&case_id).await?))
}

/// Latest analysis version of a case
#[utoipa::path(
    get,
    path = "/v1/cases/{case_id}/analyses/latest",
    params(("case_id" = String, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Latest version", body = AnalysisVersion),
        (status = 404, description = "Case has not been analysed", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[get("/v1/cases/{case_id}/analyses/latest")]
pub async fn latest_analysis(
    service: web::Data<AnalysisService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let case_id = validate_case_id(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(service.latest(&case_id).await?))
}

/// A specific analysis version
#[utoipa::path(
    get,
    path = "/v1/cases/{case_id}/analyses/{version}",
    params(
        ("case_id" = String, Path, description = "Case identifier"),
        ("version" = i32, Path, description = "Version number, starting at 1")
    ),
    responses(
        (status = 200, description = "Analysis version", body = AnalysisVersion),
        (status = 404, description = "Version not found", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[get("/v1/cases/{case_id}/analyses/{version}")]
pub async fn get_analysis(
    service: web::Data<AnalysisService>,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, ApiError> {
    let (case_id, version) = path.into_inner();
    let case_id = validate_case_id(&case_id)?;
    if version < 1 {
        return Err(ApiError::BadRequest("version numbers start at 1".to_string()));
    }
    Ok(HttpResponse::Ok().json(service.get_version(&case_id, version).await?))
}

/// Correspondence timeline and opponent activity of a case
#[utoipa::path(
    get,
    path = "/v1/cases/{case_id}/correspondence",
    params(("case_id" = String, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Correspondence timeline", body = CorrespondenceTimeline),
        (status = 400, description = "Invalid case id", body = ErrorResponse)
    ),
    tag = "correspondence"
)]
#[get("/v1/cases/{case_id}/correspondence")]
pub async fn get_correspondence(
    service: web::Data<AnalysisService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let case_id = validate_case_id(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(service.correspondence(&case_id, Utc::now()).await))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Case Momentum API",
        description = "Evidence scoring, case momentum and versioned analysis deltas"
    ),
    paths(
        create_analysis,
        list_analyses,
        latest_analysis,
        get_analysis,
        get_correspondence,
        crate::api::health::liveness,
        crate::api::health::readiness
    ),
    components(schemas(
        AnalysisVersion,
        AnalysisVersionSummary,
        AnalysisDelta,
        DeltaReport,
        CaseMomentum,
        MomentumAssessment,
        DimensionResult,
        EvidenceStrengthResult,
        CorrespondenceTimeline,
        ErrorResponse
    )),
    tags(
        (name = "analyses", description = "Versioned case analyses"),
        (name = "correspondence", description = "Correspondence timeline"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Configure analysis routes. `latest` is registered before `{version}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_analysis)
        .service(list_analyses)
        .service(latest_analysis)
        .service(get_analysis)
        .service(get_correspondence);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_bounds() {
        assert_eq!(validate_case_id("  case-7 ").unwrap(), "case-7");
        assert!(matches!(validate_case_id("   "), Err(ApiError::BadRequest(_))));
        assert!(validate_case_id(&"x".repeat(MAX_CASE_ID_LEN)).is_ok());
        assert!(validate_case_id(&"x".repeat(MAX_CASE_ID_LEN + 1)).is_err());
    }
}
