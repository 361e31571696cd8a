//! Liveness and readiness probes

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::Readiness;
use crate::service::AnalysisService;

#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessReport {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessReport {
    pub ready: bool,
    pub version: String,
    pub dependencies: Readiness,
}

/// Liveness probe: 200 whenever the process is serving
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Process is serving", body = LivenessReport)),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(LivenessReport {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe: 503 until the version store answers a read of
/// `analysis_versions`. The cache is reported but never gates readiness.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Analyses can be stored and served", body = ReadinessReport),
        (status = 503, description = "Version store unreachable", body = ReadinessReport)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(service: web::Data<AnalysisService>) -> HttpResponse {
    let dependencies = service.readiness().await;
    let report = ReadinessReport {
        ready: dependencies.is_ready(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies,
    };

    if report.ready {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}
