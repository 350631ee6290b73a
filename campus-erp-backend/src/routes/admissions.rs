use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use campus_erp_ledger::admission::{Admission, AdmissionApplication, AdmissionStatus, Decision};
use campus_erp_ledger::{AdmissionId, AdmissionLedger, CampusStore};
use http::StatusCode;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Deserialize)]
pub struct AdmissionFilter {
    pub status: Option<String>,
}

pub async fn list<S: CampusStore>(
    State(ledger): State<AdmissionLedger<S>>,
    query: Result<Query<AdmissionFilter>, QueryRejection>,
) -> Result<Json<Vec<Admission>>, AppError> {
    let Query(filter) = query?;
    let status = match filter.status {
        Some(status) => match AdmissionStatus::parse(&status) {
            Some(parsed) => Some(parsed),
            None => return Err(AppError::UnknownStatus(status)),
        },
        None => None,
    };
    Ok(Json(ledger.list(status).await?))
}

pub async fn submit<S: CampusStore>(
    State(ledger): State<AdmissionLedger<S>>,
    payload: Result<Json<AdmissionApplication>, JsonRejection>,
) -> Result<(StatusCode, Json<Admission>), AppError> {
    let Json(application) = payload?;
    Ok((StatusCode::CREATED, Json(ledger.submit(application).await?)))
}

async fn review<S: CampusStore>(
    ledger: &AdmissionLedger<S>,
    id: Result<Path<AdmissionId>, PathRejection>,
    decision: Decision,
) -> Result<Json<Admission>, AppError> {
    let Path(id) = id?;
    Ok(Json(ledger.review(&id, decision).await?))
}

pub async fn approve<S: CampusStore>(
    State(ledger): State<AdmissionLedger<S>>,
    id: Result<Path<AdmissionId>, PathRejection>,
) -> Result<Json<Admission>, AppError> {
    review(&ledger, id, Decision::Approve).await
}

pub async fn reject<S: CampusStore>(
    State(ledger): State<AdmissionLedger<S>>,
    id: Result<Path<AdmissionId>, PathRejection>,
) -> Result<Json<Admission>, AppError> {
    review(&ledger, id, Decision::Reject).await
}
