use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use campus_erp_ledger::exam::{ExamResult, ExamResultForm};
use campus_erp_ledger::{CampusStore, ExamLedger};
use http::StatusCode;

use crate::error::AppError;

pub async fn list<S: CampusStore>(
    State(ledger): State<ExamLedger<S>>,
) -> Result<Json<Vec<ExamResult>>, AppError> {
    Ok(Json(ledger.list().await?))
}

pub async fn upload<S: CampusStore>(
    State(ledger): State<ExamLedger<S>>,
    payload: Result<Json<ExamResultForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ExamResult>), AppError> {
    let Json(form) = payload?;
    Ok((StatusCode::CREATED, Json(ledger.upload(form).await?)))
}
