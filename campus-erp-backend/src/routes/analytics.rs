use axum::extract::State;
use axum::Json;
use campus_erp_ledger::analytics::CampusAnalytics;
use campus_erp_ledger::{AnalyticsLedger, CampusStore};

use crate::error::AppError;

pub async fn summary<S: CampusStore>(
    State(ledger): State<AnalyticsLedger<S>>,
) -> Result<Json<CampusAnalytics>, AppError> {
    Ok(Json(ledger.summary().await?))
}
