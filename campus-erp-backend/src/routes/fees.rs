use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use campus_erp_ledger::fee::{FeePayment, FeePaymentForm};
use campus_erp_ledger::{CampusStore, FeeLedger};
use http::StatusCode;

use crate::error::AppError;

pub async fn list<S: CampusStore>(
    State(ledger): State<FeeLedger<S>>,
) -> Result<Json<Vec<FeePayment>>, AppError> {
    Ok(Json(ledger.list().await?))
}

pub async fn record<S: CampusStore>(
    State(ledger): State<FeeLedger<S>>,
    payload: Result<Json<FeePaymentForm>, JsonRejection>,
) -> Result<(StatusCode, Json<FeePayment>), AppError> {
    let Json(form) = payload?;
    Ok((StatusCode::CREATED, Json(ledger.record(form).await?)))
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send};

    #[tokio::test]
    async fn recorded_payment_is_listed() {
        let (_, app) = app();

        let (status, payment) = send(
            &app,
            Method::POST,
            "/fees",
            Some(json!({
                "studentId": "S001",
                "studentName": "Alice Johnson",
                "amountCents": 125_000,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED, "{payment}");
        assert_eq!(payment["amountCents"], 125_000);
        let (status, payments) = send(&app, Method::GET, "/fees", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payments.as_array().unwrap().last(), Some(&payment));
    }

    #[tokio::test]
    async fn zero_amount_is_unprocessable() {
        let (_, app) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/fees",
            Some(json!({
                "studentId": "S001",
                "studentName": "Alice Johnson",
                "amountCents": 0,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().starts_with("amountCents"));
        let (_, payments) = send(&app, Method::GET, "/fees", None).await;
        assert_eq!(payments, json!([]));
    }
}
