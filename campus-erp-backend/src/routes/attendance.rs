use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use campus_erp_ledger::attendance::{
    AttendanceRecord, AttendanceSummary, ClassAttendance, MarkingSession,
};
use campus_erp_ledger::{AttendanceLedger, AttendanceOverview, CampusStore, ClassId};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

/// `/attendance/:class_id/:date`
#[derive(Deserialize)]
pub struct SheetKey {
    pub class_id: ClassId,
    pub date: NaiveDate,
}

impl SheetKey {
    fn not_found(self) -> AppError {
        AppError::AttendanceNotFound {
            class_id: self.class_id,
            date: self.date,
        }
    }
}

#[derive(Deserialize)]
pub struct UpsertRequest {
    pub records: Vec<AttendanceRecord>,
}

pub async fn history<S: CampusStore>(
    State(ledger): State<AttendanceLedger<S>>,
) -> Result<Json<Vec<AttendanceOverview>>, AppError> {
    Ok(Json(ledger.history().await?))
}

pub async fn classes<S: CampusStore>(
    State(ledger): State<AttendanceLedger<S>>,
) -> Result<Json<Vec<ClassId>>, AppError> {
    Ok(Json(ledger.classes().await?))
}

pub async fn attendance_for<S: CampusStore>(
    State(ledger): State<AttendanceLedger<S>>,
    key: Result<Path<SheetKey>, PathRejection>,
) -> Result<Json<ClassAttendance>, AppError> {
    let Path(key) = key?;
    match ledger.attendance_for(&key.class_id, key.date).await? {
        Some(attendance) => Ok(Json(attendance)),
        None => Err(key.not_found()),
    }
}

pub async fn upsert<S: CampusStore>(
    State(ledger): State<AttendanceLedger<S>>,
    key: Result<Path<SheetKey>, PathRejection>,
    payload: Result<Json<UpsertRequest>, JsonRejection>,
) -> Result<Json<ClassAttendance>, AppError> {
    let Path(key) = key?;
    let Json(request) = payload?;
    Ok(Json(
        ledger
            .upsert_attendance(&key.class_id, key.date, request.records)
            .await?,
    ))
}

pub async fn marking_session<S: CampusStore>(
    State(ledger): State<AttendanceLedger<S>>,
    key: Result<Path<SheetKey>, PathRejection>,
) -> Result<Json<MarkingSession>, AppError> {
    let Path(key) = key?;
    Ok(Json(ledger.marking_session(&key.class_id, key.date).await?))
}

pub async fn summary<S: CampusStore>(
    State(ledger): State<AttendanceLedger<S>>,
    key: Result<Path<SheetKey>, PathRejection>,
) -> Result<Json<AttendanceSummary>, AppError> {
    let Path(key) = key?;
    match ledger.summary_for(&key.class_id, key.date).await? {
        Some(summary) => Ok(Json(summary)),
        None => Err(key.not_found()),
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send};

    #[tokio::test]
    async fn upsert_creates_then_replaces() {
        let (_, app) = app();
        let uri = "/attendance/EE102/2025-09-16";

        let (status, created) = send(
            &app,
            Method::PUT,
            uri,
            Some(json!({ "records": [
                { "studentId": "S005", "status": "Present" },
                { "studentId": "S006", "status": "Absent" },
            ] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{created}");
        assert_eq!(created["classId"], "EE102");
        assert_eq!(created["date"], "2025-09-16");

        let (status, updated) = send(
            &app,
            Method::PUT,
            uri,
            Some(json!({ "records": [{ "studentId": "S007", "status": "Present" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_eq!(updated["records"].as_array().unwrap().len(), 1);

        let (status, summary) = send(&app, Method::GET, &format!("{uri}/summary"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            summary,
            json!({ "presentCount": 1, "absentCount": 0, "total": 1 })
        );
    }

    #[tokio::test]
    async fn missing_sheet_is_not_found() {
        let (_, app) = app();

        let (status, _) = send(&app, Method::GET, "/attendance/CS101/2025-09-20", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::GET,
            "/attendance/CS101/2025-09-20/summary",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_student_is_unprocessable() {
        let (_, app) = app();

        let (status, _) = send(
            &app,
            Method::PUT,
            "/attendance/CS101/2025-09-16",
            Some(json!({ "records": [
                { "studentId": "S001", "status": "Present" },
                { "studentId": "S001", "status": "Absent" },
            ] })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_date_is_a_bad_request() {
        let (_, app) = app();

        let (status, body) = send(&app, Method::GET, "/attendance/CS101/yesterday", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn session_prefills_existing_marks() {
        let (_, app) = app();

        let (status, session) = send(
            &app,
            Method::GET,
            "/attendance/CS101/2025-09-15/session",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["existing"], true);
        let statuses: Vec<_> = session["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["status"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(statuses, ["Present", "Absent", "Present", "Present"]);

        let (_, fresh) = send(
            &app,
            Method::GET,
            "/attendance/EE102/2025-09-15/session",
            None,
        )
        .await;
        assert_eq!(fresh["existing"], false);
        assert_eq!(fresh["entries"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn history_and_classes() {
        let (_, app) = app();

        let (_, classes) = send(&app, Method::GET, "/attendance/classes", None).await;
        assert_eq!(classes, json!(["CS101", "EE102"]));

        let (status, history) = send(&app, Method::GET, "/attendance", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history[0]["classId"], "CS101");
        assert_eq!(history[0]["summary"]["presentCount"], 3);
    }
}
