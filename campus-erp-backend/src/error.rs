use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use axum::Json;
use campus_erp_config::ConfigError;
use campus_erp_database::DatabaseError;
use campus_erp_ledger::{
    AdmissionError, AllocationError, AttendanceError, ClassId, ExamError, FeeError, StoreError,
};
use chrono::NaiveDate;
use http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Attendance(#[from] AttendanceError),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no attendance recorded for class {class_id} on {date}")]
    AttendanceNotFound { class_id: ClassId, date: NaiveDate },
    #[error("unknown admission status {0:?}")]
    UnknownStatus(String),
    #[error("json body error: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("path error: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("query error: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("log filter error: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Allocation(
                AllocationError::RoomNotFound(_) | AllocationError::StudentNotFound(_),
            )
            | Self::Admission(AdmissionError::AdmissionNotFound(_))
            | Self::AttendanceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Allocation(
                AllocationError::AlreadyAllocated { .. }
                | AllocationError::RoomFull { .. }
                | AllocationError::NotAllocatedHere { .. }
                | AllocationError::Conflict,
            )
            | Self::Attendance(AttendanceError::Conflict)
            | Self::Admission(AdmissionError::AlreadyReviewed(_) | AdmissionError::Conflict)
            | Self::Fee(FeeError::Conflict)
            | Self::Exam(ExamError::Conflict)
            | Self::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            Self::Attendance(AttendanceError::DuplicateStudent(_))
            | Self::Admission(AdmissionError::Invalid { .. })
            | Self::Fee(FeeError::Invalid { .. })
            | Self::Exam(ExamError::Invalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownStatus(_) => StatusCode::BAD_REQUEST,
            Self::JsonRejection(rejection) => rejection.status(),
            Self::PathRejection(rejection) => rejection.status(),
            Self::QueryRejection(rejection) => rejection.status(),
            Self::Allocation(AllocationError::StorageUnavailable(_))
            | Self::Attendance(AttendanceError::StorageUnavailable(_))
            | Self::Admission(AdmissionError::StorageUnavailable(_))
            | Self::Fee(FeeError::StorageUnavailable(_))
            | Self::Exam(ExamError::StorageUnavailable(_))
            | Self::Store(StoreError::Unavailable(_))
            | Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::File(_) | Self::Config(_) | Self::LogFilter(_) | Self::Telemetry(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {self}");
        } else {
            warn!("request rejected: {self}");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
