//! What the ledgers need from a backing store.
//!
//! Any storage that can answer these calls works: the in-memory store used for tests and the
//! demo server, or the Postgres store in `campus-erp-database`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::admission::{Admission, AdmissionStatus};
use crate::attendance::{AttendanceRecord, ClassAttendance, EnrolledStudent};
use crate::error::StoreError;
use crate::exam::ExamResult;
use crate::fee::FeePayment;
use crate::hostel::{AllocationChange, Room, Student};
use crate::ids::{AdmissionId, ClassId, RoomId, StudentId};

#[async_trait]
pub trait HostelStore: Send + Sync {
    async fn find_room_by_id(&self, id: &RoomId) -> Result<Option<Room>, StoreError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    async fn find_student_by_id(&self, id: &StudentId) -> Result<Option<Student>, StoreError>;

    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;

    /// Updates the room's occupants and the student's allocation as one step.
    ///
    /// Returns [`StoreError::Conflict`] without writing anything when either side no longer
    /// holds the expected value recorded in `change`.
    async fn commit_allocation(&self, change: &AllocationChange) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_class_attendance(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<Option<ClassAttendance>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if a sheet for the same key already exists.
    async fn insert_class_attendance(&self, attendance: &ClassAttendance)
        -> Result<(), StoreError>;

    async fn update_class_attendance_records(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
        records: &[AttendanceRecord],
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn list_class_attendance(&self) -> Result<Vec<ClassAttendance>, StoreError>;

    async fn list_enrolled_students(&self) -> Result<Vec<EnrolledStudent>, StoreError>;
}

#[async_trait]
pub trait AdmissionStore: Send + Sync {
    async fn list_admissions(&self) -> Result<Vec<Admission>, StoreError>;

    async fn find_admission_by_id(&self, id: &AdmissionId)
        -> Result<Option<Admission>, StoreError>;

    async fn insert_admission(&self, admission: &Admission) -> Result<(), StoreError>;

    /// Sets `status` only while the stored status is still `expected`.
    async fn update_admission_status(
        &self,
        id: &AdmissionId,
        expected: AdmissionStatus,
        status: AdmissionStatus,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait FeeStore: Send + Sync {
    /// In the order the payments were recorded.
    async fn list_fee_payments(&self) -> Result<Vec<FeePayment>, StoreError>;

    async fn insert_fee_payment(&self, payment: &FeePayment) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, StoreError>;

    async fn insert_exam_result(&self, result: &ExamResult) -> Result<(), StoreError>;
}

/// Everything the server needs, in one bound.
pub trait CampusStore:
    HostelStore
    + AttendanceStore
    + AdmissionStore
    + FeeStore
    + ExamStore
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> CampusStore for T where
    T: HostelStore
        + AttendanceStore
        + AdmissionStore
        + FeeStore
        + ExamStore
        + Clone
        + Send
        + Sync
        + 'static
{
}
