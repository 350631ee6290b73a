//! Ledger services: the rules from [`crate::hostel`], [`crate::attendance`],
//! [`crate::admission`], [`crate::fee`] and [`crate::exam`] applied against a store.
//!
//! Each ledger lets one writer through at a time. Stores additionally guard every paired
//! write, so a second process writing to the same database gets a `Conflict` instead of
//! corrupting the room/student link.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::admission::{self, Admission, AdmissionApplication, AdmissionStatus, Decision};
use crate::attendance::{
    self, AttendanceRecord, AttendanceSummary, AttendanceWrite, ClassAttendance, MarkingSession,
};
use crate::analytics::{self, CampusAnalytics};
use crate::error::{
    AdmissionError, AllocationError, AttendanceError, ExamError, FeeError, StoreError,
};
use crate::exam::{ExamResult, ExamResultForm};
use crate::fee::{FeePayment, FeePaymentForm};
use crate::hostel::{self, Room, RoomOccupancy, Student};
use crate::ids::{AdmissionId, ClassId, ExamResultId, FeeId, RoomId, StudentId};
use crate::store::{AdmissionStore, AttendanceStore, CampusStore, ExamStore, FeeStore, HostelStore};

fn random_id(prefix: &str) -> String {
    format!("{prefix}{:016X}", rand::random::<u64>())
}

#[derive(Clone)]
pub struct HostelLedger<S> {
    store: S,
    writer: Arc<Mutex<()>>,
}

impl<S: HostelStore> HostelLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    #[instrument(skip(self), fields(student = %student_id, room = %room_id))]
    pub async fn allocate(
        &self,
        student_id: &StudentId,
        room_id: &RoomId,
    ) -> Result<(Room, Student), AllocationError> {
        let _writer = self.writer.lock().await;
        let student = self.store.find_student_by_id(student_id).await?;
        let room = self.store.find_room_by_id(room_id).await?;
        let outcome = hostel::allocate(student_id, student.as_ref(), room_id, room.as_ref())
            .inspect_err(|error| warn!("allocation rejected: {error}"))?;
        self.store.commit_allocation(&outcome.change).await?;
        info!(
            occupants = outcome.room.occupants.len(),
            capacity = outcome.room.capacity,
            "allocated"
        );
        Ok(outcome.into_pair())
    }

    #[instrument(skip(self), fields(student = %student_id, room = %room_id))]
    pub async fn deallocate(
        &self,
        student_id: &StudentId,
        room_id: &RoomId,
    ) -> Result<(Room, Student), AllocationError> {
        let _writer = self.writer.lock().await;
        let room = self.store.find_room_by_id(room_id).await?;
        let student = self.store.find_student_by_id(student_id).await?;
        let outcome = hostel::deallocate(student_id, student.as_ref(), room_id, room.as_ref())
            .inspect_err(|error| warn!("deallocation rejected: {error}"))?;
        self.store.commit_allocation(&outcome.change).await?;
        info!(occupants = outcome.room.occupants.len(), "deallocated");
        Ok(outcome.into_pair())
    }

    pub async fn available_rooms(&self) -> Result<Vec<Room>, AllocationError> {
        Ok(hostel::available_rooms(&self.store.list_rooms().await?))
    }

    pub async fn unallocated_students(&self) -> Result<Vec<Student>, AllocationError> {
        Ok(hostel::unallocated_students(
            &self.store.list_students().await?,
        ))
    }

    /// All rooms with their occupants' names, for the occupancy table.
    pub async fn rooms(&self) -> Result<Vec<RoomOccupancy>, AllocationError> {
        let rooms = self.store.list_rooms().await?;
        let students = self.store.list_students().await?;
        Ok(hostel::occupancy(&rooms, &students))
    }
}

/// One row of the attendance history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttendanceOverview {
    #[serde(flatten)]
    pub attendance: ClassAttendance,
    pub summary: AttendanceSummary,
}

#[derive(Clone)]
pub struct AttendanceLedger<S> {
    store: S,
    writer: Arc<Mutex<()>>,
}

impl<S: AttendanceStore> AttendanceLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Creates the sheet for `(class_id, date)` or replaces the records of the existing one.
    #[instrument(skip(self, records), fields(class = %class_id, %date, records = records.len()))]
    pub async fn upsert_attendance(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
        records: Vec<AttendanceRecord>,
    ) -> Result<ClassAttendance, AttendanceError> {
        let _writer = self.writer.lock().await;
        let existing = self.store.find_class_attendance(class_id, date).await?;
        let write = attendance::plan_upsert(class_id.clone(), date, records, existing, Utc::now())?;
        match &write {
            AttendanceWrite::Insert(attendance) => {
                self.store.insert_class_attendance(attendance).await?;
                info!("attendance recorded");
            }
            AttendanceWrite::Update(attendance) => {
                self.store
                    .update_class_attendance_records(
                        &attendance.class_id,
                        attendance.date,
                        &attendance.records,
                        attendance.updated_at,
                    )
                    .await?;
                info!("attendance updated");
            }
        }
        Ok(write.into_attendance())
    }

    pub async fn attendance_for(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<Option<ClassAttendance>, AttendanceError> {
        Ok(self.store.find_class_attendance(class_id, date).await?)
    }

    pub async fn summary_for(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSummary>, AttendanceError> {
        Ok(self
            .attendance_for(class_id, date)
            .await?
            .as_ref()
            .map(attendance::summarize))
    }

    pub async fn marking_session(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<MarkingSession, AttendanceError> {
        let enrolled = self.store.list_enrolled_students().await?;
        let existing = self.store.find_class_attendance(class_id, date).await?;
        Ok(attendance::marking_session(
            class_id,
            date,
            &enrolled,
            existing.as_ref(),
        ))
    }

    /// Newest first; sheets from the same day are ordered by class.
    pub async fn history(&self) -> Result<Vec<AttendanceOverview>, AttendanceError> {
        let mut sheets = self.store.list_class_attendance().await?;
        sheets.sort_by(|left, right| {
            right
                .date
                .cmp(&left.date)
                .then_with(|| left.class_id.cmp(&right.class_id))
        });
        Ok(sheets
            .into_iter()
            .map(|attendance| AttendanceOverview {
                summary: attendance::summarize(&attendance),
                attendance,
            })
            .collect())
    }

    pub async fn classes(&self) -> Result<Vec<ClassId>, AttendanceError> {
        Ok(attendance::classes(
            &self.store.list_enrolled_students().await?,
        ))
    }
}

#[derive(Clone)]
pub struct AdmissionLedger<S> {
    store: S,
    writer: Arc<Mutex<()>>,
}

impl<S: AdmissionStore> AdmissionLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    #[instrument(skip_all, fields(course = %application.course))]
    pub async fn submit(
        &self,
        application: AdmissionApplication,
    ) -> Result<Admission, AdmissionError> {
        let id = AdmissionId::new(random_id("ADM"));
        let admission = application.into_admission(id, Utc::now())?;
        self.store.insert_admission(&admission).await?;
        info!(admission = %admission.id, "admission submitted");
        Ok(admission)
    }

    #[instrument(skip(self), fields(admission = %id))]
    pub async fn review(
        &self,
        id: &AdmissionId,
        decision: Decision,
    ) -> Result<Admission, AdmissionError> {
        let _writer = self.writer.lock().await;
        let admission = self
            .store
            .find_admission_by_id(id)
            .await?
            .ok_or_else(|| AdmissionError::AdmissionNotFound(id.clone()))?;
        let reviewed = admission::review(&admission, decision)?;
        self.store
            .update_admission_status(id, admission.status, reviewed.status)
            .await?;
        info!(status = reviewed.status.as_str(), "admission reviewed");
        Ok(reviewed)
    }

    pub async fn list(
        &self,
        status: Option<AdmissionStatus>,
    ) -> Result<Vec<Admission>, AdmissionError> {
        let mut admissions = self.store.list_admissions().await?;
        if let Some(status) = status {
            admissions.retain(|admission| admission.status == status);
        }
        Ok(admissions)
    }
}

#[derive(Clone)]
pub struct FeeLedger<S> {
    store: S,
}

impl<S: FeeStore> FeeLedger<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(student = %form.student_id, amount_cents = form.amount_cents))]
    pub async fn record(&self, form: FeePaymentForm) -> Result<FeePayment, FeeError> {
        let payment = form
            .into_payment(FeeId::new(random_id("FEE")), Utc::now())
            .inspect_err(|error| warn!("fee payment rejected: {error}"))?;
        self.store.insert_fee_payment(&payment).await?;
        info!(payment = %payment.id, "fee payment recorded");
        Ok(payment)
    }

    pub async fn list(&self) -> Result<Vec<FeePayment>, FeeError> {
        Ok(self.store.list_fee_payments().await?)
    }
}

#[derive(Clone)]
pub struct ExamLedger<S> {
    store: S,
}

impl<S: ExamStore> ExamLedger<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(student = %form.student_id, subject = %form.subject))]
    pub async fn upload(&self, form: ExamResultForm) -> Result<ExamResult, ExamError> {
        let result = form
            .into_result(ExamResultId::new(random_id("EXM")), Utc::now())
            .inspect_err(|error| warn!("exam result rejected: {error}"))?;
        self.store.insert_exam_result(&result).await?;
        info!(result = %result.id, marks = result.marks, "exam result uploaded");
        Ok(result)
    }

    pub async fn list(&self) -> Result<Vec<ExamResult>, ExamError> {
        Ok(self.store.list_exam_results().await?)
    }
}

/// Read-only view over every other ledger's data.
#[derive(Clone)]
pub struct AnalyticsLedger<S> {
    store: S,
}

impl<S: CampusStore> AnalyticsLedger<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn summary(&self) -> Result<CampusAnalytics, StoreError> {
        let students = self.store.list_students().await?;
        let admissions = self.store.list_admissions().await?;
        let payments = self.store.list_fee_payments().await?;
        let sheets = self.store.list_class_attendance().await?;
        let results = self.store.list_exam_results().await?;
        Ok(analytics::compute(
            &students,
            &admissions,
            &payments,
            &sheets,
            &results,
        ))
    }
}
