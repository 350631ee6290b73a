use async_trait::async_trait;
use campus_erp_ledger::admission::{Admission, AdmissionStatus};
use campus_erp_ledger::attendance::{AttendanceRecord, ClassAttendance, EnrolledStudent};
use campus_erp_ledger::exam::ExamResult;
use campus_erp_ledger::fee::FeePayment;
use campus_erp_ledger::hostel::{AllocationChange, Room, Student};
use campus_erp_ledger::{
    AdmissionId, AdmissionStore, AttendanceStore, ClassId, ExamStore, FeeStore, HostelStore,
    RoomId, StoreError, StudentId,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::error::DatabaseError;
use crate::models::{
    AdmissionRow, ClassAttendanceRow, ExamResultRow, FeePaymentRow, NewAdmission,
    NewClassAttendance, NewExamResult, NewFeePayment, RoomRow, StudentRow,
};
use crate::schema::{admissions, class_attendance, exam_results, fee_payments, rooms, students};
use crate::Pool;

/// Ledger storage backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn find_room(&self, id: &RoomId) -> Result<Option<Room>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let row = rooms::table
            .find(id.as_str())
            .select(RoomRow::as_select())
            .first(&mut connection)
            .await
            .optional()?;
        Ok(row.map(Room::from))
    }

    async fn rooms(&self) -> Result<Vec<Room>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let rows = rooms::table
            .order(rooms::row_order.asc())
            .select(RoomRow::as_select())
            .load(&mut connection)
            .await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn find_student(&self, id: &StudentId) -> Result<Option<Student>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let row = students::table
            .find(id.as_str())
            .select(StudentRow::as_select())
            .first(&mut connection)
            .await
            .optional()?;
        Ok(row.map(Student::from))
    }

    async fn student_rows(&self) -> Result<Vec<StudentRow>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(students::table
            .order(students::row_order.asc())
            .select(StudentRow::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn commit(&self, change: &AllocationChange) -> Result<(), DatabaseError> {
        let mut pooled = self.pool.get().await?;
        commit_allocation_change(&mut pooled, change).await
    }

    async fn find_attendance(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<Option<ClassAttendance>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let row = class_attendance::table
            .find((class_id.as_str(), date))
            .select(ClassAttendanceRow::as_select())
            .first(&mut connection)
            .await
            .optional()?;
        row.map(ClassAttendance::try_from).transpose()
    }

    async fn insert_attendance(&self, attendance: &ClassAttendance) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::insert_into(class_attendance::table)
            .values(NewClassAttendance::new(attendance)?)
            .execute(&mut connection)
            .await?;
        Ok(())
    }

    async fn update_records(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
        records: &[AttendanceRecord],
        updated_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        let updated = diesel::update(class_attendance::table.find((class_id.as_str(), date)))
            .set((
                class_attendance::records.eq(serde_json::to_value(records)?),
                class_attendance::updated_at.eq(updated_at),
            ))
            .execute(&mut connection)
            .await?;
        if updated == 1 {
            Ok(())
        } else {
            Err(DatabaseError::Conflict)
        }
    }

    async fn attendance(&self) -> Result<Vec<ClassAttendance>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let rows = class_attendance::table
            .select(ClassAttendanceRow::as_select())
            .load(&mut connection)
            .await?;
        rows.into_iter().map(ClassAttendance::try_from).collect()
    }

    async fn admissions(&self) -> Result<Vec<Admission>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let rows = admissions::table
            .order((admissions::applied_at.asc(), admissions::id.asc()))
            .select(AdmissionRow::as_select())
            .load(&mut connection)
            .await?;
        rows.into_iter().map(Admission::try_from).collect()
    }

    async fn find_admission(&self, id: &AdmissionId) -> Result<Option<Admission>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let row = admissions::table
            .find(id.as_str())
            .select(AdmissionRow::as_select())
            .first(&mut connection)
            .await
            .optional()?;
        row.map(Admission::try_from).transpose()
    }

    async fn insert_admission_row(&self, admission: &Admission) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::insert_into(admissions::table)
            .values(NewAdmission::from(admission))
            .execute(&mut connection)
            .await?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &AdmissionId,
        expected: AdmissionStatus,
        status: AdmissionStatus,
    ) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        let updated = diesel::update(
            admissions::table
                .find(id.as_str())
                .filter(admissions::status.eq(expected.as_str())),
        )
        .set(admissions::status.eq(status.as_str()))
        .execute(&mut connection)
        .await?;
        if updated == 1 {
            Ok(())
        } else {
            Err(DatabaseError::Conflict)
        }
    }

    async fn fee_payments(&self) -> Result<Vec<FeePayment>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let rows = fee_payments::table
            .order((fee_payments::created_at.asc(), fee_payments::id.asc()))
            .select(FeePaymentRow::as_select())
            .load(&mut connection)
            .await?;
        Ok(rows.into_iter().map(FeePayment::from).collect())
    }

    async fn insert_fee_payment_row(&self, payment: &FeePayment) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::insert_into(fee_payments::table)
            .values(NewFeePayment::from(payment))
            .execute(&mut connection)
            .await?;
        Ok(())
    }

    async fn exam_results(&self) -> Result<Vec<ExamResult>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let rows = exam_results::table
            .order((exam_results::created_at.asc(), exam_results::id.asc()))
            .select(ExamResultRow::as_select())
            .load(&mut connection)
            .await?;
        Ok(rows.into_iter().map(ExamResult::from).collect())
    }

    async fn insert_exam_result_row(&self, result: &ExamResult) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::insert_into(exam_results::table)
            .values(NewExamResult::from(result))
            .execute(&mut connection)
            .await?;
        Ok(())
    }
}

/// Both guarded updates run in one transaction; if either matches no row the transaction
/// rolls back.
async fn commit_allocation_change(
    connection: &mut AsyncPgConnection,
    change: &AllocationChange,
) -> Result<(), DatabaseError> {
    connection
        .transaction::<_, DatabaseError, _>(|connection| {
            async move {
                update_room_occupants(connection, change).await?;
                update_student_allocation(connection, change).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
}

async fn update_room_occupants(
    connection: &mut AsyncPgConnection,
    change: &AllocationChange,
) -> Result<(), DatabaseError> {
    let expected: Vec<Option<String>> = change
        .expected_occupants
        .iter()
        .map(|id| Some(id.as_str().to_owned()))
        .collect();
    let occupants: Vec<Option<String>> = change
        .occupants
        .iter()
        .map(|id| Some(id.as_str().to_owned()))
        .collect();
    let updated = diesel::update(
        rooms::table
            .find(change.room_id.as_str())
            .filter(rooms::occupants.eq(expected)),
    )
    .set(rooms::occupants.eq(occupants))
    .execute(connection)
    .await?;
    if updated == 1 {
        Ok(())
    } else {
        debug!(room = %change.room_id, "room occupants changed underneath");
        Err(DatabaseError::Conflict)
    }
}

async fn update_student_allocation(
    connection: &mut AsyncPgConnection,
    change: &AllocationChange,
) -> Result<(), DatabaseError> {
    let expected = change
        .expected_room_id
        .as_ref()
        .map(|id| id.as_str().to_owned());
    let allocated = change
        .allocated_room_id
        .as_ref()
        .map(|id| id.as_str().to_owned());
    let updated = diesel::update(
        students::table
            .find(change.student_id.as_str())
            .filter(students::allocated_room_id.is_not_distinct_from(expected)),
    )
    .set(students::allocated_room_id.eq(allocated))
    .execute(connection)
    .await?;
    if updated == 1 {
        Ok(())
    } else {
        debug!(student = %change.student_id, "student allocation changed underneath");
        Err(DatabaseError::Conflict)
    }
}

#[async_trait]
impl HostelStore for PgStore {
    async fn find_room_by_id(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.find_room(id).await?)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.rooms().await?)
    }

    async fn find_student_by_id(&self, id: &StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.find_student(id).await?)
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self
            .student_rows()
            .await?
            .into_iter()
            .map(Student::from)
            .collect())
    }

    async fn commit_allocation(&self, change: &AllocationChange) -> Result<(), StoreError> {
        Ok(self.commit(change).await?)
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn find_class_attendance(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<Option<ClassAttendance>, StoreError> {
        Ok(self.find_attendance(class_id, date).await?)
    }

    async fn insert_class_attendance(
        &self,
        attendance: &ClassAttendance,
    ) -> Result<(), StoreError> {
        Ok(self.insert_attendance(attendance).await?)
    }

    async fn update_class_attendance_records(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
        records: &[AttendanceRecord],
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Ok(self
            .update_records(class_id, date, records, updated_at)
            .await?)
    }

    async fn list_class_attendance(&self) -> Result<Vec<ClassAttendance>, StoreError> {
        Ok(self.attendance().await?)
    }

    async fn list_enrolled_students(&self) -> Result<Vec<EnrolledStudent>, StoreError> {
        Ok(self
            .student_rows()
            .await?
            .into_iter()
            .filter_map(StudentRow::into_enrolled)
            .collect())
    }
}

#[async_trait]
impl AdmissionStore for PgStore {
    async fn list_admissions(&self) -> Result<Vec<Admission>, StoreError> {
        Ok(self.admissions().await?)
    }

    async fn find_admission_by_id(
        &self,
        id: &AdmissionId,
    ) -> Result<Option<Admission>, StoreError> {
        Ok(self.find_admission(id).await?)
    }

    async fn insert_admission(&self, admission: &Admission) -> Result<(), StoreError> {
        Ok(self.insert_admission_row(admission).await?)
    }

    async fn update_admission_status(
        &self,
        id: &AdmissionId,
        expected: AdmissionStatus,
        status: AdmissionStatus,
    ) -> Result<(), StoreError> {
        Ok(self.update_status(id, expected, status).await?)
    }
}

#[async_trait]
impl FeeStore for PgStore {
    async fn list_fee_payments(&self) -> Result<Vec<FeePayment>, StoreError> {
        Ok(self.fee_payments().await?)
    }

    async fn insert_fee_payment(&self, payment: &FeePayment) -> Result<(), StoreError> {
        Ok(self.insert_fee_payment_row(payment).await?)
    }
}

#[async_trait]
impl ExamStore for PgStore {
    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, StoreError> {
        Ok(self.exam_results().await?)
    }

    async fn insert_exam_result(&self, result: &ExamResult) -> Result<(), StoreError> {
        Ok(self.insert_exam_result_row(result).await?)
    }
}
