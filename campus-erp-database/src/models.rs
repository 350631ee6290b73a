use campus_erp_ledger::admission::{Admission, AdmissionStatus};
use campus_erp_ledger::attendance::{AttendanceRecord, ClassAttendance, EnrolledStudent};
use campus_erp_ledger::exam::ExamResult;
use campus_erp_ledger::fee::FeePayment;
use campus_erp_ledger::hostel::{Room, Student};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::error::DatabaseError;
use crate::schema::{admissions, class_attendance, exam_results, fee_payments, rooms, students};

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    pub id: String,
    pub room_number: String,
    pub capacity: i32,
    pub occupants: Vec<Option<String>>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id.into(),
            room_number: row.room_number,
            // the table only admits positive capacities
            capacity: u32::try_from(row.capacity).unwrap_or(0),
            // postgres arrays admit null elements, the table never stores any
            occupants: row.occupants.into_iter().flatten().map(Into::into).collect(),
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub class_id: Option<String>,
    pub allocated_room_id: Option<String>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            allocated_room_id: row.allocated_room_id.map(Into::into),
        }
    }
}

impl StudentRow {
    /// Students without a class are not on any attendance register.
    #[must_use]
    pub fn into_enrolled(self) -> Option<EnrolledStudent> {
        let class_id = self.class_id?;
        Some(EnrolledStudent::new(self.id, self.name, class_id))
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = class_attendance)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClassAttendanceRow {
    pub class_id: String,
    pub date: NaiveDate,
    pub records: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClassAttendanceRow> for ClassAttendance {
    type Error = DatabaseError;

    fn try_from(row: ClassAttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            class_id: row.class_id.into(),
            date: row.date,
            records: serde_json::from_value::<Vec<AttendanceRecord>>(row.records)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = class_attendance)]
pub struct NewClassAttendance<'a> {
    pub class_id: &'a str,
    pub date: NaiveDate,
    pub records: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewClassAttendance<'a> {
    pub fn new(attendance: &'a ClassAttendance) -> Result<Self, DatabaseError> {
        Ok(Self {
            class_id: attendance.class_id.as_str(),
            date: attendance.date,
            records: serde_json::to_value(&attendance.records)?,
            created_at: attendance.created_at,
            updated_at: attendance.updated_at,
        })
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = admissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AdmissionRow {
    pub id: String,
    pub student_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub course: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}

impl TryFrom<AdmissionRow> for Admission {
    type Error = DatabaseError;

    fn try_from(row: AdmissionRow) -> Result<Self, Self::Error> {
        let status =
            AdmissionStatus::parse(&row.status).ok_or(DatabaseError::UnknownStatus(row.status))?;
        Ok(Self {
            id: row.id.into(),
            student_name: row.student_name,
            email: row.email,
            date_of_birth: row.date_of_birth,
            course: row.course,
            status,
            applied_at: row.applied_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = admissions)]
pub struct NewAdmission<'a> {
    pub id: &'a str,
    pub student_name: &'a str,
    pub email: &'a str,
    pub date_of_birth: NaiveDate,
    pub course: &'a str,
    pub status: &'static str,
    pub applied_at: DateTime<Utc>,
}

impl<'a> From<&'a Admission> for NewAdmission<'a> {
    fn from(admission: &'a Admission) -> Self {
        Self {
            id: admission.id.as_str(),
            student_name: &admission.student_name,
            email: &admission.email,
            date_of_birth: admission.date_of_birth,
            course: &admission.course,
            status: admission.status.as_str(),
            applied_at: admission.applied_at,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = fee_payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FeePaymentRow {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FeePaymentRow> for FeePayment {
    fn from(row: FeePaymentRow) -> Self {
        Self {
            id: row.id.into(),
            student_id: row.student_id.into(),
            student_name: row.student_name,
            amount_cents: row.amount_cents,
            created_at: row.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = fee_payments)]
pub struct NewFeePayment<'a> {
    pub id: &'a str,
    pub student_id: &'a str,
    pub student_name: &'a str,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a FeePayment> for NewFeePayment<'a> {
    fn from(payment: &'a FeePayment) -> Self {
        Self {
            id: payment.id.as_str(),
            student_id: payment.student_id.as_str(),
            student_name: &payment.student_name,
            amount_cents: payment.amount_cents,
            created_at: payment.created_at,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = exam_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExamResultRow {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub marks: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ExamResultRow> for ExamResult {
    fn from(row: ExamResultRow) -> Self {
        Self {
            id: row.id.into(),
            student_id: row.student_id.into(),
            subject: row.subject,
            marks: row.marks,
            created_at: row.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = exam_results)]
pub struct NewExamResult<'a> {
    pub id: &'a str,
    pub student_id: &'a str,
    pub subject: &'a str,
    pub marks: i32,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a ExamResult> for NewExamResult<'a> {
    fn from(result: &'a ExamResult) -> Self {
        Self {
            id: result.id.as_str(),
            student_id: result.student_id.as_str(),
            subject: &result.subject,
            marks: result.marks,
            created_at: result.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use campus_erp_ledger::attendance::AttendanceStatus;
    use campus_erp_ledger::{RoomId, StudentId};
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn room_rows_become_rooms() {
        let room = Room::from(RoomRow {
            id: "R1".to_owned(),
            room_number: "101".to_owned(),
            capacity: 2,
            occupants: vec![Some("S1".to_owned()), None],
        });
        assert_eq!(room.id, RoomId::new("R1"));
        assert_eq!(room.occupants, vec![StudentId::new("S1")]);
        assert!(room.has_space());
    }

    #[test]
    fn attendance_records_are_read_from_json() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let row = ClassAttendanceRow {
            class_id: "C1".to_owned(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            records: serde_json::json!([
                { "studentId": "S1", "status": "Present" },
                { "studentId": "S2", "status": "Absent" },
            ]),
            created_at: at,
            updated_at: at,
        };

        let attendance = ClassAttendance::try_from(row).unwrap();

        assert_eq!(
            attendance.records,
            vec![
                AttendanceRecord::new("S1", AttendanceStatus::Present),
                AttendanceRecord::new("S2", AttendanceStatus::Absent),
            ]
        );
        let written = NewClassAttendance::new(&attendance).unwrap();
        assert_eq!(written.records[0]["studentId"], "S1");
    }

    #[test]
    fn malformed_records_are_an_error() {
        let at = Utc::now();
        let row = ClassAttendanceRow {
            class_id: "C1".to_owned(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            records: serde_json::json!([{ "studentId": "S1", "status": "Late" }]),
            created_at: at,
            updated_at: at,
        };
        assert!(matches!(
            ClassAttendance::try_from(row),
            Err(DatabaseError::Json(_))
        ));
    }

    #[test]
    fn unknown_admission_status_is_an_error() {
        let row = AdmissionRow {
            id: "ADM001".to_owned(),
            student_name: "Alice Johnson".to_owned(),
            email: "alice@example.edu".to_owned(),
            date_of_birth: NaiveDate::from_ymd_opt(2006, 4, 2).unwrap(),
            course: "Computer Science".to_owned(),
            status: "waitlisted".to_owned(),
            applied_at: Utc::now(),
        };
        assert!(matches!(
            Admission::try_from(row),
            Err(DatabaseError::UnknownStatus(status)) if status == "waitlisted"
        ));
    }

    #[test]
    fn students_without_class_are_not_enrolled() {
        let row = StudentRow {
            id: "S1".to_owned(),
            name: "Alice".to_owned(),
            class_id: None,
            allocated_room_id: None,
        };
        assert_eq!(row.into_enrolled(), None);
    }
}
