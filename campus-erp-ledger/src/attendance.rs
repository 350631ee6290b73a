//! Per class and date attendance.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::ids::{ClassId, StudentId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: StudentId,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    #[must_use]
    pub fn new(student_id: impl Into<StudentId>, status: AttendanceStatus) -> Self {
        Self {
            student_id: student_id.into(),
            status,
        }
    }
}

/// The attendance sheet for one class on one day. `(class_id, date)` is its natural key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAttendance {
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub records: Vec<AttendanceRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassAttendance {
    #[must_use]
    pub fn status_of(&self, student: &StudentId) -> Option<AttendanceStatus> {
        self.records
            .iter()
            .find(|record| &record.student_id == student)
            .map(|record| record.status)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present_count: usize,
    pub absent_count: usize,
    pub total: usize,
}

#[must_use]
pub fn summarize(attendance: &ClassAttendance) -> AttendanceSummary {
    let present_count = attendance
        .records
        .iter()
        .filter(|record| record.status == AttendanceStatus::Present)
        .count();
    let total = attendance.records.len();
    AttendanceSummary {
        present_count,
        absent_count: total - present_count,
        total,
    }
}

/// A student as seen by the attendance register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledStudent {
    pub id: StudentId,
    pub name: String,
    pub class_id: ClassId,
}

impl EnrolledStudent {
    #[must_use]
    pub fn new(
        id: impl Into<StudentId>,
        name: impl Into<String>,
        class_id: impl Into<ClassId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            class_id: class_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub student_id: StudentId,
    pub name: String,
    pub status: AttendanceStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkingSession {
    pub class_id: ClassId,
    pub date: NaiveDate,
    /// Whether a sheet already exists for this class and date.
    pub existing: bool,
    pub entries: Vec<SessionEntry>,
}

/// Prepares the editable sheet for a class and date.
///
/// Every enrolled student of the class gets an entry, in enrollment order. Students start out
/// `Absent` unless `existing` holds a mark for them: presence is opt-in.
#[must_use]
pub fn marking_session(
    class_id: &ClassId,
    date: NaiveDate,
    enrolled: &[EnrolledStudent],
    existing: Option<&ClassAttendance>,
) -> MarkingSession {
    let entries = enrolled
        .iter()
        .filter(|student| &student.class_id == class_id)
        .map(|student| SessionEntry {
            student_id: student.id.clone(),
            name: student.name.clone(),
            status: existing
                .and_then(|attendance| attendance.status_of(&student.id))
                .unwrap_or(AttendanceStatus::Absent),
        })
        .collect();
    MarkingSession {
        class_id: class_id.clone(),
        date,
        existing: existing.is_some(),
        entries,
    }
}

/// Distinct class ids, ascending.
#[must_use]
pub fn classes(enrolled: &[EnrolledStudent]) -> Vec<ClassId> {
    let mut classes: Vec<ClassId> = enrolled
        .iter()
        .map(|student| student.class_id.clone())
        .collect();
    classes.sort();
    classes.dedup();
    classes
}

pub fn ensure_unique_students(records: &[AttendanceRecord]) -> Result<(), AttendanceError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.student_id) {
            return Err(AttendanceError::DuplicateStudent(record.student_id.clone()));
        }
    }
    Ok(())
}

/// What an upsert has to write, decided from the current sheet for the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttendanceWrite {
    Insert(ClassAttendance),
    /// Replaces the whole record list and bumps `updated_at`; `created_at` stays.
    Update(ClassAttendance),
}

impl AttendanceWrite {
    #[must_use]
    pub const fn attendance(&self) -> &ClassAttendance {
        match self {
            Self::Insert(attendance) | Self::Update(attendance) => attendance,
        }
    }

    #[must_use]
    pub fn into_attendance(self) -> ClassAttendance {
        match self {
            Self::Insert(attendance) | Self::Update(attendance) => attendance,
        }
    }
}

pub fn plan_upsert(
    class_id: ClassId,
    date: NaiveDate,
    records: Vec<AttendanceRecord>,
    existing: Option<ClassAttendance>,
    now: DateTime<Utc>,
) -> Result<AttendanceWrite, AttendanceError> {
    ensure_unique_students(&records)?;
    Ok(match existing {
        Some(existing) => AttendanceWrite::Update(ClassAttendance {
            records,
            updated_at: now,
            ..existing
        }),
        None => AttendanceWrite::Insert(ClassAttendance {
            class_id,
            date,
            records,
            created_at: now,
            updated_at: now,
        }),
    })
}
