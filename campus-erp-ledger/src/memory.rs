use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::admission::{Admission, AdmissionStatus};
use crate::attendance::{AttendanceRecord, ClassAttendance, EnrolledStudent};
use crate::error::StoreError;
use crate::exam::ExamResult;
use crate::fee::FeePayment;
use crate::hostel::{AllocationChange, Room, Student};
use crate::ids::{AdmissionId, ClassId, RoomId, StudentId};
use crate::store::{AdmissionStore, AttendanceStore, ExamStore, FeeStore, HostelStore};

/// Initial contents of an [`InMemoryStore`].
#[derive(Clone, Debug, Default)]
pub struct Fixtures {
    pub rooms: Vec<Room>,
    pub students: Vec<Student>,
    pub enrolled: Vec<EnrolledStudent>,
    pub attendance: Vec<ClassAttendance>,
    pub admissions: Vec<Admission>,
    pub fees: Vec<FeePayment>,
    pub exams: Vec<ExamResult>,
}

/// A store that keeps everything in process memory. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<Fixtures>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(fixtures: Fixtures) -> Self {
        Self {
            state: Arc::new(Mutex::new(fixtures)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, Fixtures>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_owned()));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl HostelStore for InMemoryStore {
    async fn find_room_by_id(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.state()?.rooms.iter().find(|room| &room.id == id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.state()?.rooms.clone())
    }

    async fn find_student_by_id(&self, id: &StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self
            .state()?
            .students
            .iter()
            .find(|student| &student.id == id)
            .cloned())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.state()?.students.clone())
    }

    async fn commit_allocation(&self, change: &AllocationChange) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let Fixtures {
            rooms, students, ..
        } = &mut *state;
        let room = rooms
            .iter_mut()
            .find(|room| room.id == change.room_id)
            .filter(|room| room.occupants == change.expected_occupants)
            .ok_or(StoreError::Conflict)?;
        let student = students
            .iter_mut()
            .find(|student| student.id == change.student_id)
            .filter(|student| student.allocated_room_id == change.expected_room_id)
            .ok_or(StoreError::Conflict)?;
        room.occupants.clone_from(&change.occupants);
        student.allocated_room_id.clone_from(&change.allocated_room_id);
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn find_class_attendance(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
    ) -> Result<Option<ClassAttendance>, StoreError> {
        Ok(self
            .state()?
            .attendance
            .iter()
            .find(|attendance| &attendance.class_id == class_id && attendance.date == date)
            .cloned())
    }

    async fn insert_class_attendance(
        &self,
        attendance: &ClassAttendance,
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.attendance.iter().any(|existing| {
            existing.class_id == attendance.class_id && existing.date == attendance.date
        }) {
            return Err(StoreError::Conflict);
        }
        state.attendance.push(attendance.clone());
        Ok(())
    }

    async fn update_class_attendance_records(
        &self,
        class_id: &ClassId,
        date: NaiveDate,
        records: &[AttendanceRecord],
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let attendance = state
            .attendance
            .iter_mut()
            .find(|attendance| &attendance.class_id == class_id && attendance.date == date)
            .ok_or(StoreError::Conflict)?;
        attendance.records = records.to_vec();
        attendance.updated_at = updated_at;
        Ok(())
    }

    async fn list_class_attendance(&self) -> Result<Vec<ClassAttendance>, StoreError> {
        Ok(self.state()?.attendance.clone())
    }

    async fn list_enrolled_students(&self) -> Result<Vec<EnrolledStudent>, StoreError> {
        Ok(self.state()?.enrolled.clone())
    }
}

#[async_trait]
impl AdmissionStore for InMemoryStore {
    async fn list_admissions(&self) -> Result<Vec<Admission>, StoreError> {
        Ok(self.state()?.admissions.clone())
    }

    async fn find_admission_by_id(
        &self,
        id: &AdmissionId,
    ) -> Result<Option<Admission>, StoreError> {
        Ok(self
            .state()?
            .admissions
            .iter()
            .find(|admission| &admission.id == id)
            .cloned())
    }

    async fn insert_admission(&self, admission: &Admission) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.admissions.iter().any(|existing| existing.id == admission.id) {
            return Err(StoreError::Conflict);
        }
        state.admissions.push(admission.clone());
        Ok(())
    }

    async fn update_admission_status(
        &self,
        id: &AdmissionId,
        expected: AdmissionStatus,
        status: AdmissionStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let admission = state
            .admissions
            .iter_mut()
            .find(|admission| &admission.id == id && admission.status == expected)
            .ok_or(StoreError::Conflict)?;
        admission.status = status;
        Ok(())
    }
}

#[async_trait]
impl FeeStore for InMemoryStore {
    async fn list_fee_payments(&self) -> Result<Vec<FeePayment>, StoreError> {
        Ok(self.state()?.fees.clone())
    }

    async fn insert_fee_payment(&self, payment: &FeePayment) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.fees.iter().any(|existing| existing.id == payment.id) {
            return Err(StoreError::Conflict);
        }
        state.fees.push(payment.clone());
        Ok(())
    }
}

#[async_trait]
impl ExamStore for InMemoryStore {
    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, StoreError> {
        Ok(self.state()?.exams.clone())
    }

    async fn insert_exam_result(&self, result: &ExamResult) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.exams.iter().any(|existing| existing.id == result.id) {
            return Err(StoreError::Conflict);
        }
        state.exams.push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryStore {
        let mut room = Room::new("R1", "101", 2);
        room.occupants.push("S1".into());
        let mut placed = Student::new("S1", "Alice");
        placed.allocated_room_id = Some("R1".into());
        InMemoryStore::new(Fixtures {
            rooms: vec![room],
            students: vec![placed, Student::new("S2", "Bob")],
            ..Fixtures::default()
        })
    }

    #[tokio::test]
    async fn stale_allocation_is_not_applied() -> Result<(), StoreError> {
        let store = store();
        let stale = AllocationChange {
            room_id: "R1".into(),
            expected_occupants: Vec::new(),
            occupants: vec!["S2".into()],
            student_id: "S2".into(),
            expected_room_id: None,
            allocated_room_id: Some("R1".into()),
        };

        assert_eq!(store.commit_allocation(&stale).await, Err(StoreError::Conflict));

        let room = store.find_room_by_id(&"R1".into()).await?.unwrap();
        assert_eq!(room.occupants, vec![StudentId::new("S1")]);
        let student = store.find_student_by_id(&"S2".into()).await?.unwrap();
        assert_eq!(student.allocated_room_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn student_side_mismatch_leaves_room_untouched() -> Result<(), StoreError> {
        let store = store();
        let change = AllocationChange {
            room_id: "R1".into(),
            expected_occupants: vec!["S1".into()],
            occupants: vec!["S1".into(), "S2".into()],
            student_id: "S2".into(),
            expected_room_id: Some("R9".into()),
            allocated_room_id: Some("R1".into()),
        };

        assert_eq!(store.commit_allocation(&change).await, Err(StoreError::Conflict));
        let room = store.find_room_by_id(&"R1".into()).await?.unwrap();
        assert_eq!(room.occupants.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = store();
        store.set_offline(true);
        assert!(matches!(
            store.list_rooms().await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_offline(false);
        assert!(store.list_rooms().await.is_ok());
    }
}
