//! Hostel room allocation rules.
//!
//! Everything here works on snapshots supplied by the caller and never touches storage. A
//! rejected precondition returns before anything is cloned, so failures have no side effects.

use serde::{Deserialize, Serialize};

use crate::error::AllocationError;
use crate::ids::{RoomId, StudentId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub capacity: u32,
    /// Student ids in the order they moved in.
    pub occupants: Vec<StudentId>,
}

impl Room {
    #[must_use]
    pub fn new(id: impl Into<RoomId>, room_number: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            room_number: room_number.into(),
            capacity,
            occupants: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_space(&self) -> bool {
        u32::try_from(self.occupants.len()).is_ok_and(|count| count < self.capacity)
    }

    #[must_use]
    pub fn contains(&self, student: &StudentId) -> bool {
        self.occupants.contains(student)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub allocated_room_id: Option<RoomId>,
}

impl Student {
    #[must_use]
    pub fn new(id: impl Into<StudentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            allocated_room_id: None,
        }
    }
}

/// The paired write for one allocation or deallocation.
///
/// Stores apply both sides or neither, and only while the stored room still has
/// `expected_occupants` and the stored student still has `expected_room_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationChange {
    pub room_id: RoomId,
    pub expected_occupants: Vec<StudentId>,
    pub occupants: Vec<StudentId>,
    pub student_id: StudentId,
    pub expected_room_id: Option<RoomId>,
    pub allocated_room_id: Option<RoomId>,
}

impl AllocationChange {
    fn between(before: (&Room, &Student), after: (&Room, &Student)) -> Self {
        Self {
            room_id: after.0.id.clone(),
            expected_occupants: before.0.occupants.clone(),
            occupants: after.0.occupants.clone(),
            student_id: after.1.id.clone(),
            expected_room_id: before.1.allocated_room_id.clone(),
            allocated_room_id: after.1.allocated_room_id.clone(),
        }
    }
}

/// Result of a successful allocation or deallocation: both updated sides and the write that
/// persists them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub room: Room,
    pub student: Student,
    pub change: AllocationChange,
}

impl AllocationOutcome {
    fn new(before: (&Room, &Student), room: Room, student: Student) -> Self {
        let change = AllocationChange::between(before, (&room, &student));
        Self {
            room,
            student,
            change,
        }
    }

    #[must_use]
    pub fn into_pair(self) -> (Room, Student) {
        (self.room, self.student)
    }
}

/// A room together with the names of the students living in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub id: RoomId,
    pub room_number: String,
    pub capacity: u32,
    pub occupants: Vec<Occupant>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Occupant {
    pub id: StudentId,
    /// `None` when the occupant id has no matching student record.
    pub name: Option<String>,
}

/// Moves `student_id` into `room_id`.
///
/// Checks run in a fixed order and the first failure wins: the student must exist and be
/// unallocated, then the room must exist and have a free bed.
pub fn allocate(
    student_id: &StudentId,
    student: Option<&Student>,
    room_id: &RoomId,
    room: Option<&Room>,
) -> Result<AllocationOutcome, AllocationError> {
    let student = student.ok_or_else(|| AllocationError::StudentNotFound(student_id.clone()))?;
    if let Some(current) = &student.allocated_room_id {
        return Err(AllocationError::AlreadyAllocated {
            student: student_id.clone(),
            room: current.clone(),
        });
    }
    let room = room.ok_or_else(|| AllocationError::RoomNotFound(room_id.clone()))?;
    if !room.has_space() {
        return Err(AllocationError::RoomFull {
            room: room_id.clone(),
            capacity: room.capacity,
        });
    }

    let mut allocated_room = room.clone();
    allocated_room.occupants.push(student_id.clone());
    let mut allocated_student = student.clone();
    allocated_student.allocated_room_id = Some(room_id.clone());
    Ok(AllocationOutcome::new(
        (room, student),
        allocated_room,
        allocated_student,
    ))
}

/// Moves `student_id` out of `room_id`.
pub fn deallocate(
    student_id: &StudentId,
    student: Option<&Student>,
    room_id: &RoomId,
    room: Option<&Room>,
) -> Result<AllocationOutcome, AllocationError> {
    let Some(room) = room.filter(|room| room.contains(student_id)) else {
        return Err(AllocationError::NotAllocatedHere {
            student: student_id.clone(),
            room: room_id.clone(),
        });
    };
    let student = student.ok_or_else(|| AllocationError::StudentNotFound(student_id.clone()))?;

    let mut vacated_room = room.clone();
    vacated_room.occupants.retain(|occupant| occupant != student_id);
    let mut vacated_student = student.clone();
    vacated_student.allocated_room_id = None;
    Ok(AllocationOutcome::new(
        (room, student),
        vacated_room,
        vacated_student,
    ))
}

#[must_use]
pub fn available_rooms(rooms: &[Room]) -> Vec<Room> {
    rooms.iter().filter(|room| room.has_space()).cloned().collect()
}

#[must_use]
pub fn unallocated_students(students: &[Student]) -> Vec<Student> {
    students
        .iter()
        .filter(|student| student.allocated_room_id.is_none())
        .cloned()
        .collect()
}

#[must_use]
pub fn occupancy(rooms: &[Room], students: &[Student]) -> Vec<RoomOccupancy> {
    rooms
        .iter()
        .map(|room| RoomOccupancy {
            id: room.id.clone(),
            room_number: room.room_number.clone(),
            capacity: room.capacity,
            occupants: room
                .occupants
                .iter()
                .map(|occupant| Occupant {
                    id: occupant.clone(),
                    name: students
                        .iter()
                        .find(|student| &student.id == occupant)
                        .map(|student| student.name.clone()),
                })
                .collect(),
        })
        .collect()
}
