use thiserror::Error;

use crate::ids::{AdmissionId, RoomId, StudentId};

/// Failure reported by a persistence adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A guarded write found the stored state different from what it expected.
    #[error("stored state changed concurrently")]
    Conflict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("student {student} is already allocated to room {room}")]
    AlreadyAllocated { student: StudentId, room: RoomId },
    #[error("room {0} not found")]
    RoomNotFound(RoomId),
    #[error("room {room} is full ({capacity} occupants)")]
    RoomFull { room: RoomId, capacity: u32 },
    #[error("student {student} is not allocated to room {room}")]
    NotAllocatedHere { student: StudentId, room: RoomId },
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("allocation changed concurrently, reload and try again")]
    Conflict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("student {0} is marked more than once")]
    DuplicateStudent(StudentId),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("attendance changed concurrently, reload and try again")]
    Conflict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("admission {0} not found")]
    AdmissionNotFound(AdmissionId),
    #[error("admission {0} has already been reviewed")]
    AlreadyReviewed(AdmissionId),
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("admission changed concurrently, reload and try again")]
    Conflict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("fee payment was recorded twice")]
    Conflict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExamError {
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("exam result was uploaded twice")]
    Conflict,
}

macro_rules! from_store_error {
    ($($error:ident),*) => {
        $(
            impl From<StoreError> for $error {
                fn from(value: StoreError) -> Self {
                    match value {
                        StoreError::Unavailable(reason) => Self::StorageUnavailable(reason),
                        StoreError::Conflict => Self::Conflict,
                    }
                }
            }
        )*
    };
}

from_store_error!(AllocationError, AttendanceError, AdmissionError, FeeError, ExamError);
