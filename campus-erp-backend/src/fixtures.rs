//! Demo data served when no database is configured.

use campus_erp_ledger::admission::{Admission, AdmissionStatus};
use campus_erp_ledger::attendance::{
    AttendanceRecord, AttendanceStatus, ClassAttendance, EnrolledStudent,
};
use campus_erp_ledger::hostel::{Room, Student};
use campus_erp_ledger::Fixtures;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const ROOMS: [(&str, &str, u32, &[&str]); 5] = [
    ("R001", "101", 2, &["S001"]),
    ("R002", "102", 2, &["S002", "S003"]),
    ("R003", "103", 1, &[]),
    ("R004", "104", 3, &["S004", "S005"]),
    ("R005", "105", 2, &[]),
];

const STUDENTS: [(&str, &str, Option<&str>, &str); 7] = [
    ("S001", "Alice Johnson", Some("R001"), "CS101"),
    ("S002", "Bob Williams", Some("R002"), "CS101"),
    ("S003", "Charlie Brown", Some("R002"), "CS101"),
    ("S004", "Diana Prince", Some("R004"), "CS101"),
    ("S005", "Eve Adams", Some("R004"), "EE102"),
    ("S006", "Frank Green", None, "EE102"),
    ("S007", "Grace Hall", None, "EE102"),
];

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("fixture date out of range"),
    }
}

const ATTENDANCE_TAKEN: NaiveDate = date(2025, 9, 15);

const ADMISSIONS: [(&str, &str, &str, &str, AdmissionStatus, NaiveDate, NaiveDate); 5] = [
    (
        "ADM001",
        "Alice Johnson",
        "alice.johnson@example.edu",
        "Computer Science",
        AdmissionStatus::Pending,
        date(2006, 1, 15),
        date(2025, 9, 15),
    ),
    (
        "ADM002",
        "Bob Williams",
        "bob.williams@example.edu",
        "Electrical Engineering",
        AdmissionStatus::Approved,
        date(2006, 1, 14),
        date(2025, 9, 14),
    ),
    (
        "ADM003",
        "Charlie Brown",
        "charlie.brown@example.edu",
        "Mechanical Engineering",
        AdmissionStatus::Rejected,
        date(2006, 1, 13),
        date(2025, 9, 13),
    ),
    (
        "ADM004",
        "Diana Prince",
        "diana.prince@example.edu",
        "Physics",
        AdmissionStatus::Pending,
        date(2006, 1, 12),
        date(2025, 9, 12),
    ),
    (
        "ADM005",
        "Eve Adams",
        "eve.adams@example.edu",
        "Chemistry",
        AdmissionStatus::Pending,
        date(2006, 1, 11),
        date(2025, 9, 11),
    ),
];

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

#[must_use]
pub fn demo() -> Fixtures {
    let rooms = ROOMS
        .iter()
        .map(|&(id, number, capacity, occupants)| Room {
            occupants: occupants.iter().map(|&occupant| occupant.into()).collect(),
            ..Room::new(id, number, capacity)
        })
        .collect();
    let students = STUDENTS
        .iter()
        .map(|&(id, name, room, _)| Student {
            allocated_room_id: room.map(Into::into),
            ..Student::new(id, name)
        })
        .collect();
    let enrolled = STUDENTS
        .iter()
        .map(|&(id, name, _, class)| EnrolledStudent::new(id, name, class))
        .collect();

    let attendance = vec![ClassAttendance {
        class_id: "CS101".into(),
        date: ATTENDANCE_TAKEN,
        records: vec![
            AttendanceRecord::new("S001", AttendanceStatus::Present),
            AttendanceRecord::new("S002", AttendanceStatus::Absent),
            AttendanceRecord::new("S003", AttendanceStatus::Present),
            AttendanceRecord::new("S004", AttendanceStatus::Present),
        ],
        created_at: midnight(ATTENDANCE_TAKEN),
        updated_at: midnight(ATTENDANCE_TAKEN),
    }];

    // oldest application first
    let admissions = ADMISSIONS
        .iter()
        .rev()
        .map(|&(id, name, email, course, status, born, applied)| Admission {
            id: id.into(),
            student_name: name.to_owned(),
            email: email.to_owned(),
            date_of_birth: born,
            course: course.to_owned(),
            status,
            applied_at: midnight(applied),
        })
        .collect();

    Fixtures {
        rooms,
        students,
        enrolled,
        attendance,
        admissions,
        ..Fixtures::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooms_and_students_agree() {
        let fixtures = demo();
        for room in &fixtures.rooms {
            assert!(room.occupants.len() <= room.capacity as usize);
            for occupant in &room.occupants {
                let student = fixtures
                    .students
                    .iter()
                    .find(|student| &student.id == occupant)
                    .unwrap();
                assert_eq!(student.allocated_room_id.as_ref(), Some(&room.id));
            }
        }
        for student in &fixtures.students {
            if let Some(room_id) = &student.allocated_room_id {
                let room = fixtures.rooms.iter().find(|room| &room.id == room_id).unwrap();
                assert!(room.contains(&student.id));
            }
        }
    }

    #[test]
    fn admissions_are_in_submission_order() {
        let admissions = demo().admissions;
        assert_eq!(admissions.len(), 5);
        assert!(admissions
            .windows(2)
            .all(|pair| pair[0].applied_at <= pair[1].applied_at));
        assert_eq!(admissions[0].id.as_str(), "ADM005");
    }

    #[test]
    fn dates_are_the_intended_ones() {
        let fixtures = demo();
        assert_eq!(fixtures.attendance[0].date.to_string(), "2025-09-15");
        let born: Vec<_> = fixtures
            .admissions
            .iter()
            .map(|admission| admission.date_of_birth.to_string())
            .collect();
        assert_eq!(
            born,
            ["2006-01-11", "2006-01-12", "2006-01-13", "2006-01-14", "2006-01-15"]
        );
        assert!(fixtures
            .admissions
            .iter()
            .all(|admission| admission.applied_at.date_naive() > NaiveDate::default()));
    }
}
