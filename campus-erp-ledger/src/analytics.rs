//! Campus-wide figures for the administration dashboard.

use serde::Serialize;

use crate::admission::Admission;
use crate::attendance::{self, ClassAttendance};
use crate::exam::{self, ExamResult};
use crate::fee::{self, FeePayment};
use crate::hostel::Student;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusAnalytics {
    pub total_students: usize,
    pub total_admissions: usize,
    pub total_fees_collected_cents: i64,
    /// Present marks across every attendance sheet.
    pub total_present: usize,
    pub total_absent: usize,
    pub average_marks: f64,
}

#[must_use]
pub fn compute(
    students: &[Student],
    admissions: &[Admission],
    payments: &[FeePayment],
    sheets: &[ClassAttendance],
    results: &[ExamResult],
) -> CampusAnalytics {
    let (total_present, total_absent) = sheets
        .iter()
        .map(attendance::summarize)
        .fold((0, 0), |(present, absent), summary| {
            (present + summary.present_count, absent + summary.absent_count)
        });
    CampusAnalytics {
        total_students: students.len(),
        total_admissions: admissions.len(),
        total_fees_collected_cents: fee::total_collected(payments),
        total_present,
        total_absent,
        average_marks: exam::average_marks(results),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::exam::ExamResultForm;
    use crate::fee::FeePaymentForm;

    fn sheet(class_id: &str, statuses: &[AttendanceStatus]) -> ClassAttendance {
        let at = Utc::now();
        ClassAttendance {
            class_id: class_id.into(),
            date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
            records: statuses
                .iter()
                .enumerate()
                .map(|(index, &status)| AttendanceRecord::new(format!("S{index}"), status))
                .collect(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn counts_marks_across_all_sheets() {
        use AttendanceStatus::{Absent, Present};

        let at = Utc::now();
        let payment = FeePaymentForm {
            student_id: "S1".into(),
            student_name: "Alice".to_owned(),
            amount_cents: 120_000,
        }
        .into_payment("FEE1".into(), at)
        .unwrap();
        let result = ExamResultForm {
            student_id: "S1".into(),
            subject: "Physics".to_owned(),
            marks: 64,
        }
        .into_result("EXM1".into(), at)
        .unwrap();

        let analytics = compute(
            &[Student::new("S1", "Alice"), Student::new("S2", "Bob")],
            &[],
            &[payment.clone(), payment],
            &[
                sheet("C1", &[Present, Absent, Present]),
                sheet("C2", &[Absent, Absent]),
            ],
            &[result],
        );

        assert_eq!(
            analytics,
            CampusAnalytics {
                total_students: 2,
                total_admissions: 0,
                total_fees_collected_cents: 240_000,
                total_present: 2,
                total_absent: 3,
                average_marks: 64.0,
            }
        );
    }

    #[test]
    fn empty_campus_is_all_zero() {
        let analytics = compute(&[], &[], &[], &[], &[]);
        assert_eq!(analytics.total_present + analytics.total_absent, 0);
        assert_eq!(analytics.total_fees_collected_cents, 0);
        assert!(analytics.average_marks.abs() < f64::EPSILON);
    }
}
