use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::ids::{ExamResultId, StudentId};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResultForm {
    pub student_id: StudentId,
    pub subject: String,
    pub marks: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: ExamResultId,
    pub student_id: StudentId,
    pub subject: String,
    pub marks: i32,
    pub created_at: DateTime<Utc>,
}

impl ExamResultForm {
    pub fn validate(&self) -> Result<(), ExamError> {
        if self.student_id.as_str().trim().is_empty() {
            return Err(ExamError::Invalid {
                field: "studentId",
                message: "student id is required",
            });
        }
        if self.subject.trim().is_empty() {
            return Err(ExamError::Invalid {
                field: "subject",
                message: "subject is required",
            });
        }
        if self.marks < 0 {
            return Err(ExamError::Invalid {
                field: "marks",
                message: "marks must not be negative",
            });
        }
        Ok(())
    }

    pub fn into_result(
        self,
        id: ExamResultId,
        created_at: DateTime<Utc>,
    ) -> Result<ExamResult, ExamError> {
        self.validate()?;
        Ok(ExamResult {
            id,
            student_id: self.student_id.as_str().trim().into(),
            subject: self.subject.trim().to_owned(),
            marks: self.marks,
            created_at,
        })
    }
}

/// Mean over all results, `0.0` when there are none.
#[must_use]
pub fn average_marks(results: &[ExamResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let (total, count) = results
        .iter()
        .fold((0.0, 0.0), |(total, count), result| {
            (total + f64::from(result.marks), count + 1.0)
        });
    total / count
}
