use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdmissionError;
use crate::ids::AdmissionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdmissionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for AdmissionStatus {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Approve => Self::Approved,
            Decision::Reject => Self::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionApplication {
    pub student_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub course: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub id: AdmissionId,
    pub student_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub course: String,
    pub status: AdmissionStatus,
    pub applied_at: DateTime<Utc>,
}

impl AdmissionApplication {
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if self.student_name.trim().is_empty() {
            return Err(AdmissionError::Invalid {
                field: "studentName",
                message: "student name is required",
            });
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(AdmissionError::Invalid {
                field: "email",
                message: "invalid email address",
            });
        }
        if self.course.trim().is_empty() {
            return Err(AdmissionError::Invalid {
                field: "course",
                message: "course is required",
            });
        }
        Ok(())
    }

    pub fn into_admission(
        self,
        id: AdmissionId,
        applied_at: DateTime<Utc>,
    ) -> Result<Admission, AdmissionError> {
        self.validate()?;
        Ok(Admission {
            id,
            student_name: self.student_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            date_of_birth: self.date_of_birth,
            course: self.course.trim().to_owned(),
            status: AdmissionStatus::Pending,
            applied_at,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Only pending applications can be decided on.
pub fn review(admission: &Admission, decision: Decision) -> Result<Admission, AdmissionError> {
    if admission.status != AdmissionStatus::Pending {
        return Err(AdmissionError::AlreadyReviewed(admission.id.clone()));
    }
    Ok(Admission {
        status: decision.into(),
        ..admission.clone()
    })
}
