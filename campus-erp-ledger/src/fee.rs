use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeeError;
use crate::ids::{FeeId, StudentId};

/// A payment as entered at the fee desk. Amounts are in cents.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePaymentForm {
    pub student_id: StudentId,
    pub student_name: String,
    pub amount_cents: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePayment {
    pub id: FeeId,
    pub student_id: StudentId,
    pub student_name: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl FeePaymentForm {
    pub fn validate(&self) -> Result<(), FeeError> {
        if self.student_id.as_str().trim().is_empty() {
            return Err(FeeError::Invalid {
                field: "studentId",
                message: "student id is required",
            });
        }
        if self.student_name.trim().is_empty() {
            return Err(FeeError::Invalid {
                field: "studentName",
                message: "student name is required",
            });
        }
        if self.amount_cents <= 0 {
            return Err(FeeError::Invalid {
                field: "amountCents",
                message: "amount must be greater than 0",
            });
        }
        Ok(())
    }

    pub fn into_payment(
        self,
        id: FeeId,
        created_at: DateTime<Utc>,
    ) -> Result<FeePayment, FeeError> {
        self.validate()?;
        Ok(FeePayment {
            id,
            student_id: self.student_id.as_str().trim().into(),
            student_name: self.student_name.trim().to_owned(),
            amount_cents: self.amount_cents,
            created_at,
        })
    }
}

/// Sum of all payments in cents, saturating instead of wrapping.
#[must_use]
pub fn total_collected(payments: &[FeePayment]) -> i64 {
    payments
        .iter()
        .fold(0_i64, |total, payment| total.saturating_add(payment.amount_cents))
}
