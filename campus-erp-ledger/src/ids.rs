use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a hostel room, e.g. `R001`.
    RoomId
);
opaque_id!(
    /// Identifier of an admitted student, e.g. `S001`.
    StudentId
);
opaque_id!(
    /// Identifier of a class section attendance is taken for.
    ClassId
);
opaque_id!(AdmissionId);
opaque_id!(
    /// Identifier of a recorded fee payment.
    FeeId
);
opaque_id!(ExamResultId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let id = StudentId::new("S001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"S001\"");
        let back: StudentId = serde_json::from_str("\"S001\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "S001");
    }
}
