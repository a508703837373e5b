use crate::error_handling::types::SessionError;
use crate::protocol::SampleField;

/// Why a sample was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// A numeric value lies outside its physical range.
    OutOfRange {
        field: SampleField,
        invalid_value: f64,
        expected_range: &'static str,
    },
    /// The payload is structurally broken (absent, default timestamp, non-finite).
    Malformed { field: SampleField, details: String },
}

impl Rejection {
    pub fn field(&self) -> SampleField {
        match self {
            Rejection::OutOfRange { field, .. } | Rejection::Malformed { field, .. } => *field,
        }
    }

    /// Human-readable reason, as written to the reject log.
    pub fn reason(&self) -> String {
        match self {
            Rejection::OutOfRange {
                field,
                invalid_value,
                expected_range,
            } => format!(
                "{} {} outside expected range {}",
                field, invalid_value, expected_range
            ),
            Rejection::Malformed { field, details } => format!("{}: {}", field, details),
        }
    }

    /// An absent sample has no payload to write to the reject log.
    pub fn is_persistable(&self) -> bool {
        self.field() != SampleField::Sample
    }
}

impl From<Rejection> for SessionError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::OutOfRange {
                field,
                invalid_value,
                expected_range,
            } => SessionError::ValidationFailed {
                field,
                invalid_value,
                expected_range,
            },
            Rejection::Malformed { field, details } => {
                SessionError::MalformedSample { field, details }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}
