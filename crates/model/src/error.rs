use crate::core::data_type::DataType;
use std::fmt;
use thiserror::Error;

/// Why a raw value was refused by a [`DataType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    NotParseable,
    Infinite,
    OutsideSafeRange,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationReason::NotParseable => "value is not parseable",
            ValidationReason::Infinite => "value is infinite",
            ValidationReason::OutsideSafeRange => "value is outside the safe integer range",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid {data_type} value '{value}': {reason}")]
pub struct ValidationError {
    pub data_type: DataType,
    pub value: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(data_type: DataType, value: &str, reason: ValidationReason) -> Self {
        Self {
            data_type,
            value: value.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier '{0}' exceeds 63 bytes")]
    TooLong(String),

    #[error("Identifier '{ident}' contains a disallowed character {ch:?}")]
    InvalidChar { ident: String, ch: char },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown data type: {0}")]
pub struct UnknownTypeError(pub String);
