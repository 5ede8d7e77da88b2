use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single field could not be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// The node, attribute or payload key the field reads from is absent.
    FieldMissing,
    /// The source is present but does not have the expected shape.
    FieldMalformed,
    /// Any other fault raised while the field extractor ran.
    Unexpected,
}

/// The failure a field extractor returns. It never leaves the engine: the
/// engine turns it into an `ExtractionError` and moves on to the next field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("field missing: {0}")]
    Missing(String),
    #[error("field malformed: {0}")]
    Malformed(String),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl FieldError {
    pub fn missing(message: impl Into<String>) -> Self {
        FieldError::Missing(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        FieldError::Malformed(message.into())
    }

    pub fn kind(&self) -> FieldErrorKind {
        match self {
            FieldError::Missing(_) => FieldErrorKind::FieldMissing,
            FieldError::Malformed(_) => FieldErrorKind::FieldMalformed,
            FieldError::Unexpected(_) => FieldErrorKind::Unexpected,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldError::Missing(m) | FieldError::Malformed(m) | FieldError::Unexpected(m) => m,
        }
    }
}

pub type FieldResult<T> = Result<T, FieldError>;

/// A typed key lookup on the linked-data payload that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("linked data has no `{0}` key")]
    Absent(String),
    #[error("linked data key `{key}` is not {expected}")]
    WrongType { key: String, expected: &'static str },
}

impl From<LookupError> for FieldError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Absent(_) => FieldError::Missing(err.to_string()),
            LookupError::WrongType { .. } => FieldError::Malformed(err.to_string()),
        }
    }
}

/// One failed field, as recorded in an `ExtractionResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl ExtractionError {
    pub fn new(field: &str, error: &FieldError) -> Self {
        Self {
            field: field.to_string(),
            kind: error.kind(),
            message: error.message().to_string(),
        }
    }
}

/// A failure that makes the whole document meaningless, as opposed to a
/// single field. Returned to the caller instead of a partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("{document}: no identifier could be derived from `{field}` ({kind:?}): {message}")]
    Unidentifiable {
        document: &'static str,
        field: String,
        kind: FieldErrorKind,
        message: String,
    },
}

/// Errors raised while loading an `ExtractorConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_map_to_field_kinds() {
        let absent: FieldError = LookupError::Absent("name".into()).into();
        assert_eq!(absent.kind(), FieldErrorKind::FieldMissing);
        assert!(absent.message().contains("`name`"));

        let wrong: FieldError = LookupError::WrongType {
            key: "duration".into(),
            expected: "a string",
        }
        .into();
        assert_eq!(wrong.kind(), FieldErrorKind::FieldMalformed);
        assert_eq!(wrong.message(), "linked data key `duration` is not a string");
    }

    #[test]
    fn test_extraction_error_copies_kind_and_message() {
        let err = ExtractionError::new("title", &FieldError::missing("no h1"));
        assert_eq!(err.field, "title");
        assert_eq!(err.kind, FieldErrorKind::FieldMissing);
        assert_eq!(err.message, "no h1");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FieldErrorKind::FieldMalformed).unwrap();
        assert_eq!(json, "\"field_malformed\"");
    }
}
