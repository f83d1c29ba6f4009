use thiserror::Error;

#[derive(Debug, Error)]
pub enum PechaError {
    /// The tokens handed back by the tokenizer don't concatenate to the text they were made from.
    #[error("token concatenation diverges from the text at char {offset}: expected {expected:?}, found {found:?}")]
    SegmentationMismatch {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("missing '{language}' in {field}")]
    MissingLanguageField {
        field: &'static str,
        language: String,
    },

    #[error("'{language}' has {translation_count} segments but the root text has {source_count}")]
    SegmentCountMismatch {
        language: String,
        source_count: usize,
        translation_count: usize,
    },

    #[error("invalid segmentation: {message}")]
    InvalidSegmentation { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{operation} failed: {message}")]
    UploadTransport {
        operation: &'static str,
        message: String,
    },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PechaError {
    pub(crate) fn missing(field: &'static str, language: &str) -> Self {
        Self::MissingLanguageField {
            field,
            language: language.to_string(),
        }
    }

    pub(crate) fn transport(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::UploadTransport {
            operation,
            message: err.to_string(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PechaError>;
