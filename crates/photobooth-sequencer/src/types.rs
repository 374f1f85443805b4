//! Shared error type for the photobooth core.

/// Errors produced while parsing configuration or wire data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoothError {
    /// A query-string parameter had a value that could not be parsed.
    #[error("invalid value {value:?} for parameter `{key}`")]
    InvalidParameter {
        /// Parameter name as it appeared in the query string.
        key: String,
        /// Raw (decoded) value.
        value: String,
    },

    /// A form-encoded string contained a broken `%XX` escape or
    /// decoded to invalid UTF-8.
    #[error("malformed form encoding: {0:?}")]
    MalformedEncoding(String),

    /// Configuration values violate an invariant (e.g. a zero tick).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A backend reply body was not the expected JSON shape.
    #[error("unexpected reply from backend: {0}")]
    UnexpectedReply(String),
}
