use thiserror::Error;

/// Main library error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Response parsing error: {details}")]
    Parse { details: String },

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Argument error: {0}")]
    Argument(#[from] ArgumentError),

    #[error("Endpoint binding error: {0}")]
    Binder(#[from] BinderError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },
}

impl Error {
    /// True for network and HTTP-layer failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::Timeout { .. }
        )
    }

    /// The remote error, if the server answered with an `<error>` envelope
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Error reported by the remote API inside a well-formed envelope.
///
/// Carries the envelope timestamps so callers can still learn the server
/// clock and the retry horizon when a call fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("APIError({code}) {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
    pub timestamp: i64,
    pub expires: i64,
}

/// Caller misuse of an endpoint's declared parameter list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{endpoint} takes at most {max} arguments ({given} given)")]
    TooManyArguments {
        endpoint: String,
        max: usize,
        given: usize,
    },

    #[error("{endpoint} missing required argument: {name}")]
    MissingArgument { endpoint: String, name: String },

    #[error("{endpoint} got an unexpected keyword argument: {name}")]
    UnexpectedKeyword { endpoint: String, name: String },

    #[error("{endpoint} got multiple values for argument: {name}")]
    DuplicateArgument { endpoint: String, name: String },
}

/// Defects in an endpoint declaration, as opposed to bad runtime input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinderError {
    #[error("{endpoint} has no remote name for parameter: {name}")]
    UnmappedParameter { endpoint: String, name: String },

    #[error("{endpoint} requires property {name} from its owner")]
    MissingProperty { endpoint: String, name: String },
}

/// Domain parser failures on an unexpected XML shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Missing element: {element}")]
    MissingElement { element: String },

    #[error("Missing field: {field} on {element}")]
    MissingField { element: String, field: String },

    #[error("Invalid field: {field} = {value:?} on {element}")]
    InvalidField {
        element: String,
        field: String,
        value: String,
    },
}

/// Date-time text that does not follow the API's fixed format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Invalid timestamp format: {value:?}")]
    Format { value: String },

    #[error("Timestamp out of range: {value}")]
    OutOfRange { value: i64 },
}

/// Cache-specific error types
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache write error: {key} - {details}")]
    WriteError { key: String, details: String },

    #[error("Cache read error: {key} - {details}")]
    ReadError { key: String, details: String },

    #[error("Cache corruption detected: {key} - {details}")]
    Corruption { key: String, details: String },

    #[error("Cache cleanup failed: {details}")]
    CleanupFailed { details: String },
}

/// Low-level XML syntax errors
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Syntax(#[from] roxmltree::Error),

    #[error("Unexpected document shape: {0}")]
    Shape(String),
}

// Error conversion implementations
impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        Error::Cache(err.to_string())
    }
}

impl From<XmlError> for Error {
    fn from(err: XmlError) -> Self {
        Error::Parse {
            details: err.to_string(),
        }
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;
