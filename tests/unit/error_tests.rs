use eveapi::config::ConfigError;
use eveapi::{ApiError, ArgumentError, CacheError, Error, ParserError, TimestampError};

#[test]
fn test_api_error_display() {
    let err = Error::from(ApiError {
        code: 203,
        message: "Authentication failure.".to_string(),
        timestamp: 1,
        expires: 2,
    });
    assert_eq!(err.to_string(), "APIError(203) Authentication failure.");
    assert_eq!(err.as_api_error().map(|e| e.code), Some(203));
    assert!(!err.is_transport());
}

#[test]
fn test_transport_errors_are_grouped() {
    let status = Error::HttpStatus {
        url: "https://api.eveonline.com/server/ServerStatus.xml.aspx".to_string(),
        status: 503,
        message: "HTTP 503: Service Unavailable".to_string(),
    };
    assert!(status.is_transport());
    assert!(status.to_string().contains("503"));

    let timeout = Error::Timeout {
        url: "https://api.eveonline.com/".to_string(),
        timeout_seconds: 60,
    };
    assert!(timeout.is_transport());
    assert!(!Error::Parse { details: "x".to_string() }.is_transport());
}

#[test]
fn test_error_conversions() {
    let err: Error = ArgumentError::MissingArgument {
        endpoint: "eve/CharacterName".to_string(),
        name: "ids".to_string(),
    }
    .into();
    assert!(err.to_string().contains("missing required argument: ids"));

    let err: Error = ParserError::MissingField {
        element: "row".to_string(),
        field: "itemID".to_string(),
    }
    .into();
    assert!(matches!(err, Error::Parser(_)));

    let err: Error = TimestampError::Format {
        value: "soon".to_string(),
    }
    .into();
    assert!(matches!(err, Error::Timestamp(_)));

    let err: Error = CacheError::CleanupFailed {
        details: "disk full".to_string(),
    }
    .into();
    assert!(matches!(err, Error::Cache(ref msg) if msg.contains("disk full")));

    let err: Error = ConfigError::Validation("bad".to_string()).into();
    assert!(matches!(err, Error::Config(_)));
}
