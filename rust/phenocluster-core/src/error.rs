// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

use std::ops::{Deref, DerefMut};

use http::StatusCode;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

// To keep the size of Result<T> small, we use a Box<InnerError> to store the
// actual error. This way, the size of Result<T> is just a pointer.
pub struct Error(pub Box<InnerError>);

/// The class of failure, for callers that need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An observation identifier could not be parsed as a URI.
    MalformedIdentifier,
    /// A clustering parameter or the dataset shape is unusable.
    InvalidParameter,
    /// A cluster lost all of its members during refinement.
    DegenerateCluster,
    /// A request payload could not be decoded.
    Parse,
}

impl Error {
    pub fn new(
        kind: ErrorKind,
        status: StatusCode,
        title: &'static str,
        details: impl Into<String>,
    ) -> Self {
        Self(Box::new(InnerError {
            kind,
            title,
            details: details.into(),
            status_code: status,
            cause: None,
            backtrace: MaybeBacktrace::None,
        }))
    }

    #[track_caller]
    pub fn malformed_identifier(details: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::MalformedIdentifier,
            StatusCode::BAD_REQUEST,
            "Malformed identifier",
            details,
        )
        .with_location()
    }

    #[track_caller]
    pub fn invalid_parameter(details: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::InvalidParameter,
            StatusCode::BAD_REQUEST,
            "Invalid parameter",
            details,
        )
        .with_location()
    }

    #[track_caller]
    pub fn degenerate_cluster(cluster: usize, details: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::DegenerateCluster,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Degenerate cluster",
            format!("cluster {}: {}", cluster, details.into()),
        )
        .with_location()
    }

    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.0.cause = Some(Box::new(cause));
        self
    }

    #[track_caller]
    pub fn with_location(mut self) -> Self {
        self.0.backtrace = MaybeBacktrace::Location(std::panic::Location::caller());
        self
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.details)?;
        if f.alternate() {
            write!(f, " ({})", self.status_code)?;
            match &self.backtrace {
                MaybeBacktrace::Location(loc) => write!(f, ", at {}", loc)?,
                MaybeBacktrace::None => {}
            }
            if let Some(cause) = &self.cause {
                write!(f, "\ncaused by: {}", cause)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self) // Re-use Debug impl
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|e| e.as_ref() as _)
    }
}

impl Deref for Error {
    type Target = InnerError;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Error {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Phenocluster's generic error.
///
/// Errors can be classified at three levels:
///
/// * status_code: generic kind of error, expressed as the HTTP status the
///   hosting REST layer should answer with.
/// * title: a specific kind of error. For example, "Malformed identifier".
/// * details: the details for an instance of the error.
pub struct InnerError {
    pub kind: ErrorKind,
    /// A short description of the error, the same for all instances.
    pub title: &'static str,
    /// A longer description, specific to the instance. For example,
    /// "'not a uri' is not a valid observation URI: relative URL without a base".
    pub details: String,
    /// An HTTP status code that best describes the error.
    pub status_code: StatusCode,
    /// The underlying cause of the error, if any.
    pub cause: Option<BoxedError>,
    /// Where the error was raised, if known.
    pub backtrace: MaybeBacktrace,
}

pub enum MaybeBacktrace {
    Location(&'static std::panic::Location<'static>),
    None,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<url::ParseError> for Error {
    #[track_caller]
    fn from(e: url::ParseError) -> Self {
        Self::malformed_identifier(e.to_string()).with_cause(e)
    }
}

impl From<serde_json::Error> for Error {
    #[track_caller]
    fn from(e: serde_json::Error) -> Self {
        Self::new(
            ErrorKind::Parse,
            StatusCode::BAD_REQUEST,
            "JSON parse error",
            e.to_string(),
        )
        .with_cause(e)
        .with_location()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_caller_location_capture() {
        let f = || -> Result<()> {
            url::Url::parse("no scheme here")?;
            Ok(())
        };
        let err = f().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedIdentifier);
        match &err.backtrace {
            MaybeBacktrace::Location(location) => {
                assert_eq!(location.file(), file!());
            }
            _ => panic!("expected a captured location"),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::invalid_parameter("k must be positive").status_code,
            StatusCode::BAD_REQUEST
        );
        let err = Error::degenerate_cluster(3, "no members");
        assert_eq!(err.status_code, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), ErrorKind::DegenerateCluster);
        assert_eq!(err.to_string(), "Degenerate cluster: cluster 3: no members");
    }

    #[test]
    fn test_json_error_keeps_cause() {
        let err: Error = serde_json::from_str::<f64>("{").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{:#?}", err).contains("caused by"));
    }
}
