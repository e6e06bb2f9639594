use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a path-origin invariant violation.
    pub(crate) fn path_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Path, message)
    }

    /// Construct a metadata-origin configuration error.
    pub(crate) fn metadata_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Metadata, message)
    }

    /// Construct a resolver-origin internal error.
    pub(crate) fn resolver_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Resolver, message)
    }

    /// Construct a resolver-origin invariant violation.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn resolver_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Resolver,
            message,
        )
    }

    /// Construct a registry-origin not-found error.
    pub(crate) fn registry_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::TypeRegistry, message)
    }

    /// Construct an aggregation-origin protocol mismatch error.
    #[must_use]
    pub fn aggregation_protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Protocol, ErrorOrigin::Aggregation, message)
    }

    /// Construct an aggregation-origin configuration error.
    #[must_use]
    pub fn aggregation_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Aggregation, message)
    }

    /// Construct an aggregation-origin invariant violation.
    #[must_use]
    pub fn aggregation_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Aggregation,
            message,
        )
    }

    /// Construct a query-origin configuration error.
    #[must_use]
    pub fn query_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Query, message)
    }

    /// Construct a query-origin timeout error.
    #[must_use]
    pub fn query_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Timeout, ErrorOrigin::Query, message)
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.class, ErrorClass::Timeout)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Config,
    Internal,
    InvariantViolation,
    NotFound,
    Protocol,
    Timeout,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Protocol => "protocol",
            Self::Timeout => "timeout",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Aggregation,
    Metadata,
    Path,
    Query,
    Resolver,
    TypeRegistry,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aggregation => "aggregation",
            Self::Metadata => "metadata",
            Self::Path => "path",
            Self::Query => "query",
            Self::Resolver => "resolver",
            Self::TypeRegistry => "type_registry",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
