use searchsync_core::error::{ErrorClass, InternalError};
use thiserror::Error as ThisError;

///
/// AggregationError
///
/// Failures raised while building aggregation request bodies or extracting
/// typed results from a backend response.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum AggregationError {
    /// A building-context slot was read before being written, or written
    /// with a value of the wrong type.
    #[error("building context misuse: {detail}")]
    BuildingContext { detail: String },

    /// A composite member failed; the whole composite fails.
    #[error("composite member {index} failed: {source}")]
    Composite {
        index: usize,
        #[source]
        source: Box<AggregationError>,
    },

    /// A filter was requested for a field that is not under a nested path,
    /// which this engine never emits.
    #[error("filter on '{field}' requires a nested context")]
    FilterWithoutNestedContext { field: String },

    /// The response object has no entry where the request placed one.
    #[error("missing aggregation data at '{path}'")]
    MissingData { path: String },

    /// The response entry exists but does not have the shape the
    /// aggregation emitted a request for.
    #[error("unexpected aggregation shape at '{path}': {detail}")]
    UnexpectedShape { path: String, detail: String },
}

impl AggregationError {
    #[must_use]
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingData { path: path.into() }
    }

    #[must_use]
    pub fn shape(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            path: path.into(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn context(detail: impl Into<String>) -> Self {
        Self::BuildingContext {
            detail: detail.into(),
        }
    }

    pub(crate) fn composite(index: usize, source: Self) -> Self {
        Self::Composite {
            index,
            source: Box::new(source),
        }
    }
}

impl From<AggregationError> for InternalError {
    fn from(err: AggregationError) -> Self {
        let message = err.to_string();
        match err.class() {
            ErrorClass::Config => Self::aggregation_config(message),
            ErrorClass::InvariantViolation => Self::aggregation_invariant(message),
            _ => Self::aggregation_protocol(message),
        }
    }
}

impl AggregationError {
    // Composite wraps another error; its class is the class of the
    // innermost cause.
    fn class(&self) -> ErrorClass {
        match self {
            Self::MissingData { .. } | Self::UnexpectedShape { .. } => ErrorClass::Protocol,
            Self::FilterWithoutNestedContext { .. } => ErrorClass::Config,
            Self::BuildingContext { .. } => ErrorClass::InvariantViolation,
            Self::Composite { source, .. } => source.class(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::AggregationError;
    use searchsync_core::error::{ErrorClass, ErrorOrigin, InternalError};

    #[test]
    fn conversion_classifies_by_variant_under_the_aggregation_origin() {
        let missing = InternalError::from(AggregationError::missing("aggregations.agg_0"));
        assert_eq!(missing.class, ErrorClass::Protocol);
        assert_eq!(missing.origin, ErrorOrigin::Aggregation);

        let filter = InternalError::from(AggregationError::FilterWithoutNestedContext {
            field: "genre".to_owned(),
        });
        assert_eq!(filter.class, ErrorClass::Config);

        let context = InternalError::from(AggregationError::context("slot 0 read before write"));
        assert_eq!(context.class, ErrorClass::InvariantViolation);
    }

    #[test]
    fn composite_takes_the_class_of_its_innermost_cause() {
        let err = InternalError::from(AggregationError::composite(
            1,
            AggregationError::shape("agg_0", "buckets is not an array"),
        ));

        assert_eq!(err.class, ErrorClass::Protocol);
        assert!(err.message.contains("composite member 1"));
    }
}
