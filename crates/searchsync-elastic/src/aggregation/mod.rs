mod composite;
mod count;
mod envelope;
mod metric;
mod range;
mod source;
mod terms;

pub use composite::CompositeAggregation;
pub use count::CountDocumentAggregation;
pub use envelope::Envelope;
pub use metric::{MetricAggregation, MetricFunction, MetricValue};
pub use range::{RangeAggregation, RangeBound};
pub use source::BucketSource;
pub use terms::{TermKey, TermsAggregation};

use crate::{
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext},
    error::AggregationError,
    protocol,
};
use serde_json::Value;

pub type JsonMap = serde_json::Map<String, Value>;

///
/// Aggregation
///
/// One aggregation of a search request. Building the request body yields
/// the extractor that will later pull this aggregation's typed result out
/// of the response, so a request and its extraction can never disagree on
/// keys or shape.
///

pub trait Aggregation<T> {
    /// Insert this aggregation's body under `key` into the request-level
    /// aggregations object and return the matching extractor.
    fn request(
        &self,
        ctx: &mut AggregationRequestContext,
        key: &AggregationKey,
        aggregations: &mut JsonMap,
    ) -> Result<Box<dyn AggregationExtractor<T>>, AggregationError>;
}

///
/// AggregationExtractor
///
/// Extracts one typed result from the response. It receives the whole
/// aggregations-level object and looks up its own key, which lets a single
/// extractor span several sibling entries and lets bucket objects act as
/// aggregation containers for inner extractors.
///

pub trait AggregationExtractor<T> {
    fn extract(
        &self,
        aggregations: &Value,
        ctx: &AggregationExtractContext,
    ) -> Result<T, AggregationError>;
}

//
// response JSON helpers
//

pub(crate) fn object<'a>(value: &'a Value, path: &str) -> Result<&'a JsonMap, AggregationError> {
    value
        .as_object()
        .ok_or_else(|| AggregationError::shape(path, "expected an object"))
}

pub(crate) fn member<'a>(
    value: &'a Value,
    name: &str,
    path: &str,
) -> Result<&'a Value, AggregationError> {
    object(value, path)?
        .get(name)
        .ok_or_else(|| AggregationError::missing(format!("{path}.{name}")))
}

pub(crate) fn doc_count(value: &Value, path: &str) -> Result<u64, AggregationError> {
    let count = member(value, protocol::DOC_COUNT, path)?;
    count.as_u64().ok_or_else(|| {
        AggregationError::shape(
            format!("{path}.{}", protocol::DOC_COUNT),
            "expected an unsigned integer",
        )
    })
}

pub(crate) fn optional_string(value: &Value, name: &str) -> Option<String> {
    value
        .as_object()
        .and_then(|obj| obj.get(name))
        .and_then(Value::as_str)
        .map(str::to_owned)
}
