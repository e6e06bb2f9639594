use crate::{
    aggregation::{Aggregation, AggregationExtractor, Envelope, JsonMap, member, optional_string},
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext},
    error::AggregationError,
    protocol,
};
use serde_json::{Value, json};
use std::fmt;

///
/// MetricAggregation
///
/// A single-value numeric metric over a field.
///

pub struct MetricAggregation {
    field: String,
    function: MetricFunction,
    envelope: Envelope,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum MetricFunction {
    Avg,
    Max,
    Min,
    Sum,
}

impl fmt::Display for MetricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Avg => "avg",
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
        };
        write!(f, "{name}")
    }
}

impl MetricAggregation {
    #[must_use]
    pub fn new(function: MetricFunction, field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            function,
            envelope: Envelope::direct(),
        }
    }

    #[must_use]
    pub fn avg(field: impl Into<String>) -> Self {
        Self::new(MetricFunction::Avg, field)
    }

    #[must_use]
    pub fn max(field: impl Into<String>) -> Self {
        Self::new(MetricFunction::Max, field)
    }

    #[must_use]
    pub fn min(field: impl Into<String>) -> Self {
        Self::new(MetricFunction::Min, field)
    }

    #[must_use]
    pub fn sum(field: impl Into<String>) -> Self {
        Self::new(MetricFunction::Sum, field)
    }

    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }
}

impl Aggregation<MetricValue> for MetricAggregation {
    fn request(
        &self,
        _ctx: &mut AggregationRequestContext,
        key: &AggregationKey,
        aggregations: &mut JsonMap,
    ) -> Result<Box<dyn AggregationExtractor<MetricValue>>, AggregationError> {
        let mut body = JsonMap::new();
        body.insert(
            self.function.to_string(),
            json!({ (protocol::FIELD): self.field }),
        );
        aggregations.insert(
            key.name().to_owned(),
            self.envelope.wrap(Value::Object(body)),
        );

        Ok(Box::new(MetricExtractor {
            key: key.clone(),
            envelope: self.envelope.clone(),
        }))
    }
}

struct MetricExtractor {
    key: AggregationKey,
    envelope: Envelope,
}

impl AggregationExtractor<MetricValue> for MetricExtractor {
    fn extract(
        &self,
        aggregations: &Value,
        _ctx: &AggregationExtractContext,
    ) -> Result<MetricValue, AggregationError> {
        let mut path = self.key.name().to_owned();
        let node = member(aggregations, self.key.name(), protocol::AGGREGATIONS)?;
        let node = self.envelope.unwrap(node, &mut path)?;

        let raw = member(node, protocol::VALUE, &path)?;
        let value = match raw {
            Value::Null => None,
            Value::Number(number) => number.as_f64(),
            _ => {
                return Err(AggregationError::shape(
                    format!("{path}.{}", protocol::VALUE),
                    "expected a number or null",
                ));
            }
        };

        Ok(MetricValue {
            value,
            as_string: optional_string(node, protocol::VALUE_AS_STRING),
        })
    }
}

///
/// MetricValue
///
/// A metric result. The value is absent when no document contributed, and
/// the string rendering is only present when the backend formats the field
/// (dates, scaled numerics).
///

#[derive(Clone, Debug, PartialEq)]
pub struct MetricValue {
    value: Option<f64>,
    as_string: Option<String>,
}

impl MetricValue {
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        self.as_string.as_deref()
    }
}

///
/// TESTS
///
