use crate::{
    aggregation::{
        Aggregation, AggregationExtractor, Envelope, JsonMap, member,
        source::{BucketExtractor, BucketSource},
    },
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext},
    error::AggregationError,
    protocol,
};
use serde_json::{Value, json};

///
/// RangeAggregation
///
/// Buckets documents into caller-defined ranges and reports one value per
/// range, in submission order. The request is keyed with the range's
/// position so extraction never depends on the order the backend chose for
/// the response object.
///

pub struct RangeAggregation<V> {
    field: String,
    ranges: Vec<RangeBound>,
    envelope: Envelope,
    source: BucketSource<V>,
}

///
/// RangeBound
///
/// One range, inclusive at `from` and exclusive at `to`, either side open
/// when absent.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeBound {
    from: Option<f64>,
    to: Option<f64>,
}

impl RangeBound {
    #[must_use]
    pub const fn new(from: Option<f64>, to: Option<f64>) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub const fn below(to: f64) -> Self {
        Self::new(None, Some(to))
    }

    #[must_use]
    pub const fn at_least(from: f64) -> Self {
        Self::new(Some(from), None)
    }

    #[must_use]
    pub const fn between(from: f64, to: f64) -> Self {
        Self::new(Some(from), Some(to))
    }
}

impl RangeAggregation<u64> {
    /// Per-range document counts.
    #[must_use]
    pub fn counts(field: impl Into<String>, ranges: Vec<RangeBound>) -> Self {
        Self::from_source(field, ranges, BucketSource::DocCount(|count| count))
    }

    /// Per-range counts of root documents, for fields under a nested path.
    #[must_use]
    pub fn root_counts(field: impl Into<String>, ranges: Vec<RangeBound>) -> Self {
        Self::from_source(field, ranges, BucketSource::RootDocCount(|count| count))
    }
}

impl<V> RangeAggregation<V> {
    /// Per-range values computed by an inner aggregation within each bucket.
    #[must_use]
    pub fn with_value(
        field: impl Into<String>,
        ranges: Vec<RangeBound>,
        inner: Box<dyn Aggregation<V>>,
    ) -> Self {
        Self::from_source(field, ranges, BucketSource::Inner(inner))
    }

    fn from_source(
        field: impl Into<String>,
        ranges: Vec<RangeBound>,
        source: BucketSource<V>,
    ) -> Self {
        Self {
            field: field.into(),
            ranges,
            envelope: Envelope::direct(),
            source,
        }
    }

    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }
}

impl<V> Aggregation<Vec<V>> for RangeAggregation<V>
where
    V: 'static,
{
    fn request(
        &self,
        ctx: &mut AggregationRequestContext,
        key: &AggregationKey,
        aggregations: &mut JsonMap,
    ) -> Result<Box<dyn AggregationExtractor<Vec<V>>>, AggregationError> {
        let ranges: Vec<Value> = self
            .ranges
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let mut entry = JsonMap::new();
                entry.insert(protocol::KEY.to_owned(), json!(index.to_string()));
                if let Some(from) = range.from {
                    entry.insert(protocol::FROM.to_owned(), json!(from));
                }
                if let Some(to) = range.to {
                    entry.insert(protocol::TO.to_owned(), json!(to));
                }
                Value::Object(entry)
            })
            .collect();

        let mut body = JsonMap::new();
        body.insert(
            protocol::RANGE.to_owned(),
            json!({
                (protocol::FIELD): self.field,
                (protocol::KEYED): true,
                (protocol::RANGES): ranges,
            }),
        );

        let mut sub = JsonMap::new();
        let bucket = self.source.request(ctx, &mut sub)?;
        if !sub.is_empty() {
            body.insert(protocol::AGGREGATIONS.to_owned(), Value::Object(sub));
        }

        aggregations.insert(key.name().to_owned(), self.envelope.wrap(Value::Object(body)));

        Ok(Box::new(RangeExtractor {
            key: key.clone(),
            envelope: self.envelope.clone(),
            count: self.ranges.len(),
            bucket,
        }))
    }
}

struct RangeExtractor<V> {
    key: AggregationKey,
    envelope: Envelope,
    count: usize,
    bucket: BucketExtractor<V>,
}

impl<V: 'static> AggregationExtractor<Vec<V>> for RangeExtractor<V> {
    fn extract(
        &self,
        aggregations: &Value,
        ctx: &AggregationExtractContext,
    ) -> Result<Vec<V>, AggregationError> {
        let mut path = self.key.name().to_owned();
        let node = member(aggregations, self.key.name(), protocol::AGGREGATIONS)?;
        let node = self.envelope.unwrap(node, &mut path)?;

        let buckets_path = format!("{path}.{}", protocol::BUCKETS);
        let buckets = member(node, protocol::BUCKETS, &path)?;

        let mut results = Vec::with_capacity(self.count);
        for index in 0..self.count {
            let position = index.to_string();
            let entry = member(buckets, &position, &buckets_path)?;
            let bucket_path = format!("{buckets_path}.{position}");
            results.push(self.bucket.extract(entry, ctx, &bucket_path)?);
        }

        Ok(results)
    }
}

///
/// TESTS
///
