use crate::{
    aggregation::{
        Aggregation, AggregationExtractor, Envelope, JsonMap, member, optional_string,
        source::{BucketExtractor, BucketSource},
    },
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext},
    error::AggregationError,
    protocol,
};
use serde_json::{Value, json};

///
/// TermsAggregation
///
/// Buckets documents by the distinct values of a field and reports one
/// value per bucket, in the order the backend returned the buckets.
///

pub struct TermsAggregation<V> {
    field: String,
    size: Option<u64>,
    envelope: Envelope,
    source: BucketSource<V>,
}

impl TermsAggregation<u64> {
    /// Per-term document counts.
    #[must_use]
    pub fn counts(field: impl Into<String>) -> Self {
        Self::from_source(field, BucketSource::DocCount(|count| count))
    }

    /// Per-term counts of root documents, for fields under a nested path.
    #[must_use]
    pub fn root_counts(field: impl Into<String>) -> Self {
        Self::from_source(field, BucketSource::RootDocCount(|count| count))
    }
}

impl<V> TermsAggregation<V> {
    /// Per-term values computed by an inner aggregation within each bucket.
    #[must_use]
    pub fn with_value(field: impl Into<String>, inner: Box<dyn Aggregation<V>>) -> Self {
        Self::from_source(field, BucketSource::Inner(inner))
    }

    fn from_source(field: impl Into<String>, source: BucketSource<V>) -> Self {
        Self {
            field: field.into(),
            size: None,
            envelope: Envelope::direct(),
            source,
        }
    }

    /// Cap the number of buckets the backend returns.
    #[must_use]
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }
}

impl<V> Aggregation<Vec<(TermKey, V)>> for TermsAggregation<V>
where
    V: 'static,
{
    fn request(
        &self,
        ctx: &mut AggregationRequestContext,
        key: &AggregationKey,
        aggregations: &mut JsonMap,
    ) -> Result<Box<dyn AggregationExtractor<Vec<(TermKey, V)>>>, AggregationError> {
        let mut terms = JsonMap::new();
        terms.insert(protocol::FIELD.to_owned(), json!(self.field));
        if let Some(size) = self.size {
            terms.insert(protocol::SIZE.to_owned(), json!(size));
        }

        let mut body = JsonMap::new();
        body.insert(protocol::TERMS.to_owned(), Value::Object(terms));

        let mut sub = JsonMap::new();
        let bucket = self.source.request(ctx, &mut sub)?;
        if !sub.is_empty() {
            body.insert(protocol::AGGREGATIONS.to_owned(), Value::Object(sub));
        }

        aggregations.insert(key.name().to_owned(), self.envelope.wrap(Value::Object(body)));

        Ok(Box::new(TermsExtractor {
            key: key.clone(),
            envelope: self.envelope.clone(),
            bucket,
        }))
    }
}

struct TermsExtractor<V> {
    key: AggregationKey,
    envelope: Envelope,
    bucket: BucketExtractor<V>,
}

impl<V: 'static> AggregationExtractor<Vec<(TermKey, V)>> for TermsExtractor<V> {
    fn extract(
        &self,
        aggregations: &Value,
        ctx: &AggregationExtractContext,
    ) -> Result<Vec<(TermKey, V)>, AggregationError> {
        let mut path = self.key.name().to_owned();
        let node = member(aggregations, self.key.name(), protocol::AGGREGATIONS)?;
        let node = self.envelope.unwrap(node, &mut path)?;

        let buckets_path = format!("{path}.{}", protocol::BUCKETS);
        let buckets = member(node, protocol::BUCKETS, &path)?
            .as_array()
            .ok_or_else(|| AggregationError::shape(&buckets_path, "expected an array"))?;

        let mut results = Vec::with_capacity(buckets.len());
        for (index, entry) in buckets.iter().enumerate() {
            let bucket_path = format!("{buckets_path}[{index}]");
            let term = TermKey::parse(entry, &bucket_path)?;
            let value = self.bucket.extract(entry, ctx, &bucket_path)?;
            results.push((term, value));
        }

        Ok(results)
    }
}

///
/// TermKey
///
/// The value identifying one terms bucket: the raw key as JSON, plus the
/// backend's string rendering when it sends one.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TermKey {
    key: Value,
    as_string: Option<String>,
}

impl TermKey {
    fn parse(bucket: &Value, path: &str) -> Result<Self, AggregationError> {
        let key = member(bucket, protocol::KEY, path)?.clone();
        let as_string = optional_string(bucket, protocol::KEY_AS_STRING);

        Ok(Self { key, as_string })
    }

    #[must_use]
    pub const fn key(&self) -> &Value {
        &self.key
    }

    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        self.as_string.as_deref()
    }

    /// The backend's string rendering when present, otherwise the raw key
    /// rendered locally.
    #[must_use]
    pub fn text(&self) -> String {
        if let Some(text) = &self.as_string {
            return text.clone();
        }
        match &self.key {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

///
/// TESTS
///
