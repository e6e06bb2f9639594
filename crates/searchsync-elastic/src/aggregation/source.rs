use crate::{
    aggregation::{Aggregation, AggregationExtractor, JsonMap, doc_count, member},
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext, ContextKey},
    error::AggregationError,
    protocol,
};
use serde_json::{Value, json};

///
/// BucketSource
///
/// What a bucket aggregation reports per bucket. Document counts come from
/// the bucket itself, root-document counts from a reverse-nested probe
/// planted in each bucket, and arbitrary inner values from a sub-aggregation
/// that treats the bucket as its aggregations container.
///

pub enum BucketSource<V> {
    /// The bucket's own document count in whatever nested context the
    /// aggregation runs in.
    DocCount(fn(u64) -> V),

    /// The count of root documents owning at least one matching nested
    /// document of this bucket.
    RootDocCount(fn(u64) -> V),

    /// A sub-aggregation computed within each bucket.
    Inner(Box<dyn Aggregation<V>>),
}

impl<V: 'static> BucketSource<V> {
    /// Plant whatever sub-aggregations the source needs into a bucket
    /// aggregation's request body and return the per-bucket extractor.
    /// Inner extractors are stashed in the building context; the bucket
    /// extractor carries only the slot key and reads them back at
    /// extraction time.
    pub(crate) fn request(
        &self,
        ctx: &mut AggregationRequestContext,
        sub_aggregations: &mut JsonMap,
    ) -> Result<BucketExtractor<V>, AggregationError> {
        match self {
            Self::DocCount(convert) => Ok(BucketExtractor::DocCount(*convert)),
            Self::RootDocCount(convert) => {
                sub_aggregations.insert(
                    protocol::ROOT_DOC_COUNT.to_owned(),
                    json!({ (protocol::REVERSE_NESTED): {} }),
                );
                Ok(BucketExtractor::RootDocCount(*convert))
            }
            Self::Inner(aggregation) => {
                let key = AggregationKey::new(protocol::WITH_VALUE_CHILD);
                let extractor = aggregation.request(ctx, &key, sub_aggregations)?;
                let slot = ContextKey::unique();
                ctx.building.put(slot, extractor);
                Ok(BucketExtractor::Inner(slot))
            }
        }
    }
}

pub(crate) enum BucketExtractor<V> {
    DocCount(fn(u64) -> V),
    RootDocCount(fn(u64) -> V),
    Inner(ContextKey<Box<dyn AggregationExtractor<V>>>),
}

impl<V: 'static> BucketExtractor<V> {
    /// Pull this source's value out of one response bucket.
    pub(crate) fn extract(
        &self,
        bucket: &Value,
        ctx: &AggregationExtractContext,
        path: &str,
    ) -> Result<V, AggregationError> {
        match self {
            Self::DocCount(convert) => Ok(convert(doc_count(bucket, path)?)),
            Self::RootDocCount(convert) => {
                let probe = member(bucket, protocol::ROOT_DOC_COUNT, path)?;
                let probe_path = format!("{path}.{}", protocol::ROOT_DOC_COUNT);
                Ok(convert(doc_count(probe, &probe_path)?))
            }
            Self::Inner(slot) => ctx.building.get(*slot)?.extract(bucket, ctx),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{MetricAggregation, MetricValue};

    #[test]
    fn root_doc_count_source_plants_a_reverse_nested_probe() {
        let source: BucketSource<u64> = BucketSource::RootDocCount(|count| count);
        let mut ctx = AggregationRequestContext::new();
        let mut sub = JsonMap::new();

        let extractor = source
            .request(&mut ctx, &mut sub)
            .expect("probe request should succeed");
        assert_eq!(sub["root_doc_count"], json!({ "reverse_nested": {} }));

        let bucket = json!({
            "doc_count": 9,
            "root_doc_count": { "doc_count": 4 },
        });
        let ectx = AggregationExtractContext::new(ctx, None);
        let value = extractor
            .extract(&bucket, &ectx, "agg_0.buckets.rock")
            .expect("probe extraction should succeed");
        assert_eq!(value, 4);
    }

    #[test]
    fn inner_source_hands_its_extractor_through_the_building_context() {
        let source: BucketSource<MetricValue> =
            BucketSource::Inner(Box::new(MetricAggregation::max("price")));
        let mut ctx = AggregationRequestContext::new();
        let mut sub = JsonMap::new();

        let extractor = source
            .request(&mut ctx, &mut sub)
            .expect("inner request should succeed");
        assert_eq!(sub["value"], json!({ "max": { "field": "price" } }));

        let bucket = json!({
            "doc_count": 2,
            "value": { "value": 3.5 },
        });
        let ectx = AggregationExtractContext::new(ctx, None);
        let value = extractor
            .extract(&bucket, &ectx, "agg_0.buckets.rock")
            .expect("inner extraction should succeed");
        assert_eq!(value.value(), Some(3.5));

        // A context that never saw the request phase has no stashed
        // extractor to offer.
        let foreign = AggregationExtractContext::new(AggregationRequestContext::new(), None);
        let err = extractor
            .extract(&bucket, &foreign, "agg_0.buckets.rock")
            .expect_err("foreign context should fail");
        assert!(matches!(err, AggregationError::BuildingContext { .. }));
    }

    #[test]
    fn doc_count_source_reads_the_bucket_count() {
        let source: BucketSource<u64> = BucketSource::DocCount(|count| count);
        let mut ctx = AggregationRequestContext::new();
        let mut sub = JsonMap::new();

        let extractor = source
            .request(&mut ctx, &mut sub)
            .expect("request should succeed");
        assert!(sub.is_empty());

        let ectx = AggregationExtractContext::new(ctx, None);
        let value = extractor
            .extract(&json!({ "doc_count": 9 }), &ectx, "agg_0.buckets.rock")
            .expect("extraction should succeed");
        assert_eq!(value, 9);
    }
}
