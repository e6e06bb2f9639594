use crate::{
    aggregation::{Aggregation, AggregationExtractor, JsonMap},
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext},
    error::AggregationError,
};
use serde_json::Value;
use std::sync::Arc;

///
/// CompositeAggregation
///
/// Combines the results of several aggregations into one value. Each member
/// is registered as its own top-level entry under a position-derived key,
/// and extraction hands the member results to the compositor in submission
/// order. Any member failure fails the whole composite.
///

pub struct CompositeAggregation<U, T> {
    members: Vec<Box<dyn Aggregation<U>>>,
    compositor: Compositor<U, T>,
}

type Compositor<U, T> = Arc<dyn Fn(Vec<U>) -> Result<T, AggregationError>>;

impl<U, T> CompositeAggregation<U, T> {
    #[must_use]
    pub fn new(
        members: Vec<Box<dyn Aggregation<U>>>,
        compositor: impl Fn(Vec<U>) -> Result<T, AggregationError> + 'static,
    ) -> Self {
        Self {
            members,
            compositor: Arc::new(compositor),
        }
    }
}

impl<U, T> Aggregation<T> for CompositeAggregation<U, T>
where
    U: 'static,
    T: 'static,
{
    fn request(
        &self,
        ctx: &mut AggregationRequestContext,
        key: &AggregationKey,
        aggregations: &mut JsonMap,
    ) -> Result<Box<dyn AggregationExtractor<T>>, AggregationError> {
        let mut extractors = Vec::with_capacity(self.members.len());
        for (index, member) in self.members.iter().enumerate() {
            let member_key = key.composite(index);
            extractors.push(member.request(ctx, &member_key, aggregations)?);
        }

        Ok(Box::new(CompositeExtractor {
            extractors,
            compositor: Arc::clone(&self.compositor),
        }))
    }
}

struct CompositeExtractor<U, T> {
    extractors: Vec<Box<dyn AggregationExtractor<U>>>,
    compositor: Compositor<U, T>,
}

impl<U, T> AggregationExtractor<T> for CompositeExtractor<U, T> {
    fn extract(
        &self,
        aggregations: &Value,
        ctx: &AggregationExtractContext,
    ) -> Result<T, AggregationError> {
        let mut values = Vec::with_capacity(self.extractors.len());
        for (index, extractor) in self.extractors.iter().enumerate() {
            let value = extractor
                .extract(aggregations, ctx)
                .map_err(|err| AggregationError::composite(index, err))?;
            values.push(value);
        }

        (self.compositor)(values)
    }
}

///
/// TESTS
///
