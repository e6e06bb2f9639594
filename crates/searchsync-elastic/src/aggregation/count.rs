use crate::{
    aggregation::{Aggregation, AggregationExtractor, Envelope, JsonMap, doc_count, member},
    context::{AggregationExtractContext, AggregationKey, AggregationRequestContext},
    error::AggregationError,
    protocol,
};
use serde_json::{Value, json};

///
/// CountDocumentAggregation
///
/// Document counting. The root flavor emits no aggregation at all and reads
/// the query's total hit count at extraction time; the nested flavor plants
/// a reverse-nested probe under its envelope to count the root documents
/// that own at least one matching nested document.
///

pub struct CountDocumentAggregation {
    mode: CountMode,
}

enum CountMode {
    Root,
    Nested { envelope: Envelope },
}

impl CountDocumentAggregation {
    /// Total hit count of the query.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            mode: CountMode::Root,
        }
    }

    /// Count of root documents reached back through a nested context.
    #[must_use]
    pub const fn nested(envelope: Envelope) -> Self {
        Self {
            mode: CountMode::Nested { envelope },
        }
    }
}

impl Aggregation<u64> for CountDocumentAggregation {
    fn request(
        &self,
        _ctx: &mut AggregationRequestContext,
        key: &AggregationKey,
        aggregations: &mut JsonMap,
    ) -> Result<Box<dyn AggregationExtractor<u64>>, AggregationError> {
        match &self.mode {
            CountMode::Root => Ok(Box::new(RootCountExtractor)),
            CountMode::Nested { envelope } => {
                let body = json!({ (protocol::REVERSE_NESTED): {} });
                aggregations.insert(key.name().to_owned(), envelope.wrap(body));

                Ok(Box::new(NestedCountExtractor {
                    key: key.clone(),
                    envelope: envelope.clone(),
                }))
            }
        }
    }
}

struct RootCountExtractor;

impl AggregationExtractor<u64> for RootCountExtractor {
    fn extract(
        &self,
        _aggregations: &Value,
        ctx: &AggregationExtractContext,
    ) -> Result<u64, AggregationError> {
        ctx.root_doc_count.ok_or_else(|| {
            AggregationError::context("root document count was not supplied by the search response")
        })
    }
}

struct NestedCountExtractor {
    key: AggregationKey,
    envelope: Envelope,
}

impl AggregationExtractor<u64> for NestedCountExtractor {
    fn extract(
        &self,
        aggregations: &Value,
        _ctx: &AggregationExtractContext,
    ) -> Result<u64, AggregationError> {
        let mut path = self.key.name().to_owned();
        let node = member(aggregations, self.key.name(), protocol::AGGREGATIONS)?;
        let node = self.envelope.unwrap(node, &mut path)?;

        doc_count(node, &path)
    }
}

///
/// TESTS
///
