//! Elasticsearch aggregation layer for searchsync: request-body assembly,
//! nested / filter envelopes, and typed extraction of aggregation results
//! from the backend's JSON response.
#![warn(unreachable_pub)]

pub mod aggregation;
pub mod context;
pub mod error;
pub mod protocol;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        aggregation::{
            Aggregation, AggregationExtractor, BucketSource, CompositeAggregation,
            CountDocumentAggregation, Envelope, MetricAggregation, MetricFunction, MetricValue,
            RangeAggregation, RangeBound, TermKey, TermsAggregation,
        },
        context::{
            AggregationExtractContext, AggregationKey, AggregationRequestContext, BuildingContext,
            ContextKey,
        },
    };
}
