//! Elasticsearch aggregation wire names.
//!
//! These structures are bit-exact contracts with the backend and must not be
//! altered without a corresponding backend-version compatibility check.

pub const AGGREGATIONS: &str = "aggregations";

pub const NESTED: &str = "nested";
pub const PATH: &str = "path";
pub const FILTER: &str = "filter";
pub const REVERSE_NESTED: &str = "reverse_nested";

pub const TERMS: &str = "terms";
pub const RANGE: &str = "range";
pub const FIELD: &str = "field";
pub const SIZE: &str = "size";
pub const KEYED: &str = "keyed";
pub const RANGES: &str = "ranges";
pub const FROM: &str = "from";
pub const TO: &str = "to";

pub const BUCKETS: &str = "buckets";
pub const DOC_COUNT: &str = "doc_count";
pub const KEY: &str = "key";
pub const KEY_AS_STRING: &str = "key_as_string";
pub const VALUE: &str = "value";
pub const VALUE_AS_STRING: &str = "value_as_string";

/// Synthetic reverse-nested sub-aggregation name used for parent-document
/// counts under a nested path.
pub const ROOT_DOC_COUNT: &str = "root_doc_count";

/// Synthetic child name of the nested envelope's inner aggregation.
pub const NESTED_CHILD: &str = "nested";

/// Synthetic child name of the filter envelope's inner aggregation.
pub const FILTERED_CHILD: &str = "filtered";

/// Synthetic child name of a bucket's "with value" inner aggregation.
pub const WITH_VALUE_CHILD: &str = "value";
