use crate::{aggregation::member, error::AggregationError, protocol};
use serde_json::{Value, json};

///
/// Envelope
///
/// The nested / filter wrapping an aggregation body needs to target fields
/// inside nested object paths. Nested envelopes are applied outermost-first
/// and a filter, when present, sits innermost, directly around the body.
/// The response is unwrapped along the same chain using fixed child names.
///

#[derive(Clone, Debug, Default)]
pub struct Envelope {
    nested_paths: Vec<String>,
    filter: Option<Value>,
}

impl Envelope {
    /// No wrapping at all, for fields on the root document.
    #[must_use]
    pub fn direct() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn nested(path: impl Into<String>) -> Self {
        Self {
            nested_paths: vec![path.into()],
            filter: None,
        }
    }

    /// Nested paths ordered from the root outward, for fields under
    /// several levels of nested objects.
    #[must_use]
    pub fn nested_chain(paths: impl IntoIterator<Item = String>) -> Self {
        Self {
            nested_paths: paths.into_iter().collect(),
            filter: None,
        }
    }

    /// Attach a filter query, applied innermost so it scopes the body to
    /// the nested documents that match. A filter outside any nested path
    /// would be indistinguishable from filtering the query itself, so it
    /// is rejected.
    pub fn filtered(
        mut self,
        filter: Value,
        field: impl Into<String>,
    ) -> Result<Self, AggregationError> {
        if self.nested_paths.is_empty() {
            return Err(AggregationError::FilterWithoutNestedContext {
                field: field.into(),
            });
        }

        self.filter = Some(filter);
        Ok(self)
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.nested_paths.is_empty() && self.filter.is_none()
    }

    /// Wrap a request body in this envelope, innermost-out.
    pub(crate) fn wrap(&self, body: Value) -> Value {
        let mut current = body;

        if let Some(filter) = &self.filter {
            current = json!({
                (protocol::FILTER): filter,
                (protocol::AGGREGATIONS): { (protocol::FILTERED_CHILD): current },
            });
        }
        for path in self.nested_paths.iter().rev() {
            current = json!({
                (protocol::NESTED): { (protocol::PATH): path },
                (protocol::AGGREGATIONS): { (protocol::NESTED_CHILD): current },
            });
        }

        current
    }

    /// Walk a response entry down to the wrapped body, extending `path`
    /// with each child name for error reporting.
    pub(crate) fn unwrap<'a>(
        &self,
        node: &'a Value,
        path: &mut String,
    ) -> Result<&'a Value, AggregationError> {
        let mut current = node;

        for _ in &self.nested_paths {
            current = member(current, protocol::NESTED_CHILD, path)?;
            path.push('.');
            path.push_str(protocol::NESTED_CHILD);
        }
        if self.filter.is_some() {
            current = member(current, protocol::FILTERED_CHILD, path)?;
            path.push('.');
            path.push_str(protocol::FILTERED_CHILD);
        }

        Ok(current)
    }
}

///
/// TESTS
///
