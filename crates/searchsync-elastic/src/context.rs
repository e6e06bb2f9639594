use crate::error::AggregationError;
use std::{
    any::Any,
    collections::BTreeMap,
    fmt,
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

///
/// AggregationKey
///
/// The name an aggregation occupies in the request body and, symmetrically,
/// in the response's aggregations object. Composite members derive their
/// own keys from the parent key and their position.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, derive_more::Display)]
#[display("{name}")]
pub struct AggregationKey {
    name: String,
}

impl AggregationKey {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the i-th member of a composite aggregation registered under
    /// this key.
    #[must_use]
    pub fn composite(&self, index: usize) -> Self {
        Self {
            name: format!("{}_composite_{index}", self.name),
        }
    }
}

///
/// ContextKey
///
/// A typed slot identifier for the building context. Each key is unique for
/// the lifetime of the process, so two aggregations can never collide even
/// when they stash values of the same type.
///

pub struct ContextKey<T> {
    token: u64,
    _marker: PhantomData<fn() -> T>,
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

impl<T> ContextKey<T> {
    #[must_use]
    pub fn unique() -> Self {
        Self {
            token: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.token).finish()
    }
}

///
/// BuildingContext
///
/// Side channel between the request-building phase and the extraction
/// phase. Values are written while building the request body and read back
/// while extracting, keyed by typed slots.
///

#[derive(Default)]
pub struct BuildingContext {
    slots: BTreeMap<u64, Box<dyn Any>>,
}

impl BuildingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: 'static>(&mut self, key: ContextKey<T>, value: T) {
        self.slots.insert(key.token, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: ContextKey<T>) -> Result<&T, AggregationError> {
        let Some(boxed) = self.slots.get(&key.token) else {
            return Err(AggregationError::context(format!(
                "slot {} read before being written",
                key.token
            )));
        };

        boxed.downcast_ref::<T>().ok_or_else(|| {
            AggregationError::context(format!("slot {} holds a value of another type", key.token))
        })
    }
}

///
/// AggregationRequestContext
///
/// Passed to every aggregation while the request body is assembled.
///

#[derive(Default)]
pub struct AggregationRequestContext {
    pub building: BuildingContext,
}

impl AggregationRequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

///
/// AggregationExtractContext
///
/// Passed to every extractor. Carries the building context forward along
/// with the total hit count of the query, which root-document counters read
/// instead of any aggregation payload.
///

pub struct AggregationExtractContext {
    pub building: BuildingContext,
    pub root_doc_count: Option<u64>,
}

impl AggregationExtractContext {
    #[must_use]
    pub fn new(request: AggregationRequestContext, root_doc_count: Option<u64>) -> Self {
        Self {
            building: request.building,
            root_doc_count,
        }
    }
}

///
/// TESTS
///
