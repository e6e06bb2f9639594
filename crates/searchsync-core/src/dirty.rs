use crate::path::{DirtyPathSet, PathFilter};

///
/// DirtinessFilter
///
/// Per-type union of the dirty-self filter and every inverse-edge filter
/// registered against the type. Answers "does this change set require any
/// resolution work at all" so callers can skip the graph walk when nothing
/// relevant changed.
///

#[derive(Debug)]
pub struct DirtinessFilter {
    filter: PathFilter,
}

impl DirtinessFilter {
    pub(crate) const fn new(filter: PathFilter) -> Self {
        Self { filter }
    }

    #[must_use]
    pub fn requires_resolution(&self, dirty: &DirtyPathSet) -> bool {
        self.filter.test(dirty)
    }

    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.filter.is_empty()
    }
}

///
/// TESTS
///
