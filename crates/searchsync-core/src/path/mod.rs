mod filter;

pub use filter::{DirtyPathSet, PathFilter};

use crate::error::InternalError;
use std::{collections::BTreeMap, fmt};

/// Maximum number of elements allowed in one dependency path.
///
/// This keeps ordinal-table keys and walk diagnostics bounded; mappings that
/// legitimately exceed it should flatten intermediate embeddables instead.
pub const MAX_PATH_ELEMENTS: usize = 16;

///
/// PathElement
/// One property-access step inside a dependency path.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PathElement {
    name: Box<str>,
}

impl PathElement {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().into_boxed_str(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

///
/// DependencyPath
///
/// Immutable ordered sequence of property-access steps through the entity
/// graph. Used both as a dependency-graph edge label and as the key into a
/// per-root-type ordinal table.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DependencyPath {
    elements: Box<[PathElement]>,
}

impl DependencyPath {
    #[must_use]
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self {
            elements: elements.into_boxed_slice(),
        }
    }

    /// Build a path from property names, e.g. `DependencyPath::of(["a", "b"])`.
    #[must_use]
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(PathElement::new).collect())
    }

    /// Parse a dot-separated path literal, e.g. `"containing.single"`.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::of(path.split('.').filter(|part| !part.is_empty()))
    }

    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for DependencyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, element) in self.elements.iter().enumerate() {
            if position > 0 {
                write!(f, ".")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

///
/// PathOrdinal
///
/// Dense per-root-type ordinal assigned once at bootstrap. Ordinals start at
/// zero and stay stable for the lifetime of a mapping, so dirty-path sets can
/// be bitsets instead of boxed path collections.
///

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, derive_more::Display,
)]
pub struct PathOrdinal(u32);

impl PathOrdinal {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

///
/// PathOrdinalTable
///
/// Per-root-type table mapping every registered dependency path to its
/// ordinal. Built once at bootstrap; lookups of unregistered paths are a
/// programmer error surfaced as an invariant violation.
///

#[derive(Debug, Default)]
pub struct PathOrdinalTable {
    ordinals: BTreeMap<DependencyPath, PathOrdinal>,
}

impl PathOrdinalTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one path, returning its ordinal. Re-registering is idempotent.
    pub fn register(&mut self, path: &DependencyPath) -> Result<PathOrdinal, InternalError> {
        if path.is_empty() {
            return Err(InternalError::path_invariant(
                "cannot register an empty dependency path",
            ));
        }
        if path.len() > MAX_PATH_ELEMENTS {
            return Err(InternalError::path_invariant(format!(
                "dependency path exceeds {MAX_PATH_ELEMENTS} elements: {path}"
            )));
        }
        if let Some(existing) = self.ordinals.get(path) {
            return Ok(*existing);
        }

        let next = u32::try_from(self.ordinals.len()).map_err(|_| {
            InternalError::path_invariant("path ordinal table exceeded u32 capacity")
        })?;
        let ordinal = PathOrdinal(next);
        self.ordinals.insert(path.clone(), ordinal);

        Ok(ordinal)
    }

    /// Look up the ordinal of a registered path.
    pub fn ordinal_of(&self, path: &DependencyPath) -> Result<PathOrdinal, InternalError> {
        self.ordinals.get(path).copied().ok_or_else(|| {
            InternalError::path_invariant(format!("unregistered dependency path: {path}"))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Iterate registered paths with their ordinals.
    pub fn iter(&self) -> impl Iterator<Item = (&DependencyPath, PathOrdinal)> {
        self.ordinals.iter().map(|(path, ordinal)| (path, *ordinal))
    }
}

///
/// TESTS
///
