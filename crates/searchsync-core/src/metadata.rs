use crate::{path::DependencyPath, typeinfo::{EntityTypeId, TypeLattice}};
use std::fmt;

///
/// EntityTypeMetadata
///
/// Static bootstrap input for one entity type, supplied by the mapper
/// collaborator. Consumed exactly once by the resolver builder; never
/// re-derived from runtime reflection.
///

#[derive(Debug)]
pub struct EntityTypeMetadata {
    pub lattice: TypeLattice,

    /// True when this type owns a search document of its own. Pass-through
    /// embeddable carriers set this to false and are walked but never
    /// collected.
    pub indexed: bool,

    /// Paths on this type whose change dirties this type's own document.
    /// Must include the forward path of every indexed-embedded association
    /// this type declares.
    pub indexed_paths: Vec<DependencyPath>,

    /// Indexed-embedded / used-in-derived associations declared by this
    /// (containing) type.
    pub associations: Vec<AssociationMetadata>,
}

impl EntityTypeMetadata {
    #[must_use]
    pub fn new(lattice: TypeLattice) -> Self {
        Self {
            lattice,
            indexed: true,
            indexed_paths: Vec::new(),
            associations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> EntityTypeId {
        self.lattice.type_id
    }
}

///
/// AssociationMetadata
///
/// One association declared on a containing type whose target's data feeds
/// the containing document. Carries the forward path, the dependency paths
/// on the contained side, the container unwrapping needed to dereference the
/// inverse path, and one inverse binding per concrete contained subtype.
///

#[derive(Debug)]
pub struct AssociationMetadata {
    /// Path from the containing type to the associated value.
    pub forward_path: DependencyPath,

    /// Declared (possibly abstract/polymorphic) contained type.
    pub contained_type: EntityTypeId,

    /// Paths on the contained type whose change must propagate through this
    /// association.
    pub dependency_paths: Vec<DependencyPath>,

    /// Container unwrapping applied when dereferencing the inverse path.
    pub extraction: ExtractorChain,

    /// Inverse path per concrete contained subtype. Subtypes without a
    /// binding (or with an explicit `None` path) simply do not participate.
    pub inverse_bindings: Vec<InverseBinding>,
}

///
/// InverseBinding
/// Inverse path resolution outcome for one concrete contained subtype.
///

#[derive(Clone, Debug)]
pub struct InverseBinding {
    pub subtype: EntityTypeId,
    pub inverse_path: Option<DependencyPath>,
}

impl InverseBinding {
    #[must_use]
    pub const fn bound(subtype: EntityTypeId, inverse_path: DependencyPath) -> Self {
        Self {
            subtype,
            inverse_path: Some(inverse_path),
        }
    }

    #[must_use]
    pub const fn unbound(subtype: EntityTypeId) -> Self {
        Self {
            subtype,
            inverse_path: None,
        }
    }
}

///
/// ContainerExtractor
/// One container-unwrapping step applied while dereferencing an inverse path.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerExtractor {
    /// Unwrap each element of a collection value.
    Collection,
    /// Unwrap each value of a map entry.
    MapValue,
    /// Unwrap an optional value, yielding nothing when absent.
    Optional,
}

impl fmt::Display for ContainerExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Collection => "collection",
            Self::MapValue => "map_value",
            Self::Optional => "optional",
        };
        write!(f, "{label}")
    }
}

///
/// ExtractorChain
/// Ordered container-unwrapping steps, outermost first.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtractorChain {
    steps: Vec<ContainerExtractor>,
}

impl ExtractorChain {
    /// No unwrapping; the inverse path yields the containing instance
    /// directly.
    #[must_use]
    pub const fn direct() -> Self {
        Self { steps: Vec::new() }
    }

    #[must_use]
    pub fn of(steps: impl IntoIterator<Item = ContainerExtractor>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[ContainerExtractor] {
        &self.steps
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for ExtractorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "direct");
        }
        for (position, step) in self.steps.iter().enumerate() {
            if position > 0 {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{ContainerExtractor, ExtractorChain};

    #[test]
    fn extractor_chain_display_is_dot_joined() {
        let chain = ExtractorChain::of([
            ContainerExtractor::Optional,
            ContainerExtractor::Collection,
        ]);

        assert_eq!(chain.to_string(), "optional.collection");
        assert_eq!(ExtractorChain::direct().to_string(), "direct");
    }
}
