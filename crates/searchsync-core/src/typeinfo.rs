use std::fmt;

///
/// EntityTypeId
///
/// Stable identifier for one concrete or abstract entity type. The mapper
/// collaborator supplies fully-qualified type names with static lifetime, so
/// the id stays `Copy` and comparison stays pointer-free string ordering.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityTypeId {
    name: &'static str,
}

impl EntityTypeId {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

///
/// TypeLattice
///
/// Supertype/subtype relations for one entity type. Ascending supertypes are
/// ordered most-derived first and always start with the type itself;
/// concrete subtypes may be many (interfaces exist in source models).
///

#[derive(Clone, Debug)]
pub struct TypeLattice {
    pub type_id: EntityTypeId,
    pub ascending_supertypes: Vec<EntityTypeId>,
    pub concrete_subtypes: Vec<EntityTypeId>,
    pub is_abstract: bool,
}

impl TypeLattice {
    /// Lattice for a concrete type with no inheritance.
    #[must_use]
    pub fn standalone(type_id: EntityTypeId) -> Self {
        Self {
            type_id,
            ascending_supertypes: vec![type_id],
            concrete_subtypes: vec![type_id],
            is_abstract: false,
        }
    }

    /// Normalize collaborator-supplied relations: self is always the first
    /// ascending supertype, and a concrete type is always its own subtype.
    pub(crate) fn normalize(&mut self) {
        if self.ascending_supertypes.first() != Some(&self.type_id) {
            self.ascending_supertypes.retain(|id| *id != self.type_id);
            self.ascending_supertypes.insert(0, self.type_id);
        }
        if !self.is_abstract && !self.concrete_subtypes.contains(&self.type_id) {
            self.concrete_subtypes.insert(0, self.type_id);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{EntityTypeId, TypeLattice};

    #[test]
    fn standalone_lattice_contains_self_on_both_axes() {
        let id = EntityTypeId::new("Order");
        let lattice = TypeLattice::standalone(id);

        assert_eq!(lattice.ascending_supertypes, vec![id]);
        assert_eq!(lattice.concrete_subtypes, vec![id]);
        assert!(!lattice.is_abstract);
    }

    #[test]
    fn normalize_prepends_self_to_ascending_supertypes() {
        let base = EntityTypeId::new("Base");
        let derived = EntityTypeId::new("Derived");
        let mut lattice = TypeLattice {
            type_id: derived,
            ascending_supertypes: vec![base],
            concrete_subtypes: vec![],
            is_abstract: false,
        };
        lattice.normalize();

        assert_eq!(lattice.ascending_supertypes, vec![derived, base]);
        assert_eq!(lattice.concrete_subtypes, vec![derived]);
    }
}
