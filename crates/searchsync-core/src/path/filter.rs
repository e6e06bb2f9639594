use crate::path::PathOrdinal;

const WORD_BITS: usize = 64;

// Word/bit split for one ordinal index.
const fn word_and_bit(index: usize) -> (usize, u64) {
    (index / WORD_BITS, 1u64 << (index % WORD_BITS))
}

///
/// DirtyPathSet
///
/// Mutable, word-packed bitset of changed-path ordinals for one entity
/// mutation. Grows on insert; cheap to test against a [`PathFilter`].
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DirtyPathSet {
    words: Vec<u64>,
}

impl DirtyPathSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    #[must_use]
    pub fn single(ordinal: PathOrdinal) -> Self {
        let mut set = Self::new();
        set.insert(ordinal);
        set
    }

    #[must_use]
    pub fn from_ordinals(ordinals: impl IntoIterator<Item = PathOrdinal>) -> Self {
        let mut set = Self::new();
        for ordinal in ordinals {
            set.insert(ordinal);
        }
        set
    }

    pub fn insert(&mut self, ordinal: PathOrdinal) {
        let (word, bit) = word_and_bit(ordinal.index());
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= bit;
    }

    /// Union `other` into this set. Returns true when at least one ordinal
    /// was not already present.
    pub fn union_with(&mut self, other: &Self) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }

        let mut changed = false;
        for (slot, word) in self.words.iter_mut().zip(other.words.iter()) {
            let merged = *slot | *word;
            if merged != *slot {
                *slot = merged;
                changed = true;
            }
        }

        changed
    }

    #[must_use]
    pub fn contains(&self, ordinal: PathOrdinal) -> bool {
        let (word, bit) = word_and_bit(ordinal.index());
        self.words.get(word).is_some_and(|value| value & bit != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }
}

///
/// PathFilter
///
/// Immutable bitset over path ordinals compiled at bootstrap. `test` answers
/// "does any changed path matter here" in O(words) without boxing paths.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathFilter {
    words: Box<[u64]>,
}

impl PathFilter {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_ordinals(ordinals: impl IntoIterator<Item = PathOrdinal>) -> Self {
        Self::from_dirty(&DirtyPathSet::from_ordinals(ordinals))
    }

    #[must_use]
    pub fn from_dirty(set: &DirtyPathSet) -> Self {
        Self {
            words: set.words().into(),
        }
    }

    /// Union of several filters, used for per-type dirtiness short-circuits.
    #[must_use]
    pub fn union<'a>(filters: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut words: Vec<u64> = Vec::new();
        for filter in filters {
            if filter.words.len() > words.len() {
                words.resize(filter.words.len(), 0);
            }
            for (slot, word) in words.iter_mut().zip(filter.words.iter()) {
                *slot |= *word;
            }
        }
        Self {
            words: words.into_boxed_slice(),
        }
    }

    /// True iff this filter's bitset intersects the dirty set.
    #[must_use]
    pub fn test(&self, dirty: &DirtyPathSet) -> bool {
        self.words
            .iter()
            .zip(dirty.words().iter())
            .any(|(filter, dirty)| filter & dirty != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }
}

///
/// TESTS
///
