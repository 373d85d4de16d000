//! Compact set of restrictions.
//!
//! The catalog is closed and small, so a set is a copyable bit mask rather
//! than a heap collection. Union is the only combining operation: adding
//! sources can only add restrictions, never remove them.

use std::collections::HashMap;

use crate::restrict::catalog::{Restriction, TRUTH_VALUE};

/// An unordered set of [`Restriction`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestrictionSet(u8);

impl RestrictionSet {
    /// The empty set.
    pub const EMPTY: RestrictionSet = RestrictionSet(0);

    fn bit(restriction: Restriction) -> u8 {
        1 << restriction as u8
    }

    /// Add a restriction. Inserting an already-present member is a no-op.
    pub fn insert(&mut self, restriction: Restriction) {
        self.0 |= Self::bit(restriction);
    }

    /// Whether the given restriction is a member.
    pub fn contains(self, restriction: Restriction) -> bool {
        self.0 & Self::bit(restriction) != 0
    }

    /// The union of this set and another.
    pub fn union(self, other: RestrictionSet) -> RestrictionSet {
        RestrictionSet(self.0 | other.0)
    }

    /// Whether no restrictions are present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of restrictions present.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the members in catalog order.
    pub fn iter(self) -> impl Iterator<Item = Restriction> {
        Restriction::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    /// Produce the attribute map exposing that these restrictions apply:
    /// each member's canonical attribute mapped to the truth value. Absent
    /// members are simply absent (never written as an explicit "false").
    pub fn as_attribute_map(self) -> HashMap<String, String> {
        self.iter()
            .map(|r| (r.attribute_name().to_string(), TRUTH_VALUE.to_string()))
            .collect()
    }
}

impl FromIterator<Restriction> for RestrictionSet {
    fn from_iter<I: IntoIterator<Item = Restriction>>(iter: I) -> Self {
        let mut set = RestrictionSet::EMPTY;
        for r in iter {
            set.insert(r);
        }
        set
    }
}

impl Extend<Restriction> for RestrictionSet {
    fn extend<I: IntoIterator<Item = Restriction>>(&mut self, iter: I) {
        for r in iter {
            self.insert(r);
        }
    }
}
