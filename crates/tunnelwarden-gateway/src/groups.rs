//! Directory of statically defined restriction groups.
//!
//! Groups reach this directory from two configuration sources: attribute
//! maps declared per group (the same shape a backing directory would
//! report) and the comma-separated restriction lists
//! (`restrictions.read_only_groups` and friends). Both are normalized to
//! attribute maps here so that resolution always flows through the single
//! resolver contract.

use std::collections::HashMap;

use tunnelwarden_core::restrict::{resolver, Restriction, RestrictionSet};

use crate::config::schema::{GroupEntry, RestrictionGroups};

/// All groups known to the gateway, keyed by group name.
#[derive(Default)]
pub struct GroupDirectory {
    groups: HashMap<String, HashMap<String, String>>,
}

impl GroupDirectory {
    /// Build the directory from configuration. A group named both in an
    /// attribute entry and in a restriction list carries the union of the
    /// declared restrictions.
    pub fn from_config(entries: &[GroupEntry], lists: &RestrictionGroups) -> Self {
        let mut groups: HashMap<String, HashMap<String, String>> = HashMap::new();

        for entry in entries {
            groups
                .entry(entry.name.clone())
                .or_default()
                .extend(entry.attributes.clone());
        }

        let mut listed = |names: Vec<String>, restriction: Restriction| {
            for name in names {
                let set: RestrictionSet = [restriction].into_iter().collect();
                groups.entry(name).or_default().extend(set.as_attribute_map());
            }
        };

        listed(lists.read_only(), Restriction::ForceReadOnly);
        listed(lists.disallow_concurrent(), Restriction::DisallowConcurrent);

        Self { groups }
    }

    /// Names of every defined group.
    pub fn identifiers(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Attribute maps for the named groups. Unmatched names are skipped.
    pub fn attribute_maps_for<'a>(&'a self, names: &[String]) -> Vec<&'a HashMap<String, String>> {
        names.iter().filter_map(|n| self.groups.get(n)).collect()
    }

    /// Restrictions applying to a member of all the named groups. Unmatched
    /// names contribute nothing.
    pub fn restrictions_for(&self, names: &[String]) -> RestrictionSet {
        resolver::resolve(&HashMap::new(), self.attribute_maps_for(names))
    }
}
