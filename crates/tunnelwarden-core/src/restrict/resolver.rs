//! Effective-restriction resolution.
//!
//! The effective restrictions for a session are the union of the
//! restrictions declared on the user's own attributes and on each group the
//! user effectively belongs to. Resolution is read-only and safe to run
//! concurrently for independent sessions; the result is computed once at
//! session establishment and treated as immutable afterwards.

use std::collections::HashMap;
use std::fmt::Display;

use crate::restrict::catalog::Restriction;
use crate::restrict::set::RestrictionSet;

/// Union of the restrictions enabled on the user's own attributes and on
/// every supplied group attribute map. Order and duplicates among the group
/// maps are irrelevant.
pub fn resolve<'a, I>(user_attributes: &HashMap<String, String>, groups: I) -> RestrictionSet
where
    I: IntoIterator<Item = &'a HashMap<String, String>>,
{
    let mut restrictions = Restriction::all_enabled(user_attributes);
    for group in groups {
        restrictions = restrictions.union(Restriction::all_enabled(group));
    }
    restrictions
}

/// Like [`resolve`], but tolerating a failed group-membership lookup.
///
/// A group directory being unreachable must not block the session: on
/// failure the restrictions resolvable from the user's own attributes are
/// returned and a warning is logged. The partial result can only be missing
/// restrictions contributed by groups, never carry extra ones.
pub fn resolve_degradable<E: Display>(
    user_attributes: &HashMap<String, String>,
    groups: std::result::Result<Vec<HashMap<String, String>>, E>,
) -> RestrictionSet {
    match groups {
        Ok(groups) => resolve(user_attributes, groups.iter()),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "group restrictions unavailable; resolving from user attributes only"
            );
            Restriction::all_enabled(user_attributes)
        }
    }
}
