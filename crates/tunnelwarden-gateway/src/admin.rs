//! Administrative attribute surface.
//!
//! Restriction state is read and written as ordinary attributes, but only
//! by callers holding administer rights on the subject. Determining those
//! rights is the caller's job (the permission system lives outside this
//! core); this module only applies the resulting visibility rule.

use std::collections::HashMap;

use tunnelwarden_core::restrict::Restriction;

pub use tunnelwarden_core::restrict::{restrictions_form, AttributeForm};

/// Filter a subject's attributes for presentation. Callers without
/// administer rights never see restriction attributes.
pub fn filter_readable(
    is_admin: bool,
    attributes: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut filtered = attributes.clone();
    if !is_admin {
        for restriction in Restriction::ALL {
            filtered.remove(restriction.attribute_name());
        }
    }
    filtered
}

/// Apply an attribute update on behalf of a caller. Administrators may set
/// restriction attributes freely; for anyone else the update cannot touch
/// restriction state: incoming restriction attributes are discarded and
/// the subject's existing values are carried over unchanged.
pub fn apply_attribute_update(
    is_admin: bool,
    current: &HashMap<String, String>,
    mut updates: HashMap<String, String>,
) -> HashMap<String, String> {
    if !is_admin {
        for restriction in Restriction::ALL {
            let name = restriction.attribute_name();
            updates.remove(name);
            if let Some(existing) = current.get(name) {
                updates.insert(name.to_string(), existing.clone());
            }
        }
    }
    updates
}
