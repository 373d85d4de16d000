//! The closed catalog of enforceable restrictions.

use std::collections::HashMap;

use crate::restrict::set::RestrictionSet;

/// The attribute value denoting that a restriction is enabled. Enablement is
/// an exact string match: any other value, and an absent attribute, mean the
/// restriction is not in effect. Malformed values are never an error.
pub const TRUTH_VALUE: &str = "true";

/// A restriction enforced by the gateway. Each restriction is exposed as a
/// custom attribute on users and groups; the association is read and written
/// through ordinary attribute maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Restriction {
    /// Disallows concurrent access to connections or connection groups that
    /// are already in use, regardless of restrictions enforced elsewhere.
    DisallowConcurrent,

    /// Forces all connections to be read-only for the affected session.
    /// When in effect, interactive instructions sent to the connection are
    /// dropped; only protocol-safe instructions pass through.
    ForceReadOnly,
}

impl Restriction {
    /// Every restriction in the catalog.
    pub const ALL: [Restriction; 2] = [Restriction::DisallowConcurrent, Restriction::ForceReadOnly];

    /// The name of the custom attribute storing whether this restriction is
    /// enabled for the associated user or group.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Restriction::DisallowConcurrent => "addl-restrict-disallow-concurrent",
            Restriction::ForceReadOnly => "addl-restrict-force-read-only",
        }
    }

    /// Whether this restriction is in effect according to the given
    /// attribute map.
    pub fn is_enabled(self, attributes: &HashMap<String, String>) -> bool {
        attributes.get(self.attribute_name()).map(String::as_str) == Some(TRUTH_VALUE)
    }

    /// The subset of the catalog enabled by the given attribute map.
    pub fn all_enabled(attributes: &HashMap<String, String>) -> RestrictionSet {
        Restriction::ALL
            .into_iter()
            .filter(|r| r.is_enabled(attributes))
            .collect()
    }

    /// The field descriptor for the attribute controlling this restriction,
    /// for exposure to an attribute-editing surface.
    pub fn field(self) -> AttributeField {
        AttributeField {
            name: self.attribute_name(),
            kind: FieldKind::Boolean,
            truth_value: TRUTH_VALUE,
        }
    }
}

/// How an attribute should be presented and edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A checkbox-style attribute: present with the truth value when
    /// enabled, absent otherwise.
    Boolean,
}

/// Describes one editable restriction attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeField {
    /// Canonical attribute name.
    pub name: &'static str,
    /// Presentation type.
    pub kind: FieldKind,
    /// The value that denotes "enabled".
    pub truth_value: &'static str,
}

/// A named group of attribute fields, for registration with an
/// attribute-editing surface.
#[derive(Debug, Clone)]
pub struct AttributeForm {
    /// Form identifier.
    pub name: &'static str,
    /// The fields belonging to the form.
    pub fields: Vec<AttributeField>,
}

/// The form describing every restriction attribute in the catalog.
pub fn restrictions_form() -> AttributeForm {
    AttributeForm {
        name: "addl-restrict",
        fields: Restriction::ALL.into_iter().map(Restriction::field).collect(),
    }
}
