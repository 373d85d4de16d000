//! Restriction taxonomy and resolution.
//!
//! A restriction is a named, boolean capability limitation attached to a
//! user or group through ordinary string attributes. The catalog is closed:
//! every restriction kind is a variant of [`Restriction`], bound to a
//! canonical attribute name and the `"true"` enablement encoding.
//!
//! Restriction sets are derived, never stored: they are recomputed from
//! attribute maps on each access, and the effective set for a session is
//! fixed once at session establishment.

pub mod catalog;
pub mod resolver;
pub mod set;

pub use catalog::{restrictions_form, AttributeField, AttributeForm, FieldKind, Restriction};
pub use set::RestrictionSet;
