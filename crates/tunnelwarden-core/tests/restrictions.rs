//! Restriction catalog, set, and resolver tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;

use tunnelwarden_core::restrict::{
    catalog::TRUTH_VALUE, resolver, restrictions_form, FieldKind, Restriction, RestrictionSet,
};

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn enablement_is_exact_string_match() {
    let enabled = attrs(&[("addl-restrict-force-read-only", "true")]);
    assert!(Restriction::ForceReadOnly.is_enabled(&enabled));

    // No case folding, no other truthy values, absent means disabled.
    for value in ["TRUE", "True", "yes", "1", ""] {
        let map = attrs(&[("addl-restrict-force-read-only", value)]);
        assert!(!Restriction::ForceReadOnly.is_enabled(&map), "value {value:?}");
    }
    assert!(!Restriction::ForceReadOnly.is_enabled(&HashMap::new()));
}

#[test]
fn all_enabled_selects_the_enabled_subset() {
    let map = attrs(&[
        ("addl-restrict-disallow-concurrent", "true"),
        ("addl-restrict-force-read-only", "false"),
        ("unrelated-attribute", "true"),
    ]);

    let set = Restriction::all_enabled(&map);
    assert!(set.contains(Restriction::DisallowConcurrent));
    assert!(!set.contains(Restriction::ForceReadOnly));
    assert_eq!(set.len(), 1);
}

#[test]
fn attribute_map_omits_absent_restrictions() {
    let set: RestrictionSet = [Restriction::ForceReadOnly].into_iter().collect();
    let map = set.as_attribute_map();

    assert_eq!(map.get("addl-restrict-force-read-only").map(String::as_str), Some(TRUTH_VALUE));
    assert!(!map.contains_key("addl-restrict-disallow-concurrent"));
}

#[test]
fn attribute_map_round_trip_is_identity() {
    // Every subset of the catalog survives set -> map -> set unchanged.
    let subsets: [&[Restriction]; 4] = [
        &[],
        &[Restriction::DisallowConcurrent],
        &[Restriction::ForceReadOnly],
        &[Restriction::DisallowConcurrent, Restriction::ForceReadOnly],
    ];

    for subset in subsets {
        let set: RestrictionSet = subset.iter().copied().collect();
        let round_tripped = Restriction::all_enabled(&set.as_attribute_map());
        assert_eq!(round_tripped, set);
    }
}

#[test]
fn set_union_is_order_and_duplicate_independent() {
    let a: RestrictionSet = [Restriction::ForceReadOnly].into_iter().collect();
    let b: RestrictionSet = [Restriction::DisallowConcurrent, Restriction::ForceReadOnly]
        .into_iter()
        .collect();

    assert_eq!(a.union(b), b.union(a));
    assert_eq!(a.union(a), a);
    assert_eq!(a.union(RestrictionSet::EMPTY), a);

    let both = a.union(b);
    assert_eq!(both.len(), 2);
    assert_eq!(both.iter().collect::<Vec<_>>().len(), 2);
}

#[test]
fn resolve_unions_user_and_group_restrictions() {
    let user = attrs(&[("addl-restrict-disallow-concurrent", "true")]);
    let g1 = attrs(&[("addl-restrict-force-read-only", "true")]);
    let g2 = attrs(&[("addl-restrict-force-read-only", "true")]);

    let forward = resolver::resolve(&user, [&g1, &g2]);
    let backward = resolver::resolve(&user, [&g2, &g1]);

    assert_eq!(forward, backward);
    assert!(forward.contains(Restriction::DisallowConcurrent));
    assert!(forward.contains(Restriction::ForceReadOnly));
}

#[test]
fn resolve_from_group_membership_alone() {
    // User carries no restriction attributes of their own.
    let user = HashMap::new();
    let group = attrs(&[("addl-restrict-force-read-only", "true")]);

    let effective = resolver::resolve(&user, [&group]);
    assert!(effective.contains(Restriction::ForceReadOnly));
    assert!(!effective.contains(Restriction::DisallowConcurrent));
}

#[test]
fn degraded_resolution_keeps_user_restrictions() {
    let user = attrs(&[("addl-restrict-force-read-only", "true")]);

    let effective = resolver::resolve_degradable(&user, Err("group directory unreachable"));
    assert!(effective.contains(Restriction::ForceReadOnly));
    assert!(!effective.contains(Restriction::DisallowConcurrent));
}

#[test]
fn degraded_resolution_with_no_user_restrictions_is_empty() {
    let effective = resolver::resolve_degradable::<&str>(&HashMap::new(), Err("unreachable"));
    assert!(effective.is_empty());
}

#[test]
fn form_describes_every_catalog_attribute() {
    let form = restrictions_form();
    assert_eq!(form.name, "addl-restrict");
    assert_eq!(form.fields.len(), Restriction::ALL.len());

    for field in &form.fields {
        assert_eq!(field.kind, FieldKind::Boolean);
        assert_eq!(field.truth_value, TRUTH_VALUE);
        assert!(field.name.starts_with("addl-restrict-"));
    }
}
