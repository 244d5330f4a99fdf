//! Merge law tests for the module-permission merger
//!
//! The boolean and scope fields must be order-independent and monotone;
//! the side-policy fields are deliberately last-wins, which is why the
//! resolver folds roles in a fixed order.

use std::collections::BTreeMap;

use scopegate::{actions, merge, FieldPolicy, ModulePermission, ScopeLevel};

fn perm(enabled: bool, scope: ScopeLevel, acts: &[(&str, bool)]) -> ModulePermission {
    ModulePermission {
        enabled,
        scope,
        actions: acts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        ..ModulePermission::default()
    }
}

// ============================================================================
// Commutativity of the numeric fields
// ============================================================================

/// enabled, scope and every action must come out the same regardless of
/// operand order
#[test]
fn boolean_and_scope_fields_are_commutative() {
    let samples = [
        perm(false, ScopeLevel::None, &[]),
        perm(true, ScopeLevel::Own, &[(actions::CREATE, true)]),
        perm(true, ScopeLevel::Team, &[(actions::EDIT, true), (actions::DELETE, false)]),
        perm(false, ScopeLevel::All, &[(actions::CREATE, false), (actions::EDIT, true)]),
    ];
    for a in &samples {
        for b in &samples {
            let ab = merge(a, b);
            let ba = merge(b, a);
            assert_eq!(ab.enabled, ba.enabled);
            assert_eq!(ab.scope, ba.scope);
            for k in ab.actions.keys().chain(ba.actions.keys()) {
                assert_eq!(ab.allows(k), ba.allows(k), "action {} depends on order", k);
            }
        }
    }
}

/// The merged scope never ranks below either operand
#[test]
fn scope_merge_is_monotone() {
    let levels = [ScopeLevel::None, ScopeLevel::Own, ScopeLevel::Team, ScopeLevel::All];
    for &sa in &levels {
        for &sb in &levels {
            let out = merge(&perm(true, sa, &[]), &perm(true, sb, &[])).scope;
            assert!(out.rank() >= sa.rank().max(sb.rank()));
        }
    }
}

/// Scope ties keep the left operand
#[test]
fn scope_ties_keep_left() {
    let a = perm(true, ScopeLevel::Team, &[]);
    let b = perm(true, ScopeLevel::Team, &[]);
    assert_eq!(merge(&a, &b).scope, ScopeLevel::Team);
}

// ============================================================================
// Action union
// ============================================================================

/// Actions OR over the union of keys; keys absent on one side default false
#[test]
fn actions_union_with_absent_defaulting_false() {
    let a = perm(true, ScopeLevel::Own, &[(actions::CREATE, true)]);
    let b = perm(true, ScopeLevel::Own, &[(actions::DELETE, true), (actions::CREATE, false)]);
    let out = merge(&a, &b);
    assert!(out.allows(actions::CREATE));
    assert!(out.allows(actions::DELETE));
    assert!(!out.allows(actions::EDIT));
}

/// An action denied by both roles stays denied
#[test]
fn denied_everywhere_stays_denied() {
    let a = perm(true, ScopeLevel::All, &[(actions::DELETE, false)]);
    let b = perm(true, ScopeLevel::All, &[(actions::DELETE, false)]);
    assert!(!merge(&a, &b).allows(actions::DELETE));
}

/// Merging with the empty permission is the identity on every granted field
#[test]
fn empty_permission_is_neutral() {
    let a = perm(true, ScopeLevel::Team, &[(actions::CREATE, true), (actions::EDIT, false)]);
    let seeded = merge(&ModulePermission::default(), &a);
    assert_eq!(seeded.enabled, a.enabled);
    assert_eq!(seeded.scope, a.scope);
    assert_eq!(seeded.actions, a.actions);
}

// ============================================================================
// Side policies: last-merged wins
// ============================================================================

/// field_policy from the right operand overrides the left when present
#[test]
fn field_policy_last_wins() {
    let mut a = perm(true, ScopeLevel::All, &[]);
    a.field_policy = FieldPolicy::SalesLimited;
    let mut b = perm(true, ScopeLevel::All, &[]);
    b.field_policy = FieldPolicy::Unknown("pii_masked".into());

    assert_eq!(merge(&a, &b).field_policy, FieldPolicy::Unknown("pii_masked".into()));
    assert_eq!(merge(&b, &a).field_policy, FieldPolicy::SalesLimited);
}

/// An absent field_policy on the right keeps the left one
#[test]
fn absent_field_policy_keeps_left() {
    let mut a = perm(true, ScopeLevel::All, &[]);
    a.field_policy = FieldPolicy::SalesLimited;
    let b = perm(true, ScopeLevel::All, &[]);
    assert_eq!(merge(&a, &b).field_policy, FieldPolicy::SalesLimited);
}

/// Colliding extra keys take the right operand; disjoint keys union
#[test]
fn extra_keys_shallow_merge_right_wins() {
    let mut a = perm(true, ScopeLevel::All, &[]);
    a.extra = BTreeMap::from([
        ("export_limit".to_string(), serde_json::json!(10)),
        ("watermark".to_string(), serde_json::json!(true)),
    ]);
    let mut b = perm(true, ScopeLevel::All, &[]);
    b.extra = BTreeMap::from([("export_limit".to_string(), serde_json::json!(50))]);

    let out = merge(&a, &b);
    assert_eq!(out.extra["export_limit"], 50);
    assert_eq!(out.extra["watermark"], true);
}
