//! Module permissions and the cross-role merger
//!
//! A `ModulePermission` is one fragment of the admin-managed permission
//! matrix: whether a module is reachable at all, which rows are visible
//! (the scope), which mutations are allowed (the action map) and any side
//! policies such as a field-visibility restriction.
//!
//! Merge semantics across a user's roles:
//! - `enabled` and each action OR together
//! - `scope` takes the wider rank, ties keep the left operand
//! - `field_policy` and `extra` keys take the right operand on collision,
//!   so the fold order over roles must be deterministic

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scope::ScopeLevel;

/// Action names recognized by the permission matrix.
///
/// Unknown action keys are carried through merges but always default to
/// denied when queried.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const EDIT: &str = "edit";
    pub const DELETE: &str = "delete";
}

/// Field-level visibility policy attached to a module permission.
///
/// Known policies are modeled as variants; anything else round-trips
/// through `Unknown` so an older build never silently drops a policy a
/// newer build wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum FieldPolicy {
    /// No field restriction
    #[default]
    None,
    /// Commercial allow-list for sales users: company identity, commercial
    /// and ownership-display fields only
    SalesLimited,
    /// A policy tag this build does not model; preserved verbatim
    Unknown(String),
}

impl FieldPolicy {
    /// True when no restriction applies
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, FieldPolicy::None)
    }
}

impl From<Option<String>> for FieldPolicy {
    fn from(s: Option<String>) -> Self {
        match s.as_deref() {
            None => FieldPolicy::None,
            Some("sales_limited") => FieldPolicy::SalesLimited,
            Some(other) => FieldPolicy::Unknown(other.to_string()),
        }
    }
}

impl From<FieldPolicy> for Option<String> {
    fn from(p: FieldPolicy) -> Self {
        match p {
            FieldPolicy::None => None,
            FieldPolicy::SalesLimited => Some("sales_limited".to_string()),
            FieldPolicy::Unknown(tag) => Some(tag),
        }
    }
}

/// One module's permission fragment as granted by a single role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulePermission {
    /// Gate switch: false makes the module entirely inaccessible
    /// regardless of scope or actions
    #[serde(default)]
    pub enabled: bool,
    /// Row visibility; absent in configuration means `none`
    #[serde(default, skip_serializing_if = "scope_is_none")]
    pub scope: ScopeLevel,
    /// Action grants; absent keys are denied
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, bool>,
    /// Field-visibility restriction, if any
    #[serde(default, skip_serializing_if = "FieldPolicy::is_none")]
    pub field_policy: FieldPolicy,
    /// Forward-compatible bucket for policy keys this build does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn scope_is_none(s: &ScopeLevel) -> bool {
    *s == ScopeLevel::None
}

impl ModulePermission {
    /// An explicitly disabled module entry
    pub fn disabled() -> Self {
        ModulePermission::default()
    }

    /// True when the named action is granted; unknown actions are denied
    #[inline]
    pub fn allows(&self, action: &str) -> bool {
        self.actions.get(action).copied().unwrap_or(false)
    }
}

/// Merge two permission fragments for the same module.
///
/// OR booleans, widest scope (ties keep `a`), union-OR actions. The side
/// policies (`field_policy`, `extra`) take `b` on collision; folding order
/// over a user's roles is therefore part of the contract, not an accident.
pub fn merge(a: &ModulePermission, b: &ModulePermission) -> ModulePermission {
    let mut actions = a.actions.clone();
    for (k, v) in &b.actions {
        let cur = actions.entry(k.clone()).or_insert(false);
        *cur = *cur || *v;
    }

    let mut extra = a.extra.clone();
    for (k, v) in &b.extra {
        extra.insert(k.clone(), v.clone());
    }

    ModulePermission {
        enabled: a.enabled || b.enabled,
        scope: a.scope.widest(b.scope),
        actions,
        field_policy: if b.field_policy.is_none() {
            a.field_policy.clone()
        } else {
            b.field_policy.clone()
        },
        extra,
    }
}
