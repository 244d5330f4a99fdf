//! Effective permission resolution
//!
//! Folds every role a user holds through the module-permission merger,
//! producing one effective entry per module that appears in at least one of
//! the user's roles. Recomputed on every evaluation; only the input matrix
//! is cached.

use std::collections::BTreeMap;

use tracing::warn;

use crate::config::RolePermissionSet;
use crate::permission::{merge, ModulePermission};

/// The acting user as supplied by the (already authenticated) identity layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Identity {
            user_id: user_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-request merged permission map. Modules absent from every held role
/// read as disabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectivePermissionSet {
    modules: BTreeMap<String, ModulePermission>,
}

impl EffectivePermissionSet {
    /// The merged entry for a module, if any role mentioned it
    pub fn module(&self, key: &str) -> Option<&ModulePermission> {
        self.modules.get(key)
    }

    /// True when the module is enabled and, if an action is named, granted
    pub fn allows(&self, module: &str, action: Option<&str>) -> bool {
        match self.modules.get(module) {
            Some(m) if m.enabled => action.map(|a| m.allows(a)).unwrap_or(true),
            _ => false,
        }
    }

    /// Module keys present in the merged set
    pub fn module_keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|s| s.as_str())
    }
}

/// Resolve a user's effective permissions against the global matrix.
///
/// Roles fold in their declared order with duplicates collapsed at first
/// occurrence, which makes the non-commutative side-policy merge
/// reproducible. A role with no matrix entry contributes nothing: an empty
/// or entirely unknown role list yields the empty set, where every module
/// reads as disabled.
pub fn resolve(roles: &[String], config: &RolePermissionSet) -> EffectivePermissionSet {
    let mut effective = EffectivePermissionSet::default();
    let mut seen: Vec<&str> = Vec::with_capacity(roles.len());

    for role in roles {
        if seen.contains(&role.as_str()) {
            continue;
        }
        seen.push(role);

        let Some(rm) = config.role(role) else {
            warn!(role = %role, "role has no permission configuration; contributes nothing");
            continue;
        };
        for (module, perm) in &rm.modules {
            let merged = match effective.modules.get(module) {
                Some(cur) => merge(cur, perm),
                None => merge(&ModulePermission::default(), perm),
            };
            effective.modules.insert(module.clone(), merged);
        }
    }

    effective
}
