//! The admin-managed role → module permission matrix
//!
//! One `RolePermissionSet` exists per deployment. It is created with
//! defaults on first access, edited only through explicit admin updates,
//! and served to evaluations through `ConfigCache`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::permission::{actions, FieldPolicy, ModulePermission};
use crate::scope::ScopeLevel;

/// Built-in role identifiers
pub mod roles {
    pub const ADMIN: &str = "ADMIN";
    pub const CS_OPS: &str = "CS_OPS";
    pub const CS_LEADER: &str = "CS_LEADER";
    pub const CSM: &str = "CSM";
    pub const AM: &str = "AM";
    pub const SALES: &str = "SALES";
    pub const READ_ONLY: &str = "READ_ONLY";
}

/// Module keys known to the application
pub mod modules {
    pub const DASHBOARD: &str = "dashboard";
    pub const CUSTOMERS: &str = "customers";
    pub const ACTIVITIES: &str = "activities";
    pub const RISKS: &str = "risks";
    pub const OPPORTUNITIES: &str = "opportunities";
    pub const TASKS: &str = "tasks";
    pub const DATALABS_REPORTS: &str = "datalabs_reports";
    pub const DOCUMENTS: &str = "documents";
    pub const EXPORTS: &str = "exports";
    pub const USERS: &str = "users";
    pub const SETTINGS: &str = "settings";
}

/// One role's slice of the permission matrix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleModules {
    #[serde(default)]
    pub modules: BTreeMap<String, ModulePermission>,
}

/// The global permission matrix: role → modules → permission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissionSet(pub BTreeMap<String, RoleModules>);

impl RolePermissionSet {
    /// Look up one role's module map; an unknown role is simply absent
    pub fn role(&self, role: &str) -> Option<&RoleModules> {
        self.0.get(role)
    }

    /// Replace one role's module map
    pub fn set_role(&mut self, role: &str, modules: RoleModules) {
        self.0.insert(role.to_string(), modules);
    }

    /// Declared role names, in stored order
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }

    /// The default permission matrix shipped with the product.
    ///
    /// Seeded into the configuration store on first access when the store
    /// holds nothing; admins edit it from there.
    pub fn defaults() -> RolePermissionSet {
        let full = |scope| crud(scope, true, true, true);
        let mut set = RolePermissionSet::default();

        set.set_role(
            roles::ADMIN,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, full(ScopeLevel::All)),
                (modules::ACTIVITIES, full(ScopeLevel::All)),
                (modules::RISKS, full(ScopeLevel::All)),
                (modules::OPPORTUNITIES, full(ScopeLevel::All)),
                (modules::TASKS, full(ScopeLevel::All)),
                (modules::DATALABS_REPORTS, full(ScopeLevel::All)),
                (modules::DOCUMENTS, create_delete(ScopeLevel::All, true, true)),
                (modules::EXPORTS, enabled_only()),
                (modules::USERS, enabled_only()),
                (modules::SETTINGS, enabled_only()),
            ]),
        );

        set.set_role(
            roles::CS_OPS,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, full(ScopeLevel::All)),
                (modules::ACTIVITIES, full(ScopeLevel::All)),
                (modules::RISKS, full(ScopeLevel::All)),
                (modules::OPPORTUNITIES, full(ScopeLevel::All)),
                (modules::TASKS, full(ScopeLevel::All)),
                (modules::DATALABS_REPORTS, full(ScopeLevel::All)),
                (modules::DOCUMENTS, create_delete(ScopeLevel::All, true, true)),
                (modules::EXPORTS, enabled_only()),
                (modules::USERS, enabled_only()),
                (modules::SETTINGS, enabled_only()),
            ]),
        );

        set.set_role(
            roles::CS_LEADER,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, crud(ScopeLevel::All, true, true, false)),
                (modules::ACTIVITIES, crud(ScopeLevel::All, true, true, false)),
                (modules::RISKS, crud(ScopeLevel::All, true, true, false)),
                (modules::OPPORTUNITIES, crud(ScopeLevel::All, true, true, false)),
                (modules::TASKS, crud(ScopeLevel::All, true, true, false)),
                (modules::DATALABS_REPORTS, crud(ScopeLevel::All, true, false, false)),
                (modules::DOCUMENTS, create_delete(ScopeLevel::All, true, false)),
                (modules::EXPORTS, enabled_only()),
                (modules::USERS, enabled_only()),
                (modules::SETTINGS, ModulePermission::disabled()),
            ]),
        );

        set.set_role(
            roles::CSM,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, crud(ScopeLevel::Own, true, true, false)),
                (modules::ACTIVITIES, crud(ScopeLevel::Own, true, true, false)),
                (modules::RISKS, crud(ScopeLevel::Own, true, true, false)),
                (modules::OPPORTUNITIES, crud(ScopeLevel::Own, true, true, false)),
                (modules::TASKS, crud(ScopeLevel::Own, true, true, false)),
                (modules::DATALABS_REPORTS, crud(ScopeLevel::Own, true, false, false)),
                (modules::DOCUMENTS, create_delete(ScopeLevel::Own, true, true)),
                (modules::EXPORTS, ModulePermission::disabled()),
                (modules::USERS, ModulePermission::disabled()),
                (modules::SETTINGS, ModulePermission::disabled()),
            ]),
        );

        set.set_role(
            roles::AM,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, crud(ScopeLevel::Team, true, true, false)),
                (modules::ACTIVITIES, crud(ScopeLevel::Team, true, true, false)),
                (modules::RISKS, crud(ScopeLevel::Team, true, true, false)),
                (modules::OPPORTUNITIES, crud(ScopeLevel::Team, true, true, false)),
                (modules::TASKS, crud(ScopeLevel::Team, true, true, false)),
                (modules::DATALABS_REPORTS, crud(ScopeLevel::Team, true, false, false)),
                (modules::DOCUMENTS, create_delete(ScopeLevel::Team, true, true)),
                (modules::EXPORTS, ModulePermission::disabled()),
                (modules::USERS, enabled_only()),
                (modules::SETTINGS, ModulePermission::disabled()),
            ]),
        );

        let mut sales_customers = crud(ScopeLevel::All, false, false, false);
        sales_customers.field_policy = FieldPolicy::SalesLimited;
        set.set_role(
            roles::SALES,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, sales_customers),
                (modules::OPPORTUNITIES, crud(ScopeLevel::All, false, true, false)),
                (modules::ACTIVITIES, ModulePermission::disabled()),
                (modules::RISKS, ModulePermission::disabled()),
                (modules::TASKS, ModulePermission::disabled()),
                (modules::DATALABS_REPORTS, ModulePermission::disabled()),
                (modules::DOCUMENTS, ModulePermission::disabled()),
                (modules::EXPORTS, ModulePermission::disabled()),
                (modules::USERS, ModulePermission::disabled()),
                (modules::SETTINGS, ModulePermission::disabled()),
            ]),
        );

        set.set_role(
            roles::READ_ONLY,
            role_modules(vec![
                (modules::DASHBOARD, enabled_only()),
                (modules::CUSTOMERS, crud(ScopeLevel::Own, false, false, false)),
                (modules::ACTIVITIES, crud(ScopeLevel::Own, false, false, false)),
                (modules::RISKS, crud(ScopeLevel::Own, false, false, false)),
                (modules::OPPORTUNITIES, crud(ScopeLevel::Own, false, false, false)),
                (modules::TASKS, crud(ScopeLevel::Own, false, false, false)),
                (modules::DATALABS_REPORTS, crud(ScopeLevel::Own, false, false, false)),
                (modules::DOCUMENTS, create_delete(ScopeLevel::Own, false, false)),
                (modules::EXPORTS, ModulePermission::disabled()),
                (modules::USERS, ModulePermission::disabled()),
                (modules::SETTINGS, ModulePermission::disabled()),
            ]),
        );

        set
    }
}

fn role_modules(entries: Vec<(&str, ModulePermission)>) -> RoleModules {
    RoleModules {
        modules: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    }
}

/// Module reachable but carrying no scope or actions (dashboard, exports,
/// users, settings)
fn enabled_only() -> ModulePermission {
    ModulePermission {
        enabled: true,
        ..ModulePermission::default()
    }
}

/// Standard create/edit/delete module entry
fn crud(scope: ScopeLevel, create: bool, edit: bool, delete: bool) -> ModulePermission {
    ModulePermission {
        enabled: true,
        scope,
        actions: BTreeMap::from([
            (actions::CREATE.to_string(), create),
            (actions::EDIT.to_string(), edit),
            (actions::DELETE.to_string(), delete),
        ]),
        ..ModulePermission::default()
    }
}

/// Documents carry create/delete only
fn create_delete(scope: ScopeLevel, create: bool, delete: bool) -> ModulePermission {
    ModulePermission {
        enabled: true,
        scope,
        actions: BTreeMap::from([
            (actions::CREATE.to_string(), create),
            (actions::DELETE.to_string(), delete),
        ]),
        ..ModulePermission::default()
    }
}
