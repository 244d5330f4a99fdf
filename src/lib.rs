//! Scopegate - role-based access control with ownership-aware data scoping
//!
//! Users hold one or more roles; each role grants per-module enablement, an
//! action set and a visibility scope (`none < own < team < all`). The crate
//! merges a user's roles into one effective permission set, translates the
//! effective scope into a row filter over the CSM → AM ownership graph, and
//! enforces both through a single gate.
//!
//! ```no_run
//! use std::sync::Arc;
//! use scopegate::{
//!     modules, ConfigCache, Gate, Identity, LmdbConfigStore, OwnershipDirectory, Result,
//! };
//!
//! struct Users;
//! impl OwnershipDirectory for Users {
//!     fn managed_csm_ids(&self, manager_id: &str) -> Result<Vec<String>> {
//!         // one query: users where manager_id == manager_id and role == CSM
//!         Ok(vec![])
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let store = Arc::new(LmdbConfigStore::open("/var/lib/app/permissions")?);
//!     let gate = Gate::new(ConfigCache::with_default_ttl(store), Arc::new(Users));
//!
//!     let who = Identity::new("u-42", ["CSM", "AM"]);
//!     let effective = gate.authorize(&who, modules::CUSTOMERS, None)?;
//!     let access = gate.customer_access(&effective, &who)?;
//!     // hand access.filter to the storage layer, apply access.projection per row
//!     Ok(())
//! }
//! ```
//!
//! Callers must invoke the gate before every read or write of customer,
//! activity, risk, opportunity, task, report or document data, and use
//! [`require_found`] on scoped single-entity lookups so an out-of-scope row
//! answers exactly like a missing one.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod permission;
pub mod resolver;
pub mod scope;
pub mod store;

pub use cache::{ConfigCache, DEFAULT_TTL};
pub use config::{modules, roles, RoleModules, RolePermissionSet};
pub use error::{err, require_found, AuthzError, Result};
pub use filter::{
    customer_filter, projection, resource_filter, CustomerFilter, CustomerOwnership,
    FieldProjection, OwnershipDirectory, ResourceFilter, SALES_LIMITED_FIELDS,
};
pub use gate::{CustomerAccess, Gate};
pub use permission::{actions, merge, FieldPolicy, ModulePermission};
pub use resolver::{resolve, EffectivePermissionSet, Identity};
pub use scope::ScopeLevel;
pub use store::{ConfigStore, LmdbConfigStore, MemoryConfigStore};
