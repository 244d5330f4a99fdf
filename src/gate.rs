//! The enforcement gate
//!
//! Every resource handler calls `authorize` before reading or mutating
//! data; it is the only place module and action decisions are made. The
//! gate checks enablement and the requested action first and only then may
//! the caller derive a row filter, so a disabled module is denied without
//! ever touching the ownership directory.

use std::sync::Arc;

use tracing::debug;

use crate::cache::ConfigCache;
use crate::config::modules;
use crate::error::{AuthzError, Result};
use crate::filter::{
    customer_filter, projection, resource_filter, CustomerFilter, FieldProjection,
    OwnershipDirectory, ResourceFilter,
};
use crate::resolver::{resolve, EffectivePermissionSet, Identity};

/// Row filter plus field projection for a customers read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerAccess {
    pub filter: CustomerFilter,
    pub projection: FieldProjection,
}

/// The single choke point for permission decisions
pub struct Gate {
    cache: ConfigCache,
    directory: Arc<dyn OwnershipDirectory + Send + Sync>,
}

impl Gate {
    pub fn new(cache: ConfigCache, directory: Arc<dyn OwnershipDirectory + Send + Sync>) -> Self {
        Gate { cache, directory }
    }

    /// Authorize `who` against a module and optional action.
    ///
    /// Returns the effective permission set on success so the caller can
    /// derive a data filter for list and detail reads. A disabled module
    /// or an ungranted action is `Forbidden`; a denial is terminal for the
    /// request.
    pub fn authorize(
        &self,
        who: &Identity,
        module: &str,
        action: Option<&str>,
    ) -> Result<EffectivePermissionSet> {
        let config = self.cache.get()?;
        let effective = resolve(&who.roles, &config);
        if !effective.allows(module, action) {
            debug!(user = %who.user_id, module, action = action.unwrap_or("-"), "denied");
            return Err(AuthzError::Forbidden);
        }
        Ok(effective)
    }

    /// Derive the customers row filter and field projection for an already
    /// authorized request. The `team` case takes one ownership-directory
    /// lookup; a directory failure denies the whole step.
    pub fn customer_access(
        &self,
        effective: &EffectivePermissionSet,
        who: &Identity,
    ) -> Result<CustomerAccess> {
        let perm = match effective.module(modules::CUSTOMERS) {
            Some(p) => p,
            None => {
                return Ok(CustomerAccess {
                    filter: CustomerFilter::Nothing,
                    projection: FieldProjection::Full,
                })
            }
        };
        Ok(CustomerAccess {
            filter: customer_filter(perm, &who.user_id, self.directory.as_ref())?,
            projection: projection(perm),
        })
    }

    /// Derive the simpler own/all filter for a secondary module
    pub fn resource_access(
        &self,
        effective: &EffectivePermissionSet,
        module: &str,
        who: &Identity,
    ) -> ResourceFilter {
        match effective.module(module) {
            Some(perm) => resource_filter(perm, &who.user_id),
            None => ResourceFilter::Nothing,
        }
    }

    /// Admin read of the current matrix (cached, TTL-bounded)
    pub fn permissions(&self) -> Result<Arc<crate::config::RolePermissionSet>> {
        self.cache.get()
    }

    /// Admin write: persist a new matrix and make it visible to requests
    /// issued after this call returns
    pub fn update_permissions(&self, config: crate::config::RolePermissionSet) -> Result<()> {
        self.cache.put(config)
    }

    /// Drop the cached matrix, forcing the next evaluation to refetch
    pub fn invalidate(&self) {
        self.cache.invalidate()
    }
}
