//! TTL cache over the configuration store
//!
//! One `ConfigCache` instance is injected into whatever performs
//! authorization; there is no ambient global. Readers inside the TTL window
//! clone an `Arc` of the current matrix. Replacement swaps the whole `Arc`,
//! so a reader sees either the old matrix or the new one, never a
//! half-written mix. An admin write goes through `put`, which persists and
//! then replaces the cached copy before returning.

use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::RolePermissionSet;
use crate::error::Result;
use crate::store::ConfigStore;

/// Default time-to-live for a cached matrix: five minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Cached {
    value: Arc<RolePermissionSet>,
    version: u64,
    fetched_at: Instant,
}

/// Read-mostly cache of the role-permission matrix
pub struct ConfigCache {
    store: Arc<dyn ConfigStore>,
    ttl: Duration,
    slot: RwLock<Option<Cached>>,
}

impl ConfigCache {
    pub fn new(store: Arc<dyn ConfigStore>, ttl: Duration) -> Self {
        ConfigCache { store, ttl, slot: RwLock::new(None) }
    }

    pub fn with_default_ttl(store: Arc<dyn ConfigStore>) -> Self {
        ConfigCache::new(store, DEFAULT_TTL)
    }

    /// Current matrix: served from cache within the TTL, revalidated
    /// against the store's version counter on expiry, refetched when the
    /// counter moved. Seeds the store with defaults when it holds nothing.
    /// If a refresh fails and a stale copy exists, the stale copy is served
    /// with a warning.
    pub fn get(&self) -> Result<Arc<RolePermissionSet>> {
        {
            let slot = self.slot.read().unwrap_or_else(|p| p.into_inner());
            if let Some(c) = slot.as_ref() {
                if c.fetched_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&c.value));
                }
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        // Re-check: another request may have refreshed while we waited
        if let Some(c) = slot.as_ref() {
            if c.fetched_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&c.value));
            }
        }

        match self.refresh(&mut slot) {
            Ok(value) => Ok(value),
            Err(e) => match slot.as_ref() {
                Some(stale) => {
                    warn!(error = %e, "config refresh failed; serving stale matrix");
                    Ok(Arc::clone(&stale.value))
                }
                None => Err(e),
            },
        }
    }

    /// Persist a new matrix and expose it to subsequent reads before
    /// returning
    pub fn put(&self, config: RolePermissionSet) -> Result<()> {
        self.store.save(&config)?;
        let version = self.store.version()?;
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(Cached {
            value: Arc::new(config),
            version,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    /// Drop the cached copy; the next read refetches from the store
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        *slot = None;
    }

    fn refresh(&self, slot: &mut RwLockWriteGuard<'_, Option<Cached>>) -> Result<Arc<RolePermissionSet>> {
        // Cheap revalidation: an unchanged version counter means the
        // expired entry is still the current matrix
        let version = self.store.version()?;
        if let Some(c) = slot.as_mut() {
            if c.version == version {
                c.fetched_at = Instant::now();
                return Ok(Arc::clone(&c.value));
            }
        }

        let value = match self.store.load()? {
            Some(config) => Arc::new(config),
            None => {
                // First access: seed the store with the shipped defaults
                let defaults = RolePermissionSet::defaults();
                self.store.save(&defaults)?;
                Arc::new(defaults)
            }
        };
        let version = self.store.version()?;
        **slot = Some(Cached {
            value: Arc::clone(&value),
            version,
            fetched_at: Instant::now(),
        });
        Ok(value)
    }
}
