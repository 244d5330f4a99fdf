//! Configuration storage
//!
//! The permission matrix lives behind the `ConfigStore` trait so the engine
//! stays decoupled from storage technology. Two implementations ship here:
//! an LMDB-backed store (one JSON value per role plus a monotonic version
//! counter) and an in-memory store for tests and embedders that persist the
//! matrix themselves.
//!
//! The version counter lets the cache revalidate an expired entry without
//! deserializing the whole matrix.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions};

use crate::config::{RoleModules, RolePermissionSet};
use crate::error::{err, Result};

/// Persistence contract for the role-permission matrix
pub trait ConfigStore: Send + Sync {
    /// Load the whole matrix; `None` when the store has never been written
    fn load(&self) -> Result<Option<RolePermissionSet>>;

    /// Atomically replace the whole matrix
    fn save(&self, config: &RolePermissionSet) -> Result<()>;

    /// Monotonic counter bumped by every `save`; 0 before the first write
    fn version(&self) -> Result<u64>;
}

const VERSION_KEY: &str = "version";

/// LMDB-backed store: `roles` maps role name → JSON module map, `meta`
/// holds the version counter
pub struct LmdbConfigStore {
    env: Env,
    roles: Database<Str, Str>,
    meta: Database<Str, U64<byteorder::BigEndian>>,
}

impl LmdbConfigStore {
    /// Open (creating if needed) the store at the given directory
    pub fn open(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: LMDB requires no other process access this path
        // concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 26)
                .max_dbs(2)
                .open(Path::new(path))
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let roles = env.create_database(&mut tx, Some("roles")).map_err(err)?;
        let meta = env.create_database(&mut tx, Some("meta")).map_err(err)?;
        tx.commit().map_err(err)?;
        Ok(LmdbConfigStore { env, roles, meta })
    }
}

impl ConfigStore for LmdbConfigStore {
    fn load(&self) -> Result<Option<RolePermissionSet>> {
        let tx = self.env.read_txn().map_err(err)?;
        let mut set = RolePermissionSet::default();
        for item in self.roles.iter(&tx).map_err(err)? {
            let (role, json) = item.map_err(err)?;
            let modules: RoleModules = serde_json::from_str(json).map_err(err)?;
            set.set_role(role, modules);
        }
        if set.0.is_empty() {
            return Ok(None);
        }
        Ok(Some(set))
    }

    fn save(&self, config: &RolePermissionSet) -> Result<()> {
        let mut tx = self.env.write_txn().map_err(err)?;
        self.roles.clear(&mut tx).map_err(err)?;
        for (role, modules) in &config.0 {
            let json = serde_json::to_string(modules).map_err(err)?;
            self.roles.put(&mut tx, role, &json).map_err(err)?;
        }
        let next = self.meta.get(&tx, VERSION_KEY).map_err(err)?.unwrap_or(0) + 1;
        self.meta.put(&mut tx, VERSION_KEY, &next).map_err(err)?;
        tx.commit().map_err(err)
    }

    fn version(&self) -> Result<u64> {
        let tx = self.env.read_txn().map_err(err)?;
        Ok(self.meta.get(&tx, VERSION_KEY).map_err(err)?.unwrap_or(0))
    }
}

/// In-memory store for tests and embedders with their own persistence
#[derive(Default)]
pub struct MemoryConfigStore {
    value: Mutex<Option<RolePermissionSet>>,
    version: AtomicU64,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        MemoryConfigStore::default()
    }

    /// A store pre-seeded with a matrix, version 1
    pub fn seeded(config: RolePermissionSet) -> Self {
        MemoryConfigStore {
            value: Mutex::new(Some(config)),
            version: AtomicU64::new(1),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Option<RolePermissionSet>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone())
    }

    fn save(&self, config: &RolePermissionSet) -> Result<()> {
        let mut guard = self.value.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(config.clone());
        self.version.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn version(&self) -> Result<u64> {
        Ok(self.version.load(Ordering::SeqCst))
    }
}
