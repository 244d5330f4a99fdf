//! Enforcement gate tests
//!
//! The gate is the single choke point: module enablement and action checks
//! happen before any scope translation, so a denied request never touches
//! the ownership directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scopegate::{
    actions, modules, roles, AuthzError, ConfigCache, CustomerFilter, FieldProjection, Gate,
    Identity, MemoryConfigStore, OwnershipDirectory, ResourceFilter, Result, RolePermissionSet,
};

/// Directory that counts lookups and panics when declared unreachable
struct CountingDirectory {
    calls: AtomicUsize,
    reachable: bool,
}

impl CountingDirectory {
    fn new(reachable: bool) -> Self {
        CountingDirectory { calls: AtomicUsize::new(0), reachable }
    }
}

impl OwnershipDirectory for CountingDirectory {
    fn managed_csm_ids(&self, _manager_id: &str) -> Result<Vec<String>> {
        assert!(self.reachable, "directory consulted on a denied path");
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["csm-1".into()])
    }
}

fn gate_with_defaults(directory: Arc<CountingDirectory>) -> Gate {
    let store = Arc::new(MemoryConfigStore::seeded(RolePermissionSet::defaults()));
    Gate::new(ConfigCache::new(store, Duration::from_secs(300)), directory)
}

// ============================================================================
// Deny-before-scoping ordering
// ============================================================================

/// A disabled module is Forbidden without any directory lookup
#[test]
fn denies_disabled_module_before_scoping() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(Arc::clone(&dir));

    // SALES has activities disabled
    let who = Identity::new("u-1", [roles::SALES]);
    let out = gate.authorize(&who, modules::ACTIVITIES, None);
    assert_eq!(out.unwrap_err(), AuthzError::Forbidden);
    assert_eq!(dir.calls.load(Ordering::SeqCst), 0);
}

/// An empty role set is denied everywhere
#[test]
fn empty_roles_denied_everywhere() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("u-1", Vec::<String>::new());
    for module in [modules::DASHBOARD, modules::CUSTOMERS, modules::SETTINGS] {
        assert_eq!(
            gate.authorize(&who, module, None).unwrap_err(),
            AuthzError::Forbidden
        );
    }
}

/// A role unknown to the matrix is denied, not an error
#[test]
fn unknown_role_is_denied() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("u-1", ["CONTRACTOR"]);
    assert_eq!(
        gate.authorize(&who, modules::CUSTOMERS, None).unwrap_err(),
        AuthzError::Forbidden
    );
}

// ============================================================================
// Action checks
// ============================================================================

/// Module enabled but action not granted is Forbidden
#[test]
fn denies_ungranted_action() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("u-1", [roles::CSM]);
    // CSM may create and edit customers but not delete them
    assert!(gate.authorize(&who, modules::CUSTOMERS, Some(actions::CREATE)).is_ok());
    assert!(gate.authorize(&who, modules::CUSTOMERS, Some(actions::EDIT)).is_ok());
    assert_eq!(
        gate.authorize(&who, modules::CUSTOMERS, Some(actions::DELETE)).unwrap_err(),
        AuthzError::Forbidden
    );
}

/// Unknown action names are denied rather than ignored
#[test]
fn unknown_action_is_denied() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("u-1", [roles::ADMIN]);
    assert_eq!(
        gate.authorize(&who, modules::CUSTOMERS, Some("approve")).unwrap_err(),
        AuthzError::Forbidden
    );
}

// ============================================================================
// Filter derivation after authorization
// ============================================================================

/// The CSM+AM example: merged team scope yields the team filter with one
/// directory lookup
#[test]
fn authorized_team_read_derives_team_filter() {
    let dir = Arc::new(CountingDirectory::new(true));
    let gate = gate_with_defaults(Arc::clone(&dir));

    let who = Identity::new("am-1", [roles::CSM, roles::AM]);
    let eff = gate.authorize(&who, modules::CUSTOMERS, None).unwrap();
    let access = gate.customer_access(&eff, &who).unwrap();

    assert_eq!(
        access.filter,
        CustomerFilter::Team {
            am_owner_id: "am-1".into(),
            managed_csm_ids: vec!["csm-1".into()],
        }
    );
    assert_eq!(access.projection, FieldProjection::Full);
    assert_eq!(dir.calls.load(Ordering::SeqCst), 1);
}

/// SALES listing customers: unrestricted rows, restricted fields
#[test]
fn sales_gets_all_rows_with_limited_fields() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("s-1", [roles::SALES]);
    let eff = gate.authorize(&who, modules::CUSTOMERS, None).unwrap();
    let access = gate.customer_access(&eff, &who).unwrap();

    assert_eq!(access.filter, CustomerFilter::All);
    match access.projection {
        FieldProjection::Allow(fields) => {
            assert!(fields.contains(&"company_name"));
            assert!(!fields.contains(&"website"));
            assert!(!fields.contains(&"stakeholders"));
        }
        FieldProjection::Full => panic!("sales projection must be restricted"),
    }
}

/// SALES may edit opportunities but not create them
#[test]
fn sales_opportunity_actions() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("s-1", [roles::SALES]);
    assert!(gate.authorize(&who, modules::OPPORTUNITIES, Some(actions::EDIT)).is_ok());
    assert_eq!(
        gate.authorize(&who, modules::OPPORTUNITIES, Some(actions::CREATE)).unwrap_err(),
        AuthzError::Forbidden
    );
}

/// Secondary module filters come out per the held role's scope
#[test]
fn resource_filters_follow_module_scope() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let csm = Identity::new("u-1", [roles::CSM]);
    let eff = gate.authorize(&csm, modules::TASKS, None).unwrap();
    assert_eq!(
        gate.resource_access(&eff, modules::TASKS, &csm),
        ResourceFilter::Owner { owner_id: "u-1".into() }
    );

    let am = Identity::new("am-1", [roles::AM]);
    let eff = gate.authorize(&am, modules::TASKS, None).unwrap();
    assert_eq!(
        gate.resource_access(&eff, modules::TASKS, &am),
        ResourceFilter::VisibleCustomers
    );

    let admin = Identity::new("a-1", [roles::ADMIN]);
    let eff = gate.authorize(&admin, modules::TASKS, None).unwrap();
    assert_eq!(gate.resource_access(&eff, modules::TASKS, &admin), ResourceFilter::All);
}

/// A module the user never heard of yields the impossible filter
#[test]
fn unconfigured_module_access_is_nothing() {
    let dir = Arc::new(CountingDirectory::new(false));
    let gate = gate_with_defaults(dir);

    let who = Identity::new("s-1", [roles::SALES]);
    let eff = gate.authorize(&who, modules::OPPORTUNITIES, None).unwrap();
    assert_eq!(
        gate.resource_access(&eff, "billing", &who),
        ResourceFilter::Nothing
    );
}

// ============================================================================
// NotFound semantics
// ============================================================================

/// A scoped single-entity miss answers exactly like a missing row
#[test]
fn scoped_miss_is_not_found() {
    use scopegate::{require_found, CustomerOwnership};

    let filter = CustomerFilter::Own { csm_owner_id: "u-1".into() };
    let row = CustomerOwnership {
        csm_owner_id: Some("someone-else".into()),
        am_owner_id: None,
    };

    // storage applies the filter; the handler sees None either way
    let fetched = Some(row).filter(|r| filter.matches(r));
    assert_eq!(require_found(fetched).unwrap_err(), AuthzError::NotFound);
    assert_eq!(require_found(None::<()>).unwrap_err(), AuthzError::NotFound);
}
