//! Scope → query filter translation
//!
//! The engine never issues storage queries itself. It hands the caller a
//! filter value describing exactly which rows are visible, and the caller
//! pushes that predicate down to whatever storage it uses. Scope is
//! evaluated once per request; the result-set size then scales with what
//! the caller may see, not with the whole table.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::permission::{FieldPolicy, ModulePermission};
use crate::scope::ScopeLevel;

/// One-level manager-hierarchy lookups against the user collection.
///
/// `managed_csm_ids` must return the ids of users whose `manager_id` equals
/// the given id and who hold the CSM role. One bounded read, never
/// transitive. A failure here fails the whole authorization step.
pub trait OwnershipDirectory {
    fn managed_csm_ids(&self, manager_id: &str) -> Result<Vec<String>>;
}

/// Ownership columns of a customer row, for in-process predicate checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOwnership {
    pub csm_owner_id: Option<String>,
    pub am_owner_id: Option<String>,
}

/// Row filter for the customers collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerFilter {
    /// Explicit impossible predicate; matches nothing
    Nothing,
    /// Unrestricted
    All,
    /// Rows where `csm_owner_id` equals the acting user
    Own { csm_owner_id: String },
    /// Rows the acting user owns as AM, plus rows owned by the CSMs they
    /// directly manage
    Team {
        am_owner_id: String,
        managed_csm_ids: Vec<String>,
    },
}

impl CustomerFilter {
    /// Evaluate the filter against one row's ownership columns
    pub fn matches(&self, row: &CustomerOwnership) -> bool {
        match self {
            CustomerFilter::Nothing => false,
            CustomerFilter::All => true,
            CustomerFilter::Own { csm_owner_id } => {
                row.csm_owner_id.as_deref() == Some(csm_owner_id.as_str())
            }
            CustomerFilter::Team { am_owner_id, managed_csm_ids } => {
                row.am_owner_id.as_deref() == Some(am_owner_id.as_str())
                    || row
                        .csm_owner_id
                        .as_deref()
                        .map(|csm| managed_csm_ids.iter().any(|id| id == csm))
                        .unwrap_or(false)
            }
        }
    }

    /// True when no row can match
    pub fn is_empty(&self) -> bool {
        matches!(self, CustomerFilter::Nothing)
    }
}

/// Row filter for secondary modules (activities, risks, opportunities,
/// tasks, reports, documents)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFilter {
    /// Matches nothing
    Nothing,
    /// Unrestricted
    All,
    /// Rows whose owner field equals the acting user
    Owner { owner_id: String },
    /// Rows whose `customer_id` belongs to a customer visible through the
    /// caller's customer filter; the storage layer performs the join
    VisibleCustomers,
}

/// Field-level projection applied after row filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProjection {
    /// Every field visible
    Full,
    /// Only the named fields survive
    Allow(&'static [&'static str]),
}

/// Fields a sales-limited user may see on a customer row: company identity,
/// commercial and ownership-display fields. Operational and internal fields
/// (website, stakeholders, notes, usage metrics) are deliberately absent.
pub const SALES_LIMITED_FIELDS: &[&str] = &[
    "id",
    "company_name",
    "arr",
    "renewal_date",
    "health_score",
    "health_status",
    "account_status",
    "csm_owner_name",
    "am_owner_name",
    "region",
    "industry",
];

impl FieldProjection {
    /// Strip disallowed keys from a JSON object in place. Non-object values
    /// pass through untouched.
    pub fn apply(&self, row: &mut serde_json::Value) {
        if let FieldProjection::Allow(allowed) = self {
            if let Some(map) = row.as_object_mut() {
                map.retain(|k, _| allowed.contains(&k.as_str()));
            }
        }
    }

    /// True when a field is visible under this projection
    pub fn permits(&self, field: &str) -> bool {
        match self {
            FieldProjection::Full => true,
            FieldProjection::Allow(allowed) => allowed.contains(&field),
        }
    }
}

/// Translate a customers-module permission into a row filter.
///
/// Exhaustive over the lattice: `all` is unrestricted, `none` (or a
/// disabled module) matches nothing, `own` pins the CSM owner column, and
/// `team` takes one manager-hierarchy lookup, never more than one level.
pub fn customer_filter(
    perm: &ModulePermission,
    user_id: &str,
    directory: &dyn OwnershipDirectory,
) -> Result<CustomerFilter> {
    if !perm.enabled {
        return Ok(CustomerFilter::Nothing);
    }
    Ok(match perm.scope {
        ScopeLevel::None => CustomerFilter::Nothing,
        ScopeLevel::Own => CustomerFilter::Own { csm_owner_id: user_id.to_string() },
        ScopeLevel::Team => CustomerFilter::Team {
            am_owner_id: user_id.to_string(),
            managed_csm_ids: directory.managed_csm_ids(user_id)?,
        },
        ScopeLevel::All => CustomerFilter::All,
    })
}

/// Translate a secondary module's permission into its simpler filter.
///
/// `own` scopes on the module's own owner column; `team` defers to the
/// customer join so team visibility stays defined in exactly one place.
pub fn resource_filter(perm: &ModulePermission, user_id: &str) -> ResourceFilter {
    if !perm.enabled {
        return ResourceFilter::Nothing;
    }
    match perm.scope {
        ScopeLevel::None => ResourceFilter::Nothing,
        ScopeLevel::Own => ResourceFilter::Owner { owner_id: user_id.to_string() },
        ScopeLevel::Team => ResourceFilter::VisibleCustomers,
        ScopeLevel::All => ResourceFilter::All,
    }
}

/// The field projection a module permission implies, independent of row
/// scoping
pub fn projection(perm: &ModulePermission) -> FieldProjection {
    match &perm.field_policy {
        FieldPolicy::SalesLimited => FieldProjection::Allow(SALES_LIMITED_FIELDS),
        // Unknown tags round-trip through storage but impose no projection
        FieldPolicy::None | FieldPolicy::Unknown(_) => FieldProjection::Full,
    }
}
