//! Tenant-scoped execution context.
//!
//! Modeled on the reference backend's `OrgContext`/`check_org_access`
//! family: every write path carries who it runs as and where the change
//! came from. `acquire` hands back a `TenantScope` guard whose `Drop`
//! impl is the release path — RAII makes "release must be invoked on
//! every exit path" structural instead of a caller discipline to get
//! right by hand.

use sqlx::SqlitePool;

/// Provenance attached to rows written during an enrichment run.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub source: &'static str,
    pub user: Option<String>,
}

impl Provenance {
    pub fn inferred(user: impl Into<String>) -> Self {
        Self { source: "inferred", user: Some(user.into()) }
    }
}

/// A tenant-scoped handle on the ontology database, bound to one project.
///
/// Not shared across tasks; each task acquires its own and releases it
/// before returning.
pub struct TenantScope {
    pub project_id: i64,
    pub pool: SqlitePool,
    pub provenance: Option<Provenance>,
}

impl TenantScope {
    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Drop for TenantScope {
    fn drop(&mut self) {
        tracing::debug!(project_id = self.project_id, "releasing tenant scope");
    }
}

/// Acquire a tenant-scoped handle for `project_id`.
///
/// The returned scope must be held for the duration of the tenant-scoped
/// work and dropped afterward; dropping is the release.
pub fn acquire(pool: SqlitePool, project_id: i64) -> TenantScope {
    TenantScope { project_id, pool, provenance: None }
}

/// Acquire a tenant-scoped handle that additionally stamps writes with
/// provenance, used by write paths such as `UpdateColumnDetails` and
/// relationship upserts.
pub fn acquire_with_provenance(
    pool: SqlitePool,
    project_id: i64,
    provenance: Provenance,
) -> TenantScope {
    TenantScope { project_id, pool, provenance: Some(provenance) }
}
