//! Shared router state
//!
//! One coarse lock per structure: the table behind a `Mutex`, the filter set
//! behind an `RwLock` so admission checks can read it concurrently. Never
//! hold the filter lock while taking the table lock.

use community::CommunityTable;
use filter::FilterSet;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use router_config::{parse_filters_json, RouterConfig};
use std::sync::Arc;
use tracing::{info, warn};
use types::Name;

use crate::error::Result;

#[derive(Debug)]
pub struct RouterState {
    hostname: Name,
    expiry_factor: u32,
    table: Mutex<CommunityTable>,
    filters: RwLock<FilterSet>,
}

impl RouterState {
    pub fn new(hostname: impl Into<Name>, expiry_factor: u32, table: CommunityTable, filters: FilterSet) -> Self {
        Self {
            hostname: hostname.into(),
            expiry_factor,
            table: Mutex::new(table),
            filters: RwLock::new(filters),
        }
    }

    /// Build state from configuration. Fails if any filter is invalid or a
    /// static community cannot be loaded.
    pub fn from_config(config: &RouterConfig) -> Result<Arc<Self>> {
        let filters = config.build_filters()?;
        let mut table = CommunityTable::new();
        config.populate(&mut table)?;
        info!(
            "Router {} ready: {} communities, {} memberships, {} filters",
            config.router.hostname,
            table.size(),
            table.membership_count(),
            filters.len()
        );
        Ok(Arc::new(Self::new(
            config.router.hostname.as_str(),
            config.trp.expiry_factor,
            table,
            filters,
        )))
    }

    pub fn hostname(&self) -> &Name {
        &self.hostname
    }

    pub fn expiry_factor(&self) -> u32 {
        self.expiry_factor
    }

    pub fn table(&self) -> MutexGuard<'_, CommunityTable> {
        self.table.lock()
    }

    pub fn filters(&self) -> RwLockReadGuard<'_, FilterSet> {
        self.filters.read()
    }

    /// Swap in an already validated filter set.
    pub fn replace_filters(&self, filters: FilterSet) {
        info!("Installing {} filters", filters.len());
        *self.filters.write() = filters;
    }

    /// Replace the filter set from a JSON document. On any error the
    /// current set stays in force.
    pub fn reload_filters_json(&self, text: &str) -> Result<()> {
        match parse_filters_json(text) {
            Ok(filters) => {
                self.replace_filters(filters);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected filter reload, keeping current filters: {}", e);
                Err(e.into())
            }
        }
    }
}
