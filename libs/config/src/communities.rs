//! Static communities and their member realms
//!
//! Configured memberships are local: empty provenance, so no origin, and no
//! expiry. They sit alongside anything learned over TRP under the same
//! shortest-provenance policy, which they always win.

use community::{Community, CommunityTable, MembershipUpdate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use types::{CommType, Name, RealmHandle};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommunityConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub comm_type: String,
    #[serde(default)]
    pub apcs: Vec<String>,
    pub owner_realm: Option<String>,
    pub owner_contact: Option<String>,
    /// Minutes; falls back to `[trp] default_comm_expiration`
    pub expiration_interval: Option<u32>,
    #[serde(default)]
    pub idp_realms: Vec<String>,
    #[serde(default)]
    pub rp_realms: Vec<String>,
}

impl CommunityConfig {
    fn parsed_type(&self) -> ConfigResult<CommType> {
        match CommType::from_label(&self.comm_type) {
            CommType::Unknown => Err(ConfigError::UnknownCommunityType {
                id: self.id.clone(),
                value: self.comm_type.clone(),
            }),
            known => Ok(known),
        }
    }

    fn build(&self, default_expiration: u32) -> ConfigResult<Community> {
        let mut comm = Community::new(self.id.as_str(), self.parsed_type()?)
            .with_apcs(self.apcs.iter().map(|a| Name::from(a.as_str())).collect())
            .with_expiration_interval(self.expiration_interval.unwrap_or(default_expiration));
        if let Some(owner) = &self.owner_realm {
            comm = comm.with_owner_realm(owner.as_str());
        }
        if let Some(contact) = &self.owner_contact {
            comm = comm.with_owner_contact(contact.as_str());
        }
        Ok(comm)
    }
}

/// Load configured communities into `table`. Every entry is checked before
/// the table is touched. Returns the number of memberships added.
pub fn populate_table(
    configs: &[CommunityConfig],
    default_expiration: u32,
    table: &mut CommunityTable,
) -> ConfigResult<usize> {
    let mut seen = HashSet::new();
    let mut built = Vec::with_capacity(configs.len());
    for config in configs {
        let id = Name::from(config.id.as_str());
        if !seen.insert(id.clone()) || table.find_comm(&id).is_some() {
            return Err(ConfigError::DuplicateCommunity {
                id: config.id.clone(),
            });
        }
        built.push((Arc::new(config.build(default_expiration)?), config));
    }

    let mut added = 0;
    for (comm, config) in built {
        table.add_comm(Arc::clone(&comm));

        for realm in &config.idp_realms {
            let idp = table
                .realms_mut()
                .get_or_insert_idp(&Name::from(realm.as_str()), comm.apcs());
            added += count(table.add_membership(&RealmHandle::Idp(idp), &comm, Vec::new(), None));
        }
        for realm in &config.rp_realms {
            let rp = table.realms_mut().get_or_insert_rp(&Name::from(realm.as_str()));
            added += count(table.add_membership(&RealmHandle::Rp(rp), &comm, Vec::new(), None));
        }
        debug!(
            "Community {}: {} IdP realms, {} RP realms",
            comm.id(),
            config.idp_realms.len(),
            config.rp_realms.len()
        );
    }

    info!(
        "Loaded {} static communities with {} memberships",
        configs.len(),
        added
    );
    Ok(added)
}

fn count(update: MembershipUpdate) -> usize {
    match update {
        MembershipUpdate::Inserted | MembershipUpdate::Replaced => 1,
        MembershipUpdate::Discarded => 0,
    }
}
