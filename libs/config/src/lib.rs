//! # Trust Router Configuration
//!
//! ## Purpose
//!
//! Loads the daemon's settings, filter definitions and static communities
//! from one TOML file, with `TR_`-prefixed environment overrides, and turns
//! them into the runtime structures the router uses.
//!
//! ## Layout
//!
//! ```toml
//! [router]
//! hostname = "tr.example.org"
//! log_level = "info"
//!
//! [trp]
//! sweep_interval_secs = 30
//! expiry_factor = 3
//! default_comm_expiration = 60
//!
//! [[communities]]
//! id = "coi.alpha"
//! type = "coi"
//! apcs = ["apc.main"]
//! idp_realms = ["idp.example.org"]
//! rp_realms = ["rp.example.org"]
//!
//! [[filters.trp_inbound]]
//! action = "accept"
//! specs = [{ field = "realm", match = "*" }]
//! ```
//!
//! Environment overrides use `__` between path segments, e.g.
//! `TR_ROUTER__HOSTNAME=tr2.example.org`.
//!
//! ## Troubleshooting
//!
//! **Daemon refuses to start with "Invalid filter definition"**
//! - A filter field is not registered for that filter label, or a spec
//!   has no patterns; the whole filter set is rejected on purpose
//!
//! **Override has no effect**
//! - Check the separator: `TR_TRP__EXPIRY_FACTOR`, not `TR_TRP_EXPIRY_FACTOR`

pub mod communities;
pub mod error;
pub mod filters;

pub use communities::{populate_table, CommunityConfig};
pub use error::{ConfigError, ConfigResult};
pub use filters::{
    build_filter_set, parse_filters_json, FilterLineConfig, FiltersConfig, OneOrMany, SpecConfig,
};

use anyhow::{Context, Result};
use community::CommunityTable;
use config::{Config, Environment, File, FileFormat};
use filter::FilterSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete daemon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    pub router: RouterSettings,

    #[serde(default)]
    pub trp: TrpSettings,

    #[serde(default)]
    pub communities: Vec<CommunityConfig>,

    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterSettings {
    /// Name this router puts into advertised provenance
    pub hostname: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrpSettings {
    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Learned memberships expire after `interval × expiry_factor` seconds
    #[serde(default = "default_expiry_factor")]
    pub expiry_factor: u32,
    /// Minutes, for communities that do not set their own
    #[serde(default = "default_comm_expiration")]
    pub default_comm_expiration: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_expiry_factor() -> u32 {
    3
}

fn default_comm_expiration() -> u32 {
    60
}

impl Default for TrpSettings {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            expiry_factor: default_expiry_factor(),
            default_comm_expiration: default_comm_expiration(),
        }
    }
}

impl RouterConfig {
    /// Load from a TOML file, then apply `TR_` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading router configuration from {:?}", path);

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(
                Environment::with_prefix("TR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let parsed: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        parsed.validate().context("Configuration failed validation")?;
        Ok(parsed)
    }

    /// Parse TOML text directly, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(text).context("Failed to parse configuration")?;
        parsed.validate().context("Configuration failed validation")?;
        Ok(parsed)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.router.hostname.trim().is_empty() {
            return Err(ConfigError::invalid_value("router.hostname", "must not be empty"));
        }
        if !LOG_LEVELS.contains(&self.router.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "router.log_level",
                format!("'{}' is not one of {}", self.router.log_level, LOG_LEVELS.join(", ")),
            ));
        }
        if self.trp.sweep_interval_secs == 0 {
            return Err(ConfigError::invalid_value("trp.sweep_interval_secs", "must be positive"));
        }
        if self.trp.expiry_factor == 0 {
            return Err(ConfigError::invalid_value("trp.expiry_factor", "must be positive"));
        }
        debug!(
            "Configuration valid: {} communities, {} filter labels",
            self.communities.len(),
            self.filters.len()
        );
        Ok(())
    }

    pub fn build_filters(&self) -> ConfigResult<FilterSet> {
        build_filter_set(&self.filters)
    }

    pub fn populate(&self, table: &mut CommunityTable) -> ConfigResult<usize> {
        populate_table(&self.communities, self.trp.default_comm_expiration, table)
    }
}
