//! Filter definitions from configuration
//!
//! A `[filters]` table maps a filter label to its ordered lines:
//!
//! ```toml
//! [[filters.tid_inbound]]
//! action = "accept"
//! specs = [{ field = "comm", match = "coi.*" }]
//! realm_constraints = ["*.example.org"]
//! ```
//!
//! The same shape is accepted as a JSON document by `parse_filters_json`.
//! Any error rejects the whole set; a partially built set is never returned.

use filter::{
    is_valid_field, Constraint, ConstraintType, Filter, FilterAction, FilterError, FilterLine,
    FilterSet, FilterSpec, FilterType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use types::Name;

use crate::error::{ConfigError, ConfigResult};

/// Filter label → ordered lines
pub type FiltersConfig = BTreeMap<String, Vec<FilterLineConfig>>;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FilterLineConfig {
    pub action: String,
    #[serde(default)]
    pub specs: Vec<SpecConfig>,
    #[serde(default)]
    pub realm_constraints: Vec<String>,
    #[serde(default)]
    pub domain_constraints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SpecConfig {
    pub field: String,
    #[serde(rename = "match")]
    pub patterns: OneOrMany,
}

/// `match` may be one pattern or a list of them
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_names(&self) -> Vec<Name> {
        match self {
            OneOrMany::One(pattern) => vec![Name::from(pattern.as_str())],
            OneOrMany::Many(patterns) => patterns.iter().map(|p| Name::from(p.as_str())).collect(),
        }
    }
}

fn build_constraint(
    constraint_type: ConstraintType,
    patterns: &[String],
) -> ConfigResult<Option<Constraint>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let matches = patterns.iter().map(|p| Name::from(p.as_str())).collect();
    Ok(Some(Constraint::new(constraint_type, matches)?))
}

fn build_line(
    label: &str,
    filter_type: FilterType,
    index: usize,
    config: &FilterLineConfig,
) -> ConfigResult<FilterLine> {
    let action: FilterAction = config.action.parse()?;
    if config.specs.is_empty() {
        return Err(ConfigError::MissingSpecs {
            label: label.to_string(),
            line: index,
        });
    }

    let mut line = FilterLine::new(action);
    for spec in &config.specs {
        let field = Name::from(spec.field.as_str());
        if !is_valid_field(filter_type, &field) {
            return Err(FilterError::unknown_field(filter_type.as_str(), spec.field.as_str()).into());
        }
        line.add_spec(FilterSpec::with_matches(field, spec.patterns.to_names())?)?;
    }

    if let Some(c) = build_constraint(ConstraintType::Realm, &config.realm_constraints)? {
        line = line.with_realm_constraint(c);
    }
    if let Some(c) = build_constraint(ConstraintType::Domain, &config.domain_constraints)? {
        line = line.with_domain_constraint(c);
    }
    Ok(line)
}

/// Build and validate every configured filter.
pub fn build_filter_set(config: &FiltersConfig) -> ConfigResult<FilterSet> {
    let mut set = FilterSet::new();
    for (label, lines) in config {
        let filter_type: FilterType = label.parse()?;
        let lines = lines
            .iter()
            .enumerate()
            .map(|(index, line)| build_line(label, filter_type, index, line))
            .collect::<ConfigResult<Vec<_>>>()?;
        debug!("Built {} filter with {} lines", filter_type, lines.len());
        set.add(Filter::new(filter_type, lines)?);
    }
    info!("Loaded {} filters", set.len());
    Ok(set)
}

/// Parse a JSON filter document of the `[filters]` shape.
pub fn parse_filters_json(text: &str) -> ConfigResult<FilterSet> {
    let config: FiltersConfig = serde_json::from_str(text)?;
    build_filter_set(&config)
}
