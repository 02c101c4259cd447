//! Realm roles and community kinds, with their wire/config labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{TypesError, TypesResult};

/// The role a realm plays inside a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealmRole {
    /// Identity provider
    Idp,
    /// Relying party
    Rp,
}

impl RealmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RealmRole::Idp => "idp",
            RealmRole::Rp => "rp",
        }
    }
}

impl FromStr for RealmRole {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        match s {
            "idp" => Ok(RealmRole::Idp),
            "rp" => Ok(RealmRole::Rp),
            other => Err(TypesError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for RealmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Community kind: attribute provider community or community of interest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CommType {
    #[default]
    Unknown,
    Apc,
    Coi,
}

impl CommType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommType::Unknown => "unknown",
            CommType::Apc => "apc",
            CommType::Coi => "coi",
        }
    }

    /// Lenient parse: anything other than `apc`/`coi` is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "apc" => CommType::Apc,
            "coi" => CommType::Coi,
            _ => CommType::Unknown,
        }
    }
}

impl fmt::Display for CommType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
