//! Realm/domain constraints carried from a matched filter line into
//! downstream authorization.

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use types::Name;

use crate::policy::MAX_CONSTRAINT_MATCHES;
use crate::{FilterError, FilterResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    Realm,
    Domain,
}

impl ConstraintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintType::Realm => "realm",
            ConstraintType::Domain => "domain",
        }
    }
}

impl FromStr for ConstraintType {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        match s {
            "realm" => Ok(ConstraintType::Realm),
            "domain" => Ok(ConstraintType::Domain),
            other => Err(FilterError::UnknownConstraintType(other.to_string())),
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered set of patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    constraint_type: ConstraintType,
    matches: Vec<Name>,
}

impl Constraint {
    /// Build a constraint; it must carry between 1 and 24 patterns.
    pub fn new(constraint_type: ConstraintType, matches: Vec<Name>) -> FilterResult<Self> {
        if matches.is_empty() {
            return Err(FilterError::EmptyConstraint {
                constraint_type: constraint_type.to_string(),
            });
        }
        if matches.len() > MAX_CONSTRAINT_MATCHES {
            return Err(FilterError::TooManyConstraintMatches {
                constraint_type: constraint_type.to_string(),
                max: MAX_CONSTRAINT_MATCHES,
            });
        }
        Ok(Self {
            constraint_type,
            matches,
        })
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.constraint_type
    }

    pub fn matches(&self) -> &[Name] {
        &self.matches
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": self.constraint_type.as_str(),
            "matches": self.matches,
        })
    }
}

/// Constraints accumulated across filter applications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union in a constraint; an identical one already present is not repeated.
    pub fn add(&mut self, constraint: &Constraint) {
        if !self.constraints.contains(constraint) {
            self.constraints.push(constraint.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn of_type(&self, constraint_type: ConstraintType) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(move |c| c.constraint_type == constraint_type)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.constraints.iter().map(Constraint::to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(patterns: &[&str]) -> Vec<Name> {
        patterns.iter().map(|p| Name::from(*p)).collect()
    }

    #[test]
    fn test_constraint_bounds() {
        assert!(matches!(
            Constraint::new(ConstraintType::Realm, vec![]),
            Err(FilterError::EmptyConstraint { .. })
        ));
        let many: Vec<Name> = (0..=MAX_CONSTRAINT_MATCHES)
            .map(|i| Name::from(format!("r{}", i)))
            .collect();
        assert!(matches!(
            Constraint::new(ConstraintType::Domain, many),
            Err(FilterError::TooManyConstraintMatches { max: 24, .. })
        ));
    }

    #[test]
    fn test_set_unions_without_duplicates() {
        let realm = Constraint::new(ConstraintType::Realm, names(&["*.example.org"])).unwrap();
        let domain = Constraint::new(ConstraintType::Domain, names(&["example.org"])).unwrap();

        let mut set = ConstraintSet::new();
        set.add(&realm);
        set.add(&domain);
        set.add(&realm);

        assert_eq!(set.len(), 2);
        assert_eq!(set.of_type(ConstraintType::Realm).count(), 1);
        assert_eq!(set.to_json()[1]["type"], "domain");
    }

    #[test]
    fn test_constraint_type_labels() {
        assert_eq!("realm".parse::<ConstraintType>().unwrap(), ConstraintType::Realm);
        assert!("host".parse::<ConstraintType>().is_err());
    }
}
