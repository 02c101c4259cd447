//! # Filter Evaluation - Ordered First-Match Rules
//!
//! ## Purpose
//!
//! A `Filter` is an ordered list of `FilterLine`s for one `FilterType`. Applying
//! it to a target walks the lines in order; the first line whose specs all
//! match decides the action, and its realm/domain constraints are unioned
//! into the caller's `ConstraintSet` when one is supplied.
//!
//! ## Matching Rules
//!
//! - A spec matches when the target's field value matches **any** of its
//!   patterns (prefix-wildcard comparison)
//! - A line matches when **all** of its specs match; a line with no specs
//!   matches everything
//! - No matching line ⇒ `FilterMatch::NoMatch`; the caller applies its own
//!   default (conventionally reject)
//!
//! ## Validation
//!
//! `Filter::new` validates before returning, so every `Filter` in existence
//! has only registered fields and non-empty patterns. `apply` never mutates
//! the filter and is deterministic for a fixed target.

use serde_json::{json, Value};
use tracing::{debug, error};
use types::Name;

use crate::constraint::{Constraint, ConstraintSet};
use crate::fields::field_handler;
use crate::target::FilterTarget;
use crate::policy::{FilterAction, FilterMatch, FilterType, MAX_FILTER_SPECS, MAX_FILTER_SPEC_MATCHES};
use crate::{FilterError, FilterResult};

/// One field test: does the field match any of these patterns?
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    field: Name,
    matches: Vec<Name>,
}

impl FilterSpec {
    pub fn new(field: impl Into<Name>) -> Self {
        Self {
            field: field.into(),
            matches: Vec::new(),
        }
    }

    /// Build a spec from a field and its patterns, enforcing the pattern bound.
    pub fn with_matches(field: impl Into<Name>, patterns: Vec<Name>) -> FilterResult<Self> {
        let mut spec = Self::new(field);
        for pattern in patterns {
            spec.add_match(pattern)?;
        }
        Ok(spec)
    }

    pub fn add_match(&mut self, pattern: impl Into<Name>) -> FilterResult<()> {
        if self.matches.len() >= MAX_FILTER_SPEC_MATCHES {
            return Err(FilterError::TooManyMatches {
                field: self.field.to_string(),
                max: MAX_FILTER_SPEC_MATCHES,
            });
        }
        self.matches.push(pattern.into());
        Ok(())
    }

    pub fn field(&self) -> &Name {
        &self.field
    }

    pub fn matches(&self) -> &[Name] {
        &self.matches
    }

    fn validate(&self, filter_type: FilterType) -> FilterResult<()> {
        if field_handler(filter_type, &self.field).is_none() {
            return Err(FilterError::unknown_field(filter_type.as_str(), self.field.to_string()));
        }
        if !self.matches.iter().any(|m| !m.is_empty()) {
            return Err(FilterError::empty_spec(self.field.to_string()));
        }
        if self.matches.len() > MAX_FILTER_SPEC_MATCHES {
            return Err(FilterError::TooManyMatches {
                field: self.field.to_string(),
                max: MAX_FILTER_SPEC_MATCHES,
            });
        }
        Ok(())
    }

    fn matches_target(&self, filter_type: FilterType, target: &FilterTarget<'_>) -> bool {
        let Some(handler) = field_handler(filter_type, &self.field) else {
            error!(
                "No handler for field {} in {} filter; treating as no match",
                self.field, filter_type
            );
            return false;
        };

        let Some(value) = handler.extract(target) else {
            return false;
        };

        match self.matches.iter().find(|pattern| handler.matches(&value, pattern)) {
            Some(pattern) => {
                debug!(
                    "Field {} value \"{}\" matches \"{}\" for {} filter",
                    self.field, value, pattern, filter_type
                );
                true
            }
            None => {
                debug!(
                    "Field {} value \"{}\" does not match for {} filter",
                    self.field, value, filter_type
                );
                false
            }
        }
    }

    fn to_json(&self) -> Value {
        json!({"field": self.field, "match": self.matches})
    }
}

/// A rule: action, optional constraints, and the specs that must all match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLine {
    action: FilterAction,
    realm_constraint: Option<Constraint>,
    domain_constraint: Option<Constraint>,
    specs: Vec<FilterSpec>,
}

impl FilterLine {
    pub fn new(action: FilterAction) -> Self {
        Self {
            action,
            realm_constraint: None,
            domain_constraint: None,
            specs: Vec::new(),
        }
    }

    pub fn accept() -> Self {
        Self::new(FilterAction::Accept)
    }

    pub fn reject() -> Self {
        Self::new(FilterAction::Reject)
    }

    pub fn with_spec(mut self, spec: FilterSpec) -> FilterResult<Self> {
        self.add_spec(spec)?;
        Ok(self)
    }

    pub fn with_realm_constraint(mut self, constraint: Constraint) -> Self {
        self.realm_constraint = Some(constraint);
        self
    }

    pub fn with_domain_constraint(mut self, constraint: Constraint) -> Self {
        self.domain_constraint = Some(constraint);
        self
    }

    pub fn add_spec(&mut self, spec: FilterSpec) -> FilterResult<()> {
        if self.specs.len() >= MAX_FILTER_SPECS {
            return Err(FilterError::TooManySpecs {
                count: self.specs.len() + 1,
                max: MAX_FILTER_SPECS,
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn action(&self) -> FilterAction {
        self.action
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn realm_constraint(&self) -> Option<&Constraint> {
        self.realm_constraint.as_ref()
    }

    pub fn domain_constraint(&self) -> Option<&Constraint> {
        self.domain_constraint.as_ref()
    }

    fn validate(&self, filter_type: FilterType) -> FilterResult<()> {
        if self.specs.len() > MAX_FILTER_SPECS {
            return Err(FilterError::TooManySpecs {
                count: self.specs.len(),
                max: MAX_FILTER_SPECS,
            });
        }
        self.specs.iter().try_for_each(|spec| spec.validate(filter_type))
    }

    fn matches_target(&self, filter_type: FilterType, target: &FilterTarget<'_>) -> bool {
        self.specs
            .iter()
            .all(|spec| spec.matches_target(filter_type, target))
    }

    fn to_json(&self) -> Value {
        let mut line = json!({
            "action": self.action.as_str(),
            "specs": self.specs.iter().map(FilterSpec::to_json).collect::<Vec<_>>(),
        });
        if let Some(c) = &self.realm_constraint {
            line["realm_constraints"] = json!(c.matches());
        }
        if let Some(c) = &self.domain_constraint {
            line["domain_constraints"] = json!(c.matches());
        }
        line
    }
}

/// A validated, ordered rule set for one filter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    filter_type: FilterType,
    lines: Vec<FilterLine>,
}

impl Filter {
    /// Build and validate. An invalid definition never becomes a `Filter`.
    pub fn new(filter_type: FilterType, lines: Vec<FilterLine>) -> FilterResult<Self> {
        let filter = Self { filter_type, lines };
        filter.validate()?;
        Ok(filter)
    }

    pub fn validate(&self) -> FilterResult<()> {
        self.lines
            .iter()
            .try_for_each(|line| line.validate(self.filter_type))
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn lines(&self) -> &[FilterLine] {
        &self.lines
    }

    /// Apply to `target`. On a match, the line's constraints are unioned into
    /// `constraints` if given.
    pub fn apply(
        &self,
        target: &FilterTarget<'_>,
        constraints: Option<&mut ConstraintSet>,
    ) -> FilterMatch {
        let Some((index, line)) = self
            .lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.matches_target(self.filter_type, target))
        else {
            debug!("No line of {} filter matched", self.filter_type);
            return FilterMatch::NoMatch;
        };

        debug!(
            "Line {} of {} filter matched: {}",
            index, self.filter_type, line.action
        );
        if let Some(set) = constraints {
            if let Some(c) = &line.realm_constraint {
                set.add(c);
            }
            if let Some(c) = &line.domain_constraint {
                set.add(c);
            }
        }
        FilterMatch::Matched(line.action)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": self.filter_type.as_str(),
            "lines": self.lines.iter().map(FilterLine::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Ordered collection of filters; lookup returns the first of a type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn get(&self, filter_type: FilterType) -> Option<&Filter> {
        self.filters.iter().find(|f| f.filter_type == filter_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.filters.iter().map(Filter::to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintType;
    use codec::{InfoRecord, RouteInfo, TidRequest};

    fn spec(field: &str, patterns: &[&str]) -> FilterSpec {
        FilterSpec::with_matches(field, patterns.iter().map(|p| Name::from(*p)).collect()).unwrap()
    }

    fn route(realm: &str) -> InfoRecord {
        RouteInfo::new("coi.alpha", realm, "tr1.example.org", 1, 60).into()
    }

    #[test]
    fn test_first_matching_line_wins() {
        let realm_constraint =
            Constraint::new(ConstraintType::Realm, vec![Name::from("*.example.org")]).unwrap();
        let filter = Filter::new(
            FilterType::TrpInbound,
            vec![
                FilterLine::reject().with_spec(spec("realm", &["*"])).unwrap(),
                FilterLine::accept()
                    .with_spec(spec("realm", &["idp.example.org"]))
                    .unwrap()
                    .with_realm_constraint(realm_constraint),
            ],
        )
        .unwrap();

        let rec = route("idp.example.org");
        let mut constraints = ConstraintSet::new();
        let result = filter.apply(&FilterTarget::from(&rec), Some(&mut constraints));

        assert_eq!(result, FilterMatch::Matched(FilterAction::Reject));
        assert!(constraints.is_empty());
    }

    #[test]
    fn test_later_line_reached_when_earlier_fails() {
        let filter = Filter::new(
            FilterType::TrpInbound,
            vec![
                FilterLine::reject().with_spec(spec("realm", &["bad.*"])).unwrap(),
                FilterLine::accept().with_spec(spec("realm", &["idp.*"])).unwrap(),
            ],
        )
        .unwrap();

        let rec = route("idp.example.org");
        assert_eq!(
            filter.apply(&FilterTarget::from(&rec), None),
            FilterMatch::Matched(FilterAction::Accept)
        );
        let other = route("other.org");
        assert_eq!(filter.apply(&FilterTarget::from(&other), None), FilterMatch::NoMatch);
    }

    #[test]
    fn test_line_requires_all_specs() {
        let filter = Filter::new(
            FilterType::TrpInbound,
            vec![FilterLine::accept()
                .with_spec(spec("realm", &["idp.example.org"]))
                .unwrap()
                .with_spec(spec("trust_router", &["tr2.*"]))
                .unwrap()],
        )
        .unwrap();

        let rec = route("idp.example.org");
        assert_eq!(filter.apply(&FilterTarget::from(&rec), None), FilterMatch::NoMatch);
    }

    #[test]
    fn test_spec_matches_any_pattern() {
        let filter = Filter::new(
            FilterType::TidInbound,
            vec![FilterLine::accept()
                .with_spec(spec("comm", &["coi.beta", "coi.alpha"]))
                .unwrap()],
        )
        .unwrap();
        let req = TidRequest::new("rp", "idp", "coi.alpha");
        assert!(filter.apply(&FilterTarget::from(&req), None).accepted());
    }

    #[test]
    fn test_line_without_specs_matches_everything() {
        let filter = Filter::new(FilterType::TrpOutbound, vec![FilterLine::accept()]).unwrap();
        let rec = route("anything");
        assert!(filter.apply(&FilterTarget::from(&rec), None).accepted());
    }

    #[test]
    fn test_absent_field_value_never_matches() {
        let filter = Filter::new(
            FilterType::TrpInbound,
            vec![FilterLine::accept().with_spec(spec("comm_type", &["*"])).unwrap()],
        )
        .unwrap();
        let rec = route("idp.example.org");
        assert_eq!(filter.apply(&FilterTarget::from(&rec), None), FilterMatch::NoMatch);
    }

    #[test]
    fn test_validation_rejects_unregistered_field() {
        let err = Filter::new(
            FilterType::TrpInbound,
            vec![FilterLine::accept().with_spec(spec("rp_realm", &["*"])).unwrap()],
        )
        .unwrap_err();
        assert_eq!(err, FilterError::unknown_field("trp_inbound", "rp_realm"));
    }

    #[test]
    fn test_validation_rejects_empty_patterns() {
        let err = Filter::new(
            FilterType::TidInbound,
            vec![FilterLine::accept().with_spec(FilterSpec::new("realm")).unwrap()],
        )
        .unwrap_err();
        assert_eq!(err, FilterError::empty_spec("realm"));

        let err = Filter::new(
            FilterType::TidInbound,
            vec![FilterLine::accept().with_spec(spec("realm", &[""])).unwrap()],
        )
        .unwrap_err();
        assert_eq!(err, FilterError::empty_spec("realm"));
    }

    #[test]
    fn test_spec_and_match_bounds() {
        let mut line = FilterLine::accept();
        for _ in 0..MAX_FILTER_SPECS {
            line.add_spec(spec("realm", &["*"])).unwrap();
        }
        assert!(matches!(
            line.add_spec(spec("realm", &["*"])),
            Err(FilterError::TooManySpecs { .. })
        ));

        let mut s = FilterSpec::new("realm");
        for i in 0..MAX_FILTER_SPEC_MATCHES {
            s.add_match(format!("r{}", i)).unwrap();
        }
        assert!(matches!(s.add_match("one.more"), Err(FilterError::TooManyMatches { .. })));
    }

    #[test]
    fn test_constraints_collected_from_matching_line() {
        let realm = Constraint::new(ConstraintType::Realm, vec![Name::from("*.example.org")]).unwrap();
        let domain = Constraint::new(ConstraintType::Domain, vec![Name::from("example.org")]).unwrap();
        let filter = Filter::new(
            FilterType::TidInbound,
            vec![FilterLine::accept()
                .with_spec(spec("rp_realm", &["rp.*"]))
                .unwrap()
                .with_realm_constraint(realm.clone())
                .with_domain_constraint(domain.clone())],
        )
        .unwrap();

        let req = TidRequest::new("rp.example.org", "idp.example.org", "coi.alpha");
        let mut set = ConstraintSet::new();
        assert!(filter.apply(&FilterTarget::from(&req), Some(&mut set)).accepted());
        assert_eq!(set.iter().cloned().collect::<Vec<_>>(), vec![realm, domain]);
    }

    #[test]
    fn test_filter_set_returns_first_of_type() {
        let first = Filter::new(FilterType::TrpInbound, vec![FilterLine::reject()]).unwrap();
        let second = Filter::new(FilterType::TrpInbound, vec![FilterLine::accept()]).unwrap();
        let mut set = FilterSet::new();
        set.add(first.clone());
        set.add(second);

        assert_eq!(set.get(FilterType::TrpInbound), Some(&first));
        assert!(set.get(FilterType::TidInbound).is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_filter_json_projection() {
        let filter = Filter::new(
            FilterType::TrpOutbound,
            vec![FilterLine::accept().with_spec(spec("realm", &["a.*", "b"])).unwrap()],
        )
        .unwrap();
        let value = filter.to_json();
        assert_eq!(value["type"], "trp_outbound");
        assert_eq!(value["lines"][0]["action"], "accept");
        assert_eq!(value["lines"][0]["specs"][0]["match"][1], "b");
    }
}
