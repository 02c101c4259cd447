//! Filter kinds, actions and match outcomes

use std::fmt;
use std::str::FromStr;

use crate::{FilterError, FilterResult};

/// Maximum number of specs on one filter line.
pub const MAX_FILTER_SPECS: usize = 8;
/// Maximum number of patterns in one spec.
pub const MAX_FILTER_SPEC_MATCHES: usize = 8;
/// Maximum number of patterns in one constraint.
pub const MAX_CONSTRAINT_MATCHES: usize = 24;

/// Which class of message a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterType {
    TidInbound,
    TrpInbound,
    TrpOutbound,
}

impl FilterType {
    pub const ALL: [FilterType; 3] = [
        FilterType::TidInbound,
        FilterType::TrpInbound,
        FilterType::TrpOutbound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::TidInbound => "tid_inbound",
            FilterType::TrpInbound => "trp_inbound",
            FilterType::TrpOutbound => "trp_outbound",
        }
    }
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        FilterType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FilterError::UnknownFilterType(s.to_string()))
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterAction {
    Accept,
    Reject,
}

impl FilterAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterAction::Accept => "accept",
            FilterAction::Reject => "reject",
        }
    }
}

impl FromStr for FilterAction {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        match s {
            "accept" => Ok(FilterAction::Accept),
            "reject" => Ok(FilterAction::Reject),
            other => Err(FilterError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying a filter.
///
/// `NoMatch` is distinct from a matched reject line: the caller decides the
/// default policy. `action()` gives the conventional reject-by-default view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMatch {
    Matched(FilterAction),
    NoMatch,
}

impl FilterMatch {
    pub fn action(&self) -> FilterAction {
        match self {
            FilterMatch::Matched(action) => *action,
            FilterMatch::NoMatch => FilterAction::Reject,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, FilterMatch::Matched(_))
    }

    /// True only for an explicit accept line.
    pub fn accepted(&self) -> bool {
        *self == FilterMatch::Matched(FilterAction::Accept)
    }
}
