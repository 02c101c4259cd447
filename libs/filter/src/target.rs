//! Objects a filter can be applied to.

use codec::{InfoRecord, TidRequest};

/// Borrowed view of the message under evaluation.
///
/// Each variant pairs with the filter types whose field registry can read it:
/// `TidRequest` with `tid_inbound`, `TrpInforec` with `trp_inbound` and
/// `trp_outbound`. A field applied to the wrong variant extracts nothing and
/// so never matches.
#[derive(Debug, Clone, Copy)]
pub enum FilterTarget<'a> {
    TidRequest(&'a TidRequest),
    TrpInforec(&'a InfoRecord),
}

impl<'a> FilterTarget<'a> {
    pub fn tid(&self) -> Option<&'a TidRequest> {
        match self {
            FilterTarget::TidRequest(req) => Some(req),
            FilterTarget::TrpInforec(_) => None,
        }
    }

    pub fn inforec(&self) -> Option<&'a InfoRecord> {
        match self {
            FilterTarget::TrpInforec(rec) => Some(rec),
            FilterTarget::TidRequest(_) => None,
        }
    }
}

impl<'a> From<&'a TidRequest> for FilterTarget<'a> {
    fn from(req: &'a TidRequest) -> Self {
        FilterTarget::TidRequest(req)
    }
}

impl<'a> From<&'a InfoRecord> for FilterTarget<'a> {
    fn from(rec: &'a InfoRecord) -> Self {
        FilterTarget::TrpInforec(rec)
    }
}
