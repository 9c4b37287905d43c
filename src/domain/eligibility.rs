//! Candidate selection ahead of matching.
//!
//! A fund is eligible against a reference when it shares the reference's
//! classification, is not the reference itself, has a record at the anchor
//! period, and has a computable trailing yield. Each fund is resolved
//! independently, so the pass runs as a parallel map over the universe.

use super::period::ReportPeriod;
use super::record::{FundId, FundPeriodRecord};
use super::series::FundUniverse;
use super::trailing::{TrailingWindow, trailing_yield};
use rayon::prelude::*;

/// A fund's anchor-period snapshot annotated with its trailing yield.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: FundPeriodRecord,
    pub calc_yield: f64,
}

impl Candidate {
    pub fn fund_id(&self) -> FundId {
        self.record.fund_id
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.record.std_dev
    }
}

/// A reference without a classification matches every fund.
fn same_classification(reference: Option<&str>, candidate: Option<&str>) -> bool {
    match reference {
        None => true,
        Some(class) => candidate == Some(class),
    }
}

/// Funds of `classification` (any, when `None`) with a record at `anchor` and
/// a computable trailing yield, ordered by fund id.
pub fn candidates_in_class(
    universe: &FundUniverse,
    classification: Option<&str>,
    exclude: Option<FundId>,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> Vec<Candidate> {
    let series: Vec<_> = universe
        .iter()
        .filter(|s| Some(s.fund_id) != exclude)
        .collect();

    let candidates: Vec<Candidate> = series
        .par_iter()
        .filter_map(|s| {
            let record = s.get(anchor)?;
            if !same_classification(classification, record.classification.as_deref()) {
                return None;
            }
            let Some(calc_yield) = trailing_yield(s, window, anchor) else {
                tracing::debug!(fund_id = s.fund_id, %window, %anchor, "trailing yield not computable");
                return None;
            };
            Some(Candidate {
                record: record.clone(),
                calc_yield,
            })
        })
        .collect();

    tracing::debug!(
        considered = series.len(),
        eligible = candidates.len(),
        %window,
        %anchor,
        "eligibility pass"
    );
    candidates
}

/// Eligible comparison candidates for `reference`.
pub fn eligible_candidates(
    universe: &FundUniverse,
    reference: &FundPeriodRecord,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> Vec<Candidate> {
    candidates_in_class(
        universe,
        reference.classification.as_deref(),
        Some(reference.fund_id),
        window,
        anchor,
    )
}
