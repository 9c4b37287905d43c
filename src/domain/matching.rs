//! Matching strategies over eligible candidates.
//!
//! All three strategies share the same gate shape:
//!
//! - yield: `candidate.yield >= target.yield + yield_tolerance`
//! - risk: `candidate.std_dev <= target.std_dev - std_tolerance`
//! - exposure (similar / in-strategy only): `|candidate - target| <= tolerance`
//!   per dimension
//!
//! Unrestricted and similar-strategy read their targets from a reference
//! record. A reference without a standard deviation skips the risk gate; an
//! exposure missing on either side skips that dimension. A candidate without
//! a standard deviation cannot show lower risk and fails the risk gate.
//!
//! In-strategy takes explicit targets. A target left unset skips its
//! dimension, but every compared field must be present on the candidate.

use super::eligibility::Candidate;
use super::period::ReportPeriod;
use super::record::{Exposure, FundId, FundPeriodRecord};
use super::thresholds::{ToleranceOverrides, Tolerances};
use super::trailing::{TrailingWindow, WindowParseError};
use std::cmp::Ordering;

pub type MatchResult = Vec<Candidate>;

fn passes_yield(candidate: &Candidate, target_yield: f64, tol: &Tolerances) -> bool {
    candidate.calc_yield >= target_yield + tol.yield_pct
}

fn passes_risk(candidate: &Candidate, target_std: Option<f64>, tol: &Tolerances) -> bool {
    match target_std {
        None => true,
        Some(target) => candidate
            .std_dev()
            .is_some_and(|std| std <= target - tol.std_dev),
    }
}

fn within(candidate: f64, target: f64, tolerance: f64) -> bool {
    (candidate - target).abs() <= tolerance
}

fn exposures_similar(candidate: &Candidate, reference: &FundPeriodRecord, tol: &Tolerances) -> bool {
    Exposure::ALL.iter().all(|&dim| {
        match (candidate.record.exposure(dim), reference.exposure(dim)) {
            (Some(c), Some(r)) => within(c, r, tol.exposure(dim)),
            _ => true,
        }
    })
}

fn by_yield_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.calc_yield.total_cmp(&a.calc_yield)
}

fn by_std_asc(a: &Candidate, b: &Candidate) -> Ordering {
    match (a.std_dev(), b.std_dev()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Better yield and lower risk, any allocation. Ordered by yield descending,
/// then standard deviation ascending.
pub fn find_unrestricted_better(
    eligible: &[Candidate],
    reference: &FundPeriodRecord,
    reference_yield: f64,
    tolerances: &Tolerances,
    limit: usize,
) -> MatchResult {
    let mut better: Vec<Candidate> = eligible
        .iter()
        .filter(|c| passes_yield(c, reference_yield, tolerances))
        .filter(|c| passes_risk(c, reference.std_dev, tolerances))
        .cloned()
        .collect();
    better.sort_by(|a, b| by_yield_desc(a, b).then_with(|| by_std_asc(a, b)));
    better.truncate(limit);
    better
}

/// Better yield and lower risk with every exposure within tolerance of the
/// reference. Ordered by yield descending.
pub fn find_similar_strategy_better(
    eligible: &[Candidate],
    reference: &FundPeriodRecord,
    reference_yield: f64,
    tolerances: &Tolerances,
    limit: usize,
) -> MatchResult {
    let mut better: Vec<Candidate> = eligible
        .iter()
        .filter(|c| passes_yield(c, reference_yield, tolerances))
        .filter(|c| passes_risk(c, reference.std_dev, tolerances))
        .filter(|c| exposures_similar(c, reference, tolerances))
        .cloned()
        .collect();
    better.sort_by(by_yield_desc);
    better.truncate(limit);
    better
}

/// Externally supplied targets for in-strategy matching.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InStrategyTargets {
    pub yield_pct: f64,
    pub std_dev: Option<f64>,
    pub stock: Option<f64>,
    pub foreign: Option<f64>,
    pub currency: Option<f64>,
    pub liquidity: Option<f64>,
}

impl InStrategyTargets {
    /// Targets copied from a fund's own record and yield.
    pub fn from_record(record: &FundPeriodRecord, yield_pct: f64) -> Self {
        Self {
            yield_pct,
            std_dev: record.std_dev,
            stock: record.stock_exposure,
            foreign: record.foreign_exposure,
            currency: record.currency_exposure,
            liquidity: record.liquid_assets,
        }
    }

    pub fn exposure(&self, dimension: Exposure) -> Option<f64> {
        match dimension {
            Exposure::Stock => self.stock,
            Exposure::Foreign => self.foreign,
            Exposure::Currency => self.currency,
            Exposure::Liquidity => self.liquidity,
        }
    }
}

/// A target-driven search.
#[derive(Debug, Clone, PartialEq)]
pub struct InStrategyQuery {
    pub window: TrailingWindow,
    pub anchor: ReportPeriod,
    pub targets: InStrategyTargets,
    pub classification: Option<String>,
    pub exclude_fund: Option<FundId>,
    pub overrides: ToleranceOverrides,
    pub limit: usize,
}

impl InStrategyQuery {
    pub const DEFAULT_LIMIT: usize = 5;

    /// `window_label` is `3M`, `6M`, `1Y`, `3Y`, `5Y` or a month count.
    pub fn new(
        window_label: &str,
        anchor: ReportPeriod,
        targets: InStrategyTargets,
    ) -> Result<Self, WindowParseError> {
        Ok(Self {
            window: window_label.parse()?,
            anchor,
            targets,
            classification: None,
            exclude_fund: None,
            overrides: ToleranceOverrides::default(),
            limit: Self::DEFAULT_LIMIT,
        })
    }
}

fn strict_within(candidate: Option<f64>, target: Option<f64>, tolerance: f64) -> bool {
    match target {
        None => true,
        Some(t) => candidate.is_some_and(|c| within(c, t, tolerance)),
    }
}

/// In-strategy gate and ordering over prepared candidates. Ordered by yield
/// descending.
pub fn find_in_strategy(
    candidates: &[Candidate],
    targets: &InStrategyTargets,
    tolerances: &Tolerances,
    limit: usize,
) -> MatchResult {
    let mut better: Vec<Candidate> = candidates
        .iter()
        .filter(|c| passes_yield(c, targets.yield_pct, tolerances))
        .filter(|c| passes_risk(c, targets.std_dev, tolerances))
        .filter(|c| {
            Exposure::ALL.iter().all(|&dim| {
                strict_within(
                    c.record.exposure(dim),
                    targets.exposure(dim),
                    tolerances.exposure(dim),
                )
            })
        })
        .cloned()
        .collect();
    better.sort_by(by_yield_desc);
    better.truncate(limit);
    better
}
