//! Trailing window resolution.
//!
//! A trailing window of `w` months ending at anchor `p` covers the periods
//! `[p - (w - 1) months, p]`. The window is computable when the number of
//! records with a reported monthly return reaches `floor(0.8 * w)`; gaps are
//! tolerated, the present months are compounded and annualized.
//!
//! Series may carry precomputed values: trailing figures reported upstream
//! (1Y / 3Y / 5Y) and the derived 3M / 6M / 1Y columns. Resolution tries that
//! lookup first and falls back to the general computation when the window has
//! no precomputed column or the value is absent for the period.

use super::compounding::compounded_yield;
use super::period::ReportPeriod;
use super::record::FundId;
use super::series::{FundTimeSeries, FundUniverse};
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Windows that get a precomputed column.
pub const STANDARD_WINDOWS: [TrailingWindow; 3] = [
    TrailingWindow::THREE_MONTHS,
    TrailingWindow::SIX_MONTHS,
    TrailingWindow::ONE_YEAR,
];

const LABELS: [(&str, u32); 5] = [("3M", 3), ("6M", 6), ("1Y", 12), ("3Y", 36), ("5Y", 60)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrailingWindow(u32);

impl TrailingWindow {
    pub const THREE_MONTHS: Self = Self(3);
    pub const SIX_MONTHS: Self = Self(6);
    pub const ONE_YEAR: Self = Self(12);
    pub const THREE_YEARS: Self = Self(36);
    pub const FIVE_YEARS: Self = Self(60);

    pub fn new(months: u32) -> Option<Self> {
        if months == 0 { None } else { Some(Self(months)) }
    }

    pub fn months(self) -> u32 {
        self.0
    }

    /// Minimum number of reported months: `floor(0.8 * months)`.
    pub fn min_records(self) -> usize {
        (self.0 as usize * 4) / 5
    }

    pub fn label(self) -> String {
        LABELS
            .iter()
            .find(|(_, m)| *m == self.0)
            .map(|(l, _)| (*l).to_string())
            .unwrap_or_else(|| format!("{}M", self.0))
    }

    /// First period of the window ending at `anchor`.
    pub fn start(self, anchor: ReportPeriod) -> Option<ReportPeriod> {
        anchor.minus_months(self.0 - 1)
    }
}

impl Default for TrailingWindow {
    fn default() -> Self {
        Self::ONE_YEAR
    }
}

impl fmt::Display for TrailingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trailing window '{0}' (expected <n>M, <n>Y or a month count)")]
pub struct WindowParseError(pub String);

impl FromStr for TrailingWindow {
    type Err = WindowParseError;

    /// Accepts `<n>M`, `<n>Y` (case-insensitive) or a bare positive month
    /// count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, per_unit) = match trimmed.char_indices().last() {
            Some((i, 'M' | 'm')) => (&trimmed[..i], 1),
            Some((i, 'Y' | 'y')) => (&trimmed[..i], 12),
            _ => (trimmed, 1),
        };
        digits
            .parse::<u32>()
            .ok()
            .and_then(|n| n.checked_mul(per_unit))
            .and_then(Self::new)
            .ok_or_else(|| WindowParseError(s.to_string()))
    }
}

/// Where a resolved trailing yield came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldSource {
    Precomputed,
    Computed,
}

/// A resolved trailing yield. `value` is `None` when not computable.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingYield {
    pub fund_id: FundId,
    pub window: TrailingWindow,
    pub anchor: ReportPeriod,
    pub value: Option<f64>,
    pub source: Option<YieldSource>,
}

/// Monthly returns inside the window, or `None` if coverage is insufficient.
pub fn window_returns(
    series: &FundTimeSeries,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> Option<Vec<f64>> {
    let start = window.start(anchor)?;
    let returns: Vec<f64> = series
        .range(start, anchor)
        .iter()
        .filter_map(|r| r.monthly_yield)
        .collect();
    if returns.len() < window.min_records() {
        return None;
    }
    Some(returns)
}

/// General computation, ignoring any precomputed column.
pub fn compute_trailing_yield(
    series: &FundTimeSeries,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> Option<f64> {
    window_returns(series, window, anchor).and_then(|r| compounded_yield(&r))
}

/// Cache-or-compute resolution.
pub fn resolve(
    series: &FundTimeSeries,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> Option<(f64, YieldSource)> {
    if let Some(v) = series.precomputed(window.months(), anchor) {
        return Some((v, YieldSource::Precomputed));
    }
    compute_trailing_yield(series, window, anchor).map(|v| (v, YieldSource::Computed))
}

pub fn trailing_yield(
    series: &FundTimeSeries,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> Option<f64> {
    resolve(series, window, anchor).map(|(v, _)| v)
}

/// Resolves one fund in a universe. An unknown fund is not computable.
pub fn resolve_in_universe(
    universe: &FundUniverse,
    fund_id: FundId,
    window: TrailingWindow,
    anchor: ReportPeriod,
) -> TrailingYield {
    let resolved = universe
        .series(fund_id)
        .and_then(|s| resolve(s, window, anchor));
    TrailingYield {
        fund_id,
        window,
        anchor,
        value: resolved.map(|(v, _)| v),
        source: resolved.map(|(_, s)| s),
    }
}

/// Fills the standard trailing columns for every period of a series.
///
/// A precomputed value needs the full window: `w` consecutive months ending
/// at the period, each with a reported return. Values already present, such
/// as upstream figures, are kept.
pub fn precompute_standard_columns(series: &mut FundTimeSeries) {
    let mut computed = Vec::new();
    {
        let records = series.records();
        for end in 0..records.len() {
            for window in STANDARD_WINDOWS {
                let w = window.months() as usize;
                if end + 1 < w {
                    continue;
                }
                let slice = &records[end + 1 - w..=end];
                let first = slice[0].period;
                let last = slice[w - 1].period;
                if series.precomputed(window.months(), last).is_some() {
                    continue;
                }
                if first.plus_months(window.months() - 1) != Some(last) {
                    continue;
                }
                let returns: Option<Vec<f64>> = slice.iter().map(|r| r.monthly_yield).collect();
                if let Some(v) = returns.and_then(|r| compounded_yield(&r)) {
                    computed.push((window.months(), last, v));
                }
            }
        }
    }
    for (months, period, value) in computed {
        series.set_precomputed(months, period, value);
    }
}

/// Runs [`precompute_standard_columns`] over every fund in parallel.
pub fn precompute_universe(universe: &mut FundUniverse) {
    universe
        .par_series_mut()
        .for_each(precompute_standard_columns);
    let total: usize = universe.iter().map(|s| s.precomputed_count()).sum();
    tracing::info!(funds = universe.len(), values = total, "precomputed trailing columns");
}
