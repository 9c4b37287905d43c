//! Per-fund time series and the fund universe.

use super::period::ReportPeriod;
use super::record::{FundId, FundPeriodRecord};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One fund's records, sorted by period ascending, at most one per period.
#[derive(Debug, Clone)]
pub struct FundTimeSeries {
    pub fund_id: FundId,
    records: Vec<FundPeriodRecord>,
    period_index: HashMap<ReportPeriod, usize>,
    precomputed: HashMap<(u32, ReportPeriod), f64>,
}

impl FundTimeSeries {
    /// Builds a series from records of a single fund. Records are sorted; if a
    /// period repeats, the first occurrence wins. Trailing yields reported on
    /// the records seed the precomputed table.
    pub fn new(fund_id: FundId, mut records: Vec<FundPeriodRecord>) -> Self {
        records.retain(|r| r.fund_id == fund_id);
        records.sort_by_key(|r| r.period);
        records.dedup_by_key(|r| r.period);
        let period_index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.period, i))
            .collect();
        let precomputed = records
            .iter()
            .flat_map(|r| r.reported_trailing().map(move |(m, v)| ((m, r.period), v)))
            .collect();
        Self {
            fund_id,
            records,
            period_index,
            precomputed,
        }
    }

    pub fn records(&self) -> &[FundPeriodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, period: ReportPeriod) -> Option<&FundPeriodRecord> {
        self.period_index.get(&period).map(|&i| &self.records[i])
    }

    /// Records with `start <= period <= end`, ascending.
    pub fn range(&self, start: ReportPeriod, end: ReportPeriod) -> &[FundPeriodRecord] {
        let lo = self.records.partition_point(|r| r.period < start);
        let hi = self.records.partition_point(|r| r.period <= end);
        if lo >= hi { &[] } else { &self.records[lo..hi] }
    }

    pub fn latest(&self) -> Option<&FundPeriodRecord> {
        self.records.last()
    }

    /// Attaches a precomputed trailing yield for `(months, period)`.
    pub fn set_precomputed(&mut self, months: u32, period: ReportPeriod, value: f64) {
        self.precomputed.insert((months, period), value);
    }

    pub fn precomputed(&self, months: u32, period: ReportPeriod) -> Option<f64> {
        self.precomputed.get(&(months, period)).copied()
    }

    pub fn precomputed_count(&self) -> usize {
        self.precomputed.len()
    }
}

/// Every fund's series, keyed by fund id.
#[derive(Debug, Clone, Default)]
pub struct FundUniverse {
    series: BTreeMap<FundId, FundTimeSeries>,
}

impl FundUniverse {
    pub fn from_records(records: Vec<FundPeriodRecord>) -> Self {
        let mut grouped: BTreeMap<FundId, Vec<FundPeriodRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.fund_id).or_default().push(record);
        }

        let series = grouped
            .into_iter()
            .map(|(fund_id, recs)| {
                let before = recs.len();
                let s = FundTimeSeries::new(fund_id, recs);
                if s.len() < before {
                    tracing::warn!(
                        fund_id,
                        dropped = before - s.len(),
                        "duplicate reporting periods dropped"
                    );
                }
                (fund_id, s)
            })
            .collect();

        Self { series }
    }

    pub fn from_series(series: Vec<FundTimeSeries>) -> Self {
        Self {
            series: series.into_iter().map(|s| (s.fund_id, s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series(&self, fund_id: FundId) -> Option<&FundTimeSeries> {
        self.series.get(&fund_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FundTimeSeries> {
        self.series.values()
    }

    pub fn par_series_mut(&mut self) -> impl ParallelIterator<Item = &mut FundTimeSeries> {
        self.series.par_iter_mut().map(|(_, s)| s)
    }

    pub fn fund_ids(&self) -> Vec<FundId> {
        self.series.keys().copied().collect()
    }

    pub fn record_at(&self, fund_id: FundId, period: ReportPeriod) -> Option<&FundPeriodRecord> {
        self.series(fund_id).and_then(|s| s.get(period))
    }

    /// All reporting periods present in the universe, latest first.
    pub fn periods(&self) -> Vec<ReportPeriod> {
        let unique: BTreeSet<ReportPeriod> = self
            .series
            .values()
            .flat_map(|s| s.records.iter().map(|r| r.period))
            .collect();
        unique.into_iter().rev().collect()
    }

    pub fn latest_period(&self) -> Option<ReportPeriod> {
        self.series
            .values()
            .filter_map(|s| s.latest().map(|r| r.period))
            .max()
    }
}
