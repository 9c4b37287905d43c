//! The comparison engine: a loaded universe plus the threshold store.

use super::eligibility::{Candidate, candidates_in_class, eligible_candidates};
use super::error::FindBetterError;
use super::matching::{
    InStrategyQuery, MatchResult, find_in_strategy, find_similar_strategy_better,
    find_unrestricted_better,
};
use super::period::ReportPeriod;
use super::record::{FundId, FundPeriodRecord};
use super::series::FundUniverse;
use super::thresholds::ThresholdStore;
use super::trailing::{TrailingWindow, TrailingYield, resolve_in_universe};

/// Both strategy results for one reference fund.
#[derive(Debug, Clone, PartialEq)]
pub struct FindBetterOutcome {
    pub reference: FundPeriodRecord,
    pub reference_yield: f64,
    pub window: TrailingWindow,
    pub anchor: ReportPeriod,
    pub eligible_count: usize,
    pub unrestricted: MatchResult,
    pub similar_strategy: MatchResult,
}

pub struct FindBetter<'a> {
    universe: &'a FundUniverse,
    store: &'a ThresholdStore,
}

impl<'a> FindBetter<'a> {
    pub fn new(universe: &'a FundUniverse, store: &'a ThresholdStore) -> Self {
        Self { universe, store }
    }

    pub fn trailing_yield(
        &self,
        fund_id: FundId,
        window: TrailingWindow,
        anchor: ReportPeriod,
    ) -> TrailingYield {
        resolve_in_universe(self.universe, fund_id, window, anchor)
    }

    /// The reference's record at `anchor` and its trailing yield.
    pub fn reference(
        &self,
        fund_id: FundId,
        window: TrailingWindow,
        anchor: ReportPeriod,
    ) -> Result<(FundPeriodRecord, f64), FindBetterError> {
        let record = self
            .universe
            .record_at(fund_id, anchor)
            .ok_or(FindBetterError::UnknownFund {
                fund_id,
                period: anchor.raw(),
            })?
            .clone();
        let value = self
            .trailing_yield(fund_id, window, anchor)
            .value
            .ok_or(FindBetterError::NotComputable {
                fund_id,
                months: window.months(),
                period: anchor.raw(),
            })?;
        Ok((record, value))
    }

    pub fn eligible(
        &self,
        reference: &FundPeriodRecord,
        window: TrailingWindow,
        anchor: ReportPeriod,
    ) -> Vec<Candidate> {
        eligible_candidates(self.universe, reference, window, anchor)
    }

    pub fn unrestricted(
        &self,
        eligible: &[Candidate],
        reference: &FundPeriodRecord,
        reference_yield: f64,
        limit: usize,
    ) -> MatchResult {
        find_unrestricted_better(
            eligible,
            reference,
            reference_yield,
            &self.store.tolerances(),
            limit,
        )
    }

    pub fn similar_strategy(
        &self,
        eligible: &[Candidate],
        reference: &FundPeriodRecord,
        reference_yield: f64,
        limit: usize,
    ) -> MatchResult {
        find_similar_strategy_better(
            eligible,
            reference,
            reference_yield,
            &self.store.tolerances(),
            limit,
        )
    }

    /// Runs both reference-driven strategies. Tolerances are read once, so
    /// both lists see the same snapshot.
    pub fn find_better(
        &self,
        fund_id: FundId,
        window: TrailingWindow,
        anchor: ReportPeriod,
        limit: usize,
    ) -> Result<FindBetterOutcome, FindBetterError> {
        let (reference, reference_yield) = self.reference(fund_id, window, anchor)?;
        let eligible = self.eligible(&reference, window, anchor);
        let tolerances = self.store.tolerances();

        let unrestricted =
            find_unrestricted_better(&eligible, &reference, reference_yield, &tolerances, limit);
        let similar_strategy =
            find_similar_strategy_better(&eligible, &reference, reference_yield, &tolerances, limit);

        tracing::info!(
            fund_id,
            %window,
            %anchor,
            reference_yield,
            eligible = eligible.len(),
            unrestricted = unrestricted.len(),
            similar = similar_strategy.len(),
            "find-better complete"
        );

        Ok(FindBetterOutcome {
            reference,
            reference_yield,
            window,
            anchor,
            eligible_count: eligible.len(),
            unrestricted,
            similar_strategy,
        })
    }

    /// Target-driven search; overrides in the query replace store values.
    pub fn in_strategy(&self, query: &InStrategyQuery) -> MatchResult {
        let tolerances = query.overrides.apply(self.store.tolerances());
        let candidates = candidates_in_class(
            self.universe,
            query.classification.as_deref(),
            query.exclude_fund,
            query.window,
            query.anchor,
        );
        let result = find_in_strategy(&candidates, &query.targets, &tolerances, query.limit);
        tracing::info!(
            window = %query.window,
            anchor = %query.anchor,
            candidates = candidates.len(),
            matched = result.len(),
            "in-strategy search complete"
        );
        result
    }
}
