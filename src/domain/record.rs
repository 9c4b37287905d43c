//! Per-fund, per-period performance records.

use super::period::ReportPeriod;
use serde::Deserialize;

pub type FundId = i64;

/// One fund's reported metrics for one reporting period.
///
/// Column names follow the upstream dataset (`FUND_ID`, `REPORT_PERIOD`, ...).
/// Every metric except the identity columns may be missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FundPeriodRecord {
    #[serde(rename = "FUND_ID")]
    pub fund_id: FundId,
    #[serde(rename = "FUND_NAME", default)]
    pub fund_name: String,
    #[serde(rename = "FUND_CLASSIFICATION", default)]
    pub classification: Option<String>,
    #[serde(rename = "REPORT_PERIOD")]
    pub period: ReportPeriod,
    #[serde(rename = "MONTHLY_YIELD", default)]
    pub monthly_yield: Option<f64>,
    #[serde(rename = "STANDARD_DEVIATION", default)]
    pub std_dev: Option<f64>,
    #[serde(rename = "SHARPE_RATIO", default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(rename = "STOCK_MARKET_EXPOSURE", default)]
    pub stock_exposure: Option<f64>,
    #[serde(rename = "FOREIGN_EXPOSURE", default)]
    pub foreign_exposure: Option<f64>,
    #[serde(rename = "FOREIGN_CURRENCY_EXPOSURE", default)]
    pub currency_exposure: Option<f64>,
    #[serde(rename = "LIQUID_ASSETS_PERCENT", default)]
    pub liquid_assets: Option<f64>,
    #[serde(rename = "AVG_ANNUAL_MANAGEMENT_FEE", default)]
    pub management_fee: Option<f64>,
    #[serde(rename = "AVG_ANNUAL_YIELD_TRAILING_1YR", default)]
    pub trailing_1yr: Option<f64>,
    #[serde(rename = "AVG_ANNUAL_YIELD_TRAILING_3YRS", default)]
    pub trailing_3yrs: Option<f64>,
    #[serde(rename = "AVG_ANNUAL_YIELD_TRAILING_5YRS", default)]
    pub trailing_5yrs: Option<f64>,
}

impl FundPeriodRecord {
    /// A record carrying only identity fields; metrics are filled in by callers.
    pub fn new(fund_id: FundId, fund_name: &str, period: ReportPeriod) -> Self {
        Self {
            fund_id,
            fund_name: fund_name.to_string(),
            classification: None,
            period,
            monthly_yield: None,
            std_dev: None,
            sharpe_ratio: None,
            stock_exposure: None,
            foreign_exposure: None,
            currency_exposure: None,
            liquid_assets: None,
            management_fee: None,
            trailing_1yr: None,
            trailing_3yrs: None,
            trailing_5yrs: None,
        }
    }

    /// Trailing yields reported upstream, as `(months, value)` pairs.
    pub fn reported_trailing(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        [
            (12, self.trailing_1yr),
            (36, self.trailing_3yrs),
            (60, self.trailing_5yrs),
        ]
        .into_iter()
        .filter_map(|(months, v)| v.filter(|x| x.is_finite()).map(|x| (months, x)))
    }

    pub fn exposure(&self, dimension: Exposure) -> Option<f64> {
        match dimension {
            Exposure::Stock => self.stock_exposure,
            Exposure::Foreign => self.foreign_exposure,
            Exposure::Currency => self.currency_exposure,
            Exposure::Liquidity => self.liquid_assets,
        }
    }
}

/// Allocation dimensions compared by similar-strategy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exposure {
    Stock,
    Foreign,
    Currency,
    Liquidity,
}

impl Exposure {
    pub const ALL: [Exposure; 4] = [
        Exposure::Stock,
        Exposure::Foreign,
        Exposure::Currency,
        Exposure::Liquidity,
    ];
}
