#![allow(dead_code)]

use findbetter::domain::error::FindBetterError;
use findbetter::domain::period::ReportPeriod;
pub use findbetter::domain::record::{FundId, FundPeriodRecord};
use findbetter::domain::thresholds::ThresholdSetting;
use findbetter::ports::data_port::FundDataPort;
use findbetter::ports::settings_port::SettingsPort;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const CSV_HEADER: &str = "FUND_ID,FUND_NAME,FUND_CLASSIFICATION,REPORT_PERIOD,MONTHLY_YIELD,\
STANDARD_DEVIATION,SHARPE_RATIO,STOCK_MARKET_EXPOSURE,FOREIGN_EXPOSURE,\
FOREIGN_CURRENCY_EXPOSURE,LIQUID_ASSETS_PERCENT,AVG_ANNUAL_MANAGEMENT_FEE";

pub struct MockFundDataPort {
    pub records: Vec<FundPeriodRecord>,
    pub error: Option<String>,
}

impl MockFundDataPort {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            error: None,
        }
    }

    pub fn with_records(mut self, records: Vec<FundPeriodRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl FundDataPort for MockFundDataPort {
    fn fetch_records(&self) -> Result<Vec<FundPeriodRecord>, FindBetterError> {
        if let Some(reason) = &self.error {
            return Err(FindBetterError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self.records.clone())
    }
}

/// Settings port whose writes can be switched to fail. Clones share state.
#[derive(Clone, Default)]
pub struct FlakySettingsPort {
    pub rows: Arc<Mutex<Vec<ThresholdSetting>>>,
    pub fail_writes: Arc<AtomicBool>,
}

impl FlakySettingsPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn stored(&self, key: &str) -> Option<ThresholdSetting> {
        self.rows.lock().unwrap().iter().find(|r| r.key == key).cloned()
    }
}

impl SettingsPort for FlakySettingsPort {
    fn load_settings(&self) -> Result<Vec<ThresholdSetting>, FindBetterError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    fn save_setting(&self, setting: &ThresholdSetting) -> Result<(), FindBetterError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FindBetterError::DatabaseQuery {
                reason: "disk full".into(),
            });
        }
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| r.key != setting.key);
        rows.push(setting.clone());
        Ok(())
    }
}

pub fn period(raw: i32) -> ReportPeriod {
    ReportPeriod::new(raw).unwrap()
}

/// Builder for a fund's profile; `history` expands it into monthly records.
#[derive(Clone)]
pub struct FundProfile {
    pub fund_id: FundId,
    pub name: String,
    pub classification: Option<String>,
    pub monthly: f64,
    pub std_dev: Option<f64>,
    pub stock: Option<f64>,
    pub foreign: Option<f64>,
    pub currency: Option<f64>,
    pub liquidity: Option<f64>,
}

impl FundProfile {
    pub fn new(fund_id: FundId, monthly: f64) -> Self {
        Self {
            fund_id,
            name: format!("Fund {fund_id}"),
            classification: Some("General".to_string()),
            monthly,
            std_dev: None,
            stock: None,
            foreign: None,
            currency: None,
            liquidity: None,
        }
    }

    pub fn class(mut self, classification: &str) -> Self {
        self.classification = Some(classification.to_string());
        self
    }

    pub fn std(mut self, std_dev: f64) -> Self {
        self.std_dev = Some(std_dev);
        self
    }

    pub fn stock(mut self, stock: f64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn foreign(mut self, foreign: f64) -> Self {
        self.foreign = Some(foreign);
        self
    }

    /// `months` consecutive records ending at `end`.
    pub fn history(&self, end: i32, months: u32) -> Vec<FundPeriodRecord> {
        let end = period(end);
        (0..months)
            .map(|i| {
                let mut r =
                    FundPeriodRecord::new(self.fund_id, &self.name, end.minus_months(i).unwrap());
                r.classification = self.classification.clone();
                r.monthly_yield = Some(self.monthly);
                r.std_dev = self.std_dev;
                r.stock_exposure = self.stock;
                r.foreign_exposure = self.foreign;
                r.currency_exposure = self.currency;
                r.liquid_assets = self.liquidity;
                r
            })
            .collect()
    }
}

fn cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

pub fn to_csv(records: &[FundPeriodRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}\n",
            r.fund_id,
            r.fund_name,
            r.classification.as_deref().unwrap_or(""),
            r.period,
            cell(r.monthly_yield),
            cell(r.std_dev),
            cell(r.sharpe_ratio),
            cell(r.stock_exposure),
            cell(r.foreign_exposure),
            cell(r.currency_exposure),
            cell(r.liquid_assets),
            cell(r.management_fee),
        ));
    }
    out
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// The reference scenario: fund 1001 at 1.0% monthly, one better fund with a
/// similar allocation, one better fund with a different allocation, and
/// weaker or out-of-class funds.
pub fn scenario_records() -> Vec<FundPeriodRecord> {
    let mut records = Vec::new();
    records.extend(FundProfile::new(1001, 1.0).std(3.5).stock(45.0).foreign(20.0).history(202312, 24));
    records.extend(FundProfile::new(1002, 1.5).std(3.0).stock(44.0).foreign(21.0).history(202312, 24));
    records.extend(FundProfile::new(1003, 1.3).std(2.5).stock(80.0).foreign(20.0).history(202312, 24));
    records.extend(FundProfile::new(1004, 0.5).std(1.0).stock(45.0).foreign(20.0).history(202312, 24));
    records.extend(FundProfile::new(1005, 1.2).std(3.4).stock(46.0).foreign(19.0).history(202312, 24));
    records.extend(
        FundProfile::new(2001, 3.0)
            .class("Equity")
            .std(1.0)
            .stock(45.0)
            .history(202312, 24),
    );
    records
}
