//! Fund record source port.

use crate::domain::error::FindBetterError;
use crate::domain::period::ReportPeriod;
use crate::domain::record::FundPeriodRecord;
use crate::domain::series::FundUniverse;

/// Supplies already-cleaned fund records.
pub trait FundDataPort {
    fn fetch_records(&self) -> Result<Vec<FundPeriodRecord>, FindBetterError>;

    /// Reporting periods available, latest first.
    fn list_periods(&self) -> Result<Vec<ReportPeriod>, FindBetterError> {
        Ok(self.load_universe()?.periods())
    }

    fn load_universe(&self) -> Result<FundUniverse, FindBetterError> {
        Ok(FundUniverse::from_records(self.fetch_records()?))
    }
}
