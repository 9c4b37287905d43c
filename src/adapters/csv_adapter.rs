//! CSV fund data adapter.
//!
//! Reads the cleaned fund dataset: one row per fund and reporting period,
//! headers named after the upstream columns. Blank cells are missing values.

use crate::domain::error::FindBetterError;
use crate::domain::record::FundPeriodRecord;
use crate::ports::data_port::FundDataPort;
use std::fs;
use std::path::PathBuf;

pub struct CsvFundAdapter {
    path: PathBuf,
}

impl CsvFundAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn parse(content: &str) -> Result<Vec<FundPeriodRecord>, FindBetterError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (i, result) in rdr.deserialize::<FundPeriodRecord>().enumerate() {
            let record = result.map_err(|e| FindBetterError::DataParse {
                // Header is line 1.
                row: e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(i + 2),
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl FundDataPort for CsvFundAdapter {
    fn fetch_records(&self) -> Result<Vec<FundPeriodRecord>, FindBetterError> {
        let content = fs::read_to_string(&self.path)?;
        let records = Self::parse(&content)?;
        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "loaded fund records"
        );
        Ok(records)
    }
}
