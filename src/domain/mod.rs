//! Core domain types and logic.

pub mod compounding;
pub mod config_validation;
pub mod eligibility;
pub mod error;
pub mod find_better;
pub mod matching;
pub mod period;
pub mod record;
pub mod series;
pub mod thresholds;
pub mod trailing;
