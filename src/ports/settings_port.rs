//! Threshold settings persistence port.

use crate::domain::error::FindBetterError;
use crate::domain::thresholds::ThresholdSetting;

pub trait SettingsPort {
    fn load_settings(&self) -> Result<Vec<ThresholdSetting>, FindBetterError>;

    /// Insert or replace the row for `setting.key`.
    fn save_setting(&self, setting: &ThresholdSetting) -> Result<(), FindBetterError>;
}
