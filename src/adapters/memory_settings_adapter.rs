//! Process-local settings storage, used when no settings database is
//! configured.

use crate::domain::error::FindBetterError;
use crate::domain::thresholds::ThresholdSetting;
use crate::ports::settings_port::SettingsPort;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemorySettingsAdapter {
    rows: Mutex<BTreeMap<String, ThresholdSetting>>,
}

impl MemorySettingsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Vec<ThresholdSetting>) -> Self {
        Self {
            rows: Mutex::new(settings.into_iter().map(|s| (s.key.clone(), s)).collect()),
        }
    }
}

impl SettingsPort for MemorySettingsAdapter {
    fn load_settings(&self) -> Result<Vec<ThresholdSetting>, FindBetterError> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows.values().cloned().collect())
    }

    fn save_setting(&self, setting: &ThresholdSetting) -> Result<(), FindBetterError> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        rows.insert(setting.key.clone(), setting.clone());
        Ok(())
    }
}
