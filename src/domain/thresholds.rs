//! Admin-tunable tolerance thresholds.
//!
//! The store holds one [`ThresholdSetting`] per key behind a mutex. Reads of an
//! unknown key fall back to `0.0`; updates outside `[min, max]` or for an
//! unknown key are rejected without touching the table.
//!
//! Construction runs [`reconcile`] against the code-defined defaults. A stored
//! value that still equals its recorded default follows the new default; a
//! customized value is kept.

use super::error::FindBetterError;
use super::record::Exposure;
use crate::ports::settings_port::SettingsPort;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

pub const YIELD_THRESHOLD: &str = "yield_threshold";
pub const STD_THRESHOLD: &str = "std_threshold";
pub const STOCK_EXPOSURE_THRESHOLD: &str = "stock_exposure_threshold";
pub const FOREIGN_EXPOSURE_THRESHOLD: &str = "foreign_exposure_threshold";
pub const CURRENCY_EXPOSURE_THRESHOLD: &str = "currency_exposure_threshold";
pub const LIQUIDITY_THRESHOLD: &str = "liquidity_threshold";

/// Code-defined bounds and default for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSpec {
    pub key: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub description: &'static str,
}

pub const DEFAULT_THRESHOLDS: [ThresholdSpec; 6] = [
    ThresholdSpec {
        key: YIELD_THRESHOLD,
        min: 0.0,
        max: 5.0,
        default: 0.1,
        description: "Minimum yield improvement (%) for a fund to be considered better",
    },
    ThresholdSpec {
        key: STD_THRESHOLD,
        min: 0.0,
        max: 15.0,
        default: 0.0,
        description: "Required reduction in standard deviation (%) below the reference fund",
    },
    ThresholdSpec {
        key: STOCK_EXPOSURE_THRESHOLD,
        min: 0.0,
        max: 20.0,
        default: 5.0,
        description: "Tolerance (%) for stock market exposure difference",
    },
    ThresholdSpec {
        key: FOREIGN_EXPOSURE_THRESHOLD,
        min: 0.0,
        max: 20.0,
        default: 5.0,
        description: "Tolerance (%) for foreign exposure difference",
    },
    ThresholdSpec {
        key: CURRENCY_EXPOSURE_THRESHOLD,
        min: 0.0,
        max: 20.0,
        default: 5.0,
        description: "Tolerance (%) for currency exposure difference",
    },
    ThresholdSpec {
        key: LIQUIDITY_THRESHOLD,
        min: 0.0,
        max: 20.0,
        default: 5.0,
        description: "Tolerance (%) for liquid assets difference",
    },
];

/// A named tolerance parameter as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSetting {
    pub key: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub description: String,
    pub updated_by: Option<i64>,
}

impl ThresholdSetting {
    pub fn from_spec(spec: &ThresholdSpec) -> Self {
        Self {
            key: spec.key.to_string(),
            value: spec.default,
            min: spec.min,
            max: spec.max,
            default: spec.default,
            description: spec.description.to_string(),
            updated_by: None,
        }
    }

    pub fn accepts(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub settings: BTreeMap<String, ThresholdSetting>,
    /// Keys whose stored row was created or changed.
    pub changed: Vec<String>,
}

/// Brings stored settings in line with `specs`.
///
/// For each [`ThresholdSpec`]: a missing key is seeded from it. An existing
/// key takes its bounds and description; if the stored value equals the
/// previously recorded default, value and default both move to the new
/// default, otherwise only the recorded default moves. A value left outside
/// the new bounds is clamped. Stored keys with no matching entry are kept.
pub fn reconcile(stored: Vec<ThresholdSetting>, specs: &[ThresholdSpec]) -> Reconciled {
    let mut settings: BTreeMap<String, ThresholdSetting> =
        stored.into_iter().map(|s| (s.key.clone(), s)).collect();
    let mut changed = Vec::new();

    for spec in specs {
        match settings.get_mut(spec.key) {
            None => {
                settings.insert(spec.key.to_string(), ThresholdSetting::from_spec(spec));
                changed.push(spec.key.to_string());
            }
            Some(existing) => {
                let before = existing.clone();
                let uncustomized = existing.value == existing.default || existing.value.is_nan();
                existing.min = spec.min;
                existing.max = spec.max;
                existing.description = spec.description.to_string();
                existing.default = spec.default;
                if uncustomized {
                    existing.value = spec.default;
                }
                existing.value = existing.value.clamp(spec.min, spec.max);
                if *existing != before {
                    changed.push(spec.key.to_string());
                }
            }
        }
    }

    Reconciled { settings, changed }
}

/// Tolerances in effect for one matching call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub yield_pct: f64,
    pub std_dev: f64,
    pub stock: f64,
    pub foreign: f64,
    pub currency: f64,
    pub liquidity: f64,
}

impl Tolerances {
    pub fn exposure(&self, dimension: Exposure) -> f64 {
        match dimension {
            Exposure::Stock => self.stock,
            Exposure::Foreign => self.foreign,
            Exposure::Currency => self.currency,
            Exposure::Liquidity => self.liquidity,
        }
    }
}

impl Default for Tolerances {
    /// The defaults from [`DEFAULT_THRESHOLDS`].
    fn default() -> Self {
        let default_of = |key: &str| {
            DEFAULT_THRESHOLDS
                .iter()
                .find(|spec| spec.key == key)
                .map_or(0.0, |spec| spec.default)
        };
        Self {
            yield_pct: default_of(YIELD_THRESHOLD),
            std_dev: default_of(STD_THRESHOLD),
            stock: default_of(STOCK_EXPOSURE_THRESHOLD),
            foreign: default_of(FOREIGN_EXPOSURE_THRESHOLD),
            currency: default_of(CURRENCY_EXPOSURE_THRESHOLD),
            liquidity: default_of(LIQUIDITY_THRESHOLD),
        }
    }
}

/// Per-call overrides; unset fields keep the store's value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToleranceOverrides {
    pub yield_pct: Option<f64>,
    pub std_dev: Option<f64>,
    pub stock: Option<f64>,
    pub foreign: Option<f64>,
    pub currency: Option<f64>,
    pub liquidity: Option<f64>,
}

impl ToleranceOverrides {
    pub fn apply(&self, base: Tolerances) -> Tolerances {
        Tolerances {
            yield_pct: self.yield_pct.unwrap_or(base.yield_pct),
            std_dev: self.std_dev.unwrap_or(base.std_dev),
            stock: self.stock.unwrap_or(base.stock),
            foreign: self.foreign.unwrap_or(base.foreign),
            currency: self.currency.unwrap_or(base.currency),
            liquidity: self.liquidity.unwrap_or(base.liquidity),
        }
    }
}

type BoxedSettingsPort = Box<dyn SettingsPort + Send + Sync>;

/// Shared threshold table.
pub struct ThresholdStore {
    settings: Mutex<BTreeMap<String, ThresholdSetting>>,
    persistence: Option<BoxedSettingsPort>,
}

impl ThresholdStore {
    /// A store seeded with the code defaults and no persistence.
    pub fn new() -> Self {
        Self::from_settings(Vec::new())
    }

    /// Reconciles previously stored settings against the code defaults.
    pub fn from_settings(stored: Vec<ThresholdSetting>) -> Self {
        Self::with_specs(stored, &DEFAULT_THRESHOLDS)
    }

    pub fn with_specs(stored: Vec<ThresholdSetting>, specs: &[ThresholdSpec]) -> Self {
        let reconciled = reconcile(stored, specs);
        Self {
            settings: Mutex::new(reconciled.settings),
            persistence: None,
        }
    }

    /// Loads settings from `port`, reconciles them, writes back the rows the
    /// reconciliation changed, and keeps `port` for later updates.
    pub fn load(port: BoxedSettingsPort) -> Result<Self, FindBetterError> {
        let stored = port.load_settings()?;
        let reconciled = reconcile(stored, &DEFAULT_THRESHOLDS);
        for key in &reconciled.changed {
            if let Some(setting) = reconciled.settings.get(key) {
                port.save_setting(setting)?;
            }
        }
        tracing::info!(
            settings = reconciled.settings.len(),
            reconciled = reconciled.changed.len(),
            "threshold settings loaded"
        );
        Ok(Self {
            settings: Mutex::new(reconciled.settings),
            persistence: Some(port),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, ThresholdSetting>> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current value for `key`, or `0.0` when the key is unknown.
    pub fn get(&self, key: &str) -> f64 {
        self.lock().get(key).map(|s| s.value).unwrap_or(0.0)
    }

    pub fn get_setting(&self, key: &str) -> Option<ThresholdSetting> {
        self.lock().get(key).cloned()
    }

    pub fn get_all(&self) -> BTreeMap<String, ThresholdSetting> {
        self.lock().clone()
    }

    pub fn update(&self, key: &str, value: f64) -> bool {
        self.update_by(key, value, None)
    }

    /// Validated update recording the operator. Returns `false` and leaves the
    /// store unchanged for an unknown key, an out-of-range value, or a failed
    /// write-through.
    pub fn update_by(&self, key: &str, value: f64, operator: Option<i64>) -> bool {
        let mut settings = self.lock();
        let Some(current) = settings.get(key) else {
            tracing::warn!(key, "rejected update of unknown threshold");
            return false;
        };
        if !current.accepts(value) {
            tracing::warn!(
                key,
                value,
                min = current.min,
                max = current.max,
                "rejected out-of-range threshold update"
            );
            return false;
        }

        let mut updated = current.clone();
        updated.value = value;
        updated.updated_by = operator;

        if let Some(port) = &self.persistence {
            if let Err(e) = port.save_setting(&updated) {
                tracing::warn!(key, error = %e, "failed to persist threshold update");
                return false;
            }
        }

        tracing::info!(key, value, "threshold updated");
        settings.insert(key.to_string(), updated);
        true
    }

    /// Snapshot of the six matching tolerances.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            yield_pct: self.get(YIELD_THRESHOLD),
            std_dev: self.get(STD_THRESHOLD),
            stock: self.get(STOCK_EXPOSURE_THRESHOLD),
            foreign: self.get(FOREIGN_EXPOSURE_THRESHOLD),
            currency: self.get(CURRENCY_EXPOSURE_THRESHOLD),
            liquidity: self.get(LIQUIDITY_THRESHOLD),
        }
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand used by the admin surface.
pub fn update_threshold(store: &ThresholdStore, key: &str, value: f64) -> bool {
    store.update(key, value)
}
