//! SQLite threshold settings adapter.
//!
//! Settings live in a single `system_settings` table keyed by setting name.

use crate::domain::error::FindBetterError;
use crate::domain::thresholds::ThresholdSetting;
use crate::ports::config_port::ConfigPort;
use crate::ports::settings_port::SettingsPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteSettingsAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteSettingsAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FindBetterError> {
        let db_path = config.get_string("settings", "sqlite_path").ok_or_else(|| {
            FindBetterError::ConfigMissing {
                section: "settings".into(),
                key: "sqlite_path".into(),
            }
        })?;

        let pool_size = config.get_int("settings", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| FindBetterError::Database {
                    reason: e.to_string(),
                })?;

        tracing::debug!(path = %db_path, pool_size, "opened settings database");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, FindBetterError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| FindBetterError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, FindBetterError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| FindBetterError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), FindBetterError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS system_settings (
                key TEXT PRIMARY KEY,
                value REAL NOT NULL,
                min_value REAL NOT NULL,
                max_value REAL NOT NULL,
                default_value REAL NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                updated_by INTEGER,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .map_err(|e: rusqlite::Error| FindBetterError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl SettingsPort for SqliteSettingsAdapter {
    fn load_settings(&self) -> Result<Vec<ThresholdSetting>, FindBetterError> {
        let conn = self.conn()?;

        let query = "SELECT key, value, min_value, max_value, default_value, description, updated_by
                     FROM system_settings
                     ORDER BY key";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| FindBetterError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ThresholdSetting {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    min: row.get(2)?,
                    max: row.get(3)?,
                    default: row.get(4)?,
                    description: row.get(5)?,
                    updated_by: row.get(6)?,
                })
            })
            .map_err(|e: rusqlite::Error| FindBetterError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut settings = Vec::new();
        for row in rows {
            settings.push(
                row.map_err(|e: rusqlite::Error| FindBetterError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(settings)
    }

    fn save_setting(&self, setting: &ThresholdSetting) -> Result<(), FindBetterError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO system_settings
                (key, value, min_value, max_value, default_value, description, updated_by, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                min_value = excluded.min_value,
                max_value = excluded.max_value,
                default_value = excluded.default_value,
                description = excluded.description,
                updated_by = excluded.updated_by,
                updated_at = CURRENT_TIMESTAMP",
            params![
                setting.key,
                setting.value,
                setting.min,
                setting.max,
                setting.default,
                setting.description,
                setting.updated_by
            ],
        )
        .map_err(|e: rusqlite::Error| FindBetterError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
