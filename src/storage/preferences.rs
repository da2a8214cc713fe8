use anyhow::Result;

use super::schema::Database;
use crate::state::DashboardSnapshot;

/// Key under which the whole preferences+favorites aggregate is stored.
const SNAPSHOT_KEY: &str = "dashboard.snapshot";

impl Database {
    // ========================================================================
    // Key-Value Operations
    // ========================================================================

    /// Get a single preference value by key.
    ///
    /// Keys use dotted convention: `dashboard.snapshot`, `session.token`, etc.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM user_preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Set a preference value (UPSERT).
    ///
    /// Inserts the key-value pair if it doesn't exist, or updates the value
    /// and timestamp if the key already exists.
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a preference key. Missing keys are a no-op.
    pub async fn delete_preference(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ========================================================================
    // Snapshot Codec
    // ========================================================================

    /// Load the persisted dashboard aggregate.
    ///
    /// A missing snapshot returns `None`. A corrupt snapshot also returns
    /// `None` with a warning. Startup must not fail over a bad row; the
    /// caller falls back to default state and the next flush overwrites it.
    pub async fn load_snapshot(&self) -> Result<Option<DashboardSnapshot>> {
        let Some(raw) = self.get_preference(SNAPSHOT_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt dashboard snapshot, starting fresh");
                Ok(None)
            }
        }
    }

    /// Serialize and store the dashboard aggregate.
    pub async fn save_snapshot(&self, snapshot: &DashboardSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.set_preference(SNAPSHOT_KEY, &json).await
    }
}

// ============================================================================
// Tests
// ============================================================================
