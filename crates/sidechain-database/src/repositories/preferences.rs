//! Notification preference repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::result::AppResult;
use sidechain_core::traits::PreferenceStore;
use sidechain_core::types::NotificationPreferences;
use sidechain_entity::notification::NotificationPreferenceRow;

/// Preference maps stored as JSONB, one row per user.
#[derive(Debug, Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn load(&self, user_id: Uuid) -> AppResult<Option<NotificationPreferences>> {
        let row = sqlx::query_as::<_, NotificationPreferenceRow>(
            "SELECT user_id, preferences, created_at, updated_at \
             FROM notification_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load preferences", e))?;

        Ok(row.map(|r| r.to_preferences()))
    }

    async fn save(&self, user_id: Uuid, preferences: &NotificationPreferences) -> AppResult<()> {
        let json = serde_json::to_value(preferences)?;
        sqlx::query(
            "INSERT INTO notification_preferences (user_id, preferences, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET preferences = $2, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save preferences", e))?;
        Ok(())
    }
}
