use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgDatabaseError;
use sqlx::types::Json;
use sqlx::PgPool;

use super::model::TravelDate;

/// A failed round-trip to the travel-date store.
///
/// Serialized as-is into the error body of the booking-dates endpoint, so
/// the shape follows what the database reports: message, code, details, hint.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let Some(db) = err.as_database_error() else {
            return StoreError::new(err.to_string());
        };
        let pg = db.try_downcast_ref::<PgDatabaseError>();
        StoreError {
            message: db.message().to_string(),
            code: db.code().map(|c| c.into_owned()),
            details: pg.and_then(|e| e.detail()).map(str::to_string),
            hint: pg.and_then(|e| e.hint()).map(str::to_string),
        }
    }
}

/// Read access to published travel dates and their bookings.
#[async_trait]
pub trait TravelDateStore: Send + Sync {
    /// Published dates of `voyage_slug` departing strictly after `now`,
    /// each with its bookings attached.
    async fn upcoming_dates(
        &self,
        voyage_slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TravelDate>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

// Each row is the full travel_dates record with its bookings nested as a
// JSON array, so columns the service does not model pass through untouched.
const UPCOMING_DATES_SQL: &str = r#"
SELECT to_jsonb(td) || jsonb_build_object(
    'booked_dates',
    COALESCE(
        (SELECT jsonb_agg(
                    jsonb_build_object(
                        'id', bd.id,
                        'booked_places', bd.booked_places,
                        'travel_date_id', bd.travel_date_id,
                        'deleted', bd.deleted
                    )
                    ORDER BY bd.id)
         FROM booked_dates bd
         WHERE bd.travel_date_id = td.id),
        '[]'::jsonb
    )
) AS row
FROM travel_dates td
WHERE td.travel_slug = $1
  AND td.departure_date > $2
  AND td.published = true
ORDER BY td.departure_date, td.id
"#;

/// PostgreSQL-backed [`TravelDateStore`].
#[derive(Debug, Clone)]
pub struct PgTravelDateStore {
    pool: PgPool,
}

impl PgTravelDateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TravelDateStore for PgTravelDateStore {
    async fn upcoming_dates(
        &self,
        voyage_slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TravelDate>, StoreError> {
        let rows: Vec<Json<TravelDate>> = sqlx::query_scalar(UPCOMING_DATES_SQL)
            .bind(voyage_slug)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(voyage_slug, count = rows.len(), "fetched upcoming travel dates");
        Ok(rows.into_iter().map(|Json(date)| date).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
