//! Repository for the `events` table.

use chrono::Utc;

use crate::models::event::{DiscoveredMarket, Event, PricedEvent, TokenizedEvent, UpsertResult};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, created_at, slug, gamma_market_id, yes_token_id, \
                       volume_24h, latest_pm_p, latest_machine_p";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a hand-created event with only a title, returning the new row.
    pub async fn create(pool: &DbPool, title: &str) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (id, title, created_at) VALUES (?1, ?2, ?3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(title)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = ?1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events, most recently created first.
    pub async fn list(pool: &DbPool, limit: i64) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events ORDER BY created_at DESC LIMIT ?1");
        sqlx::query_as::<_, Event>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Insert or refresh a discovered market.
    ///
    /// An existing row is matched by slug first, then by YES token id. Prices
    /// and `created_at` of an existing row are preserved.
    pub async fn upsert_discovered(
        pool: &DbPool,
        market: &DiscoveredMarket,
    ) -> Result<UpsertResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut existing: Option<String> = None;
        if let Some(slug) = market.slug.as_deref() {
            existing = sqlx::query_scalar("SELECT id FROM events WHERE slug = ?1")
                .bind(slug)
                .fetch_optional(&mut *tx)
                .await?;
        }
        if existing.is_none() {
            existing = sqlx::query_scalar("SELECT id FROM events WHERE yes_token_id = ?1")
                .bind(&market.yes_token_id)
                .fetch_optional(&mut *tx)
                .await?;
        }

        let result = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE events
                     SET title = ?2, slug = ?3, gamma_market_id = ?4, yes_token_id = ?5,
                         volume_24h = COALESCE(?6, volume_24h)
                     WHERE id = ?1",
                )
                .bind(&id)
                .bind(&market.title)
                .bind(&market.slug)
                .bind(&market.gamma_market_id)
                .bind(&market.yes_token_id)
                .bind(market.volume_24h)
                .execute(&mut *tx)
                .await?;
                UpsertResult::Updated
            }
            None => {
                sqlx::query(
                    "INSERT INTO events
                        (id, title, created_at, slug, gamma_market_id, yes_token_id, volume_24h)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(&market.title)
                .bind(Utc::now())
                .bind(&market.slug)
                .bind(&market.gamma_market_id)
                .bind(&market.yes_token_id)
                .bind(market.volume_24h)
                .execute(&mut *tx)
                .await?;
                UpsertResult::Inserted
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    /// Events that have a YES token and can therefore be priced.
    pub async fn list_tokenized(pool: &DbPool) -> Result<Vec<TokenizedEvent>, sqlx::Error> {
        sqlx::query_as::<_, TokenizedEvent>(
            "SELECT id, yes_token_id FROM events WHERE yes_token_id IS NOT NULL",
        )
        .fetch_all(pool)
        .await
    }

    /// Events with a stored market price.
    pub async fn list_priced(pool: &DbPool) -> Result<Vec<PricedEvent>, sqlx::Error> {
        sqlx::query_as::<_, PricedEvent>(
            "SELECT id, latest_pm_p, volume_24h FROM events WHERE latest_pm_p IS NOT NULL",
        )
        .fetch_all(pool)
        .await
    }

    /// Store the latest market price. Returns `true` if a row was updated.
    pub async fn set_pm_price(pool: &DbPool, id: &str, p: f64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET latest_pm_p = ?2 WHERE id = ?1")
            .bind(id)
            .bind(p)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store the latest machine estimate. Returns `true` if a row was updated.
    pub async fn set_machine_price(pool: &DbPool, id: &str, p: f64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET latest_machine_p = ?2 WHERE id = ?1")
            .bind(id)
            .bind(p)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
