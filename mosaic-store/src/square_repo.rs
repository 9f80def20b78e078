use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mosaic_core::repository::SquareRepository;
use mosaic_core::square::{Square, SquareSummary};

pub struct StoreSquareRepository {
    pool: PgPool,
}

impl StoreSquareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct SquareRow {
    id: i64,
    title: String,
    image_url: String,
    redirect_link: String,
    owner: String,
    is_purchased: bool,
    reserved_at: DateTime<Utc>,
}

impl From<SquareRow> for Square {
    fn from(row: SquareRow) -> Self {
        Square {
            id: row.id,
            title: row.title,
            image_url: row.image_url,
            redirect_link: row.redirect_link,
            owner: row.owner,
            is_purchased: row.is_purchased,
            reserved_at: row.reserved_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    title: String,
    image_url: String,
    redirect_link: String,
    is_purchased: bool,
}

#[async_trait]
impl SquareRepository for StoreSquareRepository {
    async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<Square>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<SquareRow> = sqlx::query_as(
            r#"
            SELECT id, title, image_url, redirect_link, owner, is_purchased, reserved_at
            FROM squares
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Square::from))
    }

    async fn find_range(
        &self,
        start: i64,
        end: i64,
    ) -> Result<Vec<SquareSummary>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT id, title, image_url, redirect_link, is_purchased
            FROM squares
            WHERE id >= $1 AND id <= $2
            ORDER BY id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SquareSummary {
                id: row.id,
                title: row.title,
                image_url: row.image_url,
                redirect_link: row.redirect_link,
                is_purchased: row.is_purchased,
            })
            .collect())
    }

    async fn create_if_absent(
        &self,
        square: &Square,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // A racing claim that loses the insert shows up as zero rows
        // affected rather than a duplicate-key error.
        let result = sqlx::query(
            r#"
            INSERT INTO squares (id, title, image_url, redirect_link, owner, is_purchased, reserved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(square.id)
        .bind(&square.title)
        .bind(&square.image_url)
        .bind(&square.redirect_link)
        .bind(&square.owner)
        .bind(square.is_purchased)
        .bind(square.reserved_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired(
        &self,
        id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // The guard re-checks eligibility so a claim renewed between the
        // caller's read and this delete is left alone.
        let result = sqlx::query(
            r#"
            DELETE FROM squares
            WHERE id = $1 AND is_purchased = FALSE AND reserved_at <= $2
            "#,
        )
        .bind(id)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_purchased(
        &self,
        id: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            UPDATE squares
            SET is_purchased = TRUE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
