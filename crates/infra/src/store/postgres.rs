//! Postgres-backed store.
//!
//! Uniqueness and referential rules are enforced by the schema itself
//! (UNIQUE on the email index, FK with RESTRICT on sales.seller_id); the
//! error mapping translates those violations into the same [`StoreError`]
//! variants the in-memory store produces.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use salesdesk_core::{SaleId, SellerId};
use salesdesk_sales::{Sale, SaleFilter};
use salesdesk_sellers::Seller;

use super::{SaleStore, SellerStore, SellerTotals, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sellers (
        id         UUID PRIMARY KEY,
        name       TEXT NOT NULL,
        email      TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id         UUID PRIMARY KEY,
        seller_id  UUID NOT NULL REFERENCES sellers(id) ON DELETE RESTRICT,
        amount     NUMERIC(12, 2) NOT NULL,
        commission NUMERIC(12, 2) NOT NULL,
        sale_date  DATE NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS sellers_email_unique ON sellers (lower(email))",
    "CREATE INDEX IF NOT EXISTS sellers_name_idx ON sellers (name)",
    "CREATE INDEX IF NOT EXISTS sales_seller_id_idx ON sales (seller_id)",
    "CREATE INDEX IF NOT EXISTS sales_sale_date_idx ON sales (sale_date)",
];

// Postgres SQLSTATE codes surfaced as typed store errors.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(backend)?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

fn map_seller_row(row: &sqlx::postgres::PgRow) -> Result<Seller, StoreError> {
    Ok(Seller {
        id: SellerId::from_uuid(row.try_get::<Uuid, _>("id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        email: row.try_get("email").map_err(backend)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(backend)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(backend)?,
    })
}

fn map_sale_row(row: &sqlx::postgres::PgRow) -> Result<Sale, StoreError> {
    Ok(Sale {
        id: SaleId::from_uuid(row.try_get::<Uuid, _>("id").map_err(backend)?),
        seller_id: SellerId::from_uuid(row.try_get::<Uuid, _>("seller_id").map_err(backend)?),
        amount: row.try_get::<Decimal, _>("amount").map_err(backend)?,
        commission: row.try_get::<Decimal, _>("commission").map_err(backend)?,
        sale_date: row.try_get::<NaiveDate, _>("sale_date").map_err(backend)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(backend)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(backend)?,
    })
}

#[async_trait]
impl SellerStore for PostgresStore {
    async fn insert_seller(&self, seller: Seller) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sellers (id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*seller.id.as_uuid())
        .bind(&seller.name)
        .bind(&seller.email)
        .bind(seller.created_at)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::DuplicateEmail,
            _ => backend(e),
        })?;
        Ok(())
    }

    async fn seller(&self, id: SellerId) -> Result<Option<Seller>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, created_at, updated_at FROM sellers WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(map_seller_row).transpose()
    }

    async fn update_seller(&self, seller: Seller) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE sellers
            SET name = $2, email = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(*seller.id.as_uuid())
        .bind(&seller.name)
        .bind(&seller.email)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::DuplicateEmail,
            _ => backend(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_seller(&self, id: SellerId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM sellers WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| match sqlstate(&e).as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => StoreError::SellerHasSales,
                _ => backend(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn search_sellers(&self, query: Option<&str>) -> Result<Vec<Seller>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM sellers
            WHERE $1::text IS NULL
               OR lower(name) LIKE lower($1) || '%'
               OR lower(email) LIKE lower($1) || '%'
            ORDER BY lower(name), id
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(map_seller_row).collect()
    }

    async fn seller_count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM sellers")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        let n: i64 = row.try_get("n").map_err(backend)?;
        Ok(n.max(0) as u64)
    }
}

#[async_trait]
impl SaleStore for PostgresStore {
    async fn insert_sale(&self, sale: Sale) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sales (id, seller_id, amount, commission, sale_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*sale.id.as_uuid())
        .bind(*sale.seller_id.as_uuid())
        .bind(sale.amount)
        .bind(sale.commission)
        .bind(sale.sale_date)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => StoreError::UnknownSeller,
            _ => backend(e),
        })?;
        Ok(())
    }

    async fn sale(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, seller_id, amount, commission, sale_date, created_at, updated_at
            FROM sales WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(map_sale_row).transpose()
    }

    async fn update_sale(&self, sale: Sale) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE sales
            SET seller_id = $2, amount = $3, commission = $4, sale_date = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(*sale.id.as_uuid())
        .bind(*sale.seller_id.as_uuid())
        .bind(sale.amount)
        .bind(sale.commission)
        .bind(sale.sale_date)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => StoreError::UnknownSeller,
            _ => backend(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_sale(&self, id: SaleId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, amount, commission, sale_date, created_at, updated_at
            FROM sales
            WHERE ($1::uuid IS NULL OR seller_id = $1)
              AND ($2::date IS NULL OR sale_date >= $2)
              AND ($3::date IS NULL OR sale_date <= $3)
              AND ($4::numeric IS NULL OR amount >= $4)
              AND ($5::numeric IS NULL OR amount <= $5)
            ORDER BY sale_date DESC, created_at DESC, id DESC
            "#,
        )
        .bind(filter.seller_id.map(|id| *id.as_uuid()))
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.amount_min)
        .bind(filter.amount_max)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(map_sale_row).collect()
    }

    async fn seller_totals(&self) -> Result<Vec<SellerTotals>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT seller_id, COUNT(*) AS sales_count,
                   COALESCE(SUM(commission), 0) AS commission_sum
            FROM sales
            GROUP BY seller_id
            ORDER BY seller_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|row| {
                let count: i64 = row.try_get("sales_count").map_err(backend)?;
                Ok(SellerTotals {
                    seller_id: SellerId::from_uuid(
                        row.try_get::<Uuid, _>("seller_id").map_err(backend)?,
                    ),
                    sales_count: count.max(0) as u64,
                    commission_sum: row
                        .try_get::<Decimal, _>("commission_sum")
                        .map_err(backend)?,
                })
            })
            .collect()
    }

    async fn latest_sale_date(
        &self,
        seller_id: SellerId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        let row = sqlx::query("SELECT MAX(sale_date) AS latest FROM sales WHERE seller_id = $1")
            .bind(*seller_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        row.try_get::<Option<NaiveDate>, _>("latest").map_err(backend)
    }
}
