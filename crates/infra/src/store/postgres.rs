//! Postgres-backed sale store.
//!
//! One row per sale in the `sales` table. `payment_code` carries a unique
//! constraint, so duplicate codes are rejected by the database itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use autosales_core::{PaymentCode, SaleId};
use autosales_inventory::{Price, VehicleId};
use autosales_sales::{Cpf, Sale, SaleStatus};

use super::{SaleStore, StoreError};

const SALE_COLUMNS: &str = "id, vehicle_id, cpf_buyer, price, brand, model, color, payment_code, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresSaleStore {
    pool: PgPool,
}

impl PostgresSaleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(backend)?;
        Ok(Self::new(pool))
    }

    /// Create the `sales` table and its indexes when missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sales (
                id UUID PRIMARY KEY,
                vehicle_id TEXT NOT NULL,
                cpf_buyer TEXT NOT NULL,
                price NUMERIC NOT NULL CHECK (price >= 0),
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                color TEXT NOT NULL,
                payment_code TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS sales_status_price_idx ON sales (status, price)")
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn corrupt(column: &str, detail: impl core::fmt::Display) -> StoreError {
    StoreError::Backend(format!("corrupt sales row ({column}): {detail}"))
}

fn sale_from_row(row: &PgRow) -> Result<Sale, StoreError> {
    let id: Uuid = row.try_get("id").map_err(backend)?;
    let vehicle_id: String = row.try_get("vehicle_id").map_err(backend)?;
    let cpf_buyer: String = row.try_get("cpf_buyer").map_err(backend)?;
    let price: Decimal = row.try_get("price").map_err(backend)?;
    let payment_code: String = row.try_get("payment_code").map_err(backend)?;
    let status: String = row.try_get("status").map_err(backend)?;

    Ok(Sale {
        id: SaleId::from_uuid(id),
        vehicle_id: VehicleId::new(vehicle_id),
        cpf_buyer: Cpf::parse(cpf_buyer).map_err(|e| corrupt("cpf_buyer", e))?,
        price: Price::new(price).map_err(|e| corrupt("price", e))?,
        brand: row.try_get("brand").map_err(backend)?,
        model: row.try_get("model").map_err(backend)?,
        color: row.try_get("color").map_err(backend)?,
        payment_code: PaymentCode::parse(payment_code).map_err(|e| corrupt("payment_code", e))?,
        status: status.parse().map_err(|e| corrupt("status", e))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(backend)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(backend)?,
    })
}

#[async_trait::async_trait]
impl SaleStore for PostgresSaleStore {
    #[instrument(skip(self, sale), fields(payment_code = %sale.payment_code), err)]
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                id, vehicle_id, cpf_buyer, price, brand, model, color,
                payment_code, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(sale.id.as_uuid())
        .bind(sale.vehicle_id.as_str())
        .bind(sale.cpf_buyer.as_str())
        .bind(sale.price.amount())
        .bind(&sale.brand)
        .bind(&sale.model)
        .bind(&sale.color)
        .bind(sale.payment_code.as_str())
        .bind(sale.status.as_str())
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(sale),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(sale.payment_code))
            }
            Err(e) => Err(backend(e)),
        }
    }

    #[instrument(skip(self), fields(payment_code = %code), err)]
    async fn find_by_payment_code(&self, code: &PaymentCode) -> Result<Option<Sale>, StoreError> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE payment_code = $1");
        let row = sqlx::query(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(sale_from_row).transpose()
    }

    #[instrument(skip(self, updated_at), fields(payment_code = %code, from = %from, to = %to), err)]
    async fn update_status(
        &self,
        code: &PaymentCode,
        from: SaleStatus,
        to: SaleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Sale, StoreError> {
        let sql = format!(
            "UPDATE sales SET status = $1, updated_at = $2 WHERE payment_code = $3 AND status = $4 RETURNING {SALE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(to.as_str())
            .bind(updated_at)
            .bind(code.as_str())
            .bind(from.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        if let Some(row) = row {
            return sale_from_row(&row);
        }

        // No row updated: either the code is unknown or the status moved on.
        let exists = sqlx::query("SELECT 1 FROM sales WHERE payment_code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match exists {
            Some(_) => Err(StoreError::Stale(code.clone())),
            None => Err(StoreError::NotFound(code.clone())),
        }
    }

    #[instrument(skip(self), fields(status = %status), err)]
    async fn list_by_status(&self, status: SaleStatus) -> Result<Vec<Sale>, StoreError> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE status = $1 ORDER BY price ASC");
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter().map(sale_from_row).collect()
    }
}
