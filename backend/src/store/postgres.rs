//! PostgreSQL backend

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    CentralStockEntry, DateWindow, NewSale, PageRequest, Product, ProductSalesTotal,
    ReplenishmentRequest, RequestStatus, Sale, SaleItem, Store, StoreSalesTotal, StoreStock,
    StoreType, WarehouseStock,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{InventoryStore, StoreTx};
use crate::error::{AppError, AppResult};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgInventoryStore {
    db: PgPool,
}

impl PgInventoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    type Tx = PgTx;

    async fn begin(&self) -> AppResult<PgTx> {
        Ok(PgTx {
            tx: self.db.begin().await?,
        })
    }
}

/// Open PostgreSQL transaction. Rolled back on drop unless committed.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[derive(Debug, FromRow)]
struct StockRow {
    id: Uuid,
    store_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

impl From<StockRow> for StoreStock {
    fn from(r: StockRow) -> Self {
        StoreStock {
            id: r.id,
            store_id: r.store_id,
            product_id: r.product_id,
            quantity: r.quantity,
        }
    }
}

#[derive(Debug, FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
    address: String,
    store_type: String,
}

impl TryFrom<StoreRow> for Store {
    type Error = AppError;

    fn try_from(r: StoreRow) -> Result<Self, Self::Error> {
        Ok(Store {
            id: r.id,
            name: r.name,
            address: r.address,
            store_type: r
                .store_type
                .parse::<StoreType>()
                .map_err(|e| AppError::Internal(e.to_string()))?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    description: Option<String>,
    category: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            name: r.name,
            price: r.price,
            description: r.description,
            category: r.category,
        }
    }
}

#[derive(Debug, FromRow)]
struct RequestRow {
    id: Uuid,
    store_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    status: String,
    created_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    source_store_id: Option<Uuid>,
}

impl TryFrom<RequestRow> for ReplenishmentRequest {
    type Error = AppError;

    fn try_from(r: RequestRow) -> Result<Self, Self::Error> {
        Ok(ReplenishmentRequest {
            id: r.id,
            store_id: r.store_id,
            product_id: r.product_id,
            quantity: r.quantity,
            status: r
                .status
                .parse::<RequestStatus>()
                .map_err(|e| AppError::Internal(e.to_string()))?,
            created_at: r.created_at,
            approved_at: r.approved_at,
            source_store_id: r.source_store_id,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    date: DateTime<Utc>,
    store_id: Uuid,
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
}

impl From<SaleItemRow> for SaleItem {
    fn from(r: SaleItemRow) -> Self {
        SaleItem {
            id: r.id,
            sale_id: r.sale_id,
            product_id: r.product_id,
            quantity: r.quantity,
            unit_price: r.unit_price,
        }
    }
}

const REQUEST_COLUMNS: &str =
    "id, store_id, product_id, quantity, status, created_at, approved_at, source_store_id";

fn to_requests(rows: Vec<RequestRow>) -> AppResult<Vec<ReplenishmentRequest>> {
    rows.into_iter().map(ReplenishmentRequest::try_from).collect()
}

impl PgTx {
    async fn items_for_sales(&mut self, sale_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<SaleItem>>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price
            FROM sale_items
            WHERE sale_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(sale_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut by_sale: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for row in rows {
            by_sale.entry(row.sale_id).or_default().push(row.into());
        }
        Ok(by_sale)
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn stock_quantity(&mut self, store_id: Uuid, product_id: Uuid) -> AppResult<Option<i32>> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM store_stock WHERE store_id = $1 AND product_id = $2",
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(quantity)
    }

    async fn add_stock(&mut self, store_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<i32> {
        let new_quantity = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO store_stock (store_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (store_id, product_id)
            DO UPDATE SET quantity = store_stock.quantity + EXCLUDED.quantity, updated_at = NOW()
            RETURNING quantity
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(new_quantity)
    }

    async fn take_stock(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<i32>> {
        let new_quantity = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE store_stock
            SET quantity = quantity - $3, updated_at = NOW()
            WHERE store_id = $1 AND product_id = $2 AND quantity >= $3
            RETURNING quantity
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(new_quantity)
    }

    async fn stock_below(&mut self, threshold: i32) -> AppResult<Vec<StoreStock>> {
        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT id, store_id, product_id, quantity
            FROM store_stock
            WHERE quantity < $1
            ORDER BY quantity, store_id, product_id
            "#,
        )
        .bind(threshold)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn stock_for_store(&mut self, store_id: Uuid) -> AppResult<Vec<StoreStock>> {
        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT id, store_id, product_id, quantity
            FROM store_stock
            WHERE store_id = $1
            ORDER BY product_id
            "#,
        )
        .bind(store_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn warehouse_stock(&mut self, page: Option<PageRequest>) -> AppResult<WarehouseStock> {
        let limit = page.map(|p| i64::from(p.limit));
        let offset = page.map(|p| p.offset() as i64).unwrap_or(0);

        let rows = sqlx::query_as::<_, (Uuid, i64, String)>(
            r#"
            SELECT ss.product_id, SUM(ss.quantity)::BIGINT AS stock, p.name
            FROM store_stock ss
            JOIN stores s ON s.id = ss.store_id
            JOIN products p ON p.id = ss.product_id
            WHERE s.store_type = 'LOGISTICS'
            GROUP BY ss.product_id, p.name
            ORDER BY p.name, ss.product_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.tx)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT ss.product_id)
            FROM store_stock ss
            JOIN stores s ON s.id = ss.store_id
            JOIN products p ON p.id = ss.product_id
            WHERE s.store_type = 'LOGISTICS'
            "#,
        )
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(WarehouseStock {
            items: rows
                .into_iter()
                .map(|(product_id, stock, name)| CentralStockEntry {
                    product_id,
                    stock,
                    name,
                })
                .collect(),
            total,
        })
    }

    async fn find_store(&mut self, store_id: Uuid) -> AppResult<Option<Store>> {
        sqlx::query_as::<_, StoreRow>(
            "SELECT id, name, address, store_type FROM stores WHERE id = $1",
        )
        .bind(store_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(Store::try_from)
        .transpose()
    }

    async fn stores_by_type(&mut self, store_type: StoreType) -> AppResult<Vec<Store>> {
        let rows = sqlx::query_as::<_, StoreRow>(
            "SELECT id, name, address, store_type FROM stores WHERE store_type = $1 ORDER BY id",
        )
        .bind(store_type.as_str())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(Store::try_from).collect()
    }

    async fn find_product(&mut self, product_id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, description, category FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_request(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<ReplenishmentRequest> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            INSERT INTO replenishment_requests (store_id, product_id, quantity, status)
            VALUES ($1, $2, $3, 'PENDING')
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(store_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        row.try_into()
    }

    async fn find_request(&mut self, request_id: Uuid) -> AppResult<Option<ReplenishmentRequest>> {
        sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM replenishment_requests WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(ReplenishmentRequest::try_from)
        .transpose()
    }

    async fn lock_request(&mut self, request_id: Uuid) -> AppResult<Option<ReplenishmentRequest>> {
        sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM replenishment_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(request_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(ReplenishmentRequest::try_from)
        .transpose()
    }

    async fn approve_request(
        &mut self,
        request_id: Uuid,
        source_store_id: Uuid,
    ) -> AppResult<Option<ReplenishmentRequest>> {
        sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            UPDATE replenishment_requests
            SET status = 'APPROVED', approved_at = NOW(), source_store_id = $2
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(source_store_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(ReplenishmentRequest::try_from)
        .transpose()
    }

    async fn list_requests(
        &mut self,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<ReplenishmentRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM replenishment_requests
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&mut *self.tx)
        .await?;

        to_requests(rows)
    }

    async fn insert_sale(&mut self, sale: &NewSale) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            INSERT INTO sales (date, store_id)
            VALUES ($1, $2)
            RETURNING id, date, store_id
            "#,
        )
        .bind(sale.date)
        .bind(sale.store_id)
        .fetch_one(&mut *self.tx)
        .await?;

        let mut sale_items = Vec::with_capacity(sale.items.len());
        for item in &sale.items {
            let item_row = sqlx::query_as::<_, SaleItemRow>(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, sale_id, product_id, quantity, unit_price
                "#,
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .fetch_one(&mut *self.tx)
            .await?;
            sale_items.push(item_row.into());
        }

        Ok(Sale {
            id: row.id,
            date: row.date,
            store_id: row.store_id,
            sale_items,
        })
    }

    async fn find_sale(&mut self, sale_id: Uuid) -> AppResult<Option<Sale>> {
        let Some(row) = sqlx::query_as::<_, SaleRow>(
            "SELECT id, date, store_id FROM sales WHERE id = $1",
        )
        .bind(sale_id)
        .fetch_optional(&mut *self.tx)
        .await?
        else {
            return Ok(None);
        };

        let mut items = self.items_for_sales(&[row.id]).await?;
        Ok(Some(Sale {
            id: row.id,
            date: row.date,
            store_id: row.store_id,
            sale_items: items.remove(&row.id).unwrap_or_default(),
        }))
    }

    async fn list_sales(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
    ) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, date, store_id
            FROM sales
            WHERE ($1::UUID[] IS NULL OR store_id = ANY($1))
              AND ($2::TIMESTAMPTZ IS NULL OR date >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR date <= $3)
            ORDER BY date DESC, id
            "#,
        )
        .bind(store_ids)
        .bind(window.start_date)
        .bind(window.end_date)
        .fetch_all(&mut *self.tx)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for_sales(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| Sale {
                sale_items: items.remove(&r.id).unwrap_or_default(),
                id: r.id,
                date: r.date,
                store_id: r.store_id,
            })
            .collect())
    }

    async fn delete_sale(&mut self, sale_id: Uuid) -> AppResult<bool> {
        // sale_items cascade
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn sales_by_store(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
    ) -> AppResult<Vec<StoreSalesTotal>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT s.store_id, SUM(si.quantity)::BIGINT AS total_quantity
            FROM sales s
            JOIN sale_items si ON si.sale_id = s.id
            WHERE ($1::UUID[] IS NULL OR s.store_id = ANY($1))
              AND ($2::TIMESTAMPTZ IS NULL OR s.date >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR s.date <= $3)
            GROUP BY s.store_id
            ORDER BY s.store_id
            "#,
        )
        .bind(store_ids)
        .bind(window.start_date)
        .bind(window.end_date)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(store_id, total_quantity)| StoreSalesTotal {
                store_id,
                total_quantity,
            })
            .collect())
    }

    async fn top_products(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
        limit: u32,
    ) -> AppResult<Vec<ProductSalesTotal>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT si.product_id, SUM(si.quantity)::BIGINT AS total_quantity
            FROM sales s
            JOIN sale_items si ON si.sale_id = s.id
            WHERE ($1::UUID[] IS NULL OR s.store_id = ANY($1))
              AND ($2::TIMESTAMPTZ IS NULL OR s.date >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR s.date <= $3)
            GROUP BY si.product_id
            ORDER BY total_quantity DESC, si.product_id
            LIMIT $4
            "#,
        )
        .bind(store_ids)
        .bind(window.start_date)
        .bind(window.end_date)
        .bind(i64::from(limit))
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, total_quantity)| ProductSalesTotal {
                product_id,
                total_quantity,
            })
            .collect())
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
