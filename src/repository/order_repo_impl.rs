// ==========================================
// Tiffin 配送订单后台 - 订单仓储 SQLite 实现
// ==========================================
// 对齐: db.rs orders 表
// 约束: 所有查询参数化；order_date 列在待复核时存原文
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::types::{OrderSource, PaymentMode, PaymentStatus};
use crate::domain::{Order, OrderDate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::order_repo::{BulkUpsertOutcome, OrderRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// orders 表的列清单（SELECT 口径，与 row_to_order 的下标一一对应）
const ORDER_COLUMNS: &str = r#"
    order_id, order_date, date_needs_review, original_date_string,
    delivery_address, quantity, unit_price, total_amount,
    mode, payment_status, payment_mode,
    billing_month, billing_year, source, price_override,
    created_at, updated_at
"#;

// ==========================================
// OrderRepositoryImpl
// ==========================================
pub struct OrderRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepositoryImpl {
    /// 创建新的仓储实例（打开连接并完成建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 单行 → Order
    fn row_to_order(row: &Row<'_>) -> rusqlite::Result<Order> {
        let stored_date: String = row.get(1)?;
        let needs_review: bool = row.get::<_, i64>(2)? != 0;
        let original: Option<String> = row.get(3)?;

        // 待复核行的 date 等于原文；正常行按 ISO 解析
        let date = if needs_review {
            OrderDate::NeedsReview(original.unwrap_or(stored_date))
        } else {
            match NaiveDate::parse_from_str(&stored_date, "%Y-%m-%d") {
                Ok(d) => OrderDate::Valid(d),
                // 库内异常数据按待复核对待，不做日期替换
                Err(_) => OrderDate::NeedsReview(stored_date),
            }
        };

        Ok(Order {
            order_id: row.get(0)?,
            date,
            delivery_address: row.get(4)?,
            quantity: row.get::<_, i64>(5)? as u32,
            unit_price: row.get(6)?,
            total_amount: row.get(7)?,
            mode: row.get(8)?,
            payment_status: PaymentStatus::parse(&row.get::<_, String>(9)?)
                .unwrap_or(PaymentStatus::Pending),
            payment_mode: row
                .get::<_, Option<String>>(10)?
                .and_then(|s| PaymentMode::parse(&s)),
            billing_month: row.get::<_, Option<i64>>(11)?.map(|m| m as u32),
            billing_year: row.get::<_, Option<i64>>(12)?.map(|y| y as i32),
            source: OrderSource::parse(&row.get::<_, String>(13)?).unwrap_or(OrderSource::Manual),
            price_override: row.get::<_, i64>(14)? != 0,
            created_at: parse_utc(&row.get::<_, String>(15)?),
            updated_at: parse_utc(&row.get::<_, String>(16)?),
        })
    }

    /// Order → 绑定参数（INSERT/UPSERT 共用）
    fn bind_order(order: &Order) -> [Box<dyn rusqlite::ToSql>; 17] {
        let (needs_review, original): (bool, Option<String>) = match &order.date {
            OrderDate::Valid(_) => (false, None),
            OrderDate::NeedsReview(raw) => (true, Some(raw.clone())),
        };
        [
            Box::new(order.order_id.clone()),
            Box::new(order.date.storage_value()),
            Box::new(needs_review as i64),
            Box::new(original),
            Box::new(order.delivery_address.clone()),
            Box::new(order.quantity as i64),
            Box::new(order.unit_price),
            Box::new(order.total_amount),
            Box::new(order.mode.clone()),
            Box::new(order.payment_status.as_str()),
            Box::new(order.payment_mode.map(|m| m.as_str())),
            Box::new(order.billing_month.map(|m| m as i64)),
            Box::new(order.billing_year.map(|y| y as i64)),
            Box::new(order.source.as_str()),
            Box::new(order.price_override as i64),
            Box::new(order.created_at.to_rfc3339()),
            Box::new(order.updated_at.to_rfc3339()),
        ]
    }
}

fn parse_utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

const INSERT_SQL: &str = r#"
    INSERT INTO orders (
        order_id, order_date, date_needs_review, original_date_string,
        delivery_address, quantity, unit_price, total_amount,
        mode, payment_status, payment_mode,
        billing_month, billing_year, source, price_override,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO orders (
        order_id, order_date, date_needs_review, original_date_string,
        delivery_address, quantity, unit_price, total_amount,
        mode, payment_status, payment_mode,
        billing_month, billing_year, source, price_override,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
    ON CONFLICT(order_id) DO UPDATE SET
        order_date = excluded.order_date,
        date_needs_review = excluded.date_needs_review,
        original_date_string = excluded.original_date_string,
        delivery_address = excluded.delivery_address,
        quantity = excluded.quantity,
        unit_price = excluded.unit_price,
        total_amount = excluded.total_amount,
        mode = excluded.mode,
        payment_status = excluded.payment_status,
        payment_mode = excluded.payment_mode,
        billing_month = excluded.billing_month,
        billing_year = excluded.billing_year,
        source = excluded.source,
        price_override = excluded.price_override,
        updated_at = excluded.updated_at
"#;

#[async_trait]
impl OrderRepository for OrderRepositoryImpl {
    async fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM orders", ORDER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], Self::row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    async fn find_by_order_id(&self, order_id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM orders WHERE order_id = ?1", ORDER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![order_id], Self::row_to_order)?;
        match rows.next() {
            Some(order) => Ok(Some(order?)),
            None => Ok(None),
        }
    }

    async fn exists_order_id(&self, order_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE order_id = ?1",
            params![order_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn existing_order_ids(&self) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT order_id FROM orders")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    async fn create(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let bound = Self::bind_order(order);
        let refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        conn.execute(INSERT_SQL, refs.as_slice())?;
        Ok(())
    }

    async fn update(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let bound = Self::bind_order(order);
        let refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        let changed = conn.execute(
            r#"
            UPDATE orders SET
                order_date = ?2, date_needs_review = ?3, original_date_string = ?4,
                delivery_address = ?5, quantity = ?6, unit_price = ?7, total_amount = ?8,
                mode = ?9, payment_status = ?10, payment_mode = ?11,
                billing_month = ?12, billing_year = ?13, source = ?14, price_override = ?15,
                created_at = ?16, updated_at = ?17
            WHERE order_id = ?1
            "#,
            refs.as_slice(),
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order.order_id.clone(),
            });
        }
        Ok(())
    }

    async fn delete_by_order_id(&self, order_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM orders WHERE order_id = ?1", params![order_id])?;
        Ok(deleted > 0)
    }

    async fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM orders", [])?;
        Ok(deleted)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// 批量 upsert（无序批次语义）
    ///
    /// # 说明
    /// - 整批在一个事务内提交以保证吞吐，但单条失败只记入 failures，
    ///   不回滚、不中断其余记录（1 条坏记录不能损失其余 999 条）
    async fn bulk_upsert(&self, orders: &[Order]) -> RepositoryResult<BulkUpsertOutcome> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut written = 0usize;
        let mut failures = Vec::new();
        {
            let mut stmt = tx.prepare(UPSERT_SQL)?;
            for order in orders {
                let bound = Self::bind_order(order);
                let refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
                match stmt.execute(refs.as_slice()) {
                    Ok(_) => written += 1,
                    Err(e) => failures.push((order.order_id.clone(), e.to_string())),
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(BulkUpsertOutcome { written, failures })
    }
}
