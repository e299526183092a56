// ==========================================
// Tiffin 配送订单后台 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（foreign_keys / busy_timeout）
// - 集中建表语句，保证 orders.order_id 的唯一约束是标识唯一性的最终裁决者
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化订单核心所需的表结构（幂等）
///
/// # 表
/// - orders: 订单主表，order_id 为 PRIMARY KEY（唯一约束）
/// - config_kv: 运营配置（key-value + scope）
///
/// # 说明
/// - order_date 列存储 ISO 日期字符串；当 date_needs_review=1 时，
///   存储的是原始的不可解析字符串（不做任何日期替换）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            order_id             TEXT PRIMARY KEY,
            order_date           TEXT NOT NULL,
            date_needs_review    INTEGER NOT NULL DEFAULT 0,
            original_date_string TEXT,
            delivery_address     TEXT NOT NULL,
            quantity             INTEGER NOT NULL DEFAULT 1,
            unit_price           REAL NOT NULL DEFAULT 0,
            total_amount         REAL NOT NULL DEFAULT 0,
            mode                 TEXT,
            payment_status       TEXT NOT NULL,
            payment_mode         TEXT,
            billing_month        INTEGER,
            billing_year         INTEGER,
            source               TEXT NOT NULL,
            price_override       INTEGER NOT NULL DEFAULT 0,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_orders_address ON orders(delivery_address);
        CREATE INDEX IF NOT EXISTS idx_orders_billing ON orders(billing_year, billing_month);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;
    Ok(())
}

/// 打开连接并完成建表（测试与嵌入式场景的便捷入口）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
