// ==========================================
// Tiffin 配送订单后台 - 配置管理器
// ==========================================
// 职责: 运营配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 运营默认单价（未配置时的兜底值）
pub const DEFAULT_UNIT_PRICE_FALLBACK: f64 = 0.0;

/// 配置键: 默认单价（priceOverride 派生的比较基准）
pub const KEY_DEFAULT_UNIT_PRICE: &str = "default_unit_price";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（scope_id='global'，upsert）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 运营默认单价
    ///
    /// # 用途
    /// 写入订单时比较 unit_price 与默认价，派生 price_override 标志
    pub fn get_default_unit_price(&self) -> Result<f64, Box<dyn Error>> {
        let raw = self.get_config_value(KEY_DEFAULT_UNIT_PRICE)?;
        Ok(raw
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_UNIT_PRICE_FALLBACK))
    }

    /// 设置运营默认单价
    pub fn set_default_unit_price(&self, price: f64) -> Result<(), Box<dyn Error>> {
        self.set_config_value(KEY_DEFAULT_UNIT_PRICE, &price.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::NamedTempFile, ConfigManager) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(file.path().to_str().unwrap()).unwrap();
        (file, manager)
    }

    #[test]
    fn test_default_unit_price_fallback() {
        let (_file, manager) = temp_config();
        assert_eq!(manager.get_default_unit_price().unwrap(), 0.0);
    }

    #[test]
    fn test_set_and_get_default_unit_price() {
        let (_file, manager) = temp_config();
        manager.set_default_unit_price(120.0).unwrap();
        assert_eq!(manager.get_default_unit_price().unwrap(), 120.0);

        // 覆写生效
        manager.set_default_unit_price(150.0).unwrap();
        assert_eq!(manager.get_default_unit_price().unwrap(), 150.0);
    }
}
