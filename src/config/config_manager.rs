// ==========================================
// 校餐配送排期系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::engine::session::SessionOptions;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键全集
// ==========================================
pub mod config_keys {
    /// 节假日冲突是否附带替代日期建议 (bool, 默认 true)
    pub const SUGGEST_ALTERNATIVE_DATE: &str = "schedule/suggest_alternative_date";
    /// 节假日来源故障时是否按空列表降级 (bool, 默认 true)
    pub const HOLIDAY_DEGRADE_TO_EMPTY: &str = "holiday/degrade_to_empty";
    /// 节假日日历地区标识 (默认 "BR")
    pub const HOLIDAY_REGION: &str = "holiday/region";
}

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
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致, 会对传入连接再次应用统一 PRAGMA (幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
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

    /// 从 config_kv 表读取配置值, 带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // 类型化读取
    // ==========================================

    /// 节假日冲突是否附带替代日期建议
    pub fn get_suggest_alternative_date(&self) -> Result<bool, Box<dyn Error>> {
        let raw =
            self.get_config_or_default(config_keys::SUGGEST_ALTERNATIVE_DATE, "true")?;
        Ok(raw.trim().eq_ignore_ascii_case("true"))
    }

    /// 节假日来源故障是否降级为空列表
    pub fn get_holiday_degrade_to_empty(&self) -> Result<bool, Box<dyn Error>> {
        let raw = self.get_config_or_default(config_keys::HOLIDAY_DEGRADE_TO_EMPTY, "true")?;
        Ok(raw.trim().eq_ignore_ascii_case("true"))
    }

    /// 节假日日历地区标识
    pub fn get_holiday_region(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::HOLIDAY_REGION, "BR")
    }

    /// 汇总为会话选项
    pub fn session_options(&self) -> Result<SessionOptions, Box<dyn Error>> {
        Ok(SessionOptions {
            degrade_holiday_failure: self.get_holiday_degrade_to_empty()?,
        })
    }
}
