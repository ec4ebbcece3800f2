// ==========================================
// 校餐配送排期系统 - 节假日数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::domain::holiday::Holiday;
use crate::engine::ports::{BoundaryError, HolidaySource};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 日期落库格式
const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// HolidayRepository - 节假日仓储
// ==========================================

/// 节假日仓储
/// 职责: 管理 holiday 表的查询与导入落库
pub struct HolidayRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HolidayRepository {
    /// 创建新的节假日仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按日期范围查询节假日 (闭区间, 升序)
    pub fn find_by_range(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> RepositoryResult<Vec<Holiday>> {
        let conn = self.get_conn()?;
        let start_str = range_start.format(DATE_FMT).to_string();
        let end_str = range_end.format(DATE_FMT).to_string();

        let mut stmt = conn.prepare(
            r#"
            SELECT holiday_date, name
            FROM holiday
            WHERE holiday_date >= ?1 AND holiday_date <= ?2
            ORDER BY holiday_date ASC
            "#,
        )?;

        let rows = stmt.query_map(params![start_str, end_str], |row| {
            let date_str: String = row.get(0)?;
            let name: String = row.get(1)?;
            Ok((date_str, name))
        })?;

        let mut holidays = Vec::new();
        for row in rows {
            let (date_str, name) = row?;
            let date = NaiveDate::parse_from_str(&date_str, DATE_FMT).map_err(|_| {
                RepositoryError::DateParseError {
                    field: "holiday_date".to_string(),
                    value: date_str.clone(),
                }
            })?;
            holidays.push(Holiday::new(date, name));
        }
        Ok(holidays)
    }

    /// 写入/更新单个节假日 (同日期覆盖名称)
    pub fn upsert(&self, holiday: &Holiday) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO holiday (holiday_date, name)
            VALUES (?1, ?2)
            ON CONFLICT(holiday_date) DO UPDATE SET name = excluded.name
            "#,
            params![holiday.date.format(DATE_FMT).to_string(), holiday.name],
        )?;
        Ok(())
    }

    /// 统计节假日总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM holiday", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ==========================================
// SqliteHolidaySource - 节假日来源适配器
// ==========================================

/// 节假日来源适配器: 以本地 holiday 表实现引擎边界 trait
pub struct SqliteHolidaySource {
    repo: Arc<HolidayRepository>,
}

impl SqliteHolidaySource {
    pub fn new(repo: Arc<HolidayRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl HolidaySource for SqliteHolidaySource {
    async fn fetch_holidays(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<Holiday>, BoundaryError> {
        let holidays = self.repo.find_by_range(range_start, range_end)?;
        Ok(holidays)
    }
}
