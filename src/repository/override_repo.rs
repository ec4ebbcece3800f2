// ==========================================
// 校餐配送排期系统 - 配送覆写数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================
// 表: delivery_override
//   id INTEGER PRIMARY KEY AUTOINCREMENT
//   grouping_id TEXT / delivery_date TEXT(YYYY-MM-DD)
//   deleted INTEGER(0/1) / note TEXT
// 墓碑 (deleted=1) 压制同日期的生成实例
// ==========================================

use crate::domain::override_record::OverrideRecord;
use crate::engine::ports::{BoundaryError, OverrideStore};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// DeliveryOverrideRepository - 覆写仓储
// ==========================================

/// 配送覆写仓储
/// 职责: 管理 delivery_override 表的 CRUD 操作
pub struct DeliveryOverrideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DeliveryOverrideRepository {
    /// 创建新的覆写仓储实例
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, bool, Option<String>)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get::<_, i64>(3)? != 0,
            row.get(4)?,
        ))
    }

    fn to_record(
        raw: (i64, String, String, bool, Option<String>),
    ) -> RepositoryResult<OverrideRecord> {
        let (id, grouping_id, date_str, deleted, note) = raw;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FMT).map_err(|_| {
            RepositoryError::DateParseError {
                field: "delivery_date".to_string(),
                value: date_str,
            }
        })?;
        Ok(OverrideRecord {
            id: Some(id),
            grouping_id,
            date,
            deleted,
            note,
        })
    }

    /// 按聚合组与月份查询全部覆写记录 (含墓碑, 按日期升序)
    pub fn find_by_grouping_month(
        &self,
        grouping_id: &str,
        year: i32,
        month: u32,
    ) -> RepositoryResult<Vec<OverrideRecord>> {
        let conn = self.get_conn()?;
        let prefix = format!("{:04}-{:02}-%", year, month);

        let mut stmt = conn.prepare(
            r#"
            SELECT id, grouping_id, delivery_date, deleted, note
            FROM delivery_override
            WHERE grouping_id = ?1 AND delivery_date LIKE ?2
            ORDER BY delivery_date ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![grouping_id, prefix], Self::map_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(Self::to_record(row?)?);
        }
        Ok(records)
    }

    /// 按ID查询单条覆写记录
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<OverrideRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT id, grouping_id, delivery_date, deleted, note
                FROM delivery_override
                WHERE id = ?1
                "#,
                params![id],
                Self::map_row,
            )
            .optional()?;

        raw.map(Self::to_record).transpose()
    }

    /// 插入覆写记录, 返回落库后的记录 (携带 rowid)
    pub fn insert(
        &self,
        grouping_id: &str,
        date: NaiveDate,
        deleted: bool,
        note: Option<&str>,
    ) -> RepositoryResult<OverrideRecord> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO delivery_override (grouping_id, delivery_date, deleted, note)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                grouping_id,
                date.format(DATE_FMT).to_string(),
                deleted as i64,
                note
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(OverrideRecord {
            id: Some(id),
            grouping_id: grouping_id.to_string(),
            date,
            deleted,
            note: note.map(|s| s.to_string()),
        })
    }

    /// 更新覆写日期/备注 (移动 = 单记录改日期)
    pub fn update_date(
        &self,
        id: i64,
        new_date: NaiveDate,
        note: Option<&str>,
    ) -> RepositoryResult<OverrideRecord> {
        let changed = {
            let conn = self.get_conn()?;
            conn.execute(
                r#"
                UPDATE delivery_override
                SET delivery_date = ?2,
                    note = COALESCE(?3, note)
                WHERE id = ?1
                "#,
                params![id, new_date.format(DATE_FMT).to_string(), note],
            )?
        };
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "delivery_override".to_string(),
                id: id.to_string(),
            });
        }
        self.find_by_id(id)?.ok_or(RepositoryError::NotFound {
            entity: "delivery_override".to_string(),
            id: id.to_string(),
        })
    }

    /// 物理删除覆写记录
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM delivery_override WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "delivery_override".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// SqliteOverrideStore - 覆写存储适配器
// ==========================================

/// 覆写存储适配器: 以覆写仓储实现引擎边界 trait
pub struct SqliteOverrideStore {
    repo: Arc<DeliveryOverrideRepository>,
}

impl SqliteOverrideStore {
    pub fn new(repo: Arc<DeliveryOverrideRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl OverrideStore for SqliteOverrideStore {
    async fn list(
        &self,
        grouping_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<OverrideRecord>, BoundaryError> {
        Ok(self.repo.find_by_grouping_month(grouping_id, year, month)?)
    }

    async fn add(
        &self,
        grouping_id: &str,
        date: NaiveDate,
        deleted: bool,
        note: Option<String>,
    ) -> Result<OverrideRecord, BoundaryError> {
        Ok(self.repo.insert(grouping_id, date, deleted, note.as_deref())?)
    }

    async fn update(
        &self,
        id: i64,
        new_date: NaiveDate,
        note: Option<String>,
    ) -> Result<OverrideRecord, BoundaryError> {
        Ok(self.repo.update_date(id, new_date, note.as_deref())?)
    }

    async fn remove(&self, id: i64) -> Result<(), BoundaryError> {
        Ok(self.repo.delete(id)?)
    }
}
