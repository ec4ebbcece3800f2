// ==========================================
// 校餐配送排期系统 - 引擎层外部边界 Trait
// ==========================================
// 职责: 定义节假日来源与覆写存储接口 (不含实现)
// 说明: Engine 层定义 trait, Repository 层实现适配器,
//       遵循依赖倒置, Engine 不依赖具体存储
// ==========================================

use crate::domain::holiday::Holiday;
use crate::domain::override_record::OverrideRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;

/// 边界调用错误: 具体原因由适配器给出
pub type BoundaryError = Box<dyn Error + Send + Sync>;

// ==========================================
// HolidaySource Trait - 节假日来源
// ==========================================
// 用途: 按日期范围查询节假日
// 实现者: SqliteHolidaySource (repository 层)
#[async_trait]
pub trait HolidaySource: Send + Sync {
    /// 查询日期范围内的节假日 (闭区间, 升序)
    ///
    /// # 返回
    /// - Ok(Vec<Holiday>): 范围内节假日
    /// - Err: 来源故障; 调用方按空列表降级, 不得中断排期生成
    async fn fetch_holidays(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<Holiday>, BoundaryError>;
}

// ==========================================
// OverrideStore Trait - 覆写存储
// ==========================================
// 用途: 人工覆写记录的增删改查
// 实现者: SqliteOverrideStore (repository 层)
// 约束: 同 (聚合组, 日期) 的变更由调用方串行化
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// 列出聚合组在目标月份的全部覆写记录 (含墓碑)
    async fn list(
        &self,
        grouping_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<OverrideRecord>, BoundaryError>;

    /// 新增覆写 (人工新增或墓碑)
    ///
    /// # 返回
    /// 落库后的记录 (携带持久化ID)
    async fn add(
        &self,
        grouping_id: &str,
        date: NaiveDate,
        deleted: bool,
        note: Option<String>,
    ) -> Result<OverrideRecord, BoundaryError>;

    /// 更新覆写日期/备注 (移动 = 单记录改日期)
    async fn update(
        &self,
        id: i64,
        new_date: NaiveDate,
        note: Option<String>,
    ) -> Result<OverrideRecord, BoundaryError>;

    /// 物理删除覆写记录 (删除墓碑即恢复生成实例)
    async fn remove(&self, id: i64) -> Result<(), BoundaryError>;
}
