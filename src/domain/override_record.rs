// ==========================================
// 校餐配送排期系统 - 覆写记录领域模型
// ==========================================
// 职责: 人工覆写 (新增/移动/删除) 的持久化形态
// 红线: 覆写只属于聚合组, 引擎不拥有持久状态
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OverrideRecord - 覆写记录
// ==========================================
// id=None 且 deleted=false: 尚未落库的人工新增
// deleted=true: 墓碑记录, 压制该日期的生成实例
// id=Some 且日期与原记录不同: 移动 (原日期由本记录让出)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// 持久化ID (SQLite rowid); None 表示尚未落库的新增
    pub id: Option<i64>,
    /// 所属聚合组
    pub grouping_id: String,
    /// 配送日期
    pub date: NaiveDate,
    /// 墓碑标记: 压制同日期的生成实例 (或取消既有人工新增)
    pub deleted: bool,
    /// 备注 (observações)
    pub note: Option<String>,
}

impl OverrideRecord {
    /// 构造人工新增记录 (未落库)
    pub fn addition(grouping_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            grouping_id: grouping_id.into(),
            date,
            deleted: false,
            note: None,
        }
    }

    /// 构造墓碑记录 (压制生成实例)
    pub fn tombstone(grouping_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            grouping_id: grouping_id.into(),
            date,
            deleted: true,
            note: None,
        }
    }

    /// 是否为已落库记录
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
