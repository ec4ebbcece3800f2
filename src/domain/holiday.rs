// ==========================================
// 校餐配送排期系统 - 节假日领域模型
// ==========================================
// 职责: 节假日只读参考数据
// 说明: 除 日期+名称 外无额外身份
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 节假日
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// 日期 (无时间成分)
    pub date: NaiveDate,
    /// 名称 (如 "Confraternização Universal")
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}
