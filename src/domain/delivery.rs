// ==========================================
// 校餐配送排期系统 - 配送实例领域模型
// ==========================================
// 职责: 合并后的配送实例、冲突描述与统计快照
// 红线: 实例只是月视图快照, 换月即重算, 不跨月缓存
// ==========================================

use crate::domain::types::{ConflictKind, DeliveryOrigin, DeliveryStatus, PatternType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ConflictInfo - 冲突描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    /// 冲突类别
    pub kind: ConflictKind,
    /// 给运营人员看的说明文本
    pub message: String,
    /// 节假日名称 (仅 Holiday 冲突)
    pub holiday_name: Option<String>,
    /// 建议替代日期 (前一日, 遇周日回退到周五; 可配置关闭)
    pub alternative_date: Option<NaiveDate>,
}

impl ConflictInfo {
    /// 构造节假日冲突
    pub fn holiday(name: impl Into<String>, alternative: Option<NaiveDate>) -> Self {
        let name = name.into();
        Self {
            kind: ConflictKind::Holiday,
            message: format!("节假日冲突: {} - 请确认当日是否照常配送", name),
            holiday_name: Some(name),
            alternative_date: alternative,
        }
    }

    /// 构造同日重复冲突
    pub fn duplicate(date: NaiveDate) -> Self {
        Self {
            kind: ConflictKind::Duplicate,
            message: format!("同日重复配送: {}", date),
            holiday_name: None,
            alternative_date: None,
        }
    }
}

// ==========================================
// GroupingContext - 聚合组上下文
// ==========================================
// 学校数/产品数来自外部分组界面, 引擎原样透传
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingContext {
    /// 聚合组ID (agrupamento)
    pub grouping_id: String,
    /// 覆盖学校数
    pub school_count: u32,
    /// 覆盖产品数
    pub product_count: u32,
}

impl GroupingContext {
    pub fn new(grouping_id: impl Into<String>, school_count: u32, product_count: u32) -> Self {
        Self {
            grouping_id: grouping_id.into(),
            school_count,
            product_count,
        }
    }
}

// ==========================================
// DeliveryInstance - 配送实例
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInstance {
    /// 稳定标识: 生成实例为 "gen-{日期}", 覆写实例为持久化ID的字符串
    pub id: String,
    /// 配送日期
    pub date: NaiveDate,
    /// 展示用周期类型标签 (复制自所属规则)
    pub recurrence_type_label: String,
    /// 覆盖学校数 (外部上下文提供)
    pub school_count: u32,
    /// 覆盖产品数 (外部上下文提供)
    pub product_count: u32,
    /// 状态
    pub status: DeliveryStatus,
    /// 来源
    pub origin: DeliveryOrigin,
    /// 冲突列表 (有序)
    pub conflicts: Vec<ConflictInfo>,
    /// 覆写备注 (仅 Override 来源)
    pub note: Option<String>,
}

impl DeliveryInstance {
    /// 构造生成来源实例
    pub fn generated(date: NaiveDate, pattern: PatternType, ctx: &GroupingContext) -> Self {
        Self {
            id: format!("gen-{}", date),
            date,
            recurrence_type_label: pattern.to_string(),
            school_count: ctx.school_count,
            product_count: ctx.product_count,
            status: DeliveryStatus::Scheduled,
            origin: DeliveryOrigin::Generated,
            conflicts: Vec::new(),
            note: None,
        }
    }

    /// 构造覆写来源实例
    pub fn from_override(
        record_id: i64,
        date: NaiveDate,
        pattern: PatternType,
        ctx: &GroupingContext,
        note: Option<String>,
    ) -> Self {
        Self {
            id: record_id.to_string(),
            date,
            recurrence_type_label: pattern.to_string(),
            school_count: ctx.school_count,
            product_count: ctx.product_count,
            status: DeliveryStatus::Scheduled,
            origin: DeliveryOrigin::Override,
            conflicts: Vec::new(),
            note,
        }
    }

    /// 构造未落库的人工新增实例 (待确认, 直到持久化拿到ID)
    pub fn pending_addition(
        date: NaiveDate,
        pattern: PatternType,
        ctx: &GroupingContext,
        note: Option<String>,
    ) -> Self {
        Self {
            id: format!("new-{}", date),
            date,
            recurrence_type_label: pattern.to_string(),
            school_count: ctx.school_count,
            product_count: ctx.product_count,
            status: DeliveryStatus::Pending,
            origin: DeliveryOrigin::Override,
            conflicts: Vec::new(),
            note,
        }
    }

    /// 是否存在冲突
    pub fn has_conflict(&self) -> bool {
        self.status == DeliveryStatus::Conflict
    }
}

// ==========================================
// ScheduleStatistics - 排期统计
// ==========================================
// 纯归约结果, 空输入得全零
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleStatistics {
    /// 配送总次数
    pub total_deliveries: usize,
    /// 已排定次数
    pub scheduled_count: usize,
    /// 冲突次数
    pub conflict_count: usize,
    /// 待确认次数
    pub pending_count: usize,
    /// 学校数合计 (跨实例求和)
    pub total_schools: u64,
    /// 产品数合计 (跨实例求和)
    pub total_products: u64,
    /// 当月节假日数
    pub holiday_count: usize,
}
