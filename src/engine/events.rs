// ==========================================
// 校餐配送排期系统 - 引擎层事件发布
// ==========================================
// 职责: 定义排期事件发布 trait, 实现依赖倒置
// 说明: Engine 层定义 trait, 外层 (汇总看板/通知) 实现适配器
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 排期事件类型
// ==========================================

/// 排期事件触发类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEventType {
    /// 月视图重新生成
    ScheduleRegenerated,
    /// 覆写已落库 (新增/移动/编辑)
    OverrideApplied,
    /// 覆写已移除
    OverrideRemoved,
    /// 节假日来源降级 (按空列表处理)
    HolidaySourceDegraded,
}

impl ScheduleEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            ScheduleEventType::ScheduleRegenerated => "ScheduleRegenerated",
            ScheduleEventType::OverrideApplied => "OverrideApplied",
            ScheduleEventType::OverrideRemoved => "OverrideRemoved",
            ScheduleEventType::HolidaySourceDegraded => "HolidaySourceDegraded",
        }
    }
}

/// 排期事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// 事件ID
    pub event_id: Uuid,
    /// 所属聚合组
    pub grouping_id: String,
    /// 事件类型
    pub event_type: ScheduleEventType,
    /// 目标月份 (年, 月)
    pub month: (i32, u32),
    /// 涉及日期 (覆写事件携带)
    pub date: Option<NaiveDate>,
}

impl ScheduleEvent {
    pub fn new(
        grouping_id: impl Into<String>,
        event_type: ScheduleEventType,
        year: i32,
        month: u32,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            grouping_id: grouping_id.into(),
            event_type,
            month: (year, month),
            date,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 排期事件发布者 Trait
///
/// Engine 层定义, 外层实现; 发布失败不影响排期计算
pub trait ScheduleEventPublisher: Send + Sync {
    /// 发布排期事件
    fn publish(&self, event: ScheduleEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景 (如单元测试)
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ScheduleEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ScheduleEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - grouping_id={}, event_type={}",
            event.grouping_id,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn ScheduleEventPublisher>> 的使用
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn ScheduleEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn ScheduleEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例 (不发布事件)
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件 (如果有发布者); 失败仅记日志
    pub fn publish(&self, event: ScheduleEvent) {
        if let Some(publisher) = &self.inner {
            if let Err(e) = publisher.publish(event) {
                tracing::warn!("排期事件发布失败: {}", e);
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
