// ==========================================
// 校餐配送排期系统 - 聚合组排期会话
// ==========================================
// 职责: 单聚合组的月视图状态: 基线求值 + 节假日 + 覆写 -> 合并快照
// 红线: 合并结果是唯一事实来源; 变更成功后必须回读权威覆写列表再重算
// 红线: 换月后迟到的节假日响应必须丢弃 (序号守卫)
// ==========================================
// 会话随编辑过程存活, 结束即丢弃; 不同聚合组互不共享状态
// ==========================================

use crate::domain::delivery::{DeliveryInstance, GroupingContext, ScheduleStatistics};
use crate::domain::holiday::Holiday;
use crate::domain::override_record::OverrideRecord;
use crate::domain::rule::{PeriodicityRule, RuleError};
use crate::engine::calendar;
use crate::engine::events::{OptionalEventPublisher, ScheduleEvent, ScheduleEventType};
use crate::engine::merge::{MergeInput, ScheduleMerger};
use crate::engine::ports::{HolidaySource, OverrideStore};
use crate::engine::recurrence::RecurrenceEngine;
use crate::engine::statistics::StatisticsAggregator;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

// ==========================================
// 会话错误
// ==========================================

/// 排期会话错误
///
/// 异步边界的失败一律经由返回值传递, 不跨 await 抛出
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("节假日来源故障: {message}")]
    HolidaySource { message: String },

    #[error("覆写存储调用失败: {message}")]
    OverrideConflict { message: String },

    /// 内部信号: 迟到的响应已按序号守卫丢弃, 对用户不可见
    #[error("过期请求已丢弃: {year}-{month:02}")]
    StaleRequestDiscarded { year: i32, month: u32 },

    #[error("非法月份: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("尚未加载任何月份")]
    MonthNotLoaded,
}

// ==========================================
// MonthView - 月视图快照
// ==========================================
#[derive(Debug, Clone)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// 合并后的实例列表 (按日期升序)
    pub deliveries: Vec<DeliveryInstance>,
    /// 当月节假日
    pub holidays: Vec<Holiday>,
    /// 统计快照
    pub statistics: ScheduleStatistics,
}

/// 已加载月份的内部状态
struct MonthState {
    year: i32,
    month: u32,
    generated: Vec<NaiveDate>,
    holidays: Vec<Holiday>,
    overrides: Vec<OverrideRecord>,
    view: MonthView,
}

// ==========================================
// SessionOptions - 会话选项
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// 节假日来源故障时是否按空列表降级 (默认开)
    pub degrade_holiday_failure: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            degrade_holiday_failure: true,
        }
    }
}

// ==========================================
// ScheduleSession - 排期会话
// ==========================================

/// 聚合组排期会话
///
/// 纯计算部分同步无共享可变状态; 异步边界仅两处:
/// 节假日查询与覆写存储调用
pub struct ScheduleSession {
    session_id: Uuid,
    ctx: GroupingContext,
    rule: PeriodicityRule,
    holiday_source: Arc<dyn HolidaySource>,
    override_store: Arc<dyn OverrideStore>,
    publisher: OptionalEventPublisher,
    engine: RecurrenceEngine,
    merger: ScheduleMerger,
    aggregator: StatisticsAggregator,
    options: SessionOptions,
    /// 月份加载序号: 每次 load_month 自增, 迟到响应据此丢弃
    load_seq: AtomicU64,
    state: Mutex<Option<MonthState>>,
}

impl ScheduleSession {
    pub fn new(
        ctx: GroupingContext,
        rule: PeriodicityRule,
        holiday_source: Arc<dyn HolidaySource>,
        override_store: Arc<dyn OverrideStore>,
        merger: ScheduleMerger,
        publisher: OptionalEventPublisher,
        options: SessionOptions,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            ctx,
            rule,
            holiday_source,
            override_store,
            publisher,
            engine: RecurrenceEngine::new(),
            merger,
            aggregator: StatisticsAggregator::new(),
            options,
            load_seq: AtomicU64::new(0),
            state: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn grouping_id(&self) -> &str {
        &self.ctx.grouping_id
    }

    pub fn rule(&self) -> &PeriodicityRule {
        &self.rule
    }

    /// 当前月视图快照 (未加载时为 None)
    pub fn current_view(&self) -> Option<MonthView> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|s| s.view.clone())
    }

    /// 在缓存的覆写列表中查找某日期的非墓碑记录ID
    pub fn override_id_at(&self, date: NaiveDate) -> Option<i64> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .and_then(|s| {
                s.overrides
                    .iter()
                    .filter(|r| !r.deleted && r.date == date)
                    .filter_map(|r| r.id)
                    .max()
            })
    }

    // ==========================================
    // 月份加载
    // ==========================================

    /// 加载目标月份: 求值基线, 取节假日与覆写, 合并出月视图
    ///
    /// # 序号守卫
    /// 每次调用自增加载序号; 若本次 await 期间又发起了新的加载,
    /// 迟到的结果被丢弃 (StaleRequestDiscarded), 不会覆盖新月份
    pub async fn load_month(&self, year: i32, month: u32) -> Result<MonthView, SessionError> {
        let token = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let (first, last) = match (calendar::first_day(year, month), calendar::last_day(year, month))
        {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(SessionError::InvalidMonth { year, month }),
        };

        // 同步纯计算: 规则校验 + 基线求值
        let generated = self.engine.evaluate(&self.rule, year, month)?;

        // 异步边界 1: 节假日查询 (故障按空列表降级)
        let holidays = match self.holiday_source.fetch_holidays(first, last).await {
            Ok(list) => list,
            Err(e) if self.options.degrade_holiday_failure => {
                tracing::warn!(
                    grouping_id = %self.ctx.grouping_id,
                    "节假日来源故障, 按无节假日处理: {}",
                    e
                );
                self.publisher.publish(ScheduleEvent::new(
                    self.ctx.grouping_id.clone(),
                    ScheduleEventType::HolidaySourceDegraded,
                    year,
                    month,
                    None,
                ));
                Vec::new()
            }
            Err(e) => {
                return Err(SessionError::HolidaySource {
                    message: e.to_string(),
                })
            }
        };

        // 异步边界 2: 权威覆写列表
        let overrides = self
            .override_store
            .list(&self.ctx.grouping_id, year, month)
            .await
            .map_err(|e| SessionError::OverrideConflict {
                message: e.to_string(),
            })?;

        // 序号守卫: await 之后校验本次加载是否已被新加载取代
        if self.load_seq.load(Ordering::SeqCst) != token {
            tracing::debug!(
                grouping_id = %self.ctx.grouping_id,
                "丢弃过期的月份加载结果: {}-{:02}",
                year,
                month
            );
            return Err(SessionError::StaleRequestDiscarded { year, month });
        }

        let view = self.commit(year, month, generated, holidays, overrides);
        self.publisher.publish(ScheduleEvent::new(
            self.ctx.grouping_id.clone(),
            ScheduleEventType::ScheduleRegenerated,
            year,
            month,
            None,
        ));
        Ok(view)
    }

    /// 重算当前月份: 回读权威覆写列表后合并
    ///
    /// 变更成功后调用, 保证统计永不反映半套用的变更
    pub async fn refresh(&self) -> Result<MonthView, SessionError> {
        let (year, month, generated, holidays) = {
            let guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let state = guard.as_ref().ok_or(SessionError::MonthNotLoaded)?;
            (
                state.year,
                state.month,
                state.generated.clone(),
                state.holidays.clone(),
            )
        };
        let token = self.load_seq.load(Ordering::SeqCst);

        let overrides = self
            .override_store
            .list(&self.ctx.grouping_id, year, month)
            .await
            .map_err(|e| SessionError::OverrideConflict {
                message: e.to_string(),
            })?;

        // 刷新期间换了月份: 丢弃
        if self.load_seq.load(Ordering::SeqCst) != token {
            return Err(SessionError::StaleRequestDiscarded { year, month });
        }

        Ok(self.commit(year, month, generated, holidays, overrides))
    }

    /// 合并并提交月状态, 返回视图快照
    fn commit(
        &self,
        year: i32,
        month: u32,
        generated: Vec<NaiveDate>,
        holidays: Vec<Holiday>,
        overrides: Vec<OverrideRecord>,
    ) -> MonthView {
        let deliveries = self.merger.merge(&MergeInput {
            generated: &generated,
            overrides: &overrides,
            holidays: &holidays,
            pattern: self.rule.pattern_type,
            ctx: &self.ctx,
        });
        let statistics = self.aggregator.summarize(&deliveries, holidays.len());

        let view = MonthView {
            year,
            month,
            deliveries,
            holidays: holidays.clone(),
            statistics,
        };

        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(MonthState {
            year,
            month,
            generated,
            holidays,
            overrides,
            view: view.clone(),
        });
        view
    }

    // ==========================================
    // 覆写变更 (均为: 存储调用成功 -> 权威刷新)
    // ==========================================

    /// 人工新增配送
    pub async fn add_delivery(
        &self,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<MonthView, SessionError> {
        let record = self
            .override_store
            .add(&self.ctx.grouping_id, date, false, note)
            .await
            .map_err(|e| SessionError::OverrideConflict {
                message: e.to_string(),
            })?;
        self.publish_override(ScheduleEventType::OverrideApplied, record.date);
        self.refresh().await
    }

    /// 压制生成实例 (写墓碑)
    pub async fn suppress_date(&self, date: NaiveDate) -> Result<MonthView, SessionError> {
        self.override_store
            .add(&self.ctx.grouping_id, date, true, None)
            .await
            .map_err(|e| SessionError::OverrideConflict {
                message: e.to_string(),
            })?;
        self.publish_override(ScheduleEventType::OverrideApplied, date);
        self.refresh().await
    }

    /// 更新既有覆写 (移动/编辑)
    pub async fn update_delivery(
        &self,
        id: i64,
        new_date: NaiveDate,
        note: Option<String>,
    ) -> Result<MonthView, SessionError> {
        let record = self
            .override_store
            .update(id, new_date, note)
            .await
            .map_err(|e| SessionError::OverrideConflict {
                message: e.to_string(),
            })?;
        self.publish_override(ScheduleEventType::OverrideApplied, record.date);
        self.refresh().await
    }

    /// 物理删除覆写记录 (删除墓碑即恢复生成实例)
    pub async fn remove_override(&self, id: i64) -> Result<MonthView, SessionError> {
        self.override_store
            .remove(id)
            .await
            .map_err(|e| SessionError::OverrideConflict {
                message: e.to_string(),
            })?;
        let (year, month) = {
            let guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard
                .as_ref()
                .map(|s| (s.year, s.month))
                .unwrap_or((0, 0))
        };
        self.publisher.publish(ScheduleEvent::new(
            self.ctx.grouping_id.clone(),
            ScheduleEventType::OverrideRemoved,
            year,
            month,
            None,
        ));
        self.refresh().await
    }

    fn publish_override(&self, event_type: ScheduleEventType, date: NaiveDate) {
        let (year, month) = {
            let guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard
                .as_ref()
                .map(|s| (s.year, s.month))
                .unwrap_or((0, 0))
        };
        self.publisher.publish(ScheduleEvent::new(
            self.ctx.grouping_id.clone(),
            event_type,
            year,
            month,
            Some(date),
        ));
    }
}
