// ==========================================
// 校餐配送排期系统 - 统计归约引擎
// ==========================================
// 职责: 合并后的实例列表 -> 状态计数与合计
// 红线: 纯归约, 无副作用; 空输入得全零
// ==========================================

use crate::domain::delivery::{DeliveryInstance, ScheduleStatistics};
use crate::domain::types::DeliveryStatus;

/// 统计归约器
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 归约
    ///
    /// # 参数
    /// - instances: 合并后的月度实例列表
    /// - holiday_count: 当月节假日数 (展示用, 随统计一并下发)
    pub fn summarize(
        &self,
        instances: &[DeliveryInstance],
        holiday_count: usize,
    ) -> ScheduleStatistics {
        let mut stats = ScheduleStatistics {
            total_deliveries: instances.len(),
            holiday_count,
            ..ScheduleStatistics::default()
        };

        for instance in instances {
            match instance.status {
                DeliveryStatus::Scheduled => stats.scheduled_count += 1,
                DeliveryStatus::Conflict => stats.conflict_count += 1,
                DeliveryStatus::Pending => stats.pending_count += 1,
            }
            stats.total_schools += u64::from(instance.school_count);
            stats.total_products += u64::from(instance.product_count);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delivery::GroupingContext;
    use crate::domain::types::PatternType;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_input_all_zero() {
        let stats = StatisticsAggregator::new().summarize(&[], 0);
        assert_eq!(stats, ScheduleStatistics::default());
    }

    #[test]
    fn test_counts_by_status_and_totals() {
        let ctx = GroupingContext::new("grp-1", 10, 3);
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();

        let mut scheduled = DeliveryInstance::generated(d(3), PatternType::Weekly, &ctx);
        scheduled.status = DeliveryStatus::Scheduled;
        let mut conflict = DeliveryInstance::generated(d(1), PatternType::Weekly, &ctx);
        conflict.status = DeliveryStatus::Conflict;
        let pending = DeliveryInstance::pending_addition(d(9), PatternType::Weekly, &ctx, None);

        let stats =
            StatisticsAggregator::new().summarize(&[conflict, scheduled, pending], 2);
        assert_eq!(stats.total_deliveries, 3);
        assert_eq!(stats.scheduled_count, 1);
        assert_eq!(stats.conflict_count, 1);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.total_schools, 30);
        assert_eq!(stats.total_products, 9);
        assert_eq!(stats.holiday_count, 2);
    }
}
