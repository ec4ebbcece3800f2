// ==========================================
// 校餐配送排期系统 - 冲突检测引擎
// ==========================================
// 职责: 候选/覆写日期的节假日与同日重复检测
// 输入: 日期列表(含重数) + 节假日列表
// 输出: 日期 -> 冲突描述列表
// 红线: 检测只产出标记与原因, 不修改排期
// ==========================================

use crate::domain::delivery::ConflictInfo;
use crate::domain::holiday::Holiday;
use crate::engine::calendar;
use chrono::NaiveDate;
use std::collections::HashMap;

// ==========================================
// ConflictDetector - 冲突检测器
// ==========================================

/// 冲突检测器
///
/// 无内部状态; 节假日命中携带名称, 同日重复在重复各方都打标
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    /// 节假日冲突是否附带替代日期建议
    suggest_alternative: bool,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self {
            suggest_alternative: true,
        }
    }
}

impl ConflictDetector {
    pub fn new(suggest_alternative: bool) -> Self {
        Self {
            suggest_alternative,
        }
    }

    /// 检测冲突
    ///
    /// # 参数
    /// - dates: 实例日期列表 (同一日期出现多次即构成重复)
    /// - holidays: 当月节假日
    ///
    /// # 返回
    /// 日期 -> 有序冲突列表; 无冲突的日期不在映射中
    pub fn detect(
        &self,
        dates: &[NaiveDate],
        holidays: &[Holiday],
    ) -> HashMap<NaiveDate, Vec<ConflictInfo>> {
        let mut conflicts: HashMap<NaiveDate, Vec<ConflictInfo>> = HashMap::new();

        // 节假日命中
        let holiday_by_date: HashMap<NaiveDate, &Holiday> =
            holidays.iter().map(|h| (h.date, h)).collect();
        for date in dates {
            if let Some(holiday) = holiday_by_date.get(date) {
                let entry = conflicts.entry(*date).or_default();
                // 同一日期只打一次节假日标记
                if !entry.iter().any(|c| c.holiday_name.is_some()) {
                    let alternative = self
                        .suggest_alternative
                        .then(|| calendar::alternative_date(*date));
                    entry.push(ConflictInfo::holiday(holiday.name.clone(), alternative));
                }
            }
        }

        // 同日重复
        let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
        for date in dates {
            *counts.entry(*date).or_insert(0) += 1;
        }
        for (date, count) in counts {
            if count > 1 {
                conflicts
                    .entry(date)
                    .or_default()
                    .push(ConflictInfo::duplicate(date));
            }
        }

        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ConflictKind;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_holiday_conflict_carries_name() {
        let detector = ConflictDetector::default();
        let holidays = vec![Holiday::new(d(2024, 1, 1), "Confraternização Universal")];
        let dates = vec![d(2024, 1, 1), d(2024, 1, 3)];

        let conflicts = detector.detect(&dates, &holidays);
        let on_first = &conflicts[&d(2024, 1, 1)];
        assert_eq!(on_first.len(), 1);
        assert_eq!(on_first[0].kind, ConflictKind::Holiday);
        assert_eq!(
            on_first[0].holiday_name.as_deref(),
            Some("Confraternização Universal")
        );
        assert!(!conflicts.contains_key(&d(2024, 1, 3)));
    }

    #[test]
    fn test_duplicate_dates_flagged() {
        let detector = ConflictDetector::default();
        let dates = vec![d(2024, 1, 10), d(2024, 1, 10), d(2024, 1, 12)];

        let conflicts = detector.detect(&dates, &[]);
        assert_eq!(conflicts[&d(2024, 1, 10)][0].kind, ConflictKind::Duplicate);
        assert!(!conflicts.contains_key(&d(2024, 1, 12)));
    }

    #[test]
    fn test_alternative_suggestion_toggle() {
        let holidays = vec![Holiday::new(d(2024, 1, 25), "Aniversário de São Paulo")];
        let dates = vec![d(2024, 1, 25)];

        let with = ConflictDetector::new(true).detect(&dates, &holidays);
        assert_eq!(
            with[&d(2024, 1, 25)][0].alternative_date,
            Some(d(2024, 1, 24))
        );

        let without = ConflictDetector::new(false).detect(&dates, &holidays);
        assert_eq!(without[&d(2024, 1, 25)][0].alternative_date, None);
    }

    #[test]
    fn test_empty_input_no_conflicts() {
        let detector = ConflictDetector::default();
        assert!(detector.detect(&[], &[]).is_empty());
    }
}
