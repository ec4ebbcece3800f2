// ==========================================
// 校餐配送排期系统 - 周期求值引擎
// ==========================================
// 职责: 周期规则 + 目标月份 -> 有序候选日期集
// 输入: PeriodicityRule, 年, 月
// 输出: 升序日期列表, 全部落在当月之内
// 红线: 求值确定无副作用; 非法规则显式报错
// ==========================================

use crate::domain::rule::{PeriodicityRule, RuleError};
use crate::domain::types::{MonthlyVariant, PatternType, QuinzenaVariant};
use crate::engine::calendar;
use chrono::{Datelike, NaiveDate};

// ==========================================
// RecurrenceEngine - 周期求值引擎
// ==========================================

/// 周期求值引擎
///
/// 无内部状态, 可跨聚合组并发调用
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceEngine;

impl RecurrenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// 求值: 规则在目标月份的候选配送日期 (升序)
    ///
    /// # 参数
    /// - rule: 周期规则
    /// - year: 年份
    /// - month: 月份 (1..=12)
    ///
    /// # 返回
    /// - Ok(Vec<NaiveDate>): 升序日期, 全部在 [当月首日, 当月末日]
    /// - Err(RuleError): 规则非法
    pub fn evaluate(
        &self,
        rule: &PeriodicityRule,
        year: i32,
        month: u32,
    ) -> Result<Vec<NaiveDate>, RuleError> {
        rule.validate()?;

        let dates = match rule.pattern_type {
            PatternType::Weekly => self.weekly_dates(rule, year, month),
            PatternType::Biweekly => {
                // validate() 保证变体存在
                let variant = rule
                    .quinzena_variant
                    .ok_or(RuleError::MissingQuinzenaVariant)?;
                self.biweekly_dates(rule, variant, year, month)
            }
            PatternType::Monthly => {
                let variant = rule
                    .monthly_variant
                    .ok_or(RuleError::MissingMonthlyVariant)?;
                self.monthly_dates(rule, variant, year, month)
            }
        };

        Ok(dates)
    }

    /// 每周: 当月内星期命中的全部日期
    fn weekly_dates(&self, rule: &PeriodicityRule, year: i32, month: u32) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        for day in 1..=calendar::days_in_month(year, month) {
            if let Some(date) = calendar::local_date(year, month, day) {
                if rule.weekdays.contains(&calendar::weekday_of(date)) {
                    dates.push(date);
                }
            }
        }
        dates
    }

    /// 双周: 每周集合按 quinzena 变体过滤
    fn biweekly_dates(
        &self,
        rule: &PeriodicityRule,
        variant: QuinzenaVariant,
        year: i32,
        month: u32,
    ) -> Vec<NaiveDate> {
        let last_week_start = calendar::last_week_start(year, month);

        self.weekly_dates(rule, year, month)
            .into_iter()
            .filter(|date| {
                let day = date.day();
                match variant {
                    QuinzenaVariant::FirstHalf => day <= 15,
                    QuinzenaVariant::SecondHalf => day > 15,
                    QuinzenaVariant::OddWeeks => calendar::week_index(day) % 2 == 1,
                    QuinzenaVariant::EvenWeeks => calendar::week_index(day) % 2 == 0,
                    QuinzenaVariant::LastWeek => day >= last_week_start,
                }
            })
            .collect()
    }

    /// 每月: 各配送星期取首次/末次出现
    fn monthly_dates(
        &self,
        rule: &PeriodicityRule,
        variant: MonthlyVariant,
        year: i32,
        month: u32,
    ) -> Vec<NaiveDate> {
        let mut dates = Vec::new();

        for &weekday in &rule.weekdays {
            let occurrences = calendar::nth_weekday_occurrences(year, month, weekday);
            let (first, last) = match (occurrences.first(), occurrences.last()) {
                (Some(f), Some(l)) => (*f, *l),
                _ => continue,
            };

            match variant {
                MonthlyVariant::First => dates.push(first),
                MonthlyVariant::Last => dates.push(last),
                MonthlyVariant::FirstAndLast => {
                    dates.push(first);
                    // 当月仅出现一次时合并为一条
                    if last != first {
                        dates.push(last);
                    }
                }
            }
        }

        dates.sort();
        dates.dedup();
        dates
    }
}
