// ==========================================
// 校餐配送排期系统 - 周期规则领域模型
// ==========================================
// 职责: 周期规则的结构定义与合法性校验
// 红线: 非法规则必须显式报错, 禁止静默兜底
// ==========================================

use crate::domain::types::{MonthlyVariant, PatternType, QuinzenaVariant};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 星期编号下界 (1 = 周日)
pub const WEEKDAY_MIN: u32 = 1;
/// 星期编号上界 (7 = 周六)
pub const WEEKDAY_MAX: u32 = 7;

// ==========================================
// 规则定义错误
// ==========================================

/// 周期规则定义错误
///
/// 规则来自前端 JSON, 任何结构性问题在求值前一次性暴露
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("配送星期集合为空: 周期规则至少需要一个星期")]
    EmptyWeekdays,

    #[error("非法星期编号: {0} (合法范围 1=周日 .. 7=周六)")]
    InvalidWeekday(u32),

    #[error("双周规则缺少 quinzena 变体")]
    MissingQuinzenaVariant,

    #[error("每月规则缺少 monthly 变体")]
    MissingMonthlyVariant,

    #[error("变体与周期类型不匹配: patternType={pattern}, 多余变体={extra}")]
    VariantMismatch { pattern: String, extra: String },

    #[error("规则 JSON 结构非法: {0}")]
    InvalidShape(String),
}

// ==========================================
// PeriodicityRule - 周期规则
// ==========================================

/// 周期规则
///
/// 由聚合组 (agrupamento) 持有, 对引擎只读。
/// JSON 形如: `{"patternType":"biweekly","weekdays":[2,4],"quinzenaVariant":"firstHalf"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicityRule {
    /// 周期类型
    pub pattern_type: PatternType,
    /// 配送星期集合 (1=周日 .. 7=周六), 不允许为空
    pub weekdays: Vec<u32>,
    /// 双周变体 (仅 biweekly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quinzena_variant: Option<QuinzenaVariant>,
    /// 每月变体 (仅 monthly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_variant: Option<MonthlyVariant>,
}

impl PeriodicityRule {
    /// 构造每周规则
    pub fn weekly(weekdays: Vec<u32>) -> Self {
        Self {
            pattern_type: PatternType::Weekly,
            weekdays,
            quinzena_variant: None,
            monthly_variant: None,
        }
    }

    /// 构造双周规则
    pub fn biweekly(weekdays: Vec<u32>, variant: QuinzenaVariant) -> Self {
        Self {
            pattern_type: PatternType::Biweekly,
            weekdays,
            quinzena_variant: Some(variant),
            monthly_variant: None,
        }
    }

    /// 构造每月规则
    pub fn monthly(weekdays: Vec<u32>, variant: MonthlyVariant) -> Self {
        Self {
            pattern_type: PatternType::Monthly,
            weekdays,
            quinzena_variant: None,
            monthly_variant: Some(variant),
        }
    }

    /// 校验规则合法性
    ///
    /// # 返回
    /// - Ok(()): 规则合法
    /// - Err(RuleError): 首个发现的结构性问题
    ///
    /// # 不变式
    /// - weekdays 非空且全部落在 1..=7
    /// - 恰好一个变体被设置, 且与 pattern_type 匹配 (weekly 两者皆空)
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.weekdays.is_empty() {
            return Err(RuleError::EmptyWeekdays);
        }
        for &wd in &self.weekdays {
            if !(WEEKDAY_MIN..=WEEKDAY_MAX).contains(&wd) {
                return Err(RuleError::InvalidWeekday(wd));
            }
        }

        match self.pattern_type {
            PatternType::Weekly => {
                if let Some(v) = self.quinzena_variant {
                    return Err(RuleError::VariantMismatch {
                        pattern: self.pattern_type.to_string(),
                        extra: v.to_string(),
                    });
                }
                if let Some(v) = self.monthly_variant {
                    return Err(RuleError::VariantMismatch {
                        pattern: self.pattern_type.to_string(),
                        extra: v.to_string(),
                    });
                }
            }
            PatternType::Biweekly => {
                if self.quinzena_variant.is_none() {
                    return Err(RuleError::MissingQuinzenaVariant);
                }
                if let Some(v) = self.monthly_variant {
                    return Err(RuleError::VariantMismatch {
                        pattern: self.pattern_type.to_string(),
                        extra: v.to_string(),
                    });
                }
            }
            PatternType::Monthly => {
                if self.monthly_variant.is_none() {
                    return Err(RuleError::MissingMonthlyVariant);
                }
                if let Some(v) = self.quinzena_variant {
                    return Err(RuleError::VariantMismatch {
                        pattern: self.pattern_type.to_string(),
                        extra: v.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// 从 JSON 值解析并校验
    pub fn from_json(value: &serde_json::Value) -> Result<Self, RuleError> {
        let rule: PeriodicityRule = serde_json::from_value(value.clone())
            .map_err(|e| RuleError::InvalidShape(e.to_string()))?;
        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_rule_valid() {
        let rule = PeriodicityRule::weekly(vec![2, 4]);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_empty_weekdays_rejected() {
        let rule = PeriodicityRule::weekly(vec![]);
        assert_eq!(rule.validate(), Err(RuleError::EmptyWeekdays));
    }

    #[test]
    fn test_weekday_out_of_range_rejected() {
        let rule = PeriodicityRule::weekly(vec![2, 8]);
        assert_eq!(rule.validate(), Err(RuleError::InvalidWeekday(8)));
    }

    #[test]
    fn test_biweekly_requires_quinzena_variant() {
        let mut rule = PeriodicityRule::weekly(vec![2]);
        rule.pattern_type = PatternType::Biweekly;
        assert_eq!(rule.validate(), Err(RuleError::MissingQuinzenaVariant));
    }

    #[test]
    fn test_weekly_with_monthly_variant_rejected() {
        let mut rule = PeriodicityRule::weekly(vec![2]);
        rule.monthly_variant = Some(MonthlyVariant::First);
        assert!(matches!(
            rule.validate(),
            Err(RuleError::VariantMismatch { .. })
        ));
    }

    #[test]
    fn test_json_round_trip_camel_case() {
        let json = serde_json::json!({
            "patternType": "biweekly",
            "weekdays": [2, 4],
            "quinzenaVariant": "firstHalf"
        });
        let rule = PeriodicityRule::from_json(&json).unwrap();
        assert_eq!(rule.pattern_type, PatternType::Biweekly);
        assert_eq!(rule.quinzena_variant, Some(QuinzenaVariant::FirstHalf));
    }
}
