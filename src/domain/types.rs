// ==========================================
// 校餐配送排期系统 - 领域类型定义
// ==========================================
// 职责: 周期规则与配送实例的枚举类型
// 序列化格式: camelCase (与前端 JSON 契约一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 周期类型 (Pattern Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// 每周配送
    Weekly,
    /// 双周配送 (quinzena)
    Biweekly,
    /// 每月配送
    Monthly,
}

impl PatternType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            PatternType::Weekly => "weekly",
            PatternType::Biweekly => "biweekly",
            PatternType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 双周变体 (Quinzena Variant)
// ==========================================
// 仅在 PatternType::Biweekly 时有意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuinzenaVariant {
    /// 上半月 (1~15日)
    FirstHalf,
    /// 下半月 (16日~月末)
    SecondHalf,
    /// 奇数周 (自1日起按7天滚动窗口计周)
    OddWeeks,
    /// 偶数周
    EvenWeeks,
    /// 月末最后7天窗口
    LastWeek,
}

impl QuinzenaVariant {
    pub fn as_str(&self) -> &str {
        match self {
            QuinzenaVariant::FirstHalf => "firstHalf",
            QuinzenaVariant::SecondHalf => "secondHalf",
            QuinzenaVariant::OddWeeks => "oddWeeks",
            QuinzenaVariant::EvenWeeks => "evenWeeks",
            QuinzenaVariant::LastWeek => "lastWeek",
        }
    }
}

impl fmt::Display for QuinzenaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 每月变体 (Monthly Variant)
// ==========================================
// 仅在 PatternType::Monthly 时有意义
// 语义: 各配送星期在当月的首次/末次出现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyVariant {
    /// 首次出现
    First,
    /// 末次出现
    Last,
    /// 首末均配送 (仅一次出现时合并)
    FirstAndLast,
}

impl MonthlyVariant {
    pub fn as_str(&self) -> &str {
        match self {
            MonthlyVariant::First => "first",
            MonthlyVariant::Last => "last",
            MonthlyVariant::FirstAndLast => "firstAndLast",
        }
    }
}

impl fmt::Display for MonthlyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 配送状态 (Delivery Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// 已排定
    Scheduled,
    /// 存在冲突 (节假日/同日重复)
    Conflict,
    /// 待确认 (由调用方显式标记, 引擎不主动计算)
    Pending,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::Scheduled => "scheduled",
            DeliveryStatus::Conflict => "conflict",
            DeliveryStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 实例来源 (Delivery Origin)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOrigin {
    /// 由周期规则生成 (每次换月重算, 不跨月缓存)
    Generated,
    /// 人工覆写 (已持久化, 携带覆写记录ID)
    Override,
}

impl DeliveryOrigin {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryOrigin::Generated => "generated",
            DeliveryOrigin::Override => "override",
        }
    }
}

impl fmt::Display for DeliveryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 冲突类别 (Conflict Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// 节假日重叠
    Holiday,
    /// 同聚合组同日重复
    Duplicate,
}

impl ConflictKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConflictKind::Holiday => "holiday",
            ConflictKind::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_type_json_shape() {
        let json = serde_json::to_string(&PatternType::Biweekly).unwrap();
        assert_eq!(json, "\"biweekly\"");
    }

    #[test]
    fn test_quinzena_variant_camel_case() {
        let v: QuinzenaVariant = serde_json::from_str("\"firstHalf\"").unwrap();
        assert_eq!(v, QuinzenaVariant::FirstHalf);
        assert_eq!(
            serde_json::to_string(&QuinzenaVariant::OddWeeks).unwrap(),
            "\"oddWeeks\""
        );
    }

    #[test]
    fn test_monthly_variant_round_trip() {
        let v: MonthlyVariant = serde_json::from_str("\"firstAndLast\"").unwrap();
        assert_eq!(v.as_str(), "firstAndLast");
    }
}
