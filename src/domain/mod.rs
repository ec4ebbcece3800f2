// ==========================================
// 校餐配送排期系统 - 领域层
// ==========================================
// 职责: 领域实体与类型定义, 不依赖引擎/仓储
// ==========================================

pub mod delivery;
pub mod holiday;
pub mod override_record;
pub mod rule;
pub mod types;

// 重导出领域实体
pub use delivery::{ConflictInfo, DeliveryInstance, GroupingContext, ScheduleStatistics};
pub use holiday::Holiday;
pub use override_record::OverrideRecord;
pub use rule::{PeriodicityRule, RuleError};
pub use types::{
    ConflictKind, DeliveryOrigin, DeliveryStatus, MonthlyVariant, PatternType, QuinzenaVariant,
};
