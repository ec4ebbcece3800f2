// ==========================================
// 校餐配送排期系统 - 引擎层
// ==========================================
// 职责: 实现排期业务规则, 不拼 SQL
// 红线: 纯计算引擎确定无副作用; 所有冲突必须输出原因
// ==========================================

pub mod calendar;
pub mod conflict;
pub mod events;
pub mod interaction;
pub mod merge;
pub mod ports;
pub mod recurrence;
pub mod session;
pub mod statistics;

// 重导出核心引擎
pub use conflict::ConflictDetector;
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, ScheduleEvent, ScheduleEventPublisher,
    ScheduleEventType,
};
pub use interaction::{
    EditTarget, EditorState, GestureOutcome, InteractionController, InteractionState,
};
pub use merge::{MergeInput, ScheduleMerger};
pub use ports::{BoundaryError, HolidaySource, OverrideStore};
pub use recurrence::RecurrenceEngine;
pub use session::{MonthView, ScheduleSession, SessionError, SessionOptions};
pub use statistics::StatisticsAggregator;
