// ==========================================
// 校餐配送排期系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换内层错误为用户友好的错误消息
// 红线: 所有错误信息必须包含显式原因 (可解释性)
// ==========================================

use crate::domain::rule::RuleError;
use crate::engine::session::SessionError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 规则错误: 阻断该聚合组的日历渲染 =====
    #[error("周期规则非法: {0}")]
    InvalidRule(#[from] RuleError),

    // ===== 异步边界错误 =====
    #[error("节假日来源故障: {0}")]
    HolidaySource(String),

    #[error("覆写变更失败: {0}")]
    OverrideConflict(String),

    /// 内部信号, 不面向用户展示
    #[error("过期请求已丢弃: {0}")]
    StaleRequestDiscarded(String),

    // ===== 业务规则错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ===== 基础设施错误 =====
    #[error("仓储错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("配置读取失败: {0}")]
    Config(String),
}

/// API层结果类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 会话错误转换
// ==========================================
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Rule(e) => ApiError::InvalidRule(e),
            SessionError::HolidaySource { message } => ApiError::HolidaySource(message),
            SessionError::OverrideConflict { message } => ApiError::OverrideConflict(message),
            SessionError::StaleRequestDiscarded { year, month } => {
                ApiError::StaleRequestDiscarded(format!("{}-{:02}", year, month))
            }
            SessionError::InvalidMonth { year, month } => {
                ApiError::InvalidInput(format!("非法月份: {}-{}", year, month))
            }
            SessionError::MonthNotLoaded => {
                ApiError::InvalidInput("尚未加载任何月份".to_string())
            }
        }
    }
}
