// ==========================================
// 校餐配送排期系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("日期解析失败 (field={field}): {value}")]
    DateParseError { field: String, value: String },
}

/// 仓储层结果类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// ==========================================
// rusqlite 错误转换
// ==========================================
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, Some(msg))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RepositoryError::UniqueConstraintViolation(msg.clone())
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::DatabaseQueryError(
                "查询未返回任何行".to_string(),
            ),
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}
