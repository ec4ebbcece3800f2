// ==========================================
// 校餐配送排期系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0} (仅支持 .xlsx/.csv)")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("日期格式错误 (行 {row}): 期望 YYYY-MM-DD, 实际 {value}")]
    DateFormatError { row: usize, value: String },

    #[error("名称缺失 (行 {0}): 节假日名称为空")]
    NameMissing(usize),

    // ===== 数据库错误 =====
    #[error("落库失败: {0}")]
    PersistError(String),
}
