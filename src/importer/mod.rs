// ==========================================
// 校餐配送排期系统 - 导入层
// ==========================================
// 职责: 外部数据导入, 生成内部数据
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod holiday_importer;

// 重导出核心类型
pub use error::ImportError;
pub use holiday_importer::{HolidayImporter, HolidayImporterImpl, ImportSummary};
