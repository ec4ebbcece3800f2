// ==========================================
// 校餐配送排期系统 - 节假日日历导入
// ==========================================
// 职责: 从 CSV/Excel 导入年度节假日表并落库
// 列约定: holiday_date (YYYY-MM-DD), name
// 说明: 逐行校验, 坏行计入报告, 不中断整体导入
// ==========================================

use crate::domain::holiday::Holiday;
use crate::importer::error::ImportError;
use crate::repository::holiday_repo::HolidayRepository;
use async_trait::async_trait;
use calamine::{open_workbook, Reader, Xlsx};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const DATE_FMT: &str = "%Y-%m-%d";
const COL_DATE: usize = 0;
const COL_NAME: usize = 1;

// ==========================================
// ImportSummary - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    /// 成功落库条数
    pub imported: usize,
    /// 跳过的空行数
    pub skipped: usize,
    /// 坏行错误 (行号从1计, 表头不计)
    pub row_errors: Vec<String>,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.row_errors.is_empty()
    }
}

// ==========================================
// HolidayImporter Trait
// ==========================================
// 用途: 节假日日历导入主接口
// 实现者: HolidayImporterImpl
#[async_trait]
pub trait HolidayImporter: Send + Sync {
    /// 从 CSV 文件导入节假日
    async fn import_from_csv(&self, file_path: &Path) -> Result<ImportSummary, ImportError>;

    /// 从 Excel 文件导入节假日 (.xlsx, 第一个工作表)
    async fn import_from_excel(&self, file_path: &Path) -> Result<ImportSummary, ImportError>;
}

// ==========================================
// HolidayImporterImpl - 导入实现
// ==========================================
pub struct HolidayImporterImpl {
    repo: Arc<HolidayRepository>,
}

impl HolidayImporterImpl {
    pub fn new(repo: Arc<HolidayRepository>) -> Self {
        Self { repo }
    }

    /// 校验并落库原始行, 汇总报告
    fn persist_rows(&self, rows: Vec<(usize, String, String)>) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
            row_errors: Vec::new(),
        };

        for (row_no, date_str, name) in rows {
            if date_str.is_empty() && name.is_empty() {
                summary.skipped += 1;
                continue;
            }

            let date = match NaiveDate::parse_from_str(date_str.trim(), DATE_FMT) {
                Ok(d) => d,
                Err(_) => {
                    summary.row_errors.push(
                        ImportError::DateFormatError {
                            row: row_no,
                            value: date_str,
                        }
                        .to_string(),
                    );
                    continue;
                }
            };

            let name = name.trim();
            if name.is_empty() {
                summary
                    .row_errors
                    .push(ImportError::NameMissing(row_no).to_string());
                continue;
            }

            self.repo
                .upsert(&Holiday::new(date, name))
                .map_err(|e| ImportError::PersistError(e.to_string()))?;
            summary.imported += 1;
        }

        tracing::info!(
            "节假日导入完成: 成功 {} 条, 跳过 {} 行, 坏行 {} 条",
            summary.imported,
            summary.skipped,
            summary.row_errors.len()
        );
        Ok(summary)
    }
}

#[async_trait]
impl HolidayImporter for HolidayImporterImpl {
    async fn import_from_csv(&self, file_path: &Path) -> Result<ImportSummary, ImportError> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        if file_path.extension().map(|e| e != "csv").unwrap_or(true) {
            return Err(ImportError::UnsupportedFormat(
                file_path.display().to_string(),
            ));
        }

        let file =
            File::open(file_path).map_err(|e| ImportError::FileReadError(e.to_string()))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| ImportError::CsvParseError(e.to_string()))?;
            let date = record.get(COL_DATE).unwrap_or("").trim().to_string();
            let name = record.get(COL_NAME).unwrap_or("").trim().to_string();
            rows.push((idx + 1, date, name));
        }

        self.persist_rows(rows)
    }

    async fn import_from_excel(&self, file_path: &Path) -> Result<ImportSummary, ImportError> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        if file_path.extension().map(|e| e != "xlsx").unwrap_or(true) {
            return Err(ImportError::UnsupportedFormat(
                file_path.display().to_string(),
            ));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let first_sheet = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook
            .worksheet_range(&first_sheet)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 首行视为表头, 跳过
        let mut rows = Vec::new();
        for (idx, row) in range.rows().enumerate().skip(1) {
            let date = row
                .get(COL_DATE)
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default();
            let name = row
                .get(COL_NAME)
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default();
            rows.push((idx, date, name));
        }

        self.persist_rows(rows)
    }
}
