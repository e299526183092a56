// ==========================================
// Tiffin 配送订单后台 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 口径: 第 1 行为表头，数据行号从 2 起（与用户在表格软件里看到的一致）；
//       整行空白跳过但行号不跳号
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 历史导出惯例: 全量数据通常放在名为 "all data" 的工作表
const PREFERRED_SHEET_NAME: &str = "all data";

// ==========================================
// ParsedRow - 解析产物
// ==========================================
// 保留原始文件行号，后续拒收原因必须能指回输入文件
#[derive(Debug, Clone)]
pub struct ParsedRow {
    /// 1-based 文件行号（表头为第 1 行）
    pub row_number: usize,
    /// 表头 → 单元格文本
    pub cells: HashMap<String, String>,
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    pub fn parse(&self, path: &Path) -> ImportResult<Vec<ParsedRow>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut cells = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    cells.insert(header.clone(), value.trim().to_string());
                }
            }

            // 整行空白跳过；行号按文件原始位置计算，不跳号
            if cells.values().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(ParsedRow {
                row_number: idx + 2,
                cells,
            });
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    pub fn parse(&self, path: &Path) -> ImportResult<Vec<ParsedRow>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 按扩展名自动选择读取器: .xlsx 走 zip 格式，.xls 走旧式二进制格式
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        }

        // 优先取名为 "all data" 的工作表（大小写不敏感），否则取第一个
        let sheet_name = sheet_names
            .iter()
            .find(|n| n.trim().eq_ignore_ascii_case(PREFERRED_SHEET_NAME))
            .unwrap_or(&sheet_names[0])
            .clone();

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let mut range_rows = range.rows();
        let header_row = range_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in range_rows.enumerate() {
            let mut cells = HashMap::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    cells.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            if cells.values().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(ParsedRow {
                row_number: idx + 2,
                cells,
            });
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<ParsedRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse(path),
            "xlsx" | "xls" => ExcelParser.parse(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
