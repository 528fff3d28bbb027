//! 本地编码对照表 - 业务能力层
//!
//! 从 CMS 发布的 CSV（如 PPRRVU 文件）构建 `操作编码 -> 描述` 映射。
//! 文件开头通常有若干行说明文字，表头位置随版本变化，因此需要在前几行中定位表头。

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::models::{CodeDescription, DescriptionSource, DESCRIPTION_NOT_FOUND};

/// 定位表头时最多扫描的行数
pub const HEADER_SCAN_ROWS: usize = 10;

const CODE_MARKER: &str = "HCPCS";
const DESCRIPTION_MARKER: &str = "DESCRIPTION";

/// 本地对照表，构建后只读
#[derive(Debug, Clone, Default)]
pub struct LocalLookupTable {
    code_map: HashMap<String, String>,
}

impl LocalLookupTable {
    /// 从 CSV 文件加载
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = std::fs::File::open(path).map_err(|e| LoadError::CsvRead {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;

        let table = Self::from_reader(file, path)?;
        info!("成功加载 {} 条 HCPCS 编码 ({})", table.len(), path.display());
        Ok(table)
    }

    /// 从任意 CSV 数据源加载，`path` 只用于错误信息
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record.map_err(|source| LoadError::CsvRead {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(decode_record(&record));
        }

        let header_index = find_header_row(&rows).ok_or_else(|| LoadError::HeaderNotFound {
            path: path.to_path_buf(),
            scanned: HEADER_SCAN_ROWS.min(rows.len()),
        })?;
        let header = &rows[header_index];

        let (code_col, desc_col) = resolve_columns(header);
        let code_col = code_col.ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: CODE_MARKER,
        })?;
        let desc_col = desc_col.ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: DESCRIPTION_MARKER,
        })?;

        debug!(
            "表头位于第 {} 行 - HCPCS: '{}', DESCRIPTION: '{}'",
            header_index + 1,
            header[code_col].trim(),
            header[desc_col].trim()
        );

        let mut code_map = HashMap::new();
        let mut dropped = 0usize;
        for row in &rows[header_index + 1..] {
            let (Some(code), Some(description)) = (row.get(code_col), row.get(desc_col)) else {
                dropped += 1;
                continue;
            };
            let code = code.trim();
            let description = description.trim();
            if is_missing(code) || is_missing(description) {
                dropped += 1;
                continue;
            }
            // 重复编码以后出现的为准
            code_map.insert(code.to_uppercase(), description.to_string());
        }

        if dropped > 0 {
            debug!("丢弃 {} 行缺失编码或描述的数据", dropped);
        }
        if code_map.is_empty() {
            warn!("⚠️ 对照表中没有有效数据 ({})", path.display());
        }

        Ok(Self { code_map })
    }

    /// 直接由 (编码, 描述) 构建，规范化规则与文件加载一致
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let code_map = entries
            .into_iter()
            .filter_map(|(code, description)| {
                let code = code.as_ref().trim();
                let description = description.as_ref().trim();
                if is_missing(code) || is_missing(description) {
                    None
                } else {
                    Some((code.to_uppercase(), description.to_string()))
                }
            })
            .collect();
        Self { code_map }
    }

    pub fn len(&self) -> usize {
        self.code_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_map.is_empty()
    }

    /// 查询编码描述，未收录时返回 "Description Not Found"
    pub fn lookup(&self, code: &str) -> &str {
        self.code_map
            .get(&normalize_code(code))
            .map_or(DESCRIPTION_NOT_FOUND, String::as_str)
    }

    /// 查询并带上来源标记
    pub fn describe(&self, code: &str) -> CodeDescription {
        let code = code.trim();
        match self.code_map.get(&normalize_code(code)) {
            Some(description) => CodeDescription {
                code: code.to_string(),
                description: description.clone(),
                source: DescriptionSource::Local,
            },
            None => CodeDescription::unresolved(code),
        }
    }

    /// 批量查询，结果顺序与输入一致
    pub fn lookup_multiple<S: AsRef<str>>(&self, codes: &[S]) -> Vec<CodeDescription> {
        codes.iter().map(|code| self.describe(code.as_ref())).collect()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// 空串以及字符串化的缺失值都视为缺失
fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}

fn decode_record(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// 在前 [`HEADER_SCAN_ROWS`] 行中寻找同时含有两个列标记的行
fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().take(HEADER_SCAN_ROWS).position(|row| {
        let upper: Vec<String> = row.iter().map(|cell| cell.to_uppercase()).collect();
        upper.iter().any(|cell| cell.contains(CODE_MARKER))
            && upper.iter().any(|cell| cell.contains(DESCRIPTION_MARKER))
    })
}

/// 返回 (编码列, 描述列)，多列匹配时取最后一列
fn resolve_columns(header: &[String]) -> (Option<usize>, Option<usize>) {
    let mut code_col = None;
    let mut desc_col = None;
    for (idx, name) in header.iter().enumerate() {
        let name = name.trim().to_uppercase();
        if name.contains(CODE_MARKER) {
            code_col = Some(idx);
        }
        if name.contains(DESCRIPTION_MARKER) {
            desc_col = Some(idx);
        }
    }
    (code_col, desc_col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(csv: &str) -> Result<LocalLookupTable, LoadError> {
        LocalLookupTable::from_reader(csv.as_bytes(), Path::new("test.csv"))
    }

    fn preamble(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("CMS release notes line {}\n", i + 1))
            .collect()
    }

    #[test]
    fn test_header_found_after_preamble() {
        let csv = format!(
            "{}HCPCS CODE,MOD,SHORT DESCRIPTION\n99213,,  Office/outpatient visit est  \n41110,,Excise tongue lesion\n",
            preamble(9)
        );
        let table = load(&csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("99213"), "Office/outpatient visit est");
    }

    #[test]
    fn test_header_beyond_scan_window_fails() {
        let csv = format!("{}HCPCS,DESCRIPTION\n99213,Visit\n", preamble(10));
        let err = load(&csv).unwrap_err();
        assert!(matches!(err, LoadError::HeaderNotFound { scanned: 10, .. }));
    }

    #[test]
    fn test_header_needs_both_markers() {
        let err = load("HCPCS,MOD\n99213,26\n").unwrap_err();
        assert!(matches!(err, LoadError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_missing_and_nan_rows_dropped() {
        let csv = "hcpcs,description\n11111,\n,Orphan description\n22222,nan\nnan,Something\n33333\n44444,Kept\n";
        let table = load(csv).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("44444"), "Kept");
        assert_eq!(table.lookup("22222"), DESCRIPTION_NOT_FOUND);
        assert_eq!(table.lookup("11111"), DESCRIPTION_NOT_FOUND);
    }

    #[test]
    fn test_duplicate_codes_last_write_wins() {
        let table = load("HCPCS,DESCRIPTION\n41110,First\n41110,Second\n").unwrap();
        assert_eq!(table.lookup("41110"), "Second");
    }

    #[test]
    fn test_lookup_normalizes_query() {
        let table = LocalLookupTable::from_entries([("j1885", "Ketorolac injection")]);
        for query in ["J1885", "j1885", "  J1885\t", "\nj1885 "] {
            assert_eq!(table.lookup(query), "Ketorolac injection");
            // 重复查询结果一致
            assert_eq!(table.lookup(query), table.lookup(query));
        }
        assert_eq!(table.lookup("J1886"), DESCRIPTION_NOT_FOUND);
    }

    #[test]
    fn test_lookup_multiple_keeps_order_and_sources() {
        let table = LocalLookupTable::from_entries([("41105", "Biopsy of tongue")]);
        let results = table.lookup_multiple(&["41110", "41105"]);
        assert_eq!(results[0], CodeDescription::unresolved("41110"));
        assert_eq!(results[1].description, "Biopsy of tongue");
        assert_eq!(results[1].source, DescriptionSource::Local);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Title row\n\nHCPCS,MOD,DESCRIPTION\n40800,,Drainage mouth lesion\n").unwrap();
        let table = LocalLookupTable::from_path(file.path()).unwrap();
        assert_eq!(table.lookup("40800"), "Drainage mouth lesion");
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = LocalLookupTable::from_path(Path::new("/nonexistent/PPRRVU.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }
}
