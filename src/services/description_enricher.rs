//! 描述补全 - 业务能力层
//!
//! 把 "每行一个编码" 的文本块转成 "编码 - 描述" 文本块

use std::fmt::Display;
use std::sync::Arc;

use crate::models::{CodeDescription, CodeKind};
use crate::services::code_classifier::classify;
use crate::services::lookup_table::LocalLookupTable;

/// 补全结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedBlock {
    pub entries: Vec<CodeDescription>,
}

impl EnrichedBlock {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 未在本地找到描述的编码数量
    pub fn missing_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_resolved()).count()
    }
}

impl Display for EnrichedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// 描述补全器
///
/// 只是对本地对照表的批量包装，本身没有状态
#[derive(Debug, Clone)]
pub struct DescriptionEnricher {
    table: Arc<LocalLookupTable>,
}

impl DescriptionEnricher {
    pub fn new(table: Arc<LocalLookupTable>) -> Self {
        Self { table }
    }

    /// 逐行查询，不是操作编码的行直接丢弃
    pub fn enrich(&self, codes_text: &str) -> EnrichedBlock {
        let entries = codes_text
            .trim()
            .lines()
            .map(str::trim)
            .filter(|line| classify(line) == CodeKind::Procedural)
            .map(|code| self.table.describe(code))
            .collect();
        EnrichedBlock { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DESCRIPTION_NOT_FOUND;

    fn enricher() -> DescriptionEnricher {
        DescriptionEnricher::new(Arc::new(LocalLookupTable::from_entries([
            ("41105", "Biopsy of tongue"),
            ("40800", "Drainage of mouth lesion"),
            ("J1885", "Ketorolac tromethamine inj"),
        ])))
    }

    #[test]
    fn test_enrich_formats_lines() {
        let block = enricher().enrich("41110\n41105\n  40800  \nJ1885");
        assert_eq!(
            block.to_string(),
            format!(
                "41110 - {}\n41105 - Biopsy of tongue\n40800 - Drainage of mouth lesion\nJ1885 - Ketorolac tromethamine inj",
                DESCRIPTION_NOT_FOUND
            )
        );
        assert_eq!(block.missing_count(), 1);
    }

    #[test]
    fn test_noise_lines_dropped() {
        let block = enricher().enrich("codes:\n41105, 40800\nM17.0\nj1885\n41105");
        assert_eq!(block.entries.len(), 1);
        assert_eq!(block.entries[0].code, "41105");
    }

    #[test]
    fn test_empty_input() {
        assert!(enricher().enrich("").is_empty());
        assert_eq!(enricher().enrich("").to_string(), "");
    }
}
