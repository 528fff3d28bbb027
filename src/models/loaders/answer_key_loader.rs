use crate::error::FileError;
use crate::models::answer::{Answer, AnswerKey};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// 答案键 TOML 文件结构
///
/// ```toml
/// [answers]
/// 1 = "B"
/// 2 = "D"
/// ```
#[derive(Debug, Deserialize)]
struct AnswerKeyFile {
    answers: BTreeMap<String, String>,
}

/// 从 TOML 文件加载答案键
pub async fn load_answer_key(path: &Path) -> Result<AnswerKey, FileError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read(path, e))?;

    let key = parse_answer_key(&content, path)?;
    tracing::info!("成功加载答案键: {} 道题 ({})", key.len(), path.display());
    Ok(key)
}

/// 解析答案键内容，题号必须是数字，答案必须是 A-D 之一
pub fn parse_answer_key(content: &str, path: &Path) -> Result<AnswerKey, FileError> {
    let file: AnswerKeyFile = toml::from_str(content).map_err(|source| FileError::TomlParseFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut key = AnswerKey::new();
    for (id, letter) in file.answers {
        let number: u32 = id.trim().parse().map_err(|_| FileError::InvalidAnswerKey {
            path: path.to_path_buf(),
            reason: format!("题号 '{}' 不是数字", id),
        })?;

        let mut chars = letter.trim().chars();
        let answer = match (chars.next(), chars.next()) {
            (Some(c), None) => Answer::from_letter(c.to_ascii_uppercase()),
            _ => None,
        }
        .ok_or_else(|| FileError::InvalidAnswerKey {
            path: path.to_path_buf(),
            reason: format!("题目 {} 的答案 '{}' 不是 A-D", id, letter),
        })?;

        key.insert(number, answer);
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_key() {
        let key = parse_answer_key("[answers]\n1 = \"B\"\n2 = \"d\"\n", Path::new("key.toml")).unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key[&1], Answer::B);
        assert_eq!(key[&2], Answer::D);
    }

    #[test]
    fn test_rejects_invalid_letter() {
        let err = parse_answer_key("[answers]\n1 = \"E\"\n", Path::new("key.toml")).unwrap_err();
        assert!(matches!(err, FileError::InvalidAnswerKey { .. }));
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        let err = parse_answer_key("[answers]\nfirst = \"A\"\n", Path::new("key.toml")).unwrap_err();
        assert!(matches!(err, FileError::InvalidAnswerKey { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_answer_key(Path::new("/nonexistent/answer_key.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }
}
