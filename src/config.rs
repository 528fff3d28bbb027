use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 推理服务配置 ---
    pub reasoning_api_key: String,
    pub reasoning_api_base_url: String,
    pub reasoning_model_name: String,
    // --- 检索服务配置 ---
    pub search_api_key: String,
    pub search_api_base_url: String,
    pub search_model_name: String,
    // --- 推理循环配置 ---
    /// 推理循环最大迭代次数
    pub max_iterations: usize,
    /// 缺失描述达到该数量时升级到外部检索
    pub escalation_missing_threshold: usize,
    /// 描述两两相似度达到该值视为近似重复
    pub escalation_similarity_threshold: f64,
    // --- 批处理配置 ---
    /// 每道题之间的固定等待时间
    pub pause_between_questions: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            reasoning_api_key: String::new(),
            reasoning_api_base_url: "https://api.anthropic.com/v1".to_string(),
            reasoning_model_name: "claude-sonnet-4-20250514".to_string(),
            search_api_key: String::new(),
            search_api_base_url: "https://api.openai.com/v1".to_string(),
            search_model_name: "gpt-4o-search-preview".to_string(),
            max_iterations: 6,
            escalation_missing_threshold: 3,
            escalation_similarity_threshold: 0.5,
            pause_between_questions: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            verbose_logging: parse_var("VERBOSE_LOGGING", default.verbose_logging)?,
            reasoning_api_key: first_var(&["REASONING_API_KEY", "ANTHROPIC_API_KEY"])
                .unwrap_or(default.reasoning_api_key),
            reasoning_api_base_url: std::env::var("REASONING_API_BASE_URL")
                .unwrap_or(default.reasoning_api_base_url),
            reasoning_model_name: std::env::var("REASONING_MODEL")
                .unwrap_or(default.reasoning_model_name),
            search_api_key: first_var(&["SEARCH_API_KEY", "OPENAI_API_KEY"])
                .unwrap_or(default.search_api_key),
            search_api_base_url: std::env::var("SEARCH_API_BASE_URL")
                .unwrap_or(default.search_api_base_url),
            search_model_name: std::env::var("SEARCH_MODEL").unwrap_or(default.search_model_name),
            max_iterations: parse_var("MAX_ITERATIONS", default.max_iterations)?,
            escalation_missing_threshold: parse_var(
                "ESCALATION_MISSING_THRESHOLD",
                default.escalation_missing_threshold,
            )?,
            escalation_similarity_threshold: parse_var(
                "ESCALATION_SIMILARITY_THRESHOLD",
                default.escalation_similarity_threshold,
            )?,
            pause_between_questions: Duration::from_millis(parse_var(
                "PAUSE_BETWEEN_QUESTIONS_MS",
                default.pause_between_questions.as_millis() as u64,
            )?),
        })
    }

    /// 检查推理服务凭据
    pub fn require_reasoning_credentials(&self) -> Result<(), ConfigError> {
        if self.reasoning_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "REASONING_API_KEY".to_string(),
            });
        }
        Ok(())
    }

    /// 检查检索服务凭据
    pub fn require_search_credentials(&self) -> Result<(), ConfigError> {
        if self.search_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "SEARCH_API_KEY".to_string(),
            });
        }
        Ok(())
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

fn parse_var<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_loop_contract() {
        let config = Config::default();
        assert_eq!(config.max_iterations, 6);
        assert_eq!(config.escalation_missing_threshold, 3);
        assert_eq!(
            config.escalation_similarity_threshold,
            crate::workflow::routing::EscalationPolicy::default().similarity_threshold
        );
        assert_eq!(config.pause_between_questions, Duration::from_secs(1));
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("MEDCODE_TEST_BAD_NUMBER", "six");
        let err = parse_var("MEDCODE_TEST_BAD_NUMBER", 6usize).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { .. }));
        std::env::remove_var("MEDCODE_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value = parse_var("MEDCODE_TEST_UNSET_VARIABLE", 42usize).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_missing_key_is_reported() {
        let config = Config::default();
        assert!(config.require_reasoning_credentials().is_err());
        assert!(config.require_search_credentials().is_err());
    }
}
