//! 应用入口 - 编排层
//!
//! 持有配置，负责构造外部服务客户端（进程内只构造一次）并分发各个命令

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::FileError;
use crate::models::{load_answer_key, CodeDescription, QuestionUnit};
use crate::orchestrator::baseline::BaselineRunner;
use crate::orchestrator::batch_processor::{BatchRunner, BatchSummary};
use crate::services::llm_service::LlmService;
use crate::services::lookup_table::LocalLookupTable;
use crate::services::question_parser::QuestionParser;
use crate::services::result_writer::{ResultWriter, TraceWriter};
use crate::services::scorer::{load_result_log, score, ScoreReport};
use crate::utils::logging::{log_questions_loaded, log_startup, print_final_stats};
use crate::workflow::QuestionFlow;

/// `run` 命令参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub exam: PathBuf,
    pub table: PathBuf,
    pub output: PathBuf,
    pub trace_file: Option<PathBuf>,
    pub batch_size: usize,
}

/// `baseline` 命令参数
#[derive(Debug, Clone)]
pub struct BaselineOptions {
    pub exam: PathBuf,
    pub output: PathBuf,
    pub batch_size: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 推理循环作答
    pub async fn run(&self, options: &RunOptions) -> Result<BatchSummary> {
        self.config.require_reasoning_credentials()?;
        self.config.require_search_credentials()?;
        log_startup("agent", &options.exam, &self.config.reasoning_model_name);

        // 资源加载失败是致命的
        let table = Arc::new(LocalLookupTable::from_path(&options.table)?);
        let questions = load_exam(&options.exam).await?;
        if questions.is_empty() {
            warn!("⚠️ 题目文件中没有题目，程序结束");
            return Ok(BatchSummary::default());
        }
        log_questions_loaded(questions.len(), options.batch_size);

        let reasoning = Arc::new(LlmService::new(
            &self.config.reasoning_api_key,
            &self.config.reasoning_api_base_url,
            &self.config.reasoning_model_name,
        ));
        let retriever = Arc::new(
            LlmService::new(
                &self.config.search_api_key,
                &self.config.search_api_base_url,
                &self.config.search_model_name,
            )
            .without_temperature(),
        );
        let flow = QuestionFlow::from_services(reasoning, retriever, table, &self.config);
        let runner = BatchRunner::new(flow, options.batch_size, self.config.pause_between_questions);

        let mut writer = ResultWriter::create(&options.output)?;
        let trace = options.trace_file.as_ref().map(TraceWriter::create).transpose()?;
        let summary = runner.run(&questions, &mut writer, trace.as_ref()).await?;

        print_final_stats(summary.success, summary.failed, summary.total, summary.elapsed, writer.path());
        Ok(summary)
    }

    /// 不使用工具的基线作答
    pub async fn baseline(&self, options: &BaselineOptions) -> Result<BatchSummary> {
        self.config.require_reasoning_credentials()?;
        log_startup("baseline", &options.exam, &self.config.reasoning_model_name);

        let questions = load_exam(&options.exam).await?;
        if questions.is_empty() {
            warn!("⚠️ 题目文件中没有题目，程序结束");
            return Ok(BatchSummary::default());
        }
        log_questions_loaded(questions.len(), options.batch_size);

        let completion = Arc::new(LlmService::new(
            &self.config.reasoning_api_key,
            &self.config.reasoning_api_base_url,
            &self.config.reasoning_model_name,
        ));
        let runner = BaselineRunner::new(completion, options.batch_size, self.config.pause_between_questions);

        let mut writer = ResultWriter::create(&options.output)?;
        let summary = runner.run(&questions, &mut writer).await?;

        print_final_stats(summary.success, summary.failed, summary.total, summary.elapsed, writer.path());
        Ok(summary)
    }

    /// 结果日志评分
    pub async fn score(&self, results: &Path, answer_key: &Path) -> Result<ScoreReport> {
        let answers = load_result_log(results).await?;
        let key = load_answer_key(answer_key).await?;
        info!("📊 结果日志 {} 条, 答案键 {} 条", answers.len(), key.len());

        let report = score(&answers, &key);
        if !report.unknown.is_empty() {
            warn!("⚠️ 以下题号不在答案键中，已跳过: {:?}", report.unknown);
        }
        Ok(report)
    }

    /// 本地查表
    pub fn lookup(&self, table: &Path, codes: &[String]) -> Result<Vec<CodeDescription>> {
        let table = LocalLookupTable::from_path(table)?;
        Ok(table.lookup_multiple(codes))
    }
}

/// 读取并拆分题目文件
pub async fn load_exam(path: &Path) -> Result<Vec<QuestionUnit>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read(path, e))?;
    let questions = QuestionParser::new().parse(&content)?;
    info!("📄 从 {} 解析出 {} 道题目", path.display(), questions.len());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    #[tokio::test]
    async fn test_load_exam() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.txt");
        std::fs::write(&path, "1. First?\nA) 41110 B) 41105\n2. Second?\nA) M17.0 B) M17.1\n").unwrap();

        let questions = load_exam(&path).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].id, "2");
    }

    #[tokio::test]
    async fn test_load_exam_without_boundary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.txt");
        std::fs::write(&path, "no numbered questions here").unwrap();

        let err = load_exam(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::NoQuestionBoundary { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_stop_run() {
        let app = App::new(Config::default());
        let options = RunOptions {
            exam: PathBuf::from("exam.txt"),
            table: PathBuf::from("table.csv"),
            output: PathBuf::from("out.txt"),
            trace_file: None,
            batch_size: 5,
        };
        assert!(app.run(&options).await.is_err());
    }

    #[tokio::test]
    async fn test_score_command() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("agent_responses.txt");
        let key = dir.path().join("key.toml");
        std::fs::write(&results, "1. B\n2. A\n").unwrap();
        std::fs::write(&key, "[answers]\n1 = \"B\"\n2 = \"C\"\n").unwrap();

        let report = App::new(Config::default()).score(&results, &key).await.unwrap();
        assert_eq!((report.correct(), report.total()), (1, 2));
    }
}
