//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 推理编排（查表 / 检索 / 推理，最多 N 轮）
//! 2. 从最终输出中提取答案字母
//! 3. 组装 ResolutionResult（任何失败都降级为错误结果，不中断批次）

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::{Answer, LoopOutcome, QuestionUnit, ResolutionResult};
use crate::services::answer_extractor::{AnswerExtractor, ExtractionStrategy};
use crate::services::description_enricher::DescriptionEnricher;
use crate::services::external_resolver::{ExternalResolver, KnowledgeRetriever};
use crate::services::llm_service::ReasoningService;
use crate::services::lookup_table::LocalLookupTable;
use crate::utils::logging::truncate_text;
use crate::workflow::agent::ReasoningOrchestrator;
use crate::workflow::routing::{EscalationPolicy, RoutingPolicy};

/// 题目处理流程
///
/// - 只依赖业务能力（services）和推理编排
/// - 不持有结果日志，持久化由编排层负责
pub struct QuestionFlow {
    orchestrator: ReasoningOrchestrator,
    extractor: AnswerExtractor,
}

impl QuestionFlow {
    pub fn new(orchestrator: ReasoningOrchestrator) -> Self {
        Self {
            orchestrator,
            extractor: AnswerExtractor::new(),
        }
    }

    /// 用注入的服务和配置组装完整流程
    pub fn from_services(
        reasoning: Arc<dyn ReasoningService>,
        retriever: Arc<dyn KnowledgeRetriever>,
        table: Arc<LocalLookupTable>,
        config: &Config,
    ) -> Self {
        let policy = RoutingPolicy::new(EscalationPolicy {
            missing_threshold: config.escalation_missing_threshold,
            similarity_threshold: config.escalation_similarity_threshold,
        });
        let orchestrator = ReasoningOrchestrator::new(
            reasoning,
            DescriptionEnricher::new(table),
            ExternalResolver::new(retriever),
            policy,
        )
        .with_max_iterations(config.max_iterations);
        Self::new(orchestrator)
    }

    /// 处理一道题，永远返回结果
    pub async fn process(&self, question: &QuestionUnit) -> ResolutionResult {
        let start = Instant::now();
        info!("{} 题干: {}", question, truncate_text(&question.text, 80));

        let report = match self.orchestrator.run(question).await {
            Ok(report) => report,
            Err(e) => {
                error!("{} ❌ 推理服务调用失败: {:#}", question, e);
                return ResolutionResult::failed(format!("{:#}", e), start.elapsed());
            }
        };

        let (answer, strategy) = self.extractor.extract_with_strategy(&report.final_text);
        match (answer, strategy) {
            (Answer::Error, _) => warn!("{} ⚠️ 未能从输出中提取答案", question),
            (_, ExtractionStrategy::StandaloneLetter) => {
                debug!("{} 输出中没有最终答案标记，使用最后出现的字母", question)
            }
            _ => {}
        }
        if report.outcome == LoopOutcome::Exhausted {
            warn!("{} ⚠️ 迭代 {} 轮未终止，尽力提取结果: {}", question, report.iterations, answer);
        }

        let elapsed = start.elapsed();
        info!(
            "{} ✓ 答案 {} ({} 轮, 耗时 {:.1}s)",
            question,
            answer,
            report.iterations,
            elapsed.as_secs_f64()
        );
        ResolutionResult::new(answer, report.trace, elapsed, report.outcome)
    }
}
