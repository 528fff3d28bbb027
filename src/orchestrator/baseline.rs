//! 基线作答 - 编排层
//!
//! 不使用任何工具，每组题目一次性交给模型，模型的原始回复直接写入结果日志，
//! 用来和推理循环的得分做对比

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::error::FileError;
use crate::models::{Answer, QuestionUnit};
use crate::services::llm_service::CompletionService;
use crate::services::prompt::{baseline_prompt, BASELINE_INSTRUCTIONS};
use crate::services::result_writer::{format_result_line, ResultWriter};
use crate::services::scorer::parse_result_log;
use crate::utils::logging::{log_batch_complete, log_batch_start};

use super::batch_processor::BatchSummary;

/// 基线作答处理器
pub struct BaselineRunner {
    completion: Arc<dyn CompletionService>,
    batch_size: usize,
    pause: Duration,
}

impl BaselineRunner {
    pub fn new(completion: Arc<dyn CompletionService>, batch_size: usize, pause: Duration) -> Self {
        Self {
            completion,
            batch_size: batch_size.max(1),
            pause,
        }
    }

    pub async fn run(&self, questions: &[QuestionUnit], writer: &mut ResultWriter) -> Result<BatchSummary, FileError> {
        let start = Instant::now();
        let total = questions.len();
        let total_batches = total.div_ceil(self.batch_size);
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        for (batch_index, group) in questions.chunks(self.batch_size).enumerate() {
            let batch_num = batch_index + 1;
            let first = batch_index * self.batch_size;
            log_batch_start(batch_num, total_batches, first + 1, first + group.len(), total);

            let prompt = baseline_prompt(group);
            let reply = match self.completion.complete(BASELINE_INSTRUCTIONS, &prompt).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("❌ 第 {} 组基线作答失败: {:#}", batch_num, e);
                    let lines: Vec<String> = group
                        .iter()
                        .map(|q| format_result_line(&q.id, Answer::Error))
                        .collect();
                    lines.join("\n")
                }
            };
            writer.append_text(reply.trim())?;

            // 按题号统计模型回复里真正给出字母的题目
            let answered = parse_result_log(&reply);
            let mut group_success = 0;
            for question in group {
                let answer = question
                    .number()
                    .and_then(|n| answered.get(&n).copied())
                    .unwrap_or(Answer::Error);
                if answer.is_letter() {
                    group_success += 1;
                }
                summary.answers.push((question.id.clone(), answer));
            }
            summary.success += group_success;
            summary.failed += group.len() - group_success;
            log_batch_complete(batch_num, group_success, group.len());

            if first + group.len() < total && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        summary.elapsed = start.elapsed();
        info!("✓ 基线作答完成: {}/{}", summary.success, summary.total);
        Ok(summary)
    }
}
