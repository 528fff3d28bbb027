//! 批量题目处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **顺序处理**：一道题完全处理完（包括所有工具调用）才开始下一道
//! 2. **分组写入**：每组结果写入结果日志后立即 flush，中断后已完成部分仍保留
//! 3. **固定节流**：每道题之后等待固定时间，避免触发外部服务限流
//! 4. **统计汇总**：单题失败只记为错误结果，不中断批次

use std::time::{Duration, Instant};

use tracing::{error, warn};

use crate::error::FileError;
use crate::models::{Answer, QuestionUnit, ResolutionStatus};
use crate::services::result_writer::{format_result_line, ResultWriter, TraceRecord, TraceWriter};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::QuestionFlow;

/// 默认每组题目数
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// 批处理统计
#[derive(Debug, Default, Clone)]
pub struct BatchSummary {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub elapsed: Duration,
    /// 按处理顺序记录的 (题号, 答案)
    pub answers: Vec<(String, Answer)>,
}

/// 批量题目处理器
pub struct BatchRunner {
    flow: QuestionFlow,
    batch_size: usize,
    pause: Duration,
}

impl BatchRunner {
    pub fn new(flow: QuestionFlow, batch_size: usize, pause: Duration) -> Self {
        Self {
            flow,
            batch_size: batch_size.max(1),
            pause,
        }
    }

    /// 处理全部题目
    ///
    /// 只有结果日志写入失败会中断批次
    pub async fn run(
        &self,
        questions: &[QuestionUnit],
        writer: &mut ResultWriter,
        trace: Option<&TraceWriter>,
    ) -> Result<BatchSummary, FileError> {
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

            let mut lines = Vec::with_capacity(group.len());
            let mut group_success = 0;

            for (offset, question) in group.iter().enumerate() {
                let result = self.flow.process(question).await;

                if let Some(trace) = trace {
                    // 过程记录写失败不影响结果日志
                    if let Err(e) = trace.write(&TraceRecord::new(&question.id, &result)) {
                        warn!("{} ⚠️ 推理过程记录写入失败: {}", question, e);
                    }
                }

                match result.status {
                    ResolutionStatus::Success => group_success += 1,
                    ResolutionStatus::Error => error!("{} ❌ 结果记为 {}", question, result.answer),
                }
                lines.push(format_result_line(&question.id, result.answer));
                summary.answers.push((question.id.clone(), result.answer));

                let is_last = first + offset + 1 == total;
                if !is_last && !self.pause.is_zero() {
                    tokio::time::sleep(self.pause).await;
                }
            }

            writer.append_group(&lines)?;
            summary.success += group_success;
            summary.failed += group.len() - group_success;
            log_batch_complete(batch_num, group_success, group.len());
        }

        summary.elapsed = start.elapsed();
        Ok(summary)
    }
}
