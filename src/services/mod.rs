//! 业务能力层（Services Layer）
//!
//! 每个服务只描述"我能做什么"，不关心调用顺序

pub mod answer_extractor;
pub mod code_classifier;
pub mod description_enricher;
pub mod external_resolver;
pub mod llm_service;
pub mod lookup_table;
pub mod prompt;
pub mod question_parser;
pub mod result_writer;
pub mod scorer;

pub use answer_extractor::AnswerExtractor;
pub use code_classifier::{classify, CodeClassifier, QuestionCodes};
pub use description_enricher::{DescriptionEnricher, EnrichedBlock};
pub use external_resolver::{ExternalResolution, ExternalResolver, KnowledgeRetriever};
pub use llm_service::{CompletionService, LlmService, ReasoningRequest, ReasoningService, ToolSpec};
pub use lookup_table::LocalLookupTable;
pub use question_parser::QuestionParser;
pub use result_writer::{ResultWriter, TraceRecord, TraceWriter};
pub use scorer::{score, ScoreReport};
