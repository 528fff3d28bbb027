pub mod answer;
pub mod code;
pub mod loaders;
pub mod question;

pub use answer::{Answer, AnswerKey, LoopOutcome, ResolutionResult, ResolutionStatus};
pub use code::{CodeDescription, CodeKind, CodeToken, DescriptionSource, DESCRIPTION_NOT_FOUND};
pub use loaders::load_answer_key;
pub use question::QuestionUnit;
