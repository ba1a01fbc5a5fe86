pub mod evaluation;
pub mod types;

pub use evaluation::{AggregateScore, AnalysisSummary, Criterion, Story, TrialResult};
pub use types::{ChatMessage, Conversation, MessageRole};
