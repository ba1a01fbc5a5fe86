pub mod analysis;
pub mod batch;
pub mod evaluation;
pub mod score;

pub use analysis::{AnalysisError, Analyzer, aggregate, analyze};
pub use batch::{BatchReport, parse_story_ids, read_story_ids};
pub use evaluation::{EvaluationError, EvaluationRunner, Evaluator, judging_conversation};
pub use score::parse_score;
