//! # storyjudge-core
//!
//! Judges machine-generated stories with LLMs and aggregates repeated
//! judgements into per-criterion statistics.
//!
//! - `infrastructure::model` - provider adapters behind `GenerativeModel`,
//!   with bounded retry, key rotation and cancellation
//! - `application` - evaluation, batch and analysis orchestrators
//! - `infrastructure::repository` - criteria, story and trial storage
//! - `config` - TOML configuration and credential lookup

pub mod application;
pub mod cancel;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{
    AnalysisError, Analyzer, BatchReport, EvaluationError, EvaluationRunner, Evaluator,
};
pub use cancel::CancellationToken;
pub use config::{AppConfig, ConfigError};
pub use domain::{
    AggregateScore, AnalysisSummary, ChatMessage, Conversation, Criterion, MessageRole, Story,
    TrialResult,
};
pub use infrastructure::{model, repository};
pub use model::{FactoryError, GenerativeModel, ModelError, ModelFactory};
