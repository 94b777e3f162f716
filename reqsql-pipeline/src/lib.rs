//! reqsql pipeline
//!
//! Turns a requirements document into test queries and their results in
//! three sequential stages:
//! 1. derive natural-language use cases with a language model
//! 2. synthesize one SQL query per use case against the P&C schema
//! 3. run every query on the warehouse and keep a bounded result
//!
//! [`Coordinator`] strings the stages together and always hands back a
//! [`PipelineResult`](reqsql_core::domain::pipeline::PipelineResult), even
//! when a stage comes up empty.

pub mod config;
pub mod coordinator;
pub mod progress;
pub mod prompt;
pub mod service;

pub use config::Config;
pub use coordinator::Coordinator;
pub use progress::{NoProgress, ProgressSink};
pub use service::ResponseCleaning;
