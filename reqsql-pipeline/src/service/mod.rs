//! Pipeline stages
//!
//! Each stage is a stateless async function that receives its backend by
//! reference. The coordinator owns the backends and decides what happens
//! when a stage comes back empty.

mod deriver;
mod runner;
mod synthesizer;

pub use deriver::{derive_use_cases, parse_use_cases};
pub use runner::{SKIPPED_QUERY_PREFIX, run_queries};
pub use synthesizer::{NO_QUERY_SENTINEL, ResponseCleaning, synthesize_queries};
