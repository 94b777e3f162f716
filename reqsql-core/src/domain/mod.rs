//! Core domain types
//!
//! This module contains the structures that flow through the three pipeline
//! stages. They are shared between the pipeline (which produces them), the
//! server (which serializes them) and the CLI (which renders them).

pub mod cell;
pub mod pipeline;
pub mod query;
pub mod result;
