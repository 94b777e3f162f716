//! Reqsql Core
//!
//! Core types and abstractions for the requirements-to-SQL test pipeline.
//!
//! This crate contains:
//! - Domain types: use cases, SQL queries, cells, query results, pipeline results
//! - Error taxonomy shared by the pipeline stages
//! - The fixed P&C insurance schema model
//! - DTOs: Data transfer objects for the HTTP API

pub mod domain;
pub mod dto;
pub mod error;
pub mod schema;
