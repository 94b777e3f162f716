//! Data Transfer Objects for the HTTP API
//!
//! Request and response bodies exchanged between the reqsql server and its
//! clients. Pipeline results travel as the domain type itself.

pub mod pipeline;
