//! Candidate evaluation and ranking engine for the municipal selection-process portal.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
