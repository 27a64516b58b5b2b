//! Persona: Customer Segmentation Library
//!
//! A library for profiling purchase records, building age-bucketed customer
//! keys, splitting them into quantile spend segments, and classifying new
//! customers against the resulting segment table.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
