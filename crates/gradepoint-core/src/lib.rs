//! gradepoint-core: Retake resolution and GPA aggregation.
//!
//! This crate defines the transcript data model, the grade scale, and the
//! calculation engine: the equivalence resolver that groups attempts at the
//! same requirement, the time-relative best-grade selector, and the
//! aggregator that turns a transcript into term and cumulative figures.

pub mod engine;
pub mod error;
pub mod grade;
pub mod model;
pub mod numeric;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod selector;
pub mod statistics;
pub mod traits;
