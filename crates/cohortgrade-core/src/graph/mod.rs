//! Criteria graph and its aggregation from per-entity signals
//!
//! The graph maps every criterion key to its holders, prevalence, weight
//! and rarity flag. It is built once per run and read-only afterwards.

pub mod aggregate;
pub mod types;

pub use aggregate::GraphAggregator;
pub use types::{CriteriaGraph, Criterion, GraphMetadata, WEIGHT_EPSILON};
