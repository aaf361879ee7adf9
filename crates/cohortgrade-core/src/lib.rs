//! Cohortgrade Core Library
//!
//! Criteria discovery and relative grading for a cohort of entities:
//! windowed vocabulary discovery, criteria graph aggregation with rarity
//! bonuses, scoring, curve-based grading and ranking.

pub mod category;
pub mod compare;
pub mod config;
pub mod criterion;
pub mod error;
pub mod format;
pub mod grading;
pub mod graph;
pub mod logging;
pub mod persist;
pub mod records;
pub mod run;
pub mod scoring;
pub mod signals;
pub mod stats;
pub mod vocabulary;
