//! Error types for the input boundary and the goal-seek consumer
//!
//! The projection engine itself is total and never returns an error.

use thiserror::Error;

/// Failure to load, parse or validate a [`crate::SimulationConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown tapering policy: {0}")]
    UnknownTapering(String),

    #[error("unknown investor type: {0}")]
    UnknownInvestorType(String),

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("initial stock allocation must be within 0..=100 (got {0})")]
    AllocationOutOfRange(f64),

    #[error("invested capital {invested} exceeds starting portfolio value {portfolio}")]
    InvestedCapitalExceedsPortfolio { invested: f64, portfolio: f64 },

    #[error("event {id} ends ({end_year}) before it starts ({start_year})")]
    InvertedEventRange {
        id: String,
        start_year: i32,
        end_year: i32,
    },
}

/// Failure of the annual-savings goal seek
#[derive(Debug, Error, PartialEq)]
pub enum GoalSeekError {
    #[error("plan is not sustainable even with annual savings of {ceiling}")]
    Unreachable { ceiling: f64 },

    #[error("search did not converge within {iterations} iterations")]
    IterationLimit { iterations: u32 },

    #[error("search step must be positive (got {0})")]
    InvalidStep(f64),
}
