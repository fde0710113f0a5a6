//! Portfolio Projection - long-horizon portfolio planning engine
//!
//! This library provides:
//! - Year-by-year projection of portfolio value, returns and cash flows
//! - Stock/bond allocation paths with optional payout-phase tapering
//! - Private and corporate withdrawal taxation with a tax-free capital basis
//! - Deferred tax ledgers settled the year after a withdrawal
//! - Goal seek for the annual savings that keeps a plan solvent
//! - Parallel scenario sweeps

pub mod config;
pub mod error;
pub mod goal_seek;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use config::{CashFlowEvent, InvestorType, SimulationConfig, TaperingPolicy};
pub use error::{ConfigError, GoalSeekError};
pub use goal_seek::{find_minimum_annual_savings, GoalSeekOptions};
pub use projection::{project, OutputSeries, ProjectionEngine, ProjectionSummary, SeriesKey};
pub use scenario::ScenarioRunner;
