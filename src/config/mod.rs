//! Simulation configuration, JSON loading and input validation

mod data;
pub mod loader;
mod validation;

pub use data::{CashFlowEvent, InvestorType, SimulationConfig, TaperingPolicy};
pub use loader::{load_config, load_config_from_reader};
pub use validation::validate;
