//! Projection engine for yearly portfolio projections

mod allocation;
mod apportion;
mod cashflows;
mod engine;
mod output;
mod state;
mod tax;

pub use allocation::{compute_allocation_path, AllocationPath, AllocationSplit};
pub use apportion::{apportion, draw, safe_fraction};
pub use cashflows::{resolve_year, ResolvedCashFlow};
pub use engine::{project, ProjectionEngine};
pub use output::{OutputSeries, OutputSeriesBuilder, ProjectionSummary, SeriesKey, YearRow, START_LABEL};
pub use state::{DeferredTax, SimulationState, TaxLedger};
pub use tax::{RunningBondTax, TaxPolicy, WithdrawalOutcome, WithdrawalRequest};
