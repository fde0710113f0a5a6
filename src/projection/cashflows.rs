//! Resolution of dated cash-flow events into a year's inflow and outflow

use serde::{Deserialize, Serialize};

use crate::config::CashFlowEvent;

/// Event cash flow for one calendar year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCashFlow {
    /// Signed sum of all active events
    pub net_amount: f64,

    /// Sum of active deposits
    pub inflow: f64,

    /// Magnitude of the sum of active withdrawals
    pub outflow_magnitude: f64,

    /// Deposits that add to the tax-free basis
    pub invested_capital_eligible_inflow: f64,
}

/// Sum every event active in `year` (inclusive start and end)
pub fn resolve_year(events: &[CashFlowEvent], year: i32) -> ResolvedCashFlow {
    events
        .iter()
        .filter(|event| event.is_active(year))
        .fold(ResolvedCashFlow::default(), |mut acc, event| {
            acc.net_amount += event.amount;
            if event.amount > 0.0 {
                acc.inflow += event.amount;
                if event.affects_invested_capital {
                    acc.invested_capital_eligible_inflow += event.amount;
                }
            } else if event.amount < 0.0 {
                acc.outflow_magnitude += -event.amount;
            }
            acc
        })
}
