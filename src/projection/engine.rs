//! Core projection engine for yearly portfolio projections

use super::allocation::{compute_allocation_path, AllocationPath, AllocationSplit};
use super::cashflows::resolve_year;
use super::output::{OutputSeries, OutputSeriesBuilder, YearRow, START_LABEL};
use super::state::SimulationState;
use super::tax::{TaxPolicy, WithdrawalRequest};
use crate::config::SimulationConfig;

/// Growth of one year, before withdrawals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Growth {
    gross_return: f64,
    inflation_and_fees: f64,
    bond_tax: f64,
}

/// Main projection engine
///
/// Holds an immutable configuration plus everything derived from it once
/// (allocation path, tax rules). Each call to [`ProjectionEngine::run`] builds
/// its own [`SimulationState`], so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: SimulationConfig,
    allocation: AllocationPath,
    tax: TaxPolicy,
}

impl ProjectionEngine {
    /// Create a new projection engine for the given configuration
    pub fn new(config: SimulationConfig) -> Self {
        let allocation = compute_allocation_path(&config);
        let tax = TaxPolicy::from_config(&config);
        Self {
            config,
            allocation,
            tax,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn allocation(&self) -> &AllocationPath {
        &self.allocation
    }

    pub fn tax_policy(&self) -> &TaxPolicy {
        &self.tax
    }

    /// Run the full projection
    pub fn run(&self) -> OutputSeries {
        let mut output = OutputSeriesBuilder::with_capacity(self.config.total_years() as usize + 1);
        self.simulate(|row| output.push(row));
        output.finish()
    }

    /// Unrounded portfolio value after the last simulated year
    pub fn terminal_value(&self) -> f64 {
        self.simulate(|_| {}).portfolio_value
    }

    /// Drive the year loop, handing every row (start row first) to `on_row`
    fn simulate<F>(&self, mut on_row: F) -> SimulationState
    where
        F: FnMut(&YearRow),
    {
        let total_years = self.config.total_years();
        let mut state = SimulationState::from_config(&self.config);

        log::debug!(
            "projecting {} years ({} investment, {} payout) from {:.0}",
            total_years,
            self.config.investment_years,
            self.config.payout_years,
            state.portfolio_value
        );

        on_row(&self.start_row(&state));

        let mut depleted = false;
        for _year in 0..total_years {
            let row = self.project_year(&mut state);
            on_row(&row);

            if !depleted && state.is_depleted() {
                depleted = true;
                log::debug!("portfolio depleted in {}", row.label);
            }

            state.year_index += 1;
        }

        state
    }

    /// Starting position before any simulated year
    fn start_row(&self, state: &SimulationState) -> YearRow {
        let split = AllocationSplit::from_stock_pct(self.config.initial_stock_allocation_pct);
        YearRow {
            principal: state.portfolio_value,
            end_principal: state.portfolio_value,
            invested_capital_balance: state.tax_free_capital_remaining,
            stock_pct: split.stock_pct,
            bond_pct: split.bond_pct,
            ..YearRow::new(START_LABEL)
        }
    }

    /// Simulate one year and return its row
    fn project_year(&self, state: &mut SimulationState) -> YearRow {
        let index = state.year_index;
        let year = self.config.calendar_year(index);
        let split = self
            .allocation
            .get(index as usize)
            .unwrap_or_else(|| AllocationSplit::from_stock_pct(self.config.initial_stock_allocation_pct));

        let mut row = YearRow::new(year.to_string());
        row.principal = state.portfolio_value;
        row.stock_pct = split.stock_pct;
        row.bond_pct = split.bond_pct;

        // 1. Last year's deferred tax is due now
        let settled = state.settle_deferred_tax();
        row.settled_event_tax = settled.event_tax;
        row.settled_bond_tax = settled.bond_tax;

        // 2. Tax-free basis grows at the shielding rate
        state.grow_tax_free_basis(self.config.shielding_rate);

        // 3. Savings and event deposits
        let savings = if self.config.is_investment_year(index) {
            self.config.annual_savings
        } else {
            0.0
        };
        let events = resolve_year(&self.config.events, year);
        state.portfolio_value += savings + events.inflow;
        state.tax_free_capital_remaining += savings + events.invested_capital_eligible_inflow;
        row.savings_contribution = savings;
        row.net_event_amount = events.net_amount;

        // 4. Market growth and running bond tax
        let growth = self.apply_growth(state, split);
        row.gross_return = growth.gross_return;
        row.inflation_and_fees = growth.inflation_and_fees;
        row.bond_tax = growth.bond_tax;

        // 5. Ordinary payout
        let desired = self.config.desired_annual_payout();
        if self.config.is_payout_year(index) && desired > 0.0 {
            let outcome = self.tax.apply_withdrawal(
                WithdrawalRequest {
                    amount: desired,
                    split,
                    portfolio_before: state.portfolio_value,
                },
                state,
            );
            state.portfolio_value -= outcome.gross_withdrawal;
            state.ledger.accrue(outcome.deferred_tax);
            row.net_withdrawal = desired;
            row.withdrawal_tax = outcome.deferred_tax.total();
        }

        // 6. Event withdrawals
        if events.outflow_magnitude > 0.0 {
            let outcome = self.tax.apply_withdrawal(
                WithdrawalRequest {
                    amount: events.outflow_magnitude,
                    split,
                    portfolio_before: state.portfolio_value,
                },
                state,
            );
            state.portfolio_value -= outcome.gross_withdrawal;
            state.ledger.accrue(outcome.deferred_tax);
            row.event_tax = outcome.deferred_tax.total();
        }

        row.invested_capital_balance = state.tax_free_capital_remaining;
        row.end_principal = state.portfolio_value;

        log::trace!(
            "{}: principal {:.2} -> {:.2}, basis {:.2}, pool {:.2}",
            row.label,
            row.principal,
            row.end_principal,
            state.tax_free_capital_remaining,
            state.untaxed_bond_return_pool
        );

        row
    }

    /// Add this year's net growth to the portfolio
    ///
    /// Returns are only earned on a positive portfolio. Inflation and advisory fee
    /// drag is charged on each asset class in proportion to its value.
    fn apply_growth(&self, state: &mut SimulationState, split: AllocationSplit) -> Growth {
        if state.portfolio_value <= 0.0 {
            return Growth::default();
        }

        let stock_value = state.portfolio_value * split.stock_share();
        let bond_value = state.portfolio_value * split.bond_share();

        let gross_stock_return = stock_value * self.config.stock_return_rate / 100.0;
        let gross_bond_return = bond_value * self.config.bond_return_rate / 100.0;

        let drag_rate = (self.config.cpi_rate + self.config.advisory_fee_rate) / 100.0;
        let stock_drag = stock_value * drag_rate;
        let bond_drag = bond_value * drag_rate;

        let running = self.tax.running_bond_tax(gross_bond_return);
        state.untaxed_bond_return_pool += running.pool_addition;

        let gross_return = gross_stock_return + gross_bond_return;
        let inflation_and_fees = stock_drag + bond_drag;
        state.portfolio_value += gross_return - inflation_and_fees - running.tax_now;

        Growth {
            gross_return,
            inflation_and_fees,
            bond_tax: running.tax_now,
        }
    }
}

/// Run a projection for one configuration
pub fn project(config: &SimulationConfig) -> OutputSeries {
    ProjectionEngine::new(config.clone()).run()
}
