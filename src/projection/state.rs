//! Mutable ledgers owned by one projection run

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

/// Tax recognised in one year and settled against the portfolio in the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeferredTax {
    /// Stock/dividend tax on withdrawals above the tax-free basis
    pub event_tax: f64,

    /// Tax on realised untaxed bond returns
    pub bond_tax: f64,
}

impl DeferredTax {
    pub fn total(&self) -> f64 {
        self.event_tax + self.bond_tax
    }

    pub fn add(&mut self, other: DeferredTax) {
        self.event_tax += other.event_tax;
        self.bond_tax += other.bond_tax;
    }
}

/// Two-slot deferred tax ledger
///
/// Withdrawals accrue into `accruing_for_next_year`. At the top of each year the
/// slots are rolled: what accrued last year becomes `due_this_year` and is paid,
/// and the accruing slot starts empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxLedger {
    due_this_year: DeferredTax,
    accruing_for_next_year: DeferredTax,
}

impl TaxLedger {
    /// Move last year's accrual into the due slot and return it for payment
    pub fn roll_over(&mut self) -> DeferredTax {
        self.due_this_year = std::mem::take(&mut self.accruing_for_next_year);
        self.due_this_year
    }

    pub fn accrue(&mut self, tax: DeferredTax) {
        self.accruing_for_next_year.add(tax);
    }

    pub fn due_this_year(&self) -> DeferredTax {
        self.due_this_year
    }

    pub fn accruing_for_next_year(&self) -> DeferredTax {
        self.accruing_for_next_year
    }
}

/// State of the portfolio at a point in the year loop
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current year index (0-based, advanced after each simulated year)
    pub year_index: u32,

    /// Portfolio value; may go negative for an unsustainable plan
    pub portfolio_value: f64,

    /// Remaining tax-free capital basis
    pub tax_free_capital_remaining: f64,

    /// Deferred event and bond tax
    pub ledger: TaxLedger,

    /// Gross bond returns not yet taxed (deferred bond tax mode)
    pub untaxed_bond_return_pool: f64,
}

impl SimulationState {
    /// Initialize state at projection start
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            year_index: 0,
            portfolio_value: config.starting_portfolio_value(),
            tax_free_capital_remaining: config.invested_capital,
            ledger: TaxLedger::default(),
            untaxed_bond_return_pool: 0.0,
        }
    }

    /// Pay last year's deferred tax out of the portfolio
    pub fn settle_deferred_tax(&mut self) -> DeferredTax {
        let due = self.ledger.roll_over();
        self.portfolio_value -= due.total();
        due
    }

    /// Compound the tax-free basis by the shielding rate (percent)
    pub fn grow_tax_free_basis(&mut self, shielding_rate_pct: f64) {
        self.tax_free_capital_remaining *= 1.0 + shielding_rate_pct / 100.0;
    }

    pub fn deferred_event_tax(&self) -> f64 {
        self.ledger.accruing_for_next_year().event_tax
    }

    pub fn deferred_bond_tax(&self) -> f64 {
        self.ledger.accruing_for_next_year().bond_tax
    }

    pub fn is_depleted(&self) -> bool {
        self.portfolio_value < 0.0
    }
}
