//! Withdrawal and running bond taxation rules
//!
//! Tax on a withdrawal is never paid in the year it happens. It is returned as a
//! [`DeferredTax`] for the engine to accrue, and settled at the start of the
//! following year.

use super::allocation::AllocationSplit;
use super::apportion::{draw, safe_fraction};
use super::state::{DeferredTax, SimulationState};
use crate::config::{InvestorType, SimulationConfig};

/// Running tax on one year's gross bond return
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningBondTax {
    /// Paid out of this year's growth (non-deferred mode)
    pub tax_now: f64,

    /// Added untaxed to the bond-return pool (deferred mode)
    pub pool_addition: f64,
}

/// One withdrawal to be taxed
#[derive(Debug, Clone, Copy)]
pub struct WithdrawalRequest {
    /// Net amount the investor wants out of the portfolio
    pub amount: f64,

    /// Allocation of the year the withdrawal happens in
    pub split: AllocationSplit,

    /// Portfolio value immediately before this withdrawal
    pub portfolio_before: f64,
}

/// Result of taxing one withdrawal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WithdrawalOutcome {
    /// Amount removed from the portfolio this year
    pub gross_withdrawal: f64,

    /// Part covered by the tax-free basis
    pub from_tax_free_basis: f64,

    /// Part taxed as stock gain or dividend
    pub taxable_amount: f64,

    /// Untaxed bond return realised from the pool
    pub realized_bond_return: f64,

    /// Tax due next year
    pub deferred_tax: DeferredTax,
}

/// Tax rules for one projection run
#[derive(Debug, Clone, PartialEq)]
pub struct TaxPolicy {
    pub investor_type: InvestorType,
    pub enabled: bool,
    pub deferred_bond_tax: bool,
    /// Fraction, not percent
    pub stock_tax_rate: f64,
    /// Fraction, not percent
    pub bond_tax_rate: f64,
}

impl TaxPolicy {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            investor_type: config.investor_type,
            enabled: config.tax_calculation_enabled,
            deferred_bond_tax: config.deferred_bond_tax_enabled,
            stock_tax_rate: config.stock_tax_rate / 100.0,
            bond_tax_rate: config.bond_tax_rate / 100.0,
        }
    }

    /// Tax the year's gross bond return immediately, or defer it into the pool
    ///
    /// Negative bond returns are neither taxed nor pooled.
    pub fn running_bond_tax(&self, gross_bond_return: f64) -> RunningBondTax {
        if !self.enabled || gross_bond_return <= 0.0 {
            return RunningBondTax::default();
        }
        if self.deferred_bond_tax {
            RunningBondTax {
                tax_now: 0.0,
                pool_addition: gross_bond_return,
            }
        } else {
            RunningBondTax {
                tax_now: gross_bond_return * self.bond_tax_rate,
                pool_addition: 0.0,
            }
        }
    }

    /// Apply a withdrawal to the tax-free basis and the untaxed bond pool
    ///
    /// Private investors may only cover the stock share from the basis; the rest of
    /// the stock share is taxed at the stock rate. Corporate investors cover the
    /// whole withdrawal from the basis and pay dividend tax on the excess. For
    /// Private investors the bond share also realises a proportional slice of the
    /// untaxed bond-return pool.
    pub fn apply_withdrawal(
        &self,
        request: WithdrawalRequest,
        state: &mut SimulationState,
    ) -> WithdrawalOutcome {
        let amount = request.amount.max(0.0);
        let stock_part = amount * request.split.stock_share();
        let bond_part = amount * request.split.bond_share();

        let eligible = match self.investor_type {
            InvestorType::Private => stock_part,
            InvestorType::Corporate => amount,
        };
        let from_basis = draw(eligible, state.tax_free_capital_remaining);
        state.tax_free_capital_remaining -= from_basis;

        let taxable_amount = eligible - from_basis;
        let mut outcome = WithdrawalOutcome {
            gross_withdrawal: amount,
            from_tax_free_basis: from_basis,
            taxable_amount,
            ..Default::default()
        };

        if !self.enabled {
            return outcome;
        }

        outcome.deferred_tax.event_tax = taxable_amount * self.stock_tax_rate;

        // Corporate withdrawals are taxed once, as a dividend
        let realized = match self.investor_type {
            InvestorType::Private => {
                let bond_value_before = request.portfolio_before * request.split.bond_share();
                let fraction = safe_fraction(bond_part, bond_value_before);
                let pool = state.untaxed_bond_return_pool;
                draw(pool * fraction, pool)
            }
            InvestorType::Corporate => 0.0,
        };
        state.untaxed_bond_return_pool -= realized;

        outcome.realized_bond_return = realized;
        outcome.deferred_tax.bond_tax = realized * self.bond_tax_rate;

        log::trace!(
            "withdrawal {:.2}: basis {:.2}, taxable {:.2}, realized bond return {:.2}",
            amount,
            from_basis,
            taxable_amount,
            realized
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn policy(investor_type: InvestorType, deferred_bond_tax: bool) -> TaxPolicy {
        TaxPolicy {
            investor_type,
            enabled: true,
            deferred_bond_tax,
            stock_tax_rate: 0.378,
            bond_tax_rate: 0.22,
        }
    }

    fn state(portfolio: f64, basis: f64, pool: f64) -> SimulationState {
        let mut state = SimulationState::from_config(&SimulationConfig {
            initial_portfolio_value: portfolio,
            invested_capital: basis,
            ..Default::default()
        });
        state.untaxed_bond_return_pool = pool;
        state
    }

    fn request(amount: f64, stock_pct: f64, portfolio_before: f64) -> WithdrawalRequest {
        WithdrawalRequest {
            amount,
            split: AllocationSplit::from_stock_pct(stock_pct),
            portfolio_before,
        }
    }

    #[test]
    fn test_running_bond_tax_modes() {
        let immediate = policy(InvestorType::Private, false).running_bond_tax(250_000.0);
        assert_relative_eq!(immediate.tax_now, 55_000.0);
        assert_eq!(immediate.pool_addition, 0.0);

        let deferred = policy(InvestorType::Private, true).running_bond_tax(250_000.0);
        assert_eq!(deferred.tax_now, 0.0);
        assert_eq!(deferred.pool_addition, 250_000.0);

        let loss = policy(InvestorType::Private, false).running_bond_tax(-10_000.0);
        assert_eq!(loss, RunningBondTax::default());
    }

    #[test]
    fn test_private_only_stock_share_uses_basis() {
        let mut state = state(1_000_000.0, 1_000_000.0, 0.0);
        let outcome = policy(InvestorType::Private, false)
            .apply_withdrawal(request(100_000.0, 60.0, 1_000_000.0), &mut state);

        assert_relative_eq!(outcome.from_tax_free_basis, 60_000.0);
        assert_relative_eq!(state.tax_free_capital_remaining, 940_000.0);
        assert_eq!(outcome.taxable_amount, 0.0);
        assert_eq!(outcome.deferred_tax, DeferredTax::default());
        assert_eq!(outcome.gross_withdrawal, 100_000.0);
    }

    #[test]
    fn test_private_stock_excess_taxed_at_stock_rate() {
        let mut state = state(1_000_000.0, 20_000.0, 0.0);
        let outcome = policy(InvestorType::Private, false)
            .apply_withdrawal(request(100_000.0, 50.0, 1_000_000.0), &mut state);

        assert_relative_eq!(outcome.from_tax_free_basis, 20_000.0);
        assert_relative_eq!(outcome.taxable_amount, 30_000.0);
        assert_relative_eq!(outcome.deferred_tax.event_tax, 30_000.0 * 0.378);
        assert_eq!(outcome.deferred_tax.bond_tax, 0.0);
        assert_eq!(state.tax_free_capital_remaining, 0.0);
    }

    #[test]
    fn test_corporate_whole_withdrawal_uses_basis_then_dividend_tax() {
        let mut state = state(1_000_000.0, 70_000.0, 0.0);
        let outcome = policy(InvestorType::Corporate, false)
            .apply_withdrawal(request(100_000.0, 50.0, 1_000_000.0), &mut state);

        assert_relative_eq!(outcome.from_tax_free_basis, 70_000.0);
        assert_relative_eq!(outcome.taxable_amount, 30_000.0);
        assert_relative_eq!(outcome.deferred_tax.event_tax, 30_000.0 * 0.378);
    }

    #[test]
    fn test_bond_share_realizes_pool_proportionally() {
        // 100 % bonds, withdrawing 10 % of the bond value realises 10 % of the pool
        let mut state = state(5_512_500.0, 0.0, 512_500.0);
        let outcome = policy(InvestorType::Private, true)
            .apply_withdrawal(request(551_250.0, 0.0, 5_512_500.0), &mut state);

        assert_relative_eq!(outcome.realized_bond_return, 51_250.0, max_relative = 1e-12);
        assert_relative_eq!(state.untaxed_bond_return_pool, 461_250.0, max_relative = 1e-12);
        assert_relative_eq!(outcome.deferred_tax.bond_tax, 11_275.0, max_relative = 1e-12);
        assert_eq!(outcome.deferred_tax.event_tax, 0.0);
    }

    #[test]
    fn test_corporate_leaves_bond_pool_untouched() {
        let mut state = state(5_512_500.0, 0.0, 512_500.0);
        let outcome = policy(InvestorType::Corporate, true)
            .apply_withdrawal(request(525_000.0, 0.0, 5_512_500.0), &mut state);

        assert_eq!(outcome.realized_bond_return, 0.0);
        assert_eq!(outcome.deferred_tax.bond_tax, 0.0);
        assert_relative_eq!(outcome.deferred_tax.event_tax, outcome.taxable_amount * 0.378);
        assert_relative_eq!(outcome.deferred_tax.event_tax, 198_450.0, max_relative = 1e-12);
        assert_eq!(state.untaxed_bond_return_pool, 512_500.0);
    }

    #[test]
    fn test_pool_realization_capped_at_pool() {
        let mut state = state(100_000.0, 0.0, 5_000.0);
        let outcome = policy(InvestorType::Private, true)
            .apply_withdrawal(request(300_000.0, 0.0, 100_000.0), &mut state);

        assert_eq!(outcome.realized_bond_return, 5_000.0);
        assert_eq!(state.untaxed_bond_return_pool, 0.0);
    }

    #[test]
    fn test_zero_bond_value_realizes_nothing() {
        let mut state = state(0.0, 0.0, 5_000.0);
        let outcome = policy(InvestorType::Private, true)
            .apply_withdrawal(request(10_000.0, 0.0, 0.0), &mut state);

        assert_eq!(outcome.realized_bond_return, 0.0);
        assert_eq!(state.untaxed_bond_return_pool, 5_000.0);
        assert!(outcome.deferred_tax.total().is_finite());
    }

    #[test]
    fn test_disabled_tax_is_zero_and_not_grossed_up() {
        let mut disabled = policy(InvestorType::Corporate, true);
        disabled.enabled = false;

        let mut state = state(1_000_000.0, 0.0, 50_000.0);
        let outcome = disabled.apply_withdrawal(request(200_000.0, 40.0, 1_000_000.0), &mut state);

        assert_eq!(outcome.gross_withdrawal, 200_000.0);
        assert_eq!(outcome.deferred_tax, DeferredTax::default());
        assert_eq!(state.untaxed_bond_return_pool, 50_000.0);
        assert_eq!(disabled.running_bond_tax(80_000.0), RunningBondTax::default());
    }
}
