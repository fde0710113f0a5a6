//! Goal seek: smallest annual savings that keeps the plan solvent
//!
//! Repeatedly runs the projection with different `annual_savings` and binary
//! searches for the smallest multiple of `step` whose terminal principal is not
//! negative. The search bounds itself with a ceiling and an iteration cap.

use crate::config::SimulationConfig;
use crate::error::GoalSeekError;
use crate::projection::ProjectionEngine;

/// Bounds for the annual-savings search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSeekOptions {
    /// Result is rounded up to a multiple of this
    pub step: f64,

    /// Largest annual savings tried
    pub ceiling: f64,

    /// Maximum number of bisection steps
    pub max_iterations: u32,
}

impl Default for GoalSeekOptions {
    fn default() -> Self {
        Self {
            step: 10_000.0,
            ceiling: 100_000_000.0,
            max_iterations: 64,
        }
    }
}

/// Unrounded terminal principal for the configuration with the given annual savings
pub fn terminal_principal(config: &SimulationConfig, annual_savings: f64) -> f64 {
    let mut candidate = config.clone();
    candidate.annual_savings = annual_savings;
    ProjectionEngine::new(candidate).terminal_value()
}

/// Find the minimal annual savings (a multiple of `options.step`) that leaves a
/// non-negative terminal principal
///
/// Returns `Ok(0.0)` when the plan is already sustainable without savings.
pub fn find_minimum_annual_savings(
    config: &SimulationConfig,
    options: &GoalSeekOptions,
) -> Result<f64, GoalSeekError> {
    if options.step <= 0.0 || !options.step.is_finite() {
        return Err(GoalSeekError::InvalidStep(options.step));
    }

    let sustainable = |steps: u64| terminal_principal(config, steps as f64 * options.step) >= 0.0;

    if sustainable(0) {
        return Ok(0.0);
    }

    let max_steps = (options.ceiling / options.step).ceil().max(0.0) as u64;
    if !sustainable(max_steps) {
        return Err(GoalSeekError::Unreachable {
            ceiling: max_steps as f64 * options.step,
        });
    }

    // Invariant: `low` is unsustainable, `high` is sustainable
    let mut low = 0u64;
    let mut high = max_steps;
    let mut iterations = 0u32;

    while high - low > 1 {
        if iterations >= options.max_iterations {
            return Err(GoalSeekError::IterationLimit { iterations });
        }
        iterations += 1;

        let mid = low + (high - low) / 2;
        if sustainable(mid) {
            high = mid;
        } else {
            low = mid;
        }
    }

    let savings = high as f64 * options.step;
    log::debug!(
        "goal seek converged on annual savings {:.0} after {} iterations",
        savings,
        iterations
    );
    Ok(savings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaperingPolicy;

    fn underfunded_config() -> SimulationConfig {
        SimulationConfig {
            initial_portfolio_value: 2_000_000.0,
            invested_capital: 1_000_000.0,
            investment_years: 8,
            payout_years: 15,
            start_year: 2026,
            initial_stock_allocation_pct: 65.0,
            tapering: TaperingPolicy::FivePercent,
            desired_annual_consumption_payout: 500_000.0,
            desired_annual_wealth_tax_payout: 50_000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_goal_seek_finds_minimal_sustainable_savings() {
        let config = underfunded_config();
        assert!(terminal_principal(&config, 0.0) < 0.0);

        let options = GoalSeekOptions::default();
        let savings = find_minimum_annual_savings(&config, &options).unwrap();

        assert!(savings > 0.0);
        assert_eq!(savings % options.step, 0.0);
        assert!(terminal_principal(&config, savings) >= 0.0);
        assert!(terminal_principal(&config, savings - options.step) < 0.0);
    }

    #[test]
    fn test_already_sustainable_needs_no_savings() {
        let config = SimulationConfig {
            desired_annual_consumption_payout: 0.0,
            desired_annual_wealth_tax_payout: 0.0,
            ..underfunded_config()
        };
        assert_eq!(find_minimum_annual_savings(&config, &GoalSeekOptions::default()), Ok(0.0));
    }

    #[test]
    fn test_unreachable_without_investment_years() {
        // Savings only apply in investment years, so they cannot help here
        let config = SimulationConfig {
            investment_years: 0,
            ..underfunded_config()
        };
        let result = find_minimum_annual_savings(&config, &GoalSeekOptions::default());
        assert_eq!(result, Err(GoalSeekError::Unreachable { ceiling: 100_000_000.0 }));
    }

    #[test]
    fn test_small_shortfall_is_not_rounded_away() {
        let config = SimulationConfig {
            initial_portfolio_value: 100.0,
            invested_capital: 0.0,
            bond_return_rate: 0.0,
            initial_stock_allocation_pct: 0.0,
            tax_calculation_enabled: false,
            investment_years: 1,
            payout_years: 1,
            desired_annual_consumption_payout: 100.4,
            desired_annual_wealth_tax_payout: 0.0,
            ..underfunded_config()
        };
        assert!(terminal_principal(&config, 0.0) < 0.0);

        let options = GoalSeekOptions {
            step: 1.0,
            ..Default::default()
        };
        assert_eq!(find_minimum_annual_savings(&config, &options), Ok(1.0));
    }

    #[test]
    fn test_iteration_cap() {
        let options = GoalSeekOptions {
            max_iterations: 2,
            ..Default::default()
        };
        let result = find_minimum_annual_savings(&underfunded_config(), &options);
        assert_eq!(result, Err(GoalSeekError::IterationLimit { iterations: 2 }));
    }

    #[test]
    fn test_invalid_step() {
        let options = GoalSeekOptions {
            step: 0.0,
            ..Default::default()
        };
        assert_eq!(
            find_minimum_annual_savings(&underfunded_config(), &options),
            Err(GoalSeekError::InvalidStep(0.0))
        );
    }
}
