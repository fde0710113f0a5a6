//! Scenario runner for batch projections
//!
//! Holds a base configuration and runs variants of it. Runs share nothing, so
//! batches are evaluated in parallel.

use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::projection::{project, OutputSeries};

/// Runs many projections derived from one base configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(config);
///
/// for (savings, output) in runner.savings_sweep(&[0.0, 50_000.0, 100_000.0]) {
///     println!("{savings}: {}", output.final_portfolio_value());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_config: SimulationConfig,
}

impl ScenarioRunner {
    pub fn new(base_config: SimulationConfig) -> Self {
        Self { base_config }
    }

    /// Run the base configuration
    pub fn run(&self) -> OutputSeries {
        project(&self.base_config)
    }

    /// Run a variant of the base configuration
    pub fn run_with<F>(&self, adjust: F) -> OutputSeries
    where
        F: FnOnce(&mut SimulationConfig),
    {
        let mut config = self.base_config.clone();
        adjust(&mut config);
        project(&config)
    }

    /// Run many configurations in parallel, preserving order
    pub fn run_batch(configs: &[SimulationConfig]) -> Vec<OutputSeries> {
        configs.par_iter().map(project).collect()
    }

    /// Run the base configuration once per annual savings value
    pub fn savings_sweep(&self, savings: &[f64]) -> Vec<(f64, OutputSeries)> {
        savings
            .par_iter()
            .map(|&amount| {
                let output = self.run_with(|config| config.annual_savings = amount);
                (amount, output)
            })
            .collect()
    }

    /// Get reference to the base configuration
    pub fn base(&self) -> &SimulationConfig {
        &self.base_config
    }

    /// Get mutable reference to the base configuration
    pub fn base_mut(&mut self) -> &mut SimulationConfig {
        &mut self.base_config
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimulationConfig {
        SimulationConfig {
            start_year: 2026,
            investment_years: 10,
            payout_years: 15,
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_matches_sequential() {
        let configs: Vec<SimulationConfig> = [4.0, 6.0, 8.0]
            .iter()
            .map(|&rate| SimulationConfig {
                stock_return_rate: rate,
                ..base()
            })
            .collect();

        let parallel = ScenarioRunner::run_batch(&configs);
        let sequential: Vec<OutputSeries> = configs.iter().map(project).collect();
        assert_eq!(parallel, sequential);

        // Higher stock return should end with more capital
        assert!(parallel[2].final_portfolio_value() > parallel[0].final_portfolio_value());
    }

    #[test]
    fn test_savings_sweep_is_monotonic() {
        let runner = ScenarioRunner::new(base());
        let results = runner.savings_sweep(&[0.0, 100_000.0, 200_000.0]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].0, 100_000.0);
        let finals: Vec<f64> = results.iter().map(|(_, o)| o.final_portfolio_value()).collect();
        assert!(finals[0] < finals[1] && finals[1] < finals[2]);
    }

    #[test]
    fn test_run_with_leaves_base_untouched() {
        let runner = ScenarioRunner::new(base());
        let output = runner.run_with(|config| config.payout_years = 0);
        assert_eq!(output.len(), 11);
        assert_eq!(runner.base().payout_years, 15);
        assert_eq!(runner.run().len(), 26);
    }
}
