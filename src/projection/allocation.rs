//! Per-year stock/bond allocation path

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

/// Stock/bond split for one simulated year (percent, sums to 100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub stock_pct: f64,
    pub bond_pct: f64,
}

impl AllocationSplit {
    pub fn from_stock_pct(stock_pct: f64) -> Self {
        Self {
            stock_pct,
            bond_pct: 100.0 - stock_pct,
        }
    }

    pub fn stock_share(&self) -> f64 {
        self.stock_pct / 100.0
    }

    pub fn bond_share(&self) -> f64 {
        self.bond_pct / 100.0
    }
}

/// Allocation for every simulated year index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPath {
    splits: Vec<AllocationSplit>,
}

impl AllocationPath {
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Split for a 0-based year index
    pub fn get(&self, index: usize) -> Option<AllocationSplit> {
        self.splits.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationSplit> {
        self.splits.iter()
    }
}

/// Build the allocation path for the whole horizon
///
/// Investment years hold the initial allocation. Payout years either hold it too
/// or, with a tapering policy, step it down from the end-of-investment allocation
/// by the taper rate per payout year, never below 0 % stock.
pub fn compute_allocation_path(config: &SimulationConfig) -> AllocationPath {
    let total = config.total_years() as usize;
    let investment_years = config.investment_years as usize;
    let initial = config.initial_stock_allocation_pct;

    let mut stock: Vec<f64> = Vec::with_capacity(total);
    for index in 0..total {
        let pct = if index < investment_years {
            initial
        } else {
            match config.tapering.taper_pct() {
                None => initial,
                Some(taper) => {
                    let base = if investment_years > 0 {
                        stock[investment_years - 1]
                    } else {
                        initial
                    };
                    let payout_index = (index - investment_years) as f64;
                    (base - payout_index * taper).max(0.0)
                }
            }
        };
        stock.push(pct);
    }

    AllocationPath {
        splits: stock.into_iter().map(AllocationSplit::from_stock_pct).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaperingPolicy;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn config(investment_years: u32, payout_years: u32, stock: f64, tapering: TaperingPolicy) -> SimulationConfig {
        SimulationConfig {
            investment_years,
            payout_years,
            initial_stock_allocation_pct: stock,
            tapering,
            ..Default::default()
        }
    }

    #[test]
    fn test_constant_during_investment_years() {
        let path = compute_allocation_path(&config(5, 5, 65.0, TaperingPolicy::TenPercent));
        for split in path.iter().take(5) {
            assert_eq!(split.stock_pct, 65.0);
            assert_eq!(split.bond_pct, 35.0);
        }
    }

    #[test]
    fn test_no_tapering_is_constant() {
        let path = compute_allocation_path(&config(3, 7, 55.0, TaperingPolicy::None));
        assert_eq!(path.len(), 10);
        assert!(path.iter().all(|s| s.stock_pct == 55.0));
    }

    #[test]
    fn test_five_percent_taper_steps_down() {
        let path = compute_allocation_path(&config(2, 4, 65.0, TaperingPolicy::FivePercent));
        let stock: Vec<f64> = path.iter().map(|s| s.stock_pct).collect();
        assert_eq!(stock, vec![65.0, 65.0, 65.0, 60.0, 55.0, 50.0]);
    }

    #[test]
    fn test_taper_floors_at_zero() {
        let path = compute_allocation_path(&config(1, 5, 20.0, TaperingPolicy::FifteenPercent));
        let stock: Vec<f64> = path.iter().map(|s| s.stock_pct).collect();
        assert_eq!(stock, vec![20.0, 20.0, 5.0, 0.0, 0.0, 0.0]);
        assert!(path.iter().all(|s| s.bond_pct <= 100.0));
    }

    #[test]
    fn test_taper_without_investment_phase() {
        let path = compute_allocation_path(&config(0, 3, 45.0, TaperingPolicy::TenPercent));
        let stock: Vec<f64> = path.iter().map(|s| s.stock_pct).collect();
        assert_eq!(stock, vec![45.0, 35.0, 25.0]);
    }

    #[test]
    fn test_zero_years_is_empty() {
        let path = compute_allocation_path(&config(0, 0, 65.0, TaperingPolicy::FivePercent));
        assert!(path.is_empty());
        assert_eq!(path.get(0), None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_split_sums_to_hundred_and_stays_in_range(
            investment_years in 0u32..15,
            payout_years in 0u32..30,
            stock in 0u32..=100,
            tapering_idx in 0usize..4,
        ) {
            let tapering = [
                TaperingPolicy::None,
                TaperingPolicy::FivePercent,
                TaperingPolicy::TenPercent,
                TaperingPolicy::FifteenPercent,
            ][tapering_idx];
            let path = compute_allocation_path(&config(investment_years, payout_years, stock as f64, tapering));
            prop_assert_eq!(path.len(), (investment_years + payout_years) as usize);
            for split in path.iter() {
                assert_abs_diff_eq!(split.stock_pct + split.bond_pct, 100.0, epsilon = 1e-12);
                prop_assert!(split.stock_pct >= 0.0 && split.stock_pct <= 100.0);
            }
        }
    }
}
