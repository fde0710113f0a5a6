//! Input checks for the form/CLI boundary
//!
//! The projection engine accepts any finite configuration; these checks belong
//! to whoever builds the configuration.

use super::SimulationConfig;
use crate::error::ConfigError;

/// Reject configurations the input form would never produce
pub fn validate(config: &SimulationConfig) -> Result<(), ConfigError> {
    let amounts = [
        ("initialPortfolioValue", config.initial_portfolio_value),
        ("pensionPortfolioValue", config.pension_portfolio_value),
        ("additionalLiquidityValue", config.additional_liquidity_value),
        ("investedCapital", config.invested_capital),
        ("annualSavings", config.annual_savings),
        ("desiredAnnualConsumptionPayout", config.desired_annual_consumption_payout),
        ("desiredAnnualWealthTaxPayout", config.desired_annual_wealth_tax_payout),
    ];
    for (field, value) in amounts {
        check_finite(field, value)?;
        if value < 0.0 {
            return Err(ConfigError::Negative { field, value });
        }
    }

    let rates = [
        ("stockReturnRate", config.stock_return_rate),
        ("bondReturnRate", config.bond_return_rate),
        ("shieldingRate", config.shielding_rate),
        ("stockTaxRate", config.stock_tax_rate),
        ("bondTaxRate", config.bond_tax_rate),
        ("cpiRate", config.cpi_rate),
        ("advisoryFeeRate", config.advisory_fee_rate),
    ];
    for (field, value) in rates {
        check_finite(field, value)?;
    }

    check_finite("initialStockAllocationPct", config.initial_stock_allocation_pct)?;
    if !(0.0..=100.0).contains(&config.initial_stock_allocation_pct) {
        return Err(ConfigError::AllocationOutOfRange(config.initial_stock_allocation_pct));
    }

    let starting = config.starting_portfolio_value();
    if config.invested_capital > starting {
        return Err(ConfigError::InvestedCapitalExceedsPortfolio {
            invested: config.invested_capital,
            portfolio: starting,
        });
    }

    for event in &config.events {
        check_finite("events.amount", event.amount)?;
        if event.start_year > event.end_year {
            return Err(ConfigError::InvertedEventRange {
                id: event.id.clone(),
                start_year: event.start_year,
                end_year: event.end_year,
            });
        }
        if event.end_year < config.start_year || event.start_year > config.last_year() {
            log::warn!(
                "event {} ({}..={}) lies outside the simulated years {}..={}",
                event.id,
                event.start_year,
                event.end_year,
                config.start_year,
                config.last_year()
            );
        }
    }

    Ok(())
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CashFlowEvent;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&SimulationConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_invested_capital_above_portfolio() {
        let config = SimulationConfig {
            initial_portfolio_value: 1_000_000.0,
            invested_capital: 1_500_000.0,
            ..Default::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvestedCapitalExceedsPortfolio { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_event() {
        let config = SimulationConfig {
            events: vec![CashFlowEvent::new("boat", -200_000.0, 2040, 2035)],
            ..Default::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvertedEventRange { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        let negative = SimulationConfig {
            annual_savings: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            validate(&negative),
            Err(ConfigError::Negative { field: "annualSavings", .. })
        ));

        let nan = SimulationConfig {
            bond_return_rate: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            validate(&nan),
            Err(ConfigError::NonFinite { field: "bondReturnRate" })
        ));
    }

    #[test]
    fn test_rejects_allocation_out_of_range() {
        let config = SimulationConfig {
            initial_stock_allocation_pct: 120.0,
            ..Default::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::AllocationOutOfRange(_))));
    }
}
