//! Load simulation configurations from JSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::SimulationConfig;
use crate::error::ConfigError;

/// Load a configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
    let file = File::open(path.as_ref())?;
    let config = load_config_from_reader(BufReader::new(file))?;
    log::debug!(
        "loaded configuration from {} ({} events)",
        path.as_ref().display(),
        config.events.len()
    );
    Ok(config)
}

/// Load a configuration from any reader (e.g., stdin, string buffer)
pub fn load_config_from_reader<R: Read>(reader: R) -> Result<SimulationConfig, ConfigError> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InvestorType, TaperingPolicy};

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "initialPortfolioValue": 2000000,
            "investedCapital": 1000000,
            "investmentYears": 5,
            "payoutYears": 15,
            "startYear": 2026,
            "tapering": "10%",
            "investorType": "corporate",
            "events": [
                {"id": "inheritance", "label": "Inheritance", "amount": 500000, "startYear": 2028, "endYear": 2028, "affectsInvestedCapital": false}
            ]
        }"#;

        let config = load_config_from_reader(json.as_bytes()).unwrap();
        assert_eq!(config.initial_portfolio_value, 2_000_000.0);
        assert_eq!(config.investment_years, 5);
        assert_eq!(config.start_year, 2026);
        assert_eq!(config.tapering, TaperingPolicy::TenPercent);
        assert_eq!(config.investor_type, InvestorType::Corporate);
        assert_eq!(config.stock_tax_rate, 37.8);
        assert!(config.tax_calculation_enabled);
        assert!(!config.events[0].affects_invested_capital);
    }

    #[test]
    fn test_unknown_tapering_is_rejected() {
        let json = r#"{"tapering": "25%"}"#;
        let err = load_config_from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
