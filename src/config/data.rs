//! Simulation configuration matching the planner's input form

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Current calendar year, used when a configuration omits `startYear`
fn default_start_year() -> i32 {
    chrono::Local::now().year()
}

fn default_true() -> bool {
    true
}

/// Scheduled reduction of the stock allocation during the payout phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaperingPolicy {
    /// Allocation stays at the initial split for the whole horizon
    #[default]
    #[serde(rename = "none")]
    None,
    /// 5 percentage points less stock per payout year
    #[serde(rename = "5%")]
    FivePercent,
    /// 10 percentage points less stock per payout year
    #[serde(rename = "10%")]
    TenPercent,
    /// 15 percentage points less stock per payout year
    #[serde(rename = "15%")]
    FifteenPercent,
}

impl TaperingPolicy {
    /// Reduction in stock percentage points per payout year
    pub fn taper_pct(&self) -> Option<f64> {
        match self {
            TaperingPolicy::None => None,
            TaperingPolicy::FivePercent => Some(5.0),
            TaperingPolicy::TenPercent => Some(10.0),
            TaperingPolicy::FifteenPercent => Some(15.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaperingPolicy::None => "none",
            TaperingPolicy::FivePercent => "5%",
            TaperingPolicy::TenPercent => "10%",
            TaperingPolicy::FifteenPercent => "15%",
        }
    }
}

impl FromStr for TaperingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "0" | "0%" => Ok(TaperingPolicy::None),
            "5%" | "5" => Ok(TaperingPolicy::FivePercent),
            "10%" | "10" => Ok(TaperingPolicy::TenPercent),
            "15%" | "15" => Ok(TaperingPolicy::FifteenPercent),
            _ => Err(ConfigError::UnknownTapering(s.to_string())),
        }
    }
}

impl fmt::Display for TaperingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who owns the portfolio; decides how withdrawals are taxed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestorType {
    /// Personal investor: only the stock share of a withdrawal may use the tax-free basis
    #[default]
    Private,
    /// Holding company: the whole withdrawal may use the tax-free basis, the rest is a dividend
    Corporate,
}

impl InvestorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorType::Private => "private",
            InvestorType::Corporate => "corporate",
        }
    }
}

impl FromStr for InvestorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" | "person" => Ok(InvestorType::Private),
            "corporate" | "company" => Ok(InvestorType::Corporate),
            _ => Err(ConfigError::UnknownInvestorType(s.to_string())),
        }
    }
}

impl fmt::Display for InvestorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-off or recurring cash flow over an inclusive range of calendar years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEvent {
    pub id: String,

    #[serde(default)]
    pub label: String,

    /// Positive = deposit, negative = withdrawal
    pub amount: f64,

    pub start_year: i32,

    /// Inclusive
    pub end_year: i32,

    /// Whether a deposit adds to the tax-free basis (ignored for withdrawals)
    #[serde(default = "default_true")]
    pub affects_invested_capital: bool,
}

impl CashFlowEvent {
    pub fn new(id: impl Into<String>, amount: f64, start_year: i32, end_year: i32) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            amount,
            start_year,
            end_year,
            affects_invested_capital: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn without_invested_capital(mut self) -> Self {
        self.affects_invested_capital = false;
        self
    }

    /// Whether the event contributes to the given calendar year
    pub fn is_active(&self, year: i32) -> bool {
        self.start_year <= year && year <= self.end_year
    }
}

/// Complete input for one projection run
///
/// Every rate is expressed in percent (`5.0` means 5 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    // Starting capital
    pub initial_portfolio_value: f64,
    pub pension_portfolio_value: f64,
    pub additional_liquidity_value: f64,

    /// Tax-free capital basis at start
    pub invested_capital: f64,

    // Horizon
    pub investment_years: u32,
    pub payout_years: u32,

    /// Calendar year of the first simulated year
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    // Allocation
    pub initial_stock_allocation_pct: f64,
    pub tapering: TaperingPolicy,

    // Market and tax rates (percent)
    pub stock_return_rate: f64,
    pub bond_return_rate: f64,
    pub shielding_rate: f64,
    pub stock_tax_rate: f64,
    pub bond_tax_rate: f64,
    pub cpi_rate: f64,
    pub advisory_fee_rate: f64,

    // Cash flows
    pub annual_savings: f64,
    pub desired_annual_consumption_payout: f64,
    pub desired_annual_wealth_tax_payout: f64,

    // Tax rules
    pub investor_type: InvestorType,
    pub tax_calculation_enabled: bool,
    pub deferred_bond_tax_enabled: bool,

    pub events: Vec<CashFlowEvent>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_portfolio_value: 5_000_000.0,
            pension_portfolio_value: 0.0,
            additional_liquidity_value: 0.0,
            invested_capital: 5_000_000.0,
            investment_years: 10,
            payout_years: 10,
            start_year: default_start_year(),
            initial_stock_allocation_pct: 65.0,
            tapering: TaperingPolicy::None,
            stock_return_rate: 8.0,
            bond_return_rate: 5.0,
            shielding_rate: 3.9,
            stock_tax_rate: 37.8,
            bond_tax_rate: 22.0,
            cpi_rate: 0.0,
            advisory_fee_rate: 0.0,
            annual_savings: 0.0,
            desired_annual_consumption_payout: 800_000.0,
            desired_annual_wealth_tax_payout: 200_000.0,
            investor_type: InvestorType::Private,
            tax_calculation_enabled: true,
            deferred_bond_tax_enabled: false,
            events: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Sum of all starting portfolio components
    pub fn starting_portfolio_value(&self) -> f64 {
        self.initial_portfolio_value + self.pension_portfolio_value + self.additional_liquidity_value
    }

    /// Number of simulated years
    pub fn total_years(&self) -> u32 {
        self.investment_years + self.payout_years
    }

    /// Desired net payout per payout year (consumption + wealth tax)
    pub fn desired_annual_payout(&self) -> f64 {
        self.desired_annual_consumption_payout + self.desired_annual_wealth_tax_payout
    }

    /// Whether the 0-based year index falls in the investment phase
    pub fn is_investment_year(&self, index: u32) -> bool {
        index < self.investment_years
    }

    /// Whether the 0-based year index falls in the payout phase
    pub fn is_payout_year(&self, index: u32) -> bool {
        index >= self.investment_years && index < self.total_years()
    }

    /// Calendar year for a 0-based year index
    pub fn calendar_year(&self, index: u32) -> i32 {
        self.start_year + index as i32
    }

    /// Calendar year of the last simulated year
    pub fn last_year(&self) -> i32 {
        self.calendar_year(self.total_years().saturating_sub(1))
    }

    /// Copy with the clamps the input form applies: invested capital capped at the
    /// starting value and inverted event ranges swapped into order
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        let starting = config.starting_portfolio_value();
        if config.invested_capital > starting {
            config.invested_capital = starting;
        }
        config.initial_stock_allocation_pct = config.initial_stock_allocation_pct.clamp(0.0, 100.0);
        for event in &mut config.events {
            if event.start_year > event.end_year {
                std::mem::swap(&mut event.start_year, &mut event.end_year);
            }
        }
        config
    }
}
