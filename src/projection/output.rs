//! Year-indexed output series for charting and reporting

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label of the row holding the starting position
pub const START_LABEL: &str = "start";

/// One year of projection results, unrounded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub label: String,

    /// Portfolio value at the start of the year, before settling deferred tax
    pub principal: f64,
    pub gross_return: f64,
    pub savings_contribution: f64,
    pub net_event_amount: f64,

    /// Net ordinary payout
    pub net_withdrawal: f64,

    // Tax accrued this year, payable next year
    pub withdrawal_tax: f64,
    pub event_tax: f64,

    /// Running bond tax paid out of this year's growth
    pub bond_tax: f64,

    // Deferred tax from last year paid at the start of this year
    pub settled_event_tax: f64,
    pub settled_bond_tax: f64,

    pub inflation_and_fees: f64,
    pub stock_pct: f64,
    pub bond_pct: f64,
    pub invested_capital_balance: f64,

    /// Portfolio value at the end of the year
    pub end_principal: f64,
}

impl YearRow {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Copy with every numeric field rounded to the nearest whole unit
    pub fn rounded(&self) -> Self {
        Self {
            label: self.label.clone(),
            principal: round_unit(self.principal),
            gross_return: round_unit(self.gross_return),
            savings_contribution: round_unit(self.savings_contribution),
            net_event_amount: round_unit(self.net_event_amount),
            net_withdrawal: round_unit(self.net_withdrawal),
            withdrawal_tax: round_unit(self.withdrawal_tax),
            event_tax: round_unit(self.event_tax),
            bond_tax: round_unit(self.bond_tax),
            settled_event_tax: round_unit(self.settled_event_tax),
            settled_bond_tax: round_unit(self.settled_bond_tax),
            inflation_and_fees: round_unit(self.inflation_and_fees),
            stock_pct: round_unit(self.stock_pct),
            bond_pct: round_unit(self.bond_pct),
            invested_capital_balance: round_unit(self.invested_capital_balance),
            end_principal: round_unit(self.end_principal),
        }
    }
}

/// Round half away from zero, without emitting negative zero
fn round_unit(value: f64) -> f64 {
    let rounded = value.round();
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Stable names of the emitted series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    Principal,
    GrossReturn,
    SavingsContribution,
    NetEventAmount,
    NetWithdrawal,
    WithdrawalTax,
    EventTax,
    BondTax,
    SettledEventTax,
    SettledBondTax,
    InflationAndFees,
    StockPct,
    BondPct,
    InvestedCapitalBalance,
    EndPrincipal,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 15] = [
        SeriesKey::Principal,
        SeriesKey::GrossReturn,
        SeriesKey::SavingsContribution,
        SeriesKey::NetEventAmount,
        SeriesKey::NetWithdrawal,
        SeriesKey::WithdrawalTax,
        SeriesKey::EventTax,
        SeriesKey::BondTax,
        SeriesKey::SettledEventTax,
        SeriesKey::SettledBondTax,
        SeriesKey::InflationAndFees,
        SeriesKey::StockPct,
        SeriesKey::BondPct,
        SeriesKey::InvestedCapitalBalance,
        SeriesKey::EndPrincipal,
    ];

    /// Series that carry tax amounts
    pub const TAX: [SeriesKey; 5] = [
        SeriesKey::WithdrawalTax,
        SeriesKey::EventTax,
        SeriesKey::BondTax,
        SeriesKey::SettledEventTax,
        SeriesKey::SettledBondTax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKey::Principal => "principal",
            SeriesKey::GrossReturn => "grossReturn",
            SeriesKey::SavingsContribution => "savingsContribution",
            SeriesKey::NetEventAmount => "netEventAmount",
            SeriesKey::NetWithdrawal => "netWithdrawal",
            SeriesKey::WithdrawalTax => "withdrawalTax",
            SeriesKey::EventTax => "eventTax",
            SeriesKey::BondTax => "bondTax",
            SeriesKey::SettledEventTax => "settledEventTax",
            SeriesKey::SettledBondTax => "settledBondTax",
            SeriesKey::InflationAndFees => "inflationAndFees",
            SeriesKey::StockPct => "stockPct",
            SeriesKey::BondPct => "bondPct",
            SeriesKey::InvestedCapitalBalance => "investedCapitalBalance",
            SeriesKey::EndPrincipal => "endPrincipal",
        }
    }
}

impl FromStr for SeriesKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown series: {}", s))
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parallel output series, one element per label
///
/// The first element of every series is the starting position (`"start"`),
/// followed by one element per simulated year. All values are rounded to whole
/// units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSeries {
    pub labels: Vec<String>,
    pub principal: Vec<f64>,
    pub gross_return: Vec<f64>,
    pub savings_contribution: Vec<f64>,
    pub net_event_amount: Vec<f64>,
    pub net_withdrawal: Vec<f64>,
    pub withdrawal_tax: Vec<f64>,
    pub event_tax: Vec<f64>,
    pub bond_tax: Vec<f64>,
    pub settled_event_tax: Vec<f64>,
    pub settled_bond_tax: Vec<f64>,
    pub inflation_and_fees: Vec<f64>,
    pub stock_pct: Vec<f64>,
    pub bond_pct: Vec<f64>,
    pub invested_capital_balance: Vec<f64>,
    pub end_principal: Vec<f64>,
}

impl OutputSeries {
    /// Number of labels (simulated years + the start row)
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Series by stable key
    pub fn get(&self, key: SeriesKey) -> &[f64] {
        match key {
            SeriesKey::Principal => &self.principal,
            SeriesKey::GrossReturn => &self.gross_return,
            SeriesKey::SavingsContribution => &self.savings_contribution,
            SeriesKey::NetEventAmount => &self.net_event_amount,
            SeriesKey::NetWithdrawal => &self.net_withdrawal,
            SeriesKey::WithdrawalTax => &self.withdrawal_tax,
            SeriesKey::EventTax => &self.event_tax,
            SeriesKey::BondTax => &self.bond_tax,
            SeriesKey::SettledEventTax => &self.settled_event_tax,
            SeriesKey::SettledBondTax => &self.settled_bond_tax,
            SeriesKey::InflationAndFees => &self.inflation_and_fees,
            SeriesKey::StockPct => &self.stock_pct,
            SeriesKey::BondPct => &self.bond_pct,
            SeriesKey::InvestedCapitalBalance => &self.invested_capital_balance,
            SeriesKey::EndPrincipal => &self.end_principal,
        }
    }

    /// Series by its camelCase name
    pub fn by_name(&self, name: &str) -> Option<&[f64]> {
        name.parse::<SeriesKey>().ok().map(|key| self.get(key))
    }

    /// Reassemble one row
    pub fn row(&self, index: usize) -> Option<YearRow> {
        let label = self.labels.get(index)?.clone();
        Some(YearRow {
            label,
            principal: self.principal[index],
            gross_return: self.gross_return[index],
            savings_contribution: self.savings_contribution[index],
            net_event_amount: self.net_event_amount[index],
            net_withdrawal: self.net_withdrawal[index],
            withdrawal_tax: self.withdrawal_tax[index],
            event_tax: self.event_tax[index],
            bond_tax: self.bond_tax[index],
            settled_event_tax: self.settled_event_tax[index],
            settled_bond_tax: self.settled_bond_tax[index],
            inflation_and_fees: self.inflation_and_fees[index],
            stock_pct: self.stock_pct[index],
            bond_pct: self.bond_pct[index],
            invested_capital_balance: self.invested_capital_balance[index],
            end_principal: self.end_principal[index],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = YearRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Portfolio value after the last simulated year
    pub fn final_portfolio_value(&self) -> f64 {
        self.end_principal.last().copied().unwrap_or(0.0)
    }

    /// Totals over the simulated years for the textual report
    pub fn summary(&self) -> ProjectionSummary {
        let total = |key: SeriesKey| -> f64 { self.get(key).iter().skip(1).sum() };

        let first_depleted_year = self
            .end_principal
            .iter()
            .position(|&value| value < 0.0)
            .map(|i| self.labels[i].clone());

        ProjectionSummary {
            total_years: self.len().saturating_sub(1) as u32,
            total_gross_return: total(SeriesKey::GrossReturn),
            total_savings: total(SeriesKey::SavingsContribution),
            total_net_event_amount: total(SeriesKey::NetEventAmount),
            total_net_withdrawal: total(SeriesKey::NetWithdrawal),
            total_withdrawal_tax: total(SeriesKey::WithdrawalTax),
            total_event_tax: total(SeriesKey::EventTax),
            total_bond_tax: total(SeriesKey::BondTax),
            total_settled_tax: total(SeriesKey::SettledEventTax) + total(SeriesKey::SettledBondTax),
            total_inflation_and_fees: total(SeriesKey::InflationAndFees),
            final_portfolio_value: self.final_portfolio_value(),
            final_invested_capital: self.invested_capital_balance.last().copied().unwrap_or(0.0),
            first_depleted_year,
        }
    }
}

/// Accumulates rows into [`OutputSeries`], rounding on the way in
#[derive(Debug, Default)]
pub struct OutputSeriesBuilder {
    series: OutputSeries,
}

impl OutputSeriesBuilder {
    pub fn with_capacity(rows: usize) -> Self {
        let column = || Vec::with_capacity(rows);
        Self {
            series: OutputSeries {
                labels: Vec::with_capacity(rows),
                principal: column(),
                gross_return: column(),
                savings_contribution: column(),
                net_event_amount: column(),
                net_withdrawal: column(),
                withdrawal_tax: column(),
                event_tax: column(),
                bond_tax: column(),
                settled_event_tax: column(),
                settled_bond_tax: column(),
                inflation_and_fees: column(),
                stock_pct: column(),
                bond_pct: column(),
                invested_capital_balance: column(),
                end_principal: column(),
            },
        }
    }

    pub fn push(&mut self, row: &YearRow) {
        let row = row.rounded();
        let s = &mut self.series;
        s.labels.push(row.label);
        s.principal.push(row.principal);
        s.gross_return.push(row.gross_return);
        s.savings_contribution.push(row.savings_contribution);
        s.net_event_amount.push(row.net_event_amount);
        s.net_withdrawal.push(row.net_withdrawal);
        s.withdrawal_tax.push(row.withdrawal_tax);
        s.event_tax.push(row.event_tax);
        s.bond_tax.push(row.bond_tax);
        s.settled_event_tax.push(row.settled_event_tax);
        s.settled_bond_tax.push(row.settled_bond_tax);
        s.inflation_and_fees.push(row.inflation_and_fees);
        s.stock_pct.push(row.stock_pct);
        s.bond_pct.push(row.bond_pct);
        s.invested_capital_balance.push(row.invested_capital_balance);
        s.end_principal.push(row.end_principal);
    }

    pub fn finish(self) -> OutputSeries {
        self.series
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_gross_return: f64,
    pub total_savings: f64,
    pub total_net_event_amount: f64,
    pub total_net_withdrawal: f64,
    pub total_withdrawal_tax: f64,
    pub total_event_tax: f64,
    pub total_bond_tax: f64,
    pub total_settled_tax: f64,
    pub total_inflation_and_fees: f64,
    pub final_portfolio_value: f64,
    pub final_invested_capital: f64,
    pub first_depleted_year: Option<String>,
}
