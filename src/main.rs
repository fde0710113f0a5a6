//! Portfolio Projection CLI
//!
//! Command-line interface for running portfolio projections

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use portfolio_projection::config::{load_config, validate};
use portfolio_projection::scenario::ScenarioRunner;
use portfolio_projection::{
    find_minimum_annual_savings, project, GoalSeekOptions, InvestorType, OutputSeries,
    SimulationConfig, TaperingPolicy,
};

#[derive(Debug, Parser)]
#[command(name = "portfolio-projection")]
#[command(about = "Project portfolio value, taxes and capital basis year by year", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the tapering policy (none, 5%, 10%, 15%)
    #[arg(long, global = true)]
    tapering: Option<TaperingPolicy>,

    /// Override the investor type (private, corporate)
    #[arg(long, global = true)]
    investor_type: Option<InvestorType>,

    /// Override the first calendar year
    #[arg(long, global = true)]
    start_year: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one projection and print a summary
    Project {
        /// Write every output series to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Number of years to print to the console
        #[arg(long, default_value_t = 30)]
        rows: usize,
    },

    /// Find the smallest annual savings that keeps the plan solvent
    GoalSeek {
        #[arg(long, default_value_t = 10_000.0)]
        step: f64,

        #[arg(long, default_value_t = 100_000_000.0)]
        ceiling: f64,

        #[arg(long, default_value_t = 64)]
        max_iterations: u32,
    },

    /// Run the projection over a range of annual savings
    Sweep {
        #[arg(long, default_value_t = 0.0)]
        from: f64,

        #[arg(long)]
        to: f64,

        #[arg(long, default_value_t = 50_000.0)]
        step: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Command::Project { output, format, rows } => run_projection(&config, output.as_deref(), format, rows),
        Command::GoalSeek {
            step,
            ceiling,
            max_iterations,
        } => run_goal_seek(
            &config,
            GoalSeekOptions {
                step,
                ceiling,
                max_iterations,
            },
        ),
        Command::Sweep { from, to, step } => run_sweep(config, from, to, step),
    }
}

fn build_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(tapering) = cli.tapering {
        config.tapering = tapering;
    }
    if let Some(investor_type) = cli.investor_type {
        config.investor_type = investor_type;
    }
    if let Some(start_year) = cli.start_year {
        config.start_year = start_year;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

fn run_projection(config: &SimulationConfig, output_path: Option<&Path>, format: OutputFormat, rows: usize) -> Result<()> {
    let output = project(config);

    println!("Portfolio Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("===========================\n");
    println!("  Starting value:   {:.0}", config.starting_portfolio_value());
    println!("  Invested capital: {:.0}", config.invested_capital);
    println!(
        "  Years:            {} investment + {} payout from {}",
        config.investment_years, config.payout_years, config.start_year
    );
    println!("  Investor type:    {}", config.investor_type);
    println!("  Tapering:         {}", config.tapering);
    println!();

    print_table(&output, rows);

    if let Some(path) = output_path {
        match format {
            OutputFormat::Csv => write_csv(path, &output)?,
            OutputFormat::Json => write_json(path, &output)?,
        }
        println!("\nFull results written to: {}", path.display());
    }

    let summary = output.summary();
    println!("\nSummary:");
    println!("  Total gross return:   {:.0}", summary.total_gross_return);
    println!("  Total savings:        {:.0}", summary.total_savings);
    println!("  Total net events:     {:.0}", summary.total_net_event_amount);
    println!("  Total net withdrawal: {:.0}", summary.total_net_withdrawal);
    println!(
        "  Total tax accrued:    {:.0}",
        summary.total_withdrawal_tax + summary.total_event_tax + summary.total_bond_tax
    );
    println!("  Final value:          {:.0}", summary.final_portfolio_value);
    println!("  Final basis:          {:.0}", summary.final_invested_capital);
    match summary.first_depleted_year {
        Some(year) => println!("  Depleted in:          {}", year),
        None => println!("  Plan is sustainable over the horizon"),
    }

    Ok(())
}

fn print_table(output: &OutputSeries, rows: usize) {
    println!(
        "{:>6} {:>14} {:>12} {:>10} {:>12} {:>12} {:>10} {:>10} {:>10} {:>5} {:>14}",
        "Year", "Principal", "Return", "Savings", "Events", "Withdrawal", "WdTax", "EventTax", "BondTax", "Stock", "Basis"
    );
    println!("{}", "-".repeat(125));

    for row in output.rows().take(rows + 1) {
        println!(
            "{:>6} {:>14.0} {:>12.0} {:>10.0} {:>12.0} {:>12.0} {:>10.0} {:>10.0} {:>10.0} {:>5.0} {:>14.0}",
            row.label,
            row.principal,
            row.gross_return,
            row.savings_contribution,
            row.net_event_amount,
            row.net_withdrawal,
            row.withdrawal_tax,
            row.event_tax,
            row.bond_tax,
            row.stock_pct,
            row.invested_capital_balance,
        );
    }

    if output.len() > rows + 1 {
        println!("... ({} more years)", output.len() - rows - 1);
    }
}

fn write_csv(path: &Path, output: &OutputSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for row in output.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, output: &OutputSeries) -> Result<()> {
    let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), output)?;
    Ok(())
}

fn run_goal_seek(config: &SimulationConfig, options: GoalSeekOptions) -> Result<()> {
    let savings = find_minimum_annual_savings(config, &options).context("goal seek failed")?;
    println!("Minimum annual savings: {:.0}", savings);
    Ok(())
}

fn run_sweep(config: SimulationConfig, from: f64, to: f64, step: f64) -> Result<()> {
    anyhow::ensure!(step > 0.0, "sweep step must be positive");
    anyhow::ensure!(to >= from, "sweep range is empty");

    let count = ((to - from) / step).floor() as usize + 1;
    let amounts: Vec<f64> = (0..count).map(|i| from + i as f64 * step).collect();

    let runner = ScenarioRunner::new(config);
    println!("{:>14} {:>16} {:>10}", "Savings", "Final value", "Depleted");
    for (savings, output) in runner.savings_sweep(&amounts) {
        let summary = output.summary();
        println!(
            "{:>14.0} {:>16.0} {:>10}",
            savings,
            summary.final_portfolio_value,
            summary.first_depleted_year.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
