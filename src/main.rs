use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use pto_bridge::config::{Config, ConfigOverrides};
use pto_bridge::engine::{plan_in, PlanOutcome, PlanRequest};
use pto_bridge::optimizer::manual::PlanningSession;
use pto_bridge::output::csv::{
    alternatives_to_csv, bridges_to_csv, metrics_to_csv, suggestion_to_csv,
};
use pto_bridge::output::json::render_json;
use pto_bridge::output::table::{
    render_alternatives_table, render_bridges_table, render_metrics_table,
    render_suggestion_table,
};
use pto_bridge::server::run_server;
use pto_bridge::types::{Bridge, Suggestion};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "pto-bridge",
    about = "Plan paid time off around weekends and holidays"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    year: Option<i32>,
    #[arg(short, long)]
    budget: Option<u32>,
    #[arg(short, long)]
    strategy: Option<String>,
    #[arg(long = "allow-past-days")]
    allow_past_days: bool,
    /// JSON file of holidays; replaces the configured file.
    #[arg(long)]
    holidays: Option<String>,
    #[arg(long)]
    region: Option<String>,
    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long)]
    today: Option<NaiveDate>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Best plan for the chosen strategy.
    Suggest,
    /// Every bridge worth taking, ranked.
    Bridges,
    /// The plan next to its alternatives.
    Alternatives,
    /// Metrics of the plan or an alternative, after optional day toggles.
    Metrics {
        /// Show an alternative (1-based) instead of the primary plan.
        #[arg(long)]
        alternative: Option<usize>,
        /// Days to toggle on or off, applied in order.
        #[arg(long, num_args = 1..)]
        toggle: Vec<NaiveDate>,
    },
    /// Run the REST API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    /// Write or print the configuration.
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        year: cli.year,
        budget: cli.budget,
        strategy: cli.strategy.clone(),
        allow_past_days: cli.allow_past_days.then_some(true),
        holidays_file: cli.holidays.clone(),
        region: cli.region.clone(),
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let request = PlanRequest {
        horizon: config.horizon_anchors(today.year()),
        holidays: config.resolved_holidays()?,
        budget: config.planner.budget,
        strategy: config.strategy(),
        allow_past_days: config.planner.allow_past_days,
        today,
        max_alternatives: config.planner.max_alternatives,
    };
    info!(
        strategy = %request.strategy,
        budget = request.budget,
        months = request.horizon.len(),
        holidays = request.holidays.len(),
        "planning"
    );
    let ctx = request.context();
    let outcome = plan_in(&ctx, &request);

    match &cli.command {
        Commands::Suggest => print_suggestion(&outcome.primary, cli.output)?,
        Commands::Bridges => print_bridges(&outcome.bridges, cli.output)?,
        Commands::Alternatives => print_alternatives(&outcome, cli.output)?,
        Commands::Metrics {
            alternative,
            toggle,
        } => {
            let mut session = PlanningSession::new(outcome.primary, outcome.alternatives);
            if let Some(n) = alternative {
                if *n == 0 || !session.select_alternative(n - 1) {
                    return Err(anyhow!(
                        "alternative {n} does not exist ({} available)",
                        session.alternatives().len()
                    ));
                }
            }
            for day in toggle {
                if !session.toggle_day_selection(*day, request.budget) {
                    warn!(%day, "no PTO budget left, toggle ignored");
                }
            }
            let metrics = session.metrics(&ctx, request.budget);
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_metrics_table(&metrics));
                    println!(
                        "{} days selected, {} remaining",
                        session.active_days().len(),
                        session.remaining_days(request.budget)
                    );
                }
                OutputFormat::Json => println!("{}", render_json(&metrics)?),
                OutputFormat::Csv => println!("{}", metrics_to_csv(&metrics)?),
            }
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_suggestion(suggestion: &Suggestion, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_suggestion_table(suggestion));
            println!("{}", render_metrics_table(&suggestion.metrics));
        }
        OutputFormat::Json => println!("{}", render_json(suggestion)?),
        OutputFormat::Csv => println!("{}", suggestion_to_csv(suggestion)?),
    }
    Ok(())
}

fn print_bridges(bridges: &[Bridge], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_bridges_table(bridges)),
        OutputFormat::Json => println!("{}", render_json(bridges)?),
        OutputFormat::Csv => println!("{}", bridges_to_csv(bridges)?),
    }
    Ok(())
}

fn print_alternatives(outcome: &PlanOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!(
            "{}",
            render_alternatives_table(&outcome.primary, &outcome.alternatives)
        ),
        OutputFormat::Json => println!("{}", render_json(&outcome.alternatives)?),
        OutputFormat::Csv => println!("{}", alternatives_to_csv(&outcome.alternatives)?),
    }
    Ok(())
}
