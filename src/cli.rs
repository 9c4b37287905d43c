//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvFundAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_settings_adapter::MemorySettingsAdapter;
use crate::domain::compounding::cumulative_yield;
use crate::domain::config_validation::{configured_top_n, configured_window, validate_config};
use crate::domain::eligibility::Candidate;
use crate::domain::error::FindBetterError;
use crate::domain::find_better::FindBetter;
use crate::domain::matching::{InStrategyQuery, InStrategyTargets, MatchResult};
use crate::domain::period::ReportPeriod;
use crate::domain::record::FundId;
use crate::domain::series::FundUniverse;
use crate::domain::thresholds::{ThresholdStore, ToleranceOverrides};
use crate::domain::trailing::{TrailingWindow, YieldSource, precompute_universe, window_returns};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::FundDataPort;

#[derive(Parser, Debug)]
#[command(name = "findbetter", about = "Trailing yield comparison and fund matching")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trailing compounded yield of one fund
    Yield {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        fund: FundId,
        /// 3M, 6M, 1Y, 3Y, 5Y or a month count
        #[arg(short, long)]
        window: Option<TrailingWindow>,
        /// Anchor period as YYYYMM; defaults to the latest in the data
        #[arg(short, long)]
        period: Option<ReportPeriod>,
    },
    /// Funds that beat a reference fund, with and without a similar allocation
    FindBetter {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        fund: FundId,
        #[arg(short, long)]
        window: Option<TrailingWindow>,
        #[arg(short, long)]
        period: Option<ReportPeriod>,
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Funds that beat explicit targets
    InStrategy(InStrategyArgs),
    /// Inspect or change matching thresholds
    Thresholds {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: ThresholdAction,
    },
    /// List reporting periods in the data, latest first
    Periods {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThresholdAction {
    /// Print every threshold with its bounds
    List,
    /// Set one threshold
    Set {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(long)]
        operator: Option<i64>,
    },
}

#[derive(Args, Debug)]
pub struct InStrategyArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    #[arg(long)]
    pub target_yield: f64,
    #[arg(long)]
    pub target_std: Option<f64>,
    #[arg(long)]
    pub stock: Option<f64>,
    #[arg(long)]
    pub foreign: Option<f64>,
    #[arg(long)]
    pub currency: Option<f64>,
    #[arg(long)]
    pub liquidity: Option<f64>,
    #[arg(short, long, default_value = "1Y")]
    pub window: String,
    #[arg(short, long)]
    pub period: Option<ReportPeriod>,
    #[arg(long)]
    pub classification: Option<String>,
    #[arg(long)]
    pub exclude: Option<FundId>,
    #[arg(short = 'n', long)]
    pub top: Option<usize>,
    #[arg(long)]
    pub yield_tol: Option<f64>,
    #[arg(long)]
    pub std_tol: Option<f64>,
    #[arg(long)]
    pub stock_tol: Option<f64>,
    #[arg(long)]
    pub foreign_tol: Option<f64>,
    #[arg(long)]
    pub currency_tol: Option<f64>,
    #[arg(long)]
    pub liquidity_tol: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Yield {
            config,
            fund,
            window,
            period,
        } => run_yield(&config, fund, window, period),
        Command::FindBetter {
            config,
            fund,
            window,
            period,
            top,
        } => run_find_better(&config, fund, window, period, top),
        Command::InStrategy(args) => run_in_strategy(&args),
        Command::Thresholds { config, action } => run_thresholds(&config, action),
        Command::Periods { config } => run_periods(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(e: FindBetterError) -> ExitCode {
    eprintln!("error: {e}");
    (&e).into()
}

/// Loads and validates the configuration file.
pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(fail)?;
    validate_config(&adapter).map_err(fail)?;
    Ok(adapter)
}

/// Loads every fund record and fills the standard trailing columns.
pub fn load_universe(config: &dyn ConfigPort) -> Result<FundUniverse, FindBetterError> {
    let csv_path = config
        .get_string("data", "csv_path")
        .ok_or_else(|| FindBetterError::ConfigMissing {
            section: "data".into(),
            key: "csv_path".into(),
        })?;
    let mut universe = CsvFundAdapter::new(PathBuf::from(csv_path)).load_universe()?;
    precompute_universe(&mut universe);
    Ok(universe)
}

/// Opens the threshold store: the settings database when one is configured,
/// otherwise process-local settings.
pub fn open_store(config: &dyn ConfigPort) -> Result<ThresholdStore, FindBetterError> {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteSettingsAdapter;

        if config.has("settings", "sqlite_path") {
            let adapter = SqliteSettingsAdapter::from_config(config)?;
            adapter.initialize_schema()?;
            return ThresholdStore::load(Box::new(adapter));
        }
    }

    #[cfg(not(feature = "sqlite"))]
    if config.has("settings", "sqlite_path") {
        tracing::warn!("sqlite feature disabled; thresholds will not be persisted");
    }

    ThresholdStore::load(Box::new(MemorySettingsAdapter::new()))
}

/// `true` when threshold updates outlive the process.
pub fn persistent_store_configured(config: &dyn ConfigPort) -> bool {
    cfg!(feature = "sqlite") && config.has("settings", "sqlite_path")
}

/// The requested anchor, which must appear in the data, or the latest period.
fn resolve_anchor(
    universe: &FundUniverse,
    period: Option<ReportPeriod>,
) -> Result<ReportPeriod, FindBetterError> {
    match period {
        Some(p) if universe.iter().any(|s| s.get(p).is_some()) => Ok(p),
        Some(p) => Err(FindBetterError::UnknownPeriod(p.raw())),
        None => universe
            .latest_period()
            .ok_or_else(|| FindBetterError::DataParse {
                row: 0,
                reason: "no fund records loaded".into(),
            }),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn print_matches(title: &str, matches: &MatchResult) {
    println!("\n=== {} ({}) ===", title, matches.len());
    if matches.is_empty() {
        println!("  no better funds found");
        return;
    }
    for (rank, c) in matches.iter().enumerate() {
        print_candidate(rank + 1, c);
    }
}

fn print_candidate(rank: usize, c: &Candidate) {
    let r = &c.record;
    println!(
        "  {:>2}. {:<8} {:<32} yield {:>7.2}%  std {:>6}  stock {:>6}  foreign {:>6}  currency {:>6}  liquid {:>6}",
        rank,
        r.fund_id,
        r.fund_name,
        c.calc_yield,
        fmt_opt(r.std_dev),
        fmt_opt(r.stock_exposure),
        fmt_opt(r.foreign_exposure),
        fmt_opt(r.currency_exposure),
        fmt_opt(r.liquid_assets),
    );
}

fn run_yield(
    config_path: &PathBuf,
    fund: FundId,
    window: Option<TrailingWindow>,
    period: Option<ReportPeriod>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let window = match window.map_or_else(|| configured_window(&config), Ok) {
        Ok(w) => w,
        Err(e) => return fail(e),
    };

    // Stage 2: Load data
    let universe = match load_universe(&config) {
        Ok(u) => u,
        Err(e) => return fail(e),
    };
    let anchor = match resolve_anchor(&universe, period) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    // Stage 3: Resolve
    let store = ThresholdStore::new();
    let engine = FindBetter::new(&universe, &store);
    let resolved = engine.trailing_yield(fund, window, anchor);

    match (resolved.value, resolved.source) {
        (Some(value), source) => {
            let source = match source {
                Some(YieldSource::Precomputed) => "precomputed",
                _ => "computed",
            };
            println!(
                "{} {} trailing yield to {}: {:.2}% ({})",
                fund,
                window,
                anchor.label(),
                value,
                source
            );
            if let Some(total) = universe
                .series(fund)
                .and_then(|s| window_returns(s, window, anchor))
                .and_then(|r| cumulative_yield(&r))
            {
                println!("  cumulative over reported months: {total:.2}%");
            }
            ExitCode::SUCCESS
        }
        (None, _) => fail(FindBetterError::NotComputable {
            fund_id: fund,
            months: window.months(),
            period: anchor.raw(),
        }),
    }
}

fn run_find_better(
    config_path: &PathBuf,
    fund: FundId,
    window: Option<TrailingWindow>,
    period: Option<ReportPeriod>,
    top: Option<usize>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let window = match window.map_or_else(|| configured_window(&config), Ok) {
        Ok(w) => w,
        Err(e) => return fail(e),
    };
    let limit = top.unwrap_or_else(|| configured_top_n(&config));

    // Stage 2: Load data and thresholds
    let universe = match load_universe(&config) {
        Ok(u) => u,
        Err(e) => return fail(e),
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let anchor = match resolve_anchor(&universe, period) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    // Stage 3: Match
    eprintln!(
        "Comparing fund {} over {} to {} ({} funds loaded)",
        fund,
        window,
        anchor.label(),
        universe.len()
    );
    let engine = FindBetter::new(&universe, &store);
    let outcome = match engine.find_better(fund, window, anchor, limit) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    // Stage 4: Report
    let r = &outcome.reference;
    println!(
        "Reference: {} {} ({}) {} yield {:.2}%  std {}",
        r.fund_id,
        r.fund_name,
        r.classification.as_deref().unwrap_or("unclassified"),
        outcome.window,
        outcome.reference_yield,
        fmt_opt(r.std_dev),
    );
    println!("Eligible candidates: {}", outcome.eligible_count);
    print_matches("Better funds, any strategy", &outcome.unrestricted);
    print_matches("Better funds, similar strategy", &outcome.similar_strategy);
    ExitCode::SUCCESS
}

fn run_in_strategy(args: &InStrategyArgs) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", args.config.display());
    let config = match load_config(&args.config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: Load data and thresholds
    let universe = match load_universe(&config) {
        Ok(u) => u,
        Err(e) => return fail(e),
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let anchor = match resolve_anchor(&universe, args.period) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    // Stage 3: Build query
    let targets = InStrategyTargets {
        yield_pct: args.target_yield,
        std_dev: args.target_std,
        stock: args.stock,
        foreign: args.foreign,
        currency: args.currency,
        liquidity: args.liquidity,
    };
    let mut query = match InStrategyQuery::new(&args.window, anchor, targets) {
        Ok(q) => q,
        Err(e) => {
            return fail(FindBetterError::ConfigInvalid {
                section: "in-strategy".into(),
                key: "window".into(),
                reason: e.to_string(),
            });
        }
    };
    query.classification = args.classification.clone();
    query.exclude_fund = args.exclude;
    query.limit = args.top.unwrap_or_else(|| configured_top_n(&config));
    query.overrides = ToleranceOverrides {
        yield_pct: args.yield_tol,
        std_dev: args.std_tol,
        stock: args.stock_tol,
        foreign: args.foreign_tol,
        currency: args.currency_tol,
        liquidity: args.liquidity_tol,
    };

    // Stage 4: Match and report
    let engine = FindBetter::new(&universe, &store);
    let matches = engine.in_strategy(&query);
    println!(
        "Target yield {:.2}% over {} to {}",
        query.targets.yield_pct,
        query.window,
        anchor.label()
    );
    print_matches("Funds matching targets", &matches);
    ExitCode::SUCCESS
}

fn run_thresholds(config_path: &PathBuf, action: ThresholdAction) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    match action {
        ThresholdAction::List => {
            for (key, s) in store.get_all() {
                println!(
                    "{:<28} {:>6.2}  [{:.2}, {:.2}] default {:.2}  {}",
                    key, s.value, s.min, s.max, s.default, s.description
                );
            }
            ExitCode::SUCCESS
        }
        ThresholdAction::Set {
            key,
            value,
            operator,
        } => {
            if !persistent_store_configured(&config) {
                return fail(FindBetterError::ConfigMissing {
                    section: "settings".into(),
                    key: "sqlite_path".into(),
                });
            }
            let Some(current) = store.get_setting(&key) else {
                return fail(FindBetterError::ConfigInvalid {
                    section: "thresholds".into(),
                    key,
                    reason: "unknown threshold".into(),
                });
            };
            if !store.update_by(&key, value, operator) {
                return fail(FindBetterError::ConfigInvalid {
                    section: "thresholds".into(),
                    key,
                    reason: format!(
                        "value {} rejected (allowed range {} to {})",
                        value, current.min, current.max
                    ),
                });
            }
            println!("{} = {}", key, store.get(&key));
            ExitCode::SUCCESS
        }
    }
}

fn run_periods(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let universe = match load_universe(&config) {
        Ok(u) => u,
        Err(e) => return fail(e),
    };

    let periods = universe.periods();
    if periods.is_empty() {
        eprintln!("No reporting periods found");
    }
    for p in &periods {
        println!("{}\t{}", p, p.label());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let window = configured_window(&config).unwrap_or_default();
    println!("  data:      {}", config.get_string("data", "csv_path").unwrap_or_default());
    println!(
        "  settings:  {}",
        config
            .get_string("settings", "sqlite_path")
            .unwrap_or_else(|| "in-memory".to_string())
    );
    println!("  window:    {}", window);
    println!("  top_n:     {}", configured_top_n(&config));
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
