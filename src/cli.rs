//! CLI definition and dispatch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::http_broker_adapter::HttpBrokerAdapter;
use crate::adapters::sqlite_cache_adapter::SqliteCacheAdapter;
use crate::domain::backtest::run_backtest;
use crate::domain::candle::{Candle, Interval};
use crate::domain::error::TradecoreError;
use crate::domain::history::fetch_candles_cached;
use crate::domain::indicator::{atr, bollinger, macd, rsi, sma, stochastic};
use crate::domain::metrics::Performance;
use crate::domain::optimizer::{optimize, OptimizeMetric, ParamGrid};
use crate::domain::strategy::SmaCrossStrategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::{HistoricalRequest, MarketDataPort};

#[derive(Parser, Debug)]
#[command(name = "tradecore", about = "Brokerage API client and backtesting toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch historical candles, using the local cache when possible
    Fetch {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        token: u32,
        #[arg(long, default_value = "day")]
        interval: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a backtest over a CSV candle file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Grid-search strategy parameters over a CSV candle file
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long, default_value = "total_pnl")]
        metric: String,
    },
    /// Print the latest indicator values for a CSV candle file
    Indicators {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long, default_value_t = 14)]
        window: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Fetch {
            config,
            token,
            interval,
            from,
            to,
            output,
        } => run_fetch(&config, token, &interval, &from, &to, output.as_ref()),
        Command::Backtest { config, data } => run_backtest_cmd(&config, &data),
        Command::Optimize {
            config,
            data,
            metric,
        } => run_optimize(&config, &data, &metric),
        Command::Indicators { data, window } => run_indicators(&data, window),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradecoreError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn parse_datetime(raw: &str, key: &str) -> Result<DateTime<Utc>, TradecoreError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(TradecoreError::InvalidRequest {
        reason: format!("{key}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got {raw}"),
    })
}

fn run_fetch(
    config_path: &PathBuf,
    token: u32,
    interval: &str,
    from: &str,
    to: &str,
    output: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: Build the request
    let interval = match Interval::parse(interval) {
        Some(i) => i,
        None => {
            eprintln!("error: unknown interval {interval}");
            return ExitCode::from(4);
        }
    };
    let request = match build_request(token, interval, from, to) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Broker adapter
    let broker = match HttpBrokerAdapter::from_config(&config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Fetch, through the cache when one is configured and enabled
    let candles = if cache_enabled(&config) {
        let cache = match SqliteCacheAdapter::from_config(&config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = cache.initialize_schema() {
            eprintln!("error: {e}");
            return (&e).into();
        }
        fetch_candles_cached(&broker, &cache, &request)
    } else {
        broker.fetch_candles(&request)
    };

    let candles = match candles {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Fetched {} candles", candles.len());

    // Stage 5: Write CSV
    match write_candles_csv(&candles, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// The cache is used when a path is configured and `[cache] enabled` is not
/// set to false.
fn cache_enabled(config: &dyn ConfigPort) -> bool {
    config.get_bool("cache", "enabled", true) && config.get_string("cache", "path").is_some()
}

fn build_request(
    token: u32,
    interval: Interval,
    from: &str,
    to: &str,
) -> Result<HistoricalRequest, TradecoreError> {
    let from = parse_datetime(from, "from")?;
    let to = parse_datetime(to, "to")?;
    if from > to {
        return Err(TradecoreError::InvalidRequest {
            reason: format!("from ({from}) is after to ({to})"),
        });
    }
    Ok(HistoricalRequest {
        instrument_token: token,
        interval,
        from,
        to,
    })
}

fn write_candles_csv(
    candles: &[Candle],
    output: Option<&PathBuf>,
) -> Result<(), TradecoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["timestamp", "open", "high", "low", "close", "volume", "oi"])
        .map_err(std::io::Error::other)?;
    for c in candles {
        writer
            .write_record([
                c.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                c.open.to_string(),
                c.high.to_string(),
                c.low.to_string(),
                c.close.to_string(),
                c.volume.to_string(),
                c.oi.map(|v| v.to_string()).unwrap_or_default(),
            ])
            .map_err(std::io::Error::other)?;
    }
    let content = String::from_utf8(writer.into_inner().map_err(std::io::Error::other)?)
        .map_err(std::io::Error::other)?;

    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            eprintln!("Candles written to: {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn build_sma_strategy(config: &dyn ConfigPort) -> SmaCrossStrategy {
    SmaCrossStrategy {
        short_window: config.get_int("strategy", "short_window", 20) as usize,
        long_window: config.get_int("strategy", "long_window", 50) as usize,
        quantity: config.get_double("strategy", "quantity", 1.0),
    }
}

fn run_backtest_cmd(config_path: &PathBuf, data_path: &PathBuf) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: Load candles
    eprintln!("Loading candles from {}", data_path.display());
    let candles = match CsvCandleAdapter::new(data_path).load_candles() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if candles.is_empty() {
        eprintln!("error: no candles in {}", data_path.display());
        return ExitCode::from(5);
    }

    // Stage 3: Build strategy and run
    let strategy = build_sma_strategy(&config);
    let initial_capital = config.get_double("backtest", "initial_capital", 100_000.0);

    eprintln!(
        "Running sma-cross ({}/{}) over {} candles",
        strategy.short_window,
        strategy.long_window,
        candles.len()
    );

    let trades = match run_backtest(&candles, &strategy) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Metrics
    let performance = Performance::compute(&trades, initial_capital);
    print_performance(&performance);
    ExitCode::SUCCESS
}

fn print_performance(performance: &Performance) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Total Trades:     {}", performance.total_trades);
    eprintln!("Total P&L:        {:.2}", performance.total_pnl);
    eprintln!("Max Drawdown:     {:.2}%", performance.max_drawdown * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", performance.sharpe_ratio);
    eprintln!("Win Rate:         {:.1}%", performance.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", performance.profit_factor);
}

/// Comma-separated numeric candidates from the `[optimize]` section.
fn candidate_list(config: &dyn ConfigPort, key: &str) -> Option<Vec<f64>> {
    let raw = config.get_string("optimize", key)?;
    let values: Vec<f64> = raw
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if values.is_empty() { None } else { Some(values) }
}

fn run_optimize(config_path: &PathBuf, data_path: &PathBuf, metric: &str) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let metric = match OptimizeMetric::parse(metric) {
        Some(m) => m,
        None => {
            eprintln!("error: unknown metric {metric}");
            return ExitCode::from(4);
        }
    };

    // Stage 2: Load candles
    eprintln!("Loading candles from {}", data_path.display());
    let candles = match CsvCandleAdapter::new(data_path).load_candles() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Build the grid
    let short_candidates =
        candidate_list(&config, "short_windows").unwrap_or_else(|| vec![10.0, 20.0]);
    let long_candidates =
        candidate_list(&config, "long_windows").unwrap_or_else(|| vec![50.0, 100.0]);
    let quantity = config.get_double("strategy", "quantity", 1.0);
    let initial_capital = config.get_double("backtest", "initial_capital", 100_000.0);

    let mut grid = ParamGrid::new();
    grid.insert("short_window".into(), short_candidates);
    grid.insert("long_window".into(), long_candidates);

    let combinations: usize = grid.values().map(|v| v.len()).product();
    eprintln!("Searching {} combinations, maximizing {}", combinations, metric);

    // Stage 4: Exhaustive search
    let best = match optimize(
        &candles,
        |params| SmaCrossStrategy {
            short_window: params["short_window"] as usize,
            long_window: params["long_window"] as usize,
            quantity,
        },
        &grid,
        metric,
        initial_capital,
    ) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match best {
        Some(result) => {
            eprintln!("\n=== Best Parameters ===");
            for (name, value) in &result.params {
                eprintln!("{name}: {value}");
            }
            print_performance(&result.performance);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("error: parameter grid has an empty candidate list");
            ExitCode::from(4)
        }
    }
}

fn run_indicators(data_path: &PathBuf, window: usize) -> ExitCode {
    eprintln!("Loading candles from {}", data_path.display());
    let candles = match CsvCandleAdapter::new(data_path).load_candles() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if candles.is_empty() {
        eprintln!("error: no candles in {}", data_path.display());
        return ExitCode::from(5);
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let macd_point = macd::macd_latest(&closes);
    let bands = bollinger::bollinger_latest(&closes, 20, 2.0);
    let stoch = stochastic::stochastic_latest(&candles, 14, 3);

    println!("candles:    {}", candles.len());
    println!("sma({window}):    {:.4}", sma::sma_latest(&closes, window));
    println!("rsi({window}):    {:.4}", rsi::rsi_latest(&closes, window));
    println!("macd:       {:.4}", macd_point.macd);
    println!("signal:     {:.4}", macd_point.signal);
    println!("histogram:  {:.4}", macd_point.histogram);
    println!(
        "bollinger:  {:.4} / {:.4} / {:.4}",
        bands.lower, bands.middle, bands.upper
    );
    println!(
        "stochastic: %K {:.4}, %D {:.4}",
        stoch.percent_k, stoch.percent_d
    );
    println!("atr({window}):    {:.4}", atr::atr_latest(&candles, window));

    ExitCode::SUCCESS
}
