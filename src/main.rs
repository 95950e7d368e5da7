//! StockWatcher - Main Entry Point
//!
//! Runs one evaluate → report → deliver cycle and exits. Scheduling is
//! left to an external trigger such as cron.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use stock_watcher::common::format::{format_percent, format_price};
use stock_watcher::config::{load_config, load_watchlist};
use stock_watcher::strategy::evaluate_scenarios;
use stock_watcher::{
    evaluate, AppConfig, Dispatcher, InstrumentConfig, QuoteSource, SinaQuoteClient,
    WeChatClient, Watcher,
};

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, default_value = "watcher.toml")]
    config: String,

    /// Path to the JSON watchlist (overrides the settings file)
    #[arg(short, long, env = "WATCHLIST_PATH")]
    watchlist: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides `settings.log_level`
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Evaluate and print the report without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Validate settings and watchlist, print the rules with live and
    /// boundary-price decisions, then exit
    #[arg(long, conflicts_with = "dry_run")]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Settings are loaded first so the file can choose the log level
    let mut config = load_config(Some(&args.config))?;
    init_logging(
        config.settings.log_level_or(args.log_level.as_deref()),
        args.log_format,
    )?;

    info!("Starting stock watcher");
    info!("Configuration file: {}", args.config);
    if let Some(path) = &args.watchlist {
        config.watchlist_path = path.clone();
    }
    let watchlist = load_watchlist(&config.watchlist_path)?;

    let timeout = config.settings.request_timeout();
    let quotes = SinaQuoteClient::with_timeout(&config.quote, timeout)?;

    if args.check {
        print_check(&config, &watchlist, &quotes).await?;
        return Ok(());
    }

    let dispatcher = if args.dry_run {
        None
    } else {
        let credentials = config.wechat.credentials()?;
        let template_id = credentials.template_id.clone();
        let client = WeChatClient::with_timeout(&config.wechat.api_url, credentials, timeout)?;
        Some(Dispatcher::new(client, template_id, config.settings.send_delay()))
    };

    let watcher = Watcher::new(&config, &watchlist, quotes, dispatcher);
    let summary = match watcher.run_cycle().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Run aborted: {}", e);
            return Err(e.into());
        }
    };

    if args.dry_run {
        println!("{}\n\n{}", summary.report.title, summary.report.body);
    }

    summary.log();

    if summary.has_delivery_failures() {
        bail!("report could not be delivered to every recipient");
    }

    info!("Run complete");
    Ok(())
}

fn init_logging(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!(e))
}

async fn print_check(
    config: &AppConfig,
    watchlist: &[InstrumentConfig],
    quotes: &SinaQuoteClient,
) -> Result<()> {
    println!("Watchlist: {} ({} instruments)", config.watchlist_path, watchlist.len());
    for (i, instrument) in watchlist.iter().enumerate() {
        let market = instrument.market();
        println!("\n[{}] {} ({})", i + 1, instrument.name, instrument.code);
        println!("    base price: {}", format_price(Some(instrument.base_price), market));
        if let Some(buy_price) = instrument.buy_price {
            println!("    buy price:  {}", format_price(Some(buy_price), market));
        }
        for rule in &instrument.buy_rules {
            println!(
                "    buy  {}% of capital at -{}%",
                rule.buy_percent_of_capital, rule.trigger_percent_decrease
            );
        }
        for rule in &instrument.sell_rules {
            println!(
                "    sell {}% of position at +{}%",
                rule.sell_percent_of_position, rule.trigger_percent_increase
            );
        }

        match quotes.fetch_quote(&instrument.code).await {
            Ok(quote) => {
                let decision = evaluate(instrument, Some(&quote))?;
                println!(
                    "    live:  {} ({}) -> {} | {}",
                    format_price(decision.current_price, market),
                    format_percent(decision.percent_change),
                    decision.action_kind.label(),
                    decision.detail
                );
            }
            Err(e) => println!("    live:  unavailable ({})", e),
        }

        for (scenario, decision) in evaluate_scenarios(instrument)? {
            println!(
                "    {:<16} {} -> {} | {}",
                scenario.label,
                format_price(Some(scenario.price), market),
                decision.action_kind.label(),
                decision.detail
            );
        }
    }

    println!();
    match config.wechat.credentials() {
        Ok(creds) => println!("Credentials: present (app id {})", creds.app_id),
        Err(e) => println!("Credentials: {}", e),
    }
    println!("Recipients: {}", config.wechat.recipients.len());
    Ok(())
}
