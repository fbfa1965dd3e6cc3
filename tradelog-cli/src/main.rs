//! Tradelog CLI — journal commands over the position ledger.
//!
//! Commands:
//! - `open` — record a new position (account templates pre-fill defaults)
//! - `close` — close an open position and record the realized PnL
//! - `list` — query positions with status/symbol/market/account/date filters
//! - `analyze risk` / `analyze performance` — ledger analytics
//! - `account` — manage the accounts.json book
//!
//! This layer only parses input and renders output; every ledger operation
//! goes through `tradelog-core` and `tradelog-report`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tradelog_core::{
    format_holding_duration, Account, AccountBook, AccountTemplate, CloseParams, CloseReason,
    Direction, Journal, ListFilter, MarketContext, MarketType, OpenParams, Position, StatusFilter,
};
use tradelog_report::{analyze_performance, analyze_risk};

#[derive(Parser)]
#[command(name = "tradelog", about = "Tradelog — personal trading journal")]
struct Cli {
    /// Data directory holding the monthly ledger files and accounts.json.
    #[arg(long, short = 'd', global = true, default_value = "trading-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new open position.
    Open {
        /// Account name; its balance snapshot and template defaults apply.
        #[arg(long)]
        account: Option<String>,

        /// Instrument symbol (e.g. BTC/USDT). Falls back to the account template.
        #[arg(long)]
        symbol: Option<String>,

        /// Market type: crypto, forex, gold, silver, futures.
        #[arg(long)]
        market: Option<MarketType>,

        /// Direction: long or short.
        #[arg(long)]
        direction: Option<Direction>,

        /// Open price.
        #[arg(long)]
        price: f64,

        /// Position size.
        #[arg(long)]
        quantity: f64,

        /// Stop-loss price (required; long: below open, short: above).
        #[arg(long)]
        stop: f64,

        /// Take-profit price (required; long: above open, short: below).
        #[arg(long)]
        take: f64,

        /// Margin/cost committed to the position.
        #[arg(long)]
        margin: f64,

        /// Free-text reason for the trade.
        #[arg(long, default_value = "")]
        reason: String,

        /// Market context annotation: bull, bear, none.
        #[arg(long)]
        context: Option<MarketContext>,

        /// Open time (YYYY-MM-DD HH:MM:SS, local). Defaults to now.
        #[arg(long)]
        time: Option<String>,
    },
    /// Close an open position.
    Close {
        /// Position identifier (YYYYMMDD-HHMMSS-XXXX).
        position_id: String,

        /// Close price.
        #[arg(long)]
        price: f64,

        /// Quantity to close. Defaults to the full position quantity.
        #[arg(long)]
        quantity: Option<f64>,

        /// Close reason: stop_loss, take_profit, manual.
        #[arg(long, default_value = "manual")]
        reason: CloseReason,

        /// Free-text close note.
        #[arg(long, default_value = "")]
        note: String,

        /// Close time (YYYY-MM-DD HH:MM:SS, local). Defaults to now.
        #[arg(long)]
        time: Option<String>,
    },
    /// Query positions.
    List {
        /// Status filter: open, closed, all.
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Exact symbol match.
        #[arg(long)]
        symbol: Option<String>,

        /// Exact market-type match.
        #[arg(long)]
        market: Option<MarketType>,

        /// Exact account-name match.
        #[arg(long)]
        account: Option<String>,

        /// Earliest open date, inclusive (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Latest open date, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Ledger analytics.
    Analyze {
        #[command(subcommand)]
        action: AnalyzeAction,
    },
    /// Manage the account book.
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AnalyzeAction {
    /// Risk exposure over currently open positions.
    Risk {
        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Performance over closed positions.
    Performance {
        /// Earliest open date, inclusive (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Latest open date, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Add an account.
    Add {
        name: String,

        #[arg(long)]
        balance: f64,

        #[arg(long, default_value = "")]
        currency: String,
    },
    /// List all accounts.
    List,
    /// Update an account's balance.
    SetBalance { name: String, balance: f64 },
    /// Set or clear an account's open-time template.
    SetTemplate {
        name: String,

        /// Default instrument symbol (e.g. BTC/USDT).
        #[arg(long)]
        symbol: Option<String>,

        /// Default market type: crypto, forex, gold, silver, futures.
        #[arg(long)]
        market: Option<MarketType>,

        /// Default direction: long or short.
        #[arg(long)]
        direction: Option<Direction>,

        /// Remove the template entirely.
        #[arg(long, conflicts_with_all = ["symbol", "market", "direction"])]
        clear: bool,
    },
    /// Remove an account.
    Remove { name: String },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let journal = Journal::new(&cli.data_dir);

    match cli.command {
        Commands::Open {
            account,
            symbol,
            market,
            direction,
            price,
            quantity,
            stop,
            take,
            margin,
            reason,
            context,
            time,
        } => run_open(
            &journal,
            &cli.data_dir,
            account,
            symbol,
            market,
            direction,
            price,
            quantity,
            stop,
            take,
            margin,
            reason,
            context,
            time,
        ),
        Commands::Close {
            position_id,
            price,
            quantity,
            reason,
            note,
            time,
        } => run_close(&journal, &position_id, price, quantity, reason, note, time),
        Commands::List {
            status,
            symbol,
            market,
            account,
            from,
            to,
            format,
        } => run_list(&journal, status, symbol, market, account, from, to, format),
        Commands::Analyze { action } => match action {
            AnalyzeAction::Risk { format } => run_analyze_risk(&journal, format),
            AnalyzeAction::Performance { from, to, format } => {
                run_analyze_performance(&journal, from, to, format)
            }
        },
        Commands::Account { action } => run_account(&cli.data_dir, action),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_open(
    journal: &Journal,
    data_dir: &PathBuf,
    account: Option<String>,
    symbol: Option<String>,
    market: Option<MarketType>,
    direction: Option<Direction>,
    price: f64,
    quantity: f64,
    stop: f64,
    take: f64,
    margin: f64,
    reason: String,
    context: Option<MarketContext>,
    time: Option<String>,
) -> Result<()> {
    // Resolve account snapshot and template defaults.
    let (account_name, account_balance, template) = match account {
        Some(name) => {
            let book = AccountBook::load(data_dir)?;
            let acc = book.get(&name)?.clone();
            (acc.name, acc.balance, acc.template.unwrap_or_default())
        }
        None => (String::new(), 0.0, Default::default()),
    };

    let symbol = symbol
        .or(template.default_symbol)
        .context("symbol is required (pass --symbol or set an account template)")?;
    let market_type = market
        .or(template.default_market_type)
        .context("market type is required (pass --market or set an account template)")?;
    let direction = direction
        .or(template.default_direction)
        .context("direction is required (pass --direction or set an account template)")?;

    let open_time = time.as_deref().map(parse_datetime).transpose()?;

    let pos = journal.open_position(OpenParams {
        account_name,
        account_balance,
        symbol,
        market_type,
        direction,
        open_price: price,
        quantity,
        stop_loss: stop,
        take_profit: take,
        margin,
        reason,
        market_context: context,
        open_time,
    })?;

    println!("recorded position {}", pos.position_id);
    println!("  symbol:     {} ({})", pos.symbol, pos.market_type);
    println!("  direction:  {}", pos.direction);
    println!("  open price: {:.4}", pos.open_price);
    println!("  quantity:   {:.4}", pos.quantity);
    println!("  stop loss:  {:.4}", pos.stop_loss);
    println!("  take profit: {:.4}", pos.take_profit);
    println!("  margin:     {:.2}", pos.margin);
    if !pos.reason.is_empty() {
        println!("  reason:     {}", pos.reason);
    }
    Ok(())
}

fn run_close(
    journal: &Journal,
    position_id: &str,
    price: f64,
    quantity: Option<f64>,
    reason: CloseReason,
    note: String,
    time: Option<String>,
) -> Result<()> {
    let close_quantity = match quantity {
        Some(q) => q,
        // Default to closing the full position.
        None => journal.ledger().find_by_id(position_id)?.quantity,
    };
    let close_time = time.as_deref().map(parse_datetime).transpose()?;

    let pos = journal.close_position(
        position_id,
        CloseParams {
            close_price: price,
            close_quantity,
            close_reason: reason,
            close_note: note,
            close_time,
        },
    )?;

    let pnl = pos.realized_pnl.unwrap_or(0.0);
    let pnl_pct = pos.pnl_percentage.unwrap_or(0.0);
    println!("closed position {}", pos.position_id);
    println!("  close price: {:.4}", price);
    println!("  realized PnL: {pnl:+.2} ({pnl_pct:+.2}% of margin)");
    if let Some(holding) = &pos.holding_duration {
        println!("  held: {holding}");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_list(
    journal: &Journal,
    status: StatusFilter,
    symbol: Option<String>,
    market: Option<MarketType>,
    account: Option<String>,
    from: Option<String>,
    to: Option<String>,
    format: Format,
) -> Result<()> {
    let filter = ListFilter {
        status,
        symbol,
        market_type: market,
        account,
        from: from.as_deref().map(day_start).transpose()?,
        to: to.as_deref().map(day_end).transpose()?,
    };

    let positions = journal.list_positions(&filter)?;
    if positions.is_empty() {
        println!("no matching positions");
        return Ok(());
    }

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&positions)?),
        Format::Table => print_position_table(&positions),
    }
    Ok(())
}

fn print_position_table(positions: &[Position]) {
    println!(
        "{:<22} {:<12} {:<8} {:<6} {:<7} {:>10} {:>10} {:>10}  {}",
        "ID", "SYMBOL", "MARKET", "DIR", "STATUS", "PRICE", "QTY", "PNL", "OPENED"
    );
    for pos in positions {
        let pnl = pos
            .realized_pnl
            .map(|p| format!("{p:+.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<22} {:<12} {:<8} {:<6} {:<7} {:>10.4} {:>10.4} {:>10}  {}",
            pos.position_id,
            pos.symbol,
            pos.market_type.to_string(),
            pos.direction.to_string(),
            pos.status.to_string(),
            pos.open_price,
            pos.quantity,
            pnl,
            pos.open_time.format("%Y-%m-%d %H:%M"),
        );
    }
    println!("{} positions", positions.len());
}

fn run_analyze_risk(journal: &Journal, format: Format) -> Result<()> {
    let report = analyze_risk(journal)?;

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("risk report — {} open positions", report.position_count);
    println!("  total margin:       {:.2}", report.total_margin);
    println!("  max possible loss:  {:.2}", report.max_possible_loss);
    println!("  risk exposure:      {:.2}%", report.risk_exposure_percent);

    if !report.position_risks.is_empty() {
        println!();
        println!(
            "{:<22} {:<12} {:<6} {:>10} {:>12} {:>8}",
            "ID", "SYMBOL", "DIR", "MARGIN", "MAX LOSS", "R/R"
        );
        for risk in &report.position_risks {
            println!(
                "{:<22} {:<12} {:<6} {:>10.2} {:>12.2} {:>8.2}",
                risk.position_id,
                risk.symbol,
                risk.direction.to_string(),
                risk.margin,
                risk.possible_loss,
                risk.risk_reward_ratio,
            );
        }
    }

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn run_analyze_performance(
    journal: &Journal,
    from: Option<String>,
    to: Option<String>,
    format: Format,
) -> Result<()> {
    let from = from.as_deref().map(day_start).transpose()?;
    let to = to.as_deref().map(day_end).transpose()?;
    let report = analyze_performance(journal, from, to)?;

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("performance report — {} closed trades", report.total_trades);
    if report.total_trades == 0 {
        return Ok(());
    }

    println!(
        "  wins/losses:   {}/{} ({:.1}% win rate)",
        report.winning_trades, report.losing_trades, report.win_rate
    );
    println!(
        "  total PnL:     {:+.2} (avg {:+.2})",
        report.total_pnl, report.average_pnl
    );
    if let Some(best) = &report.best_trade {
        println!(
            "  best trade:    {} {:+.2}",
            best.symbol,
            best.realized_pnl.unwrap_or(0.0)
        );
    }
    if let Some(worst) = &report.worst_trade {
        println!(
            "  worst trade:   {} {:+.2}",
            worst.symbol,
            worst.realized_pnl.unwrap_or(0.0)
        );
    }
    println!(
        "  avg holding:   {}",
        format_holding_duration(report.average_holding())
    );

    let mut symbols: Vec<_> = report.by_symbol.iter().collect();
    symbols.sort_by(|a, b| a.0.cmp(b.0));
    println!();
    println!(
        "{:<12} {:>7} {:>7} {:>9} {:>12} {:>12}",
        "SYMBOL", "TRADES", "WINS", "WIN RATE", "TOTAL PNL", "AVG PNL"
    );
    for (symbol, stats) in symbols {
        println!(
            "{:<12} {:>7} {:>7} {:>8.1}% {:>12.2} {:>12.2}",
            symbol,
            stats.total_trades,
            stats.winning_trades,
            stats.win_rate,
            stats.total_pnl,
            stats.average_pnl,
        );
    }

    let mut reasons: Vec<_> = report.by_close_reason.iter().collect();
    reasons.sort_by_key(|(reason, _)| reason.to_string());
    if !reasons.is_empty() {
        println!();
        for (reason, count) in reasons {
            println!("  {reason}: {count}");
        }
    }
    Ok(())
}

fn run_account(data_dir: &PathBuf, action: AccountAction) -> Result<()> {
    let mut book = AccountBook::load(data_dir)?;

    match action {
        AccountAction::Add {
            name,
            balance,
            currency,
        } => {
            book.add(Account {
                name: name.clone(),
                balance,
                currency,
                template: None,
            })?;
            println!("added account {name}");
        }
        AccountAction::List => {
            if book.accounts().is_empty() {
                println!("no accounts configured");
                return Ok(());
            }
            for acc in book.accounts() {
                let mut line = format!(
                    "{} — {:.2} {}",
                    acc.name,
                    acc.balance,
                    acc.currency_or_default()
                );
                if let Some(template) = &acc.template {
                    let mut parts = Vec::new();
                    if let Some(symbol) = &template.default_symbol {
                        parts.push(symbol.clone());
                    }
                    if let Some(market) = template.default_market_type {
                        parts.push(market.to_string());
                    }
                    if let Some(direction) = template.default_direction {
                        parts.push(direction.to_string());
                    }
                    if !parts.is_empty() {
                        line.push_str(&format!(" (template: {})", parts.join(", ")));
                    }
                }
                println!("{line}");
            }
        }
        AccountAction::SetBalance { name, balance } => {
            book.set_balance(&name, balance)?;
            println!("updated balance of {name} to {balance:.2}");
        }
        AccountAction::SetTemplate {
            name,
            symbol,
            market,
            direction,
            clear,
        } => {
            if clear {
                book.set_template(&name, None)?;
                println!("cleared template of {name}");
            } else {
                book.set_template(
                    &name,
                    Some(AccountTemplate {
                        default_market_type: market,
                        default_symbol: symbol,
                        default_direction: direction,
                    }),
                )?;
                println!("updated template of {name}");
            }
        }
        AccountAction::Remove { name } => {
            book.remove(&name)?;
            println!("removed account {name}");
        }
    }
    Ok(())
}

// ── Date/time parsing ────────────────────────────────────────────────

fn parse_datetime(s: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid time (expected YYYY-MM-DD HH:MM:SS): {s}"))?;
    local_from_naive(naive)
}

fn day_start(s: &str) -> Result<DateTime<Local>> {
    let date = parse_date(s)?;
    let naive = date.and_hms_opt(0, 0, 0).context("invalid day start")?;
    local_from_naive(naive)
}

fn day_end(s: &str) -> Result<DateTime<Local>> {
    let date = parse_date(s)?;
    let naive = date.and_hms_opt(23, 59, 59).context("invalid day end")?;
    local_from_naive(naive)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {s}"))
}

fn local_from_naive(naive: NaiveDateTime) -> Result<DateTime<Local>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("time does not exist in the local timezone: {naive}"))
}
