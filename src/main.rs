use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use investfolio::app;
use investfolio::clock::{Clock, SystemClock};
use investfolio::config::{default_config_path, ResolvedConfig};
use investfolio::models::{AssetType, Id, NewInvestment, NewTransaction, TransactionType};
use investfolio::storage::{JsonFileStorage, Storage};

fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    app::parse_decimal("value", s).map_err(|e| format!("{e:#}"))
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    app::parse_date("date", s).map_err(|e| format!("{e:#}"))
}

#[derive(Parser)]
#[command(name = "investfolio")]
#[command(about = "Investment portfolio tracker")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Act on this user's records instead of the configured one
    #[arg(short, long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration
    Config,

    /// Summary, allocation, recent transactions and watchlists
    Dashboard,

    /// Manage portfolios
    #[command(subcommand)]
    Portfolio(PortfolioCommand),

    /// Manage investments
    #[command(subcommand)]
    Investment(InvestmentCommand),

    /// Record and list buy/sell transactions
    #[command(subcommand)]
    Transaction(TransactionCommand),

    /// Manage watched symbols
    #[command(subcommand)]
    Watchlist(WatchlistCommand),

    /// Read and manage notifications
    #[command(subcommand)]
    Notification(NotificationCommand),
}

#[derive(Subcommand)]
enum PortfolioCommand {
    /// Per-portfolio and overall totals with every investment
    List,

    /// Create a portfolio
    Add {
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a portfolio, its investments and their transactions
    Remove {
        /// Portfolio id or name
        portfolio: String,
    },
}

#[derive(Subcommand)]
enum InvestmentCommand {
    /// List investments with their current metrics
    List {
        /// Only show this portfolio (id or name)
        #[arg(short, long)]
        portfolio: Option<String>,
    },

    /// Add an investment to a portfolio
    Add {
        /// Portfolio id or name
        #[arg(short, long)]
        portfolio: String,

        symbol: String,

        /// Display name (defaults to the symbol)
        #[arg(short, long)]
        name: Option<String>,

        /// Asset type (stock, bond, etf, mutual_fund, crypto, cash, real_estate, commodity, other)
        #[arg(short = 't', long = "type", default_value = "stock")]
        asset_type: AssetType,

        #[arg(short, long, value_parser = parse_decimal_arg)]
        quantity: Decimal,

        /// Price paid per unit
        #[arg(long, value_parser = parse_decimal_arg)]
        price: Decimal,

        /// Purchase date (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Current market price per unit
        #[arg(long, value_parser = parse_decimal_arg)]
        current_price: Option<Decimal>,
    },

    /// Delete an investment and its transactions
    Remove {
        /// Investment id or symbol
        investment: String,

        #[arg(short, long)]
        portfolio: Option<String>,
    },

    /// Set the current market price
    Price {
        /// Investment id or symbol
        investment: String,

        #[arg(value_parser = parse_decimal_arg)]
        price: Decimal,

        #[arg(short, long)]
        portfolio: Option<String>,
    },

    /// Correct the number of units held
    Quantity {
        /// Investment id or symbol
        investment: String,

        #[arg(value_parser = parse_decimal_arg)]
        quantity: Decimal,

        #[arg(short, long)]
        portfolio: Option<String>,
    },
}

#[derive(Subcommand)]
enum TransactionCommand {
    /// List transactions, newest first
    List {
        /// Only show this investment (id or symbol)
        #[arg(short, long)]
        investment: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Record a buy or sell
    Add {
        /// Investment id or symbol
        investment: String,

        /// buy or sell
        #[arg(short = 't', long = "type")]
        transaction_type: TransactionType,

        #[arg(short, long, value_parser = parse_decimal_arg)]
        quantity: Decimal,

        #[arg(long, value_parser = parse_decimal_arg)]
        price: Decimal,

        /// Trade date (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(long, value_parser = parse_decimal_arg)]
        fees: Option<Decimal>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(short, long)]
        portfolio: Option<String>,
    },
}

#[derive(Subcommand)]
enum WatchlistCommand {
    /// List watchlists and their symbols
    List,

    /// Watch a symbol
    Add {
        symbol: String,

        #[arg(short, long, default_value = "")]
        name: String,

        /// Watchlist id or name (defaults to the first list)
        #[arg(short, long)]
        watchlist: Option<String>,
    },

    /// Stop watching a symbol
    Remove {
        symbol: String,

        #[arg(short, long)]
        watchlist: Option<String>,
    },
}

#[derive(Subcommand)]
enum NotificationCommand {
    /// List notifications, newest first
    List,

    /// Post a notification
    Add {
        message: String,

        /// price_alert, portfolio_change, dividend or system
        #[arg(short = 't', long = "type", default_value = "system")]
        kind: String,
    },

    /// Mark one notification read
    Read { id: String },

    /// Mark every notification read
    ReadAll,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();

    let mut config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;
    if let Some(user) = &cli.user {
        config.user_id =
            Id::from_string_checked(user.trim()).with_context(|| format!("Invalid user: {user}"))?;
    }

    let storage = JsonFileStorage::new(&config.data_dir);
    let storage: &dyn Storage = &storage;
    let user = config.user_id.clone();
    let clock = SystemClock;

    match cli.command {
        Command::Config => print_json(&app::config_output(&cli.config, &config))?,

        Command::Dashboard => print_json(&app::dashboard(storage, &config, &user).await?)?,

        Command::Portfolio(cmd) => match cmd {
            PortfolioCommand::List => {
                print_json(&app::portfolio_overview(storage, &config, &user).await?)?
            }
            PortfolioCommand::Add { name, description } => {
                print_json(&app::add_portfolio(storage, &user, &name, description).await?)?
            }
            PortfolioCommand::Remove { portfolio } => {
                print_json(&app::remove_portfolio(storage, &user, &portfolio).await?)?
            }
        },

        Command::Investment(cmd) => match cmd {
            InvestmentCommand::List { portfolio } => print_json(
                &app::list_investments(storage, &config, &user, portfolio.as_deref()).await?,
            )?,
            InvestmentCommand::Add {
                portfolio,
                symbol,
                name,
                asset_type,
                quantity,
                price,
                date,
                current_price,
            } => {
                let new = NewInvestment {
                    name: name.unwrap_or_else(|| symbol.trim().to_uppercase()),
                    symbol,
                    asset_type,
                    quantity,
                    purchase_price: price,
                    purchase_date: date.unwrap_or_else(|| clock.today()),
                    current_price,
                };
                print_json(&app::add_investment(storage, &config, &user, &portfolio, new).await?)?
            }
            InvestmentCommand::Remove {
                investment,
                portfolio,
            } => print_json(
                &app::remove_investment(storage, &user, &investment, portfolio.as_deref()).await?,
            )?,
            InvestmentCommand::Price {
                investment,
                price,
                portfolio,
            } => print_json(
                &app::update_price(
                    storage,
                    &config,
                    &user,
                    &investment,
                    portfolio.as_deref(),
                    price,
                )
                .await?,
            )?,
            InvestmentCommand::Quantity {
                investment,
                quantity,
                portfolio,
            } => print_json(
                &app::update_quantity(
                    storage,
                    &config,
                    &user,
                    &investment,
                    portfolio.as_deref(),
                    quantity,
                )
                .await?,
            )?,
        },

        Command::Transaction(cmd) => match cmd {
            TransactionCommand::List { investment, limit } => print_json(
                &app::list_transactions(storage, &config, &user, investment.as_deref(), limit)
                    .await?,
            )?,
            TransactionCommand::Add {
                investment,
                transaction_type,
                quantity,
                price,
                date,
                fees,
                notes,
                portfolio,
            } => {
                let new = NewTransaction {
                    transaction_type,
                    quantity,
                    price,
                    date: date.unwrap_or_else(|| clock.today()),
                    fees,
                    notes,
                };
                print_json(
                    &app::record_transaction(
                        storage,
                        &config,
                        &user,
                        &investment,
                        portfolio.as_deref(),
                        new,
                    )
                    .await?,
                )?
            }
        },

        Command::Watchlist(cmd) => match cmd {
            WatchlistCommand::List => print_json(&app::list_watchlists(storage, &user).await?)?,
            WatchlistCommand::Add {
                symbol,
                name,
                watchlist,
            } => print_json(
                &app::add_watchlist_item(storage, &user, watchlist.as_deref(), &symbol, &name)
                    .await?,
            )?,
            WatchlistCommand::Remove { symbol, watchlist } => print_json(
                &app::remove_watchlist_item(storage, &user, watchlist.as_deref(), &symbol).await?,
            )?,
        },

        Command::Notification(cmd) => match cmd {
            NotificationCommand::List => {
                print_json(&app::list_notifications(storage, &user).await?)?
            }
            NotificationCommand::Add { message, kind } => {
                print_json(&app::add_notification(storage, &user, &kind, &message).await?)?
            }
            NotificationCommand::Read { id } => {
                print_json(&app::mark_notification_read(storage, &user, &id).await?)?
            }
            NotificationCommand::ReadAll => {
                print_json(&app::mark_all_notifications_read(storage, &user).await?)?
            }
        },
    }

    Ok(())
}
