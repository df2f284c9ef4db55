//! Use cases behind the CLI. Each call loads what it needs from storage,
//! runs the valuation functions and returns serializable output.

mod config;
mod list;
mod mutations;
mod portfolio;
mod types;

pub use config::config_output;
pub use list::{
    list_investments, list_notifications, list_portfolios, list_transactions, list_watchlists,
};
pub use mutations::{
    add_investment, add_investment_with, add_notification, add_notification_with, add_portfolio,
    add_portfolio_with, add_watchlist_item, add_watchlist_item_with, ensure_default_watchlist,
    mark_all_notifications_read, mark_notification_read, parse_date, parse_decimal,
    record_transaction, record_transaction_with, remove_investment, remove_portfolio,
    remove_watchlist_item, update_price, update_quantity,
};
pub use portfolio::{dashboard, portfolio_overview};
pub use types::{
    AllocationOutput, DashboardOutput, InvestmentOutput, NotificationOutput, NotificationsOutput,
    PortfolioOutput, PortfolioOverviewOutput, SummaryOutput, TransactionOutput,
    WatchlistItemOutput, WatchlistOutput,
};
