use serde::Serialize;

use crate::config::DisplayConfig;
use crate::format::{format_currency, format_decimal, format_percentage};
use crate::models::{Investment, Notification, Portfolio, Transaction, Watchlist};
use crate::portfolio::{
    investment_metrics, portfolio_metrics, roi, AllocationSlice, DashboardSummary,
};

/// JSON output for a portfolio row.
#[derive(Debug, Serialize)]
pub struct PortfolioOutput {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub investment_count: usize,
    pub total_value: String,
    pub total_cost: String,
    pub gain_loss: String,
    pub roi: String,
    pub total_value_display: String,
    pub gain_loss_display: String,
    /// "N/A" when the portfolio has no cost basis.
    pub roi_display: String,
}

/// JSON output for an investment row.
#[derive(Debug, Serialize)]
pub struct InvestmentOutput {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub quantity: String,
    pub purchase_price: String,
    pub purchase_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<String>,
    pub market_value: String,
    pub cost_basis: String,
    pub gain_loss: String,
    pub roi: String,
    pub market_value_display: String,
    pub gain_loss_display: String,
    pub roi_display: String,
}

/// JSON output for a transaction, joined with its investment.
#[derive(Debug, Serialize)]
pub struct TransactionOutput {
    pub id: String,
    pub investment_id: String,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub date: String,
    pub quantity: String,
    pub price: String,
    pub total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub total_display: String,
}

/// JSON output for one asset allocation slice.
#[derive(Debug, Serialize)]
pub struct AllocationOutput {
    pub category: String,
    pub value: String,
    pub percentage: String,
    pub value_display: String,
    pub percentage_display: String,
}

#[derive(Debug, Serialize)]
pub struct WatchlistItemOutput {
    pub symbol: String,
    pub name: String,
    pub added_at: String,
}

#[derive(Debug, Serialize)]
pub struct WatchlistOutput {
    pub id: String,
    pub name: String,
    pub items: Vec<WatchlistItemOutput>,
}

#[derive(Debug, Serialize)]
pub struct NotificationOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

/// Output for the notification list command.
#[derive(Debug, Serialize)]
pub struct NotificationsOutput {
    pub unread_count: usize,
    pub notifications: Vec<NotificationOutput>,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Serialize)]
pub struct SummaryOutput {
    pub portfolio_value: String,
    pub total_gain_loss: String,
    pub total_gain_loss_percentage: String,
    pub portfolio_count: usize,
    pub investment_count: usize,
    pub portfolio_value_display: String,
    pub total_gain_loss_display: String,
    pub total_gain_loss_percentage_display: String,
}

/// Output for the dashboard command.
#[derive(Debug, Serialize)]
pub struct DashboardOutput {
    pub user_id: String,
    pub summary: SummaryOutput,
    pub asset_allocation: Vec<AllocationOutput>,
    pub recent_transactions: Vec<TransactionOutput>,
    pub watchlists: Vec<WatchlistOutput>,
}

/// Output for the portfolio overview command.
#[derive(Debug, Serialize)]
pub struct PortfolioOverviewOutput {
    pub overall_value: String,
    pub overall_cost: String,
    pub overall_roi: String,
    pub overall_value_display: String,
    pub overall_cost_display: String,
    pub overall_roi_display: String,
    pub portfolios: Vec<PortfolioOutput>,
    pub investments: Vec<InvestmentOutput>,
}

pub(crate) fn roi_display(value: Option<rust_decimal::Decimal>, display: &DisplayConfig) -> String {
    match value {
        Some(v) => format_percentage(v, display.percentage_decimals),
        None => "N/A".to_string(),
    }
}

impl PortfolioOutput {
    pub(crate) fn new(portfolio: &Portfolio, display: &DisplayConfig) -> Self {
        let metrics = portfolio_metrics(portfolio);
        let totals = metrics.totals;
        Self {
            id: metrics.portfolio_id.to_string(),
            name: metrics.name,
            description: metrics.description,
            investment_count: metrics.investment_count,
            total_value: format_decimal(totals.total_value),
            total_cost: format_decimal(totals.total_cost),
            gain_loss: format_decimal(totals.gain_loss()),
            roi: format_decimal(totals.roi),
            total_value_display: format_currency(totals.total_value, display),
            gain_loss_display: format_currency(totals.gain_loss(), display),
            roi_display: roi_display(roi(totals.total_value, totals.total_cost), display),
        }
    }
}

impl InvestmentOutput {
    pub(crate) fn new(investment: &Investment, display: &DisplayConfig) -> Self {
        let m = investment_metrics(investment);
        Self {
            id: m.investment_id.to_string(),
            portfolio_id: m.portfolio_id.to_string(),
            symbol: m.symbol,
            name: m.name,
            asset_type: m.asset_type.to_string(),
            quantity: format_decimal(m.quantity),
            purchase_price: format_decimal(m.purchase_price),
            purchase_date: investment.purchase_date.to_string(),
            current_price: investment.current_price.map(format_decimal),
            market_value: format_decimal(m.market_value),
            cost_basis: format_decimal(m.cost_basis),
            gain_loss: format_decimal(m.gain_loss),
            roi: format_decimal(m.roi),
            market_value_display: format_currency(m.market_value, display),
            gain_loss_display: format_currency(m.gain_loss, display),
            roi_display: roi_display(roi(m.market_value, m.cost_basis), display),
        }
    }
}

impl TransactionOutput {
    pub(crate) fn new(txn: &Transaction, investment: &Investment, display: &DisplayConfig) -> Self {
        let total = txn.total();
        Self {
            id: txn.id.to_string(),
            investment_id: txn.investment_id.to_string(),
            symbol: investment.symbol.clone(),
            name: investment.name.clone(),
            transaction_type: txn.transaction_type.to_string(),
            date: txn.date.to_string(),
            quantity: format_decimal(txn.quantity),
            price: format_decimal(txn.price),
            total: format_decimal(total),
            fees: txn.fees.map(format_decimal),
            notes: txn.notes.clone(),
            total_display: format_currency(total, display),
        }
    }
}

impl AllocationOutput {
    pub(crate) fn new(slice: &AllocationSlice, display: &DisplayConfig) -> Self {
        Self {
            category: slice.category.to_string(),
            value: format_decimal(slice.value),
            percentage: format_decimal(slice.percentage),
            value_display: format_currency(slice.value, display),
            percentage_display: format_percentage(slice.percentage, display.percentage_decimals),
        }
    }
}

impl From<&Watchlist> for WatchlistOutput {
    fn from(watchlist: &Watchlist) -> Self {
        Self {
            id: watchlist.id.to_string(),
            name: watchlist.name.clone(),
            items: watchlist
                .items
                .iter()
                .map(|item| WatchlistItemOutput {
                    symbol: item.symbol.clone(),
                    name: item.name.clone(),
                    added_at: item.added_at.to_rfc3339(),
                })
                .collect(),
        }
    }
}

impl From<&Notification> for NotificationOutput {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind.to_string(),
            message: n.message.clone(),
            read: n.read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

impl SummaryOutput {
    pub(crate) fn new(summary: &DashboardSummary, display: &DisplayConfig) -> Self {
        Self {
            portfolio_value: format_decimal(summary.portfolio_value),
            total_gain_loss: format_decimal(summary.total_gain_loss),
            total_gain_loss_percentage: format_decimal(summary.total_gain_loss_percentage),
            portfolio_count: summary.portfolio_count,
            investment_count: summary.investment_count,
            portfolio_value_display: format_currency(summary.portfolio_value, display),
            total_gain_loss_display: format_currency(summary.total_gain_loss, display),
            total_gain_loss_percentage_display: format_percentage(
                summary.total_gain_loss_percentage,
                display.percentage_decimals,
            ),
        }
    }
}
