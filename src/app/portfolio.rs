use anyhow::Result;
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::format::{format_currency, format_decimal};
use crate::models::Id;
use crate::portfolio::{aggregate_across_portfolios, dashboard_summary, roi};
use crate::storage::Storage;

use super::list::collect_transactions;
use super::types::roi_display;
use super::{
    AllocationOutput, DashboardOutput, InvestmentOutput, PortfolioOutput, PortfolioOverviewOutput,
    SummaryOutput, WatchlistOutput,
};

/// Everything the dashboard shows for one user, computed from a single
/// load of their portfolios.
pub async fn dashboard(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
) -> Result<DashboardOutput> {
    let portfolios = storage.list_portfolios(user_id).await?;
    let summary = dashboard_summary(&portfolios);
    debug!(
        user = %user_id,
        portfolios = summary.portfolio_count,
        investments = summary.investment_count,
        "Building dashboard"
    );

    let mut recent_transactions = collect_transactions(storage, config, &portfolios).await?;
    recent_transactions.truncate(config.dashboard.recent_transactions);

    let watchlists = storage.list_watchlists(user_id).await?;

    Ok(DashboardOutput {
        user_id: user_id.to_string(),
        summary: SummaryOutput::new(&summary, &config.display),
        asset_allocation: summary
            .asset_allocation
            .iter()
            .map(|slice| AllocationOutput::new(slice, &config.display))
            .collect(),
        recent_transactions,
        watchlists: watchlists.iter().map(WatchlistOutput::from).collect(),
    })
}

/// Per-portfolio totals, overall totals and every investment row.
pub async fn portfolio_overview(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
) -> Result<PortfolioOverviewOutput> {
    let portfolios = storage.list_portfolios(user_id).await?;
    let overall = aggregate_across_portfolios(&portfolios);
    let display = &config.display;

    Ok(PortfolioOverviewOutput {
        overall_value: format_decimal(overall.overall_value),
        overall_cost: format_decimal(overall.overall_cost),
        overall_roi: format_decimal(overall.overall_roi),
        overall_value_display: format_currency(overall.overall_value, display),
        overall_cost_display: format_currency(overall.overall_cost, display),
        overall_roi_display: roi_display(roi(overall.overall_value, overall.overall_cost), display),
        portfolios: portfolios
            .iter()
            .map(|p| PortfolioOutput::new(p, display))
            .collect(),
        investments: portfolios
            .iter()
            .flat_map(|p| p.investments.iter())
            .map(|i| InvestmentOutput::new(i, display))
            .collect(),
    })
}
