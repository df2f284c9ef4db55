use anyhow::{Context, Result};

use crate::config::ResolvedConfig;
use crate::models::{Id, Portfolio};
use crate::notifications::unread_count;
use crate::storage::{find_investment, find_portfolio, Storage};

use super::{
    InvestmentOutput, NotificationOutput, NotificationsOutput, PortfolioOutput, TransactionOutput,
    WatchlistOutput,
};

pub async fn list_portfolios(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
) -> Result<Vec<PortfolioOutput>> {
    let portfolios = storage.list_portfolios(user_id).await?;
    Ok(portfolios
        .iter()
        .map(|p| PortfolioOutput::new(p, &config.display))
        .collect())
}

/// Investments across the user's portfolios, or within one portfolio
/// (by id or name).
pub async fn list_investments(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    portfolio: Option<&str>,
) -> Result<Vec<InvestmentOutput>> {
    let portfolios = match portfolio {
        Some(key) => vec![find_portfolio(storage, user_id, key)
            .await?
            .with_context(|| format!("Portfolio not found: {key}"))?],
        None => storage.list_portfolios(user_id).await?,
    };

    Ok(portfolios
        .iter()
        .flat_map(|p| p.investments.iter())
        .map(|i| InvestmentOutput::new(i, &config.display))
        .collect())
}

/// Transactions, newest first. `investment` narrows to a single holding.
pub async fn list_transactions(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    investment: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<TransactionOutput>> {
    let portfolios = match investment {
        Some(key) => {
            let investment = find_investment(storage, user_id, key, None)
                .await?
                .with_context(|| format!("Investment not found: {key}"))?;
            let portfolio = storage
                .get_portfolio(&investment.portfolio_id)
                .await?
                .context("Portfolio not found")?;
            vec![portfolio.header().with_investments(vec![investment])]
        }
        None => storage.list_portfolios(user_id).await?,
    };

    let mut output = collect_transactions(storage, config, &portfolios).await?;
    if let Some(limit) = limit {
        output.truncate(limit);
    }
    Ok(output)
}

/// Every transaction under `portfolios`, newest first.
pub(crate) async fn collect_transactions(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    portfolios: &[Portfolio],
) -> Result<Vec<TransactionOutput>> {
    let mut rows = Vec::new();
    for investment in portfolios.iter().flat_map(|p| p.investments.iter()) {
        for txn in storage.get_transactions(&investment.id).await? {
            let output = TransactionOutput::new(&txn, investment, &config.display);
            rows.push((txn.date, txn.id, output));
        }
    }

    rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(rows.into_iter().map(|(_, _, output)| output).collect())
}

pub async fn list_watchlists(storage: &dyn Storage, user_id: &Id) -> Result<Vec<WatchlistOutput>> {
    let watchlists = storage.list_watchlists(user_id).await?;
    Ok(watchlists.iter().map(WatchlistOutput::from).collect())
}

pub async fn list_notifications(
    storage: &dyn Storage,
    user_id: &Id,
) -> Result<NotificationsOutput> {
    let notifications = storage.list_notifications(user_id).await?;
    Ok(NotificationsOutput {
        unread_count: unread_count(&notifications),
        notifications: notifications.iter().map(NotificationOutput::from).collect(),
    })
}
