use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::ResolvedConfig;
use crate::models::{
    Id, IdGenerator, Investment, NewInvestment, NewTransaction, Notification, NotificationKind,
    Portfolio, Transaction, UuidIdGenerator, Watchlist, DEFAULT_WATCHLIST_NAME,
};
use crate::notifications::{mark_all_as_read, mark_as_read, unread_count};
use crate::storage::{find_investment, find_portfolio, Storage};

use super::{InvestmentOutput, NotificationOutput, TransactionOutput, WatchlistOutput};

/// Parse a decimal command-line argument, naming the field on failure.
pub fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("{field} cannot be empty");
    }
    Decimal::from_str(value).with_context(|| format!("Invalid {field}: {value}"))
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {field} (expected YYYY-MM-DD): {value}"))
}

async fn resolve_portfolio(storage: &dyn Storage, user_id: &Id, key: &str) -> Result<Portfolio> {
    find_portfolio(storage, user_id, key)
        .await?
        .with_context(|| format!("Portfolio not found: {key}"))
}

async fn resolve_investment(
    storage: &dyn Storage,
    user_id: &Id,
    key: &str,
    portfolio: Option<&str>,
) -> Result<Investment> {
    let portfolio_id = match portfolio {
        Some(p) => Some(resolve_portfolio(storage, user_id, p).await?.id),
        None => None,
    };
    find_investment(storage, user_id, key, portfolio_id.as_ref())
        .await?
        .with_context(|| format!("Investment not found: {key}"))
}

pub async fn add_portfolio(
    storage: &dyn Storage,
    user_id: &Id,
    name: &str,
    description: Option<String>,
) -> Result<serde_json::Value> {
    add_portfolio_with(storage, user_id, name, description, &UuidIdGenerator, &SystemClock).await
}

pub async fn add_portfolio_with(
    storage: &dyn Storage,
    user_id: &Id,
    name: &str,
    description: Option<String>,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let portfolio = Portfolio::new_with_generator(ids, clock, user_id.clone(), name, description)?;
    storage.save_portfolio(&portfolio).await?;
    info!(user = %user_id, portfolio = %portfolio.id, name = %portfolio.name, "Added portfolio");

    Ok(serde_json::json!({
        "success": true,
        "portfolio": {
            "id": portfolio.id.to_string(),
            "name": portfolio.name,
            "description": portfolio.description,
            "created_at": portfolio.created_at.to_rfc3339()
        }
    }))
}

/// Delete a portfolio (by id or name) with everything it holds.
pub async fn remove_portfolio(
    storage: &dyn Storage,
    user_id: &Id,
    id_or_name: &str,
) -> Result<serde_json::Value> {
    let Some(portfolio) = find_portfolio(storage, user_id, id_or_name).await? else {
        return Ok(serde_json::json!({
            "success": false,
            "error": "Portfolio not found",
            "id": id_or_name
        }));
    };

    storage.delete_portfolio(&portfolio.id).await?;
    info!(
        user = %user_id,
        portfolio = %portfolio.id,
        investments = portfolio.investments.len(),
        "Removed portfolio"
    );

    Ok(serde_json::json!({
        "success": true,
        "deleted_portfolio": portfolio.id.to_string(),
        "deleted_investments": portfolio.investments.len()
    }))
}

pub async fn add_investment(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    portfolio: &str,
    new: NewInvestment,
) -> Result<serde_json::Value> {
    add_investment_with(storage, config, user_id, portfolio, new, &UuidIdGenerator).await
}

pub async fn add_investment_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    portfolio: &str,
    new: NewInvestment,
    ids: &dyn IdGenerator,
) -> Result<serde_json::Value> {
    let portfolio = resolve_portfolio(storage, user_id, portfolio).await?;
    let investment = Investment::create_with_generator(ids, portfolio.id.clone(), new)?;
    storage.save_investment(&investment).await?;
    info!(
        portfolio = %portfolio.id,
        investment = %investment.id,
        symbol = %investment.symbol,
        "Added investment"
    );

    Ok(serde_json::json!({
        "success": true,
        "investment": InvestmentOutput::new(&investment, &config.display)
    }))
}

pub async fn remove_investment(
    storage: &dyn Storage,
    user_id: &Id,
    id_or_symbol: &str,
    portfolio: Option<&str>,
) -> Result<serde_json::Value> {
    let investment = resolve_investment(storage, user_id, id_or_symbol, portfolio).await?;
    storage.delete_investment(&investment.id).await?;
    info!(investment = %investment.id, symbol = %investment.symbol, "Removed investment");

    Ok(serde_json::json!({
        "success": true,
        "deleted_investment": investment.id.to_string(),
        "symbol": investment.symbol
    }))
}

/// Record a refreshed market price for one holding.
pub async fn update_price(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    id_or_symbol: &str,
    portfolio: Option<&str>,
    price: Decimal,
) -> Result<serde_json::Value> {
    let mut investment = resolve_investment(storage, user_id, id_or_symbol, portfolio).await?;
    let previous = investment.current_price;
    investment.set_current_price(price)?;
    storage.save_investment(&investment).await?;
    info!(
        investment = %investment.id,
        symbol = %investment.symbol,
        price = %price,
        "Updated current price"
    );

    Ok(serde_json::json!({
        "success": true,
        "previous_price": previous.map(|p| p.normalize().to_string()),
        "investment": InvestmentOutput::new(&investment, &config.display)
    }))
}

/// Correct the number of units held. Recorded transactions are not consulted.
pub async fn update_quantity(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    id_or_symbol: &str,
    portfolio: Option<&str>,
    quantity: Decimal,
) -> Result<serde_json::Value> {
    let mut investment = resolve_investment(storage, user_id, id_or_symbol, portfolio).await?;
    let previous = investment.quantity;
    investment.set_quantity(quantity)?;
    storage.save_investment(&investment).await?;
    info!(
        investment = %investment.id,
        symbol = %investment.symbol,
        quantity = %quantity,
        "Updated quantity"
    );

    Ok(serde_json::json!({
        "success": true,
        "previous_quantity": previous.normalize().to_string(),
        "investment": InvestmentOutput::new(&investment, &config.display)
    }))
}

/// Append a buy/sell record to an investment's log. The holding's quantity
/// and purchase price are left as they are.
pub async fn record_transaction(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    id_or_symbol: &str,
    portfolio: Option<&str>,
    new: NewTransaction,
) -> Result<serde_json::Value> {
    record_transaction_with(
        storage,
        config,
        user_id,
        id_or_symbol,
        portfolio,
        new,
        &UuidIdGenerator,
    )
    .await
}

pub async fn record_transaction_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    user_id: &Id,
    id_or_symbol: &str,
    portfolio: Option<&str>,
    new: NewTransaction,
    ids: &dyn IdGenerator,
) -> Result<serde_json::Value> {
    let investment = resolve_investment(storage, user_id, id_or_symbol, portfolio).await?;
    let txn = Transaction::create_with_generator(ids, investment.id.clone(), new)?;
    storage
        .append_transactions(&investment.id, std::slice::from_ref(&txn))
        .await?;
    info!(
        investment = %investment.id,
        transaction = %txn.id,
        kind = %txn.transaction_type,
        "Recorded transaction"
    );

    Ok(serde_json::json!({
        "success": true,
        "transaction": TransactionOutput::new(&txn, &investment, &config.display)
    }))
}

/// Return the user's first watchlist, creating the default one if they have
/// none.
pub async fn ensure_default_watchlist(
    storage: &dyn Storage,
    user_id: &Id,
    ids: &dyn IdGenerator,
) -> Result<Watchlist> {
    if let Some(existing) = storage.list_watchlists(user_id).await?.into_iter().next() {
        return Ok(existing);
    }

    let watchlist = Watchlist::new_with_generator(ids, user_id.clone(), DEFAULT_WATCHLIST_NAME)?;
    storage.save_watchlist(&watchlist).await?;
    info!(user = %user_id, watchlist = %watchlist.id, "Created default watchlist");
    Ok(watchlist)
}

async fn resolve_watchlist(
    storage: &dyn Storage,
    user_id: &Id,
    key: Option<&str>,
    ids: &dyn IdGenerator,
) -> Result<Watchlist> {
    let Some(key) = key else {
        return ensure_default_watchlist(storage, user_id, ids).await;
    };

    let watchlists = storage.list_watchlists(user_id).await?;
    if let Some(found) = watchlists.iter().find(|w| w.id.as_str() == key) {
        return Ok(found.clone());
    }
    let mut matches: Vec<Watchlist> = watchlists
        .into_iter()
        .filter(|w| w.name.eq_ignore_ascii_case(key.trim()))
        .collect();
    if matches.len() > 1 {
        anyhow::bail!("Multiple watchlists named '{key}'. Use an ID instead");
    }
    matches
        .pop()
        .with_context(|| format!("Watchlist not found: {key}"))
}

/// Watch a symbol. Without `watchlist`, the default list is used (and
/// created on first use).
pub async fn add_watchlist_item(
    storage: &dyn Storage,
    user_id: &Id,
    watchlist: Option<&str>,
    symbol: &str,
    name: &str,
) -> Result<serde_json::Value> {
    add_watchlist_item_with(
        storage,
        user_id,
        watchlist,
        symbol,
        name,
        &UuidIdGenerator,
        &SystemClock,
    )
    .await
}

pub async fn add_watchlist_item_with(
    storage: &dyn Storage,
    user_id: &Id,
    watchlist: Option<&str>,
    symbol: &str,
    name: &str,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let mut watchlist = resolve_watchlist(storage, user_id, watchlist, ids).await?;
    let added = watchlist.add_item(clock, symbol, name)?;
    if added {
        storage.save_watchlist(&watchlist).await?;
        info!(watchlist = %watchlist.id, symbol = %symbol.trim(), "Watching symbol");
    }

    Ok(serde_json::json!({
        "success": true,
        "added": added,
        "watchlist": WatchlistOutput::from(&watchlist)
    }))
}

pub async fn remove_watchlist_item(
    storage: &dyn Storage,
    user_id: &Id,
    watchlist: Option<&str>,
    symbol: &str,
) -> Result<serde_json::Value> {
    let mut watchlist = resolve_watchlist(storage, user_id, watchlist, &UuidIdGenerator).await?;
    let removed = watchlist.remove_item(symbol);
    if removed {
        storage.save_watchlist(&watchlist).await?;
        info!(watchlist = %watchlist.id, symbol = %symbol, "Stopped watching symbol");
    }

    Ok(serde_json::json!({
        "success": removed,
        "removed": removed,
        "watchlist": WatchlistOutput::from(&watchlist)
    }))
}

pub async fn add_notification(
    storage: &dyn Storage,
    user_id: &Id,
    kind: &str,
    message: &str,
) -> Result<serde_json::Value> {
    add_notification_with(storage, user_id, kind, message, &UuidIdGenerator, &SystemClock).await
}

pub async fn add_notification_with(
    storage: &dyn Storage,
    user_id: &Id,
    kind: &str,
    message: &str,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<serde_json::Value> {
    let notification = Notification::new_with_generator(
        ids,
        clock,
        user_id.clone(),
        NotificationKind::parse(kind),
        message.trim(),
    )?;

    let mut notifications = storage.list_notifications(user_id).await?;
    notifications.push(notification.clone());
    storage.save_notifications(user_id, &notifications).await?;
    info!(
        user = %user_id,
        notification = %notification.id,
        kind = %notification.kind,
        "Added notification"
    );

    Ok(serde_json::json!({
        "success": true,
        "notification": NotificationOutput::from(&notification),
        "unread_count": unread_count(&notifications)
    }))
}

pub async fn mark_notification_read(
    storage: &dyn Storage,
    user_id: &Id,
    id_str: &str,
) -> Result<serde_json::Value> {
    let id = Id::from_string_checked(id_str)
        .with_context(|| format!("Invalid notification id: {id_str}"))?;

    let mut notifications = storage.list_notifications(user_id).await?;
    if !notifications.iter().any(|n| n.id == id) {
        return Ok(serde_json::json!({
            "success": false,
            "error": "Notification not found",
            "id": id_str
        }));
    }

    let changed = mark_as_read(&mut notifications, &id);
    if changed {
        storage.save_notifications(user_id, &notifications).await?;
    }

    Ok(serde_json::json!({
        "success": true,
        "changed": changed,
        "unread_count": unread_count(&notifications)
    }))
}

pub async fn mark_all_notifications_read(
    storage: &dyn Storage,
    user_id: &Id,
) -> Result<serde_json::Value> {
    let mut notifications = storage.list_notifications(user_id).await?;
    let changed = mark_all_as_read(&mut notifications);
    if changed > 0 {
        storage.save_notifications(user_id, &notifications).await?;
        info!(user = %user_id, changed, "Marked all notifications read");
    }

    Ok(serde_json::json!({
        "success": true,
        "changed": changed,
        "unread_count": 0
    }))
}
