mod json_file;
mod lookup;
mod memory;

pub use json_file::JsonFileStorage;
pub use lookup::{find_investment, find_portfolio};
pub use memory::MemoryStorage;

use anyhow::Result;

use crate::models::{Id, Investment, Notification, Portfolio, Transaction, Watchlist};

/// Data access for portfolio records.
///
/// User-owned collections are always listed for a single user; callers never
/// see another user's records through these methods.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Portfolios
    /// All of a user's portfolios, each with its investments attached.
    async fn list_portfolios(&self, user_id: &Id) -> Result<Vec<Portfolio>>;
    /// A single portfolio with its investments attached.
    async fn get_portfolio(&self, id: &Id) -> Result<Option<Portfolio>>;
    /// Persist the portfolio header. Nested investments are ignored.
    async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<()>;
    /// Delete a portfolio along with its investments and their transactions.
    async fn delete_portfolio(&self, id: &Id) -> Result<bool>;

    // Investments
    async fn get_investment(&self, id: &Id) -> Result<Option<Investment>>;
    async fn save_investment(&self, investment: &Investment) -> Result<()>;
    /// Delete an investment and its transactions.
    async fn delete_investment(&self, id: &Id) -> Result<bool>;

    // Transactions
    async fn get_transactions(&self, investment_id: &Id) -> Result<Vec<Transaction>>;
    async fn append_transactions(&self, investment_id: &Id, txns: &[Transaction]) -> Result<()>;

    // Watchlists
    async fn list_watchlists(&self, user_id: &Id) -> Result<Vec<Watchlist>>;
    async fn save_watchlist(&self, watchlist: &Watchlist) -> Result<()>;

    // Notifications
    /// A user's notifications, newest first.
    async fn list_notifications(&self, user_id: &Id) -> Result<Vec<Notification>>;
    /// Replace the stored notifications for a user.
    async fn save_notifications(&self, user_id: &Id, notifications: &[Notification])
        -> Result<()>;
}

/// Oldest purchase first. This order feeds first-seen allocation grouping.
pub(crate) fn sort_investments(investments: &mut [Investment]) {
    investments.sort_by(|a, b| {
        a.purchase_date
            .cmp(&b.purchase_date)
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Oldest portfolio first.
pub(crate) fn sort_portfolios(portfolios: &mut [Portfolio]) {
    portfolios.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// By name; the first list is the user's default.
pub(crate) fn sort_watchlists(watchlists: &mut [Watchlist]) {
    watchlists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Newest first; ties broken by id so output is stable.
pub(crate) fn sort_notifications(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
