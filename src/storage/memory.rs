//! In-memory storage implementation for testing.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::{Id, Investment, Notification, Portfolio, Transaction, Watchlist};

use super::{sort_investments, sort_notifications, sort_portfolios, sort_watchlists, Storage};

/// In-memory storage for tests and embedding.
pub struct MemoryStorage {
    portfolios: Mutex<HashMap<Id, Portfolio>>,
    investments: Mutex<HashMap<Id, Investment>>,
    transactions: Mutex<HashMap<Id, Vec<Transaction>>>,
    watchlists: Mutex<HashMap<Id, Watchlist>>,
    notifications: Mutex<HashMap<Id, Vec<Notification>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            portfolios: Mutex::new(HashMap::new()),
            investments: Mutex::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            watchlists: Mutex::new(HashMap::new()),
            notifications: Mutex::new(HashMap::new()),
        }
    }

    async fn attach_investments(&self, portfolio: Portfolio) -> Portfolio {
        let investments = self.investments.lock().await;
        let mut owned: Vec<Investment> = investments
            .values()
            .filter(|inv| inv.portfolio_id == portfolio.id)
            .cloned()
            .collect();
        sort_investments(&mut owned);
        portfolio.with_investments(owned)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn list_portfolios(&self, user_id: &Id) -> Result<Vec<Portfolio>> {
        let headers: Vec<Portfolio> = {
            let portfolios = self.portfolios.lock().await;
            portfolios
                .values()
                .filter(|p| &p.user_id == user_id)
                .cloned()
                .collect()
        };

        let mut result = Vec::with_capacity(headers.len());
        for header in headers {
            result.push(self.attach_investments(header).await);
        }
        sort_portfolios(&mut result);
        Ok(result)
    }

    async fn get_portfolio(&self, id: &Id) -> Result<Option<Portfolio>> {
        let header = self.portfolios.lock().await.get(id).cloned();
        match header {
            Some(p) => Ok(Some(self.attach_investments(p).await)),
            None => Ok(None),
        }
    }

    async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        let mut portfolios = self.portfolios.lock().await;
        portfolios.insert(portfolio.id.clone(), portfolio.header());
        Ok(())
    }

    async fn delete_portfolio(&self, id: &Id) -> Result<bool> {
        let removed = self.portfolios.lock().await.remove(id).is_some();
        let owned: Vec<Id> = {
            let mut investments = self.investments.lock().await;
            let ids: Vec<Id> = investments
                .values()
                .filter(|inv| &inv.portfolio_id == id)
                .map(|inv| inv.id.clone())
                .collect();
            for inv_id in &ids {
                investments.remove(inv_id);
            }
            ids
        };
        let mut txns = self.transactions.lock().await;
        for inv_id in &owned {
            txns.remove(inv_id);
        }
        Ok(removed)
    }

    async fn get_investment(&self, id: &Id) -> Result<Option<Investment>> {
        let investments = self.investments.lock().await;
        Ok(investments.get(id).cloned())
    }

    async fn save_investment(&self, investment: &Investment) -> Result<()> {
        let mut investments = self.investments.lock().await;
        investments.insert(investment.id.clone(), investment.clone());
        Ok(())
    }

    async fn delete_investment(&self, id: &Id) -> Result<bool> {
        let removed = self.investments.lock().await.remove(id).is_some();
        self.transactions.lock().await.remove(id);
        Ok(removed)
    }

    async fn get_transactions(&self, investment_id: &Id) -> Result<Vec<Transaction>> {
        let txns = self.transactions.lock().await;
        Ok(txns.get(investment_id).cloned().unwrap_or_default())
    }

    async fn append_transactions(
        &self,
        investment_id: &Id,
        new_txns: &[Transaction],
    ) -> Result<()> {
        let mut txns = self.transactions.lock().await;
        txns.entry(investment_id.clone())
            .or_default()
            .extend(new_txns.iter().cloned());
        Ok(())
    }

    async fn list_watchlists(&self, user_id: &Id) -> Result<Vec<Watchlist>> {
        let watchlists = self.watchlists.lock().await;
        let mut owned: Vec<Watchlist> = watchlists
            .values()
            .filter(|w| &w.user_id == user_id)
            .cloned()
            .collect();
        sort_watchlists(&mut owned);
        Ok(owned)
    }

    async fn save_watchlist(&self, watchlist: &Watchlist) -> Result<()> {
        let mut watchlists = self.watchlists.lock().await;
        watchlists.insert(watchlist.id.clone(), watchlist.clone());
        Ok(())
    }

    async fn list_notifications(&self, user_id: &Id) -> Result<Vec<Notification>> {
        let notifications = self.notifications.lock().await;
        let mut owned = notifications.get(user_id).cloned().unwrap_or_default();
        sort_notifications(&mut owned);
        Ok(owned)
    }

    async fn save_notifications(
        &self,
        user_id: &Id,
        new_notifications: &[Notification],
    ) -> Result<()> {
        let mut notifications = self.notifications.lock().await;
        notifications.insert(user_id.clone(), new_notifications.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{AssetType, NewInvestment};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn stock(portfolio_id: &Id, symbol: &str, day: u32) -> Investment {
        Investment::create(
            portfolio_id.clone(),
            NewInvestment {
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                asset_type: AssetType::Stock,
                quantity: dec!(1),
                purchase_price: dec!(10),
                purchase_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                current_price: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn list_portfolios_is_scoped_to_user_and_attaches_investments() -> Result<()> {
        let storage = MemoryStorage::new();
        let alice = Id::from_string("alice");
        let bob = Id::from_string("bob");

        let mine = Portfolio::new(alice.clone(), "Mine", None)?;
        let theirs = Portfolio::new(bob.clone(), "Theirs", None)?;
        storage.save_portfolio(&mine).await?;
        storage.save_portfolio(&theirs).await?;
        storage.save_investment(&stock(&mine.id, "MSFT", 9)).await?;
        storage.save_investment(&stock(&mine.id, "AAPL", 2)).await?;
        storage.save_investment(&stock(&theirs.id, "TSLA", 1)).await?;

        let listed = storage.list_portfolios(&alice).await?;
        assert_eq!(listed.len(), 1);
        let symbols: Vec<&str> = listed[0].investments.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_portfolio_cascades() -> Result<()> {
        let storage = MemoryStorage::new();
        let user = Id::from_string("u");
        let portfolio = Portfolio::new(user.clone(), "Main", None)?;
        storage.save_portfolio(&portfolio).await?;
        let inv = stock(&portfolio.id, "VTI", 3);
        storage.save_investment(&inv).await?;

        assert!(storage.delete_portfolio(&portfolio.id).await?);
        assert!(storage.get_investment(&inv.id).await?.is_none());
        assert!(!storage.delete_portfolio(&portfolio.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn notifications_are_listed_newest_first() -> Result<()> {
        let storage = MemoryStorage::new();
        let user = Id::from_string("u");
        let old = Notification::new_with_generator(
            &crate::models::UuidIdGenerator,
            &FixedClock::on(2024, 1, 1).unwrap(),
            user.clone(),
            crate::models::NotificationKind::System,
            "old",
        )?;
        let new = Notification::new_with_generator(
            &crate::models::UuidIdGenerator,
            &FixedClock::on(2024, 3, 1).unwrap(),
            user.clone(),
            crate::models::NotificationKind::Dividend,
            "new",
        )?;
        storage.save_notifications(&user, &[old, new]).await?;

        let listed = storage.list_notifications(&user).await?;
        assert_eq!(listed[0].message, "new");
        assert_eq!(listed[1].message, "old");
        Ok(())
    }

    #[tokio::test]
    async fn watchlists_are_listed_by_name_then_id() -> Result<()> {
        let storage = MemoryStorage::new();
        let user = Id::from_string("u");
        let ids = crate::models::SequentialIdGenerator::new("w");
        for name in ["Tech", "Energy", "Tech"] {
            let watchlist = Watchlist::new_with_generator(&ids, user.clone(), name)?;
            storage.save_watchlist(&watchlist).await?;
        }
        let other = Watchlist::new(Id::from_string("other"), "Alpha")?;
        storage.save_watchlist(&other).await?;

        let listed = storage.list_watchlists(&user).await?;
        let order: Vec<(&str, String)> = listed
            .iter()
            .map(|w| (w.name.as_str(), w.id.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Energy", "w-2".to_string()),
                ("Tech", "w-1".to_string()),
                ("Tech", "w-3".to_string()),
            ]
        );
        Ok(())
    }
}
