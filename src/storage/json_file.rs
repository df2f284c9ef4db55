use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use super::{sort_investments, sort_notifications, sort_portfolios, sort_watchlists, Storage};
use crate::models::{Id, Investment, Notification, Portfolio, Transaction, Watchlist};

/// JSON file-based storage implementation.
///
/// Directory structure:
/// ```text
/// data/
///   portfolios/
///     {id}/
///       portfolio.json
///   investments/
///     {id}/
///       investment.json
///       transactions.jsonl
///   watchlists/
///     {id}/
///       watchlist.json
///   users/
///     {user_id}/
///       notifications.json
/// ```
///
/// Entries that fail to parse are skipped with a warning when listing, so one
/// corrupt file does not hide the rest of a user's data.
pub struct JsonFileStorage {
    base_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn portfolios_dir(&self) -> PathBuf {
        self.base_path.join("portfolios")
    }

    fn investments_dir(&self) -> PathBuf {
        self.base_path.join("investments")
    }

    fn watchlists_dir(&self) -> PathBuf {
        self.base_path.join("watchlists")
    }

    fn entity_dir(root: PathBuf, id: &Id) -> Result<PathBuf> {
        if !Id::is_path_safe(id.as_str()) {
            anyhow::bail!("Refusing to use unsafe id as a path segment: {id:?}");
        }
        Ok(root.join(id.as_str()))
    }

    fn portfolio_file(&self, id: &Id) -> Result<PathBuf> {
        Ok(Self::entity_dir(self.portfolios_dir(), id)?.join("portfolio.json"))
    }

    fn investment_dir(&self, id: &Id) -> Result<PathBuf> {
        Self::entity_dir(self.investments_dir(), id)
    }

    fn investment_file(&self, id: &Id) -> Result<PathBuf> {
        Ok(self.investment_dir(id)?.join("investment.json"))
    }

    fn transactions_file(&self, investment_id: &Id) -> Result<PathBuf> {
        Ok(self.investment_dir(investment_id)?.join("transactions.jsonl"))
    }

    fn watchlist_file(&self, id: &Id) -> Result<PathBuf> {
        Ok(Self::entity_dir(self.watchlists_dir(), id)?.join("watchlist.json"))
    }

    fn notifications_file(&self, user_id: &Id) -> Result<PathBuf> {
        Ok(Self::entity_dir(self.base_path.join("users"), user_id)?.join("notifications.json"))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        Ok(())
    }

    async fn read_json<T: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &Path,
    ) -> Result<Option<T>> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir(path).await?;
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    async fn read_jsonl<T: for<'de> serde::Deserialize<'de>>(&self, path: &Path) -> Result<Vec<T>> {
        let file = match fs::File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("Failed to open {}", path.display())),
        };

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut items = Vec::new();

        while let Some(line) = lines.next_line().await.context("Failed to read line")? {
            if line.trim().is_empty() {
                continue;
            }
            let item: T = serde_json::from_str(&line).with_context(|| {
                format!("Failed to parse JSONL line in {}: {line}", path.display())
            })?;
            items.push(item);
        }

        Ok(items)
    }

    async fn append_jsonl<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        self.ensure_dir(path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open {} for append", path.display()))?;

        for item in items {
            let line = serde_json::to_string(item).context("Failed to serialize item")?;
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }

        Ok(())
    }

    /// Ids of the entity directories under `path`. Names that are not safe ids
    /// are skipped.
    async fn list_dirs(&self, path: &Path) -> Result<Vec<Id>> {
        let mut ids = Vec::new();

        let mut entries = match fs::read_dir(path).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read directory {}", path.display()));
            }
        };

        while let Some(entry) = entries.next_entry().await.context("Failed to read entry")? {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            match entry.file_name().to_str().map(Id::from_string_checked) {
                Some(Ok(id)) => ids.push(id),
                _ => debug!(
                    path = %entry.path().display(),
                    "Skipping directory with unusable name"
                ),
            }
        }

        Ok(ids)
    }

    /// Read every `{dir}/{id}/{file}` under `root`, skipping unreadable entries.
    async fn read_all<T: for<'de> serde::Deserialize<'de>>(
        &self,
        root: PathBuf,
        file: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for id in self.list_dirs(&root).await? {
            let path = root.join(id.as_str()).join(file);
            match self.read_json::<T>(&path).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable entry"),
            }
        }
        Ok(items)
    }

    async fn list_investments(&self) -> Result<Vec<Investment>> {
        self.read_all(self.investments_dir(), "investment.json").await
    }

    async fn attach_investments(&self, portfolio: Portfolio) -> Result<Portfolio> {
        let mut owned: Vec<Investment> = self
            .list_investments()
            .await?
            .into_iter()
            .filter(|inv| inv.portfolio_id == portfolio.id)
            .collect();
        sort_investments(&mut owned);
        Ok(portfolio.with_investments(owned))
    }

    async fn remove_dir(&self, dir: &Path) -> Result<bool> {
        match fs::remove_dir_all(dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dir.display())),
        }
    }
}

#[async_trait::async_trait]
impl Storage for JsonFileStorage {
    async fn list_portfolios(&self, user_id: &Id) -> Result<Vec<Portfolio>> {
        let headers: Vec<Portfolio> = self
            .read_all::<Portfolio>(self.portfolios_dir(), "portfolio.json")
            .await?
            .into_iter()
            .filter(|p| &p.user_id == user_id)
            .collect();

        let mut investments = self.list_investments().await?;
        sort_investments(&mut investments);

        let mut portfolios: Vec<Portfolio> = headers
            .into_iter()
            .map(|header| {
                let owned = investments
                    .iter()
                    .filter(|inv| inv.portfolio_id == header.id)
                    .cloned()
                    .collect();
                header.with_investments(owned)
            })
            .collect();
        sort_portfolios(&mut portfolios);
        Ok(portfolios)
    }

    async fn get_portfolio(&self, id: &Id) -> Result<Option<Portfolio>> {
        match self.read_json::<Portfolio>(&self.portfolio_file(id)?).await? {
            Some(header) => Ok(Some(self.attach_investments(header).await?)),
            None => Ok(None),
        }
    }

    async fn save_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        self.write_json(&self.portfolio_file(&portfolio.id)?, &portfolio.header())
            .await
    }

    async fn delete_portfolio(&self, id: &Id) -> Result<bool> {
        let dir = Self::entity_dir(self.portfolios_dir(), id)?;
        let removed = self.remove_dir(&dir).await?;
        for investment in self.list_investments().await? {
            if &investment.portfolio_id == id {
                self.delete_investment(&investment.id).await?;
            }
        }
        Ok(removed)
    }

    async fn get_investment(&self, id: &Id) -> Result<Option<Investment>> {
        self.read_json(&self.investment_file(id)?).await
    }

    async fn save_investment(&self, investment: &Investment) -> Result<()> {
        self.write_json(&self.investment_file(&investment.id)?, investment)
            .await
    }

    async fn delete_investment(&self, id: &Id) -> Result<bool> {
        let dir = self.investment_dir(id)?;
        self.remove_dir(&dir).await
    }

    async fn get_transactions(&self, investment_id: &Id) -> Result<Vec<Transaction>> {
        self.read_jsonl(&self.transactions_file(investment_id)?).await
    }

    async fn append_transactions(&self, investment_id: &Id, txns: &[Transaction]) -> Result<()> {
        self.append_jsonl(&self.transactions_file(investment_id)?, txns)
            .await
    }

    async fn list_watchlists(&self, user_id: &Id) -> Result<Vec<Watchlist>> {
        let mut owned: Vec<Watchlist> = self
            .read_all::<Watchlist>(self.watchlists_dir(), "watchlist.json")
            .await?
            .into_iter()
            .filter(|w| &w.user_id == user_id)
            .collect();
        sort_watchlists(&mut owned);
        Ok(owned)
    }

    async fn save_watchlist(&self, watchlist: &Watchlist) -> Result<()> {
        self.write_json(&self.watchlist_file(&watchlist.id)?, watchlist)
            .await
    }

    async fn list_notifications(&self, user_id: &Id) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .read_json(&self.notifications_file(user_id)?)
            .await?
            .unwrap_or_default();
        sort_notifications(&mut notifications);
        Ok(notifications)
    }

    async fn save_notifications(&self, user_id: &Id, notifications: &[Notification]) -> Result<()> {
        self.write_json(&self.notifications_file(user_id)?, &notifications)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetType, NewInvestment, NewTransaction, TransactionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn bond(portfolio_id: &Id) -> Investment {
        Investment::create(
            portfolio_id.clone(),
            NewInvestment {
                symbol: "BND".to_string(),
                name: "Total Bond Market".to_string(),
                asset_type: AssetType::Bond,
                quantity: dec!(20),
                purchase_price: dec!(72.10),
                purchase_date: NaiveDate::from_ymd_opt(2023, 11, 5).unwrap(),
                current_price: Some(dec!(73)),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn portfolio_header_is_written_without_investments() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());
        let user = Id::from_string("user-1");

        let portfolio = Portfolio::new(user.clone(), "Income", None)?;
        let inv = bond(&portfolio.id);
        storage
            .save_portfolio(&portfolio.clone().with_investments(vec![inv.clone()]))
            .await?;

        let raw = std::fs::read_to_string(
            dir.path()
                .join("portfolios")
                .join(portfolio.id.as_str())
                .join("portfolio.json"),
        )?;
        assert!(!raw.contains("investments"));

        storage.save_investment(&inv).await?;
        let loaded = storage.get_portfolio(&portfolio.id).await?.unwrap();
        assert_eq!(loaded.investments, vec![inv]);
        Ok(())
    }

    #[tokio::test]
    async fn transactions_append_in_order_and_go_with_the_investment() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());
        let portfolio = Portfolio::new(Id::from_string("u"), "Main", None)?;
        let inv = bond(&portfolio.id);
        storage.save_investment(&inv).await?;

        let tx = |qty| {
            Transaction::create(
                inv.id.clone(),
                NewTransaction {
                    transaction_type: TransactionType::Buy,
                    quantity: qty,
                    price: dec!(72),
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    fees: None,
                    notes: None,
                },
            )
        };
        storage.append_transactions(&inv.id, &[tx(dec!(1))?]).await?;
        storage.append_transactions(&inv.id, &[tx(dec!(2))?]).await?;

        let loaded = storage.get_transactions(&inv.id).await?;
        let quantities: Vec<_> = loaded.iter().map(|t| t.quantity).collect();
        assert_eq!(quantities, vec![dec!(1), dec!(2)]);

        assert!(storage.delete_investment(&inv.id).await?);
        assert!(storage.get_transactions(&inv.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unsafe_ids_are_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());
        let err = storage
            .get_investment(&Id::from_string("../outside"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsafe id"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_notifications_file_is_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage
            .list_notifications(&Id::from_string("nobody"))
            .await?
            .is_empty());
        Ok(())
    }
}
