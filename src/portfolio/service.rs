use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::models::Portfolio;
use crate::storage::Storage;

use super::{
    asset_allocation, investment_metrics, portfolio_metrics, sum_totals, PortfolioQuery,
    PortfolioSnapshot,
};

/// Loads a user's portfolios and derives the valuation snapshot from them.
pub struct PortfolioService {
    storage: Arc<dyn Storage>,
}

impl PortfolioService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn calculate(&self, query: &PortfolioQuery) -> Result<PortfolioSnapshot> {
        let portfolios = self.storage.list_portfolios(&query.user_id).await?;
        debug!(
            user = %query.user_id,
            portfolios = portfolios.len(),
            "Calculating portfolio snapshot"
        );
        Ok(snapshot_of(&portfolios, query.include_investments))
    }
}

/// Build the snapshot for an already-loaded set of portfolios.
pub fn snapshot_of(portfolios: &[Portfolio], include_investments: bool) -> PortfolioSnapshot {
    let metrics: Vec<_> = portfolios.iter().map(portfolio_metrics).collect();
    let overall = sum_totals(metrics.iter().map(|m| m.totals));
    let investments = include_investments.then(|| {
        portfolios
            .iter()
            .flat_map(|p| p.investments.iter())
            .map(investment_metrics)
            .collect()
    });

    PortfolioSnapshot {
        portfolios: metrics,
        overall,
        asset_allocation: asset_allocation(portfolios),
        investments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetType, Id, Investment, NewInvestment};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn seed(storage: &MemoryStorage, user: &Id) -> Result<()> {
        let growth = Portfolio::new(user.clone(), "Growth", None)?;
        let income = Portfolio::new(user.clone(), "Income", Some("Dividends".to_string()))?;
        storage.save_portfolio(&growth).await?;
        storage.save_portfolio(&income).await?;

        let rows = [
            (&growth, "AAPL", AssetType::Stock, dec!(100), dec!(10), Some(dec!(12))),
            (&growth, "BTC", AssetType::Crypto, dec!(10), dec!(50), None),
            (&income, "BND", AssetType::Bond, dec!(5), dec!(100), Some(dec!(90))),
        ];
        for (portfolio, symbol, asset_type, quantity, price, current) in rows {
            let inv = Investment::create(
                portfolio.id.clone(),
                NewInvestment {
                    symbol: symbol.to_string(),
                    name: symbol.to_string(),
                    asset_type,
                    quantity,
                    purchase_price: price,
                    purchase_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    current_price: current,
                },
            )?;
            storage.save_investment(&inv).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn calculate_builds_totals_from_storage() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let user = Id::from_string("user-1");
        seed(&storage, &user).await?;

        let service = PortfolioService::new(storage.clone());
        let snapshot = service
            .calculate(&PortfolioQuery::for_user(user.clone()).with_investments())
            .await?;

        assert_eq!(snapshot.portfolios.len(), 2);
        assert_eq!(snapshot.overall.overall_value, dec!(2150));
        assert_eq!(snapshot.overall.overall_cost, dec!(2000));
        assert_eq!(snapshot.overall.overall_roi, dec!(7.5));
        assert_eq!(snapshot.investments.as_ref().map(Vec::len), Some(3));

        let pct: Decimal = snapshot.asset_allocation.iter().map(|s| s.percentage).sum();
        assert!((pct - dec!(100)).abs() < dec!(0.000001));
        Ok(())
    }

    #[tokio::test]
    async fn calculate_for_user_without_portfolios_is_zero() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let service = PortfolioService::new(storage);
        let snapshot = service
            .calculate(&PortfolioQuery::for_user(Id::from_string("nobody")))
            .await?;

        assert!(snapshot.portfolios.is_empty());
        assert!(snapshot.asset_allocation.is_empty());
        assert_eq!(snapshot.overall.overall_roi, Decimal::ZERO);
        assert!(snapshot.investments.is_none());
        Ok(())
    }
}
