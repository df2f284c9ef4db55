use anyhow::Result;

use crate::models::{Id, Investment, Portfolio};

use super::Storage;

/// Resolve one of the user's portfolios by id or (case-insensitive) name.
pub async fn find_portfolio(
    storage: &dyn Storage,
    user_id: &Id,
    id_or_name: &str,
) -> Result<Option<Portfolio>> {
    let portfolios = storage.list_portfolios(user_id).await?;

    if let Some(found) = portfolios.iter().find(|p| p.id.as_str() == id_or_name) {
        return Ok(Some(found.clone()));
    }

    let mut matches: Vec<Portfolio> = portfolios
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(id_or_name.trim()))
        .collect();

    if matches.len() > 1 {
        let ids: Vec<String> = matches.iter().map(|p| p.id.to_string()).collect();
        anyhow::bail!("Multiple portfolios named '{id_or_name}'. Use an ID instead: {ids:?}");
    }

    Ok(matches.pop())
}

/// Resolve one of the user's investments by id or symbol.
///
/// Symbols may repeat across portfolios; pass `portfolio` to narrow the search.
pub async fn find_investment(
    storage: &dyn Storage,
    user_id: &Id,
    id_or_symbol: &str,
    portfolio: Option<&Id>,
) -> Result<Option<Investment>> {
    let investments: Vec<Investment> = storage
        .list_portfolios(user_id)
        .await?
        .into_iter()
        .filter(|p| portfolio.map_or(true, |id| &p.id == id))
        .flat_map(|p| p.investments)
        .collect();

    if let Some(found) = investments.iter().find(|i| i.id.as_str() == id_or_symbol) {
        return Ok(Some(found.clone()));
    }

    let mut matches: Vec<Investment> = investments
        .into_iter()
        .filter(|i| i.symbol.eq_ignore_ascii_case(id_or_symbol.trim()))
        .collect();

    if matches.len() > 1 {
        let ids: Vec<String> = matches.iter().map(|i| i.id.to_string()).collect();
        anyhow::bail!(
            "Symbol '{id_or_symbol}' is held in more than one place. \
             Use an ID or --portfolio: {ids:?}"
        );
    }

    Ok(matches.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetType, NewInvestment};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn holding(portfolio: &Portfolio, symbol: &str) -> Investment {
        Investment::create(
            portfolio.id.clone(),
            NewInvestment {
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                asset_type: AssetType::Etf,
                quantity: dec!(1),
                purchase_price: dec!(100),
                purchase_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                current_price: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn find_portfolio_by_name_ignores_case_and_other_users() -> Result<()> {
        let storage = MemoryStorage::new();
        let me = Id::from_string("me");
        let other = Id::from_string("other");
        let mine = Portfolio::new(me.clone(), "Growth", None)?;
        storage.save_portfolio(&mine).await?;
        storage
            .save_portfolio(&Portfolio::new(other.clone(), "Growth", None)?)
            .await?;

        let found = find_portfolio(&storage, &me, "growth").await?.unwrap();
        assert_eq!(found.id, mine.id);
        assert!(find_portfolio(&storage, &me, "Income").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn find_portfolio_errors_on_duplicate_names() -> Result<()> {
        let storage = MemoryStorage::new();
        let me = Id::from_string("me");
        storage
            .save_portfolio(&Portfolio::new(me.clone(), "Dup", None)?)
            .await?;
        storage
            .save_portfolio(&Portfolio::new(me.clone(), "dup", None)?)
            .await?;

        let err = find_portfolio(&storage, &me, "Dup").await.unwrap_err();
        assert!(err.to_string().contains("Multiple portfolios named"));
        Ok(())
    }

    #[tokio::test]
    async fn find_investment_narrows_by_portfolio() -> Result<()> {
        let storage = MemoryStorage::new();
        let me = Id::from_string("me");
        let a = Portfolio::new(me.clone(), "A", None)?;
        let b = Portfolio::new(me.clone(), "B", None)?;
        storage.save_portfolio(&a).await?;
        storage.save_portfolio(&b).await?;
        let in_a = holding(&a, "VOO");
        storage.save_investment(&in_a).await?;
        storage.save_investment(&holding(&b, "VOO")).await?;

        assert!(find_investment(&storage, &me, "voo", None).await.is_err());
        let found = find_investment(&storage, &me, "voo", Some(&a.id))
            .await?
            .unwrap();
        assert_eq!(found.id, in_a.id);
        Ok(())
    }
}
