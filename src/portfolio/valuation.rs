//! Valuation and performance aggregation.
//!
//! Everything here is a pure function of the records passed in. Inputs are
//! assumed to have passed entry-boundary validation; nothing is checked here
//! beyond the two division guards (zero cost basis, zero total value).
//! Arithmetic saturates at `Decimal::MAX`/`Decimal::MIN` instead of panicking,
//! so records that bypassed validation still produce a result.

use rust_decimal::Decimal;

use crate::models::{AssetType, Investment, Portfolio};

use super::{
    AllocationSlice, DashboardSummary, InvestmentMetrics, OverallTotals, PortfolioMetrics,
    PortfolioTotals,
};

/// The price used for valuation: current price if recorded, else purchase price.
pub fn effective_price(investment: &Investment) -> Decimal {
    investment
        .current_price
        .unwrap_or(investment.purchase_price)
}

pub fn investment_market_value(investment: &Investment) -> Decimal {
    effective_price(investment).saturating_mul(investment.quantity)
}

pub fn investment_cost_basis(investment: &Investment) -> Decimal {
    investment.purchase_price.saturating_mul(investment.quantity)
}

pub fn investment_gain_loss(investment: &Investment) -> Decimal {
    investment_market_value(investment).saturating_sub(investment_cost_basis(investment))
}

/// `part / whole * 100`, saturating on overflow. `whole` must be non-zero.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part.is_sign_negative() == whole.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

/// Return on investment as a percentage, or `None` when the cost basis is not
/// positive and ROI is undefined.
pub fn roi(market_value: Decimal, cost_basis: Decimal) -> Option<Decimal> {
    if cost_basis > Decimal::ZERO {
        Some(percent_of(market_value.saturating_sub(cost_basis), cost_basis))
    } else {
        None
    }
}

/// Return on investment as a percentage; 0 when the cost basis is 0.
pub fn calculate_roi(market_value: Decimal, cost_basis: Decimal) -> Decimal {
    roi(market_value, cost_basis).unwrap_or(Decimal::ZERO)
}

pub fn investment_metrics(investment: &Investment) -> InvestmentMetrics {
    let market_value = investment_market_value(investment);
    let cost_basis = investment_cost_basis(investment);
    InvestmentMetrics {
        investment_id: investment.id.clone(),
        portfolio_id: investment.portfolio_id.clone(),
        symbol: investment.symbol.clone(),
        name: investment.name.clone(),
        asset_type: investment.asset_type,
        quantity: investment.quantity,
        purchase_price: investment.purchase_price,
        effective_price: effective_price(investment),
        market_value,
        cost_basis,
        gain_loss: market_value.saturating_sub(cost_basis),
        roi: calculate_roi(market_value, cost_basis),
    }
}

pub fn portfolio_totals(portfolio: &Portfolio) -> PortfolioTotals {
    let total_value = saturating_sum(portfolio.investments.iter().map(investment_market_value));
    let total_cost = saturating_sum(portfolio.investments.iter().map(investment_cost_basis));
    PortfolioTotals {
        total_value,
        total_cost,
        roi: calculate_roi(total_value, total_cost),
    }
}

pub fn portfolio_metrics(portfolio: &Portfolio) -> PortfolioMetrics {
    PortfolioMetrics {
        portfolio_id: portfolio.id.clone(),
        name: portfolio.name.clone(),
        description: portfolio.description.clone(),
        investment_count: portfolio.investments.len(),
        totals: portfolio_totals(portfolio),
    }
}

/// Sum of each portfolio's totals, with ROI recomputed on the sums.
pub fn aggregate_across_portfolios(portfolios: &[Portfolio]) -> OverallTotals {
    sum_totals(portfolios.iter().map(portfolio_totals))
}

pub(crate) fn sum_totals(totals: impl IntoIterator<Item = PortfolioTotals>) -> OverallTotals {
    let (overall_value, overall_cost) = totals
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(value, cost), t| {
            (
                value.saturating_add(t.total_value),
                cost.saturating_add(t.total_cost),
            )
        });
    OverallTotals {
        overall_value,
        overall_cost,
        overall_roi: calculate_roi(overall_value, overall_cost),
    }
}

/// Market value per asset type across every investment of every portfolio.
///
/// Categories appear in the order they are first encountered (portfolio order,
/// then investment order within a portfolio). Categories with no investments
/// are omitted.
pub fn asset_allocation(portfolios: &[Portfolio]) -> Vec<AllocationSlice> {
    let mut by_category: Vec<(AssetType, Decimal)> = Vec::new();
    for investment in portfolios.iter().flat_map(|p| p.investments.iter()) {
        let value = investment_market_value(investment);
        match by_category
            .iter_mut()
            .find(|(category, _)| *category == investment.asset_type)
        {
            Some((_, total)) => *total = total.saturating_add(value),
            None => by_category.push((investment.asset_type, value)),
        }
    }

    let total = saturating_sum(by_category.iter().map(|(_, value)| *value));
    by_category
        .into_iter()
        .map(|(category, value)| AllocationSlice {
            category,
            value,
            percentage: if total.is_zero() {
                Decimal::ZERO
            } else {
                percent_of(value, total)
            },
        })
        .collect()
}

pub fn dashboard_summary(portfolios: &[Portfolio]) -> DashboardSummary {
    let overall = aggregate_across_portfolios(portfolios);
    DashboardSummary {
        portfolio_value: overall.overall_value,
        total_gain_loss: overall.gain_loss(),
        total_gain_loss_percentage: overall.overall_roi,
        portfolio_count: portfolios.len(),
        investment_count: portfolios.iter().map(|p| p.investments.len()).sum(),
        asset_allocation: asset_allocation(portfolios),
    }
}
