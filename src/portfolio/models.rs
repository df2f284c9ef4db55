use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AssetType, Id};

/// Per-investment row: the holding plus its derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMetrics {
    pub investment_id: Id,
    pub portfolio_id: Id,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    /// Current price, or the purchase price when none is recorded.
    pub effective_price: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    /// Percentage; 0 when cost basis is 0.
    pub roi: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub roi: Decimal,
}

impl PortfolioTotals {
    pub fn gain_loss(&self) -> Decimal {
        self.total_value.saturating_sub(self.total_cost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallTotals {
    pub overall_value: Decimal,
    pub overall_cost: Decimal,
    pub overall_roi: Decimal,
}

impl OverallTotals {
    pub fn gain_loss(&self) -> Decimal {
        self.overall_value.saturating_sub(self.overall_cost)
    }
}

/// One category's share of total market value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub category: AssetType,
    pub value: Decimal,
    /// Percentage (0-100). All slices report 0 when total value is 0.
    pub percentage: Decimal,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub portfolio_value: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percentage: Decimal,
    pub portfolio_count: usize,
    pub investment_count: usize,
    pub asset_allocation: Vec<AllocationSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub portfolio_id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub investment_count: usize,
    #[serde(flatten)]
    pub totals: PortfolioTotals,
}

#[derive(Debug, Clone)]
pub struct PortfolioQuery {
    pub user_id: Id,
    /// Include the per-investment rows in the snapshot.
    pub include_investments: bool,
}

impl PortfolioQuery {
    pub fn for_user(user_id: Id) -> Self {
        Self {
            user_id,
            include_investments: false,
        }
    }

    pub fn with_investments(mut self) -> Self {
        self.include_investments = true;
        self
    }
}

/// Everything derived from one user's portfolios at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub portfolios: Vec<PortfolioMetrics>,
    #[serde(flatten)]
    pub overall: OverallTotals,
    pub asset_allocation: Vec<AllocationSlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investments: Option<Vec<InvestmentMetrics>>,
}
