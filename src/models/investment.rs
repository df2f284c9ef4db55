use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{require_non_empty, require_non_negative, require_within_limit};
use super::{AssetType, Id, IdGenerator, UuidIdGenerator, ValidationError};

/// A position held in a portfolio.
///
/// `quantity` and `purchase_price` are maintained by the user; recorded
/// transactions do not rewrite them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: Id,
    pub portfolio_id: Id,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    /// Last known market price. `None` until a price has been recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
}

fn require_amount(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    require_non_negative(field, value)?;
    require_within_limit(field, value)
}

/// User-supplied fields for a new investment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestment {
    pub symbol: String,
    pub name: String,
    pub asset_type: AssetType,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    pub current_price: Option<Decimal>,
}

impl NewInvestment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("symbol", &self.symbol)?;
        require_non_empty("name", &self.name)?;
        require_amount("quantity", self.quantity)?;
        require_amount("purchase_price", self.purchase_price)?;
        if let Some(price) = self.current_price {
            require_amount("current_price", price)?;
        }
        Ok(())
    }
}

impl Investment {
    /// Validate `new` and build an investment owned by `portfolio_id`.
    pub fn create(portfolio_id: Id, new: NewInvestment) -> Result<Self, ValidationError> {
        Self::create_with_generator(&UuidIdGenerator, portfolio_id, new)
    }

    pub fn create_with_generator(
        ids: &dyn IdGenerator,
        portfolio_id: Id,
        new: NewInvestment,
    ) -> Result<Self, ValidationError> {
        new.validate()?;
        Ok(Self {
            id: ids.new_id(),
            portfolio_id,
            symbol: new.symbol.trim().to_uppercase(),
            name: new.name.trim().to_string(),
            asset_type: new.asset_type,
            quantity: new.quantity,
            purchase_price: new.purchase_price,
            purchase_date: new.purchase_date,
            current_price: new.current_price,
        })
    }

    /// Record a refreshed market price.
    pub fn set_current_price(&mut self, price: Decimal) -> Result<(), ValidationError> {
        require_amount("current_price", price)?;
        self.current_price = Some(price);
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: Decimal) -> Result<(), ValidationError> {
        require_amount("quantity", quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SequentialIdGenerator;
    use rust_decimal_macros::dec;

    fn new_investment() -> NewInvestment {
        NewInvestment {
            symbol: " aapl ".to_string(),
            name: "Apple Inc.".to_string(),
            asset_type: AssetType::Stock,
            quantity: dec!(10),
            purchase_price: dec!(150.25),
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            current_price: None,
        }
    }

    #[test]
    fn create_normalizes_symbol_and_assigns_id() {
        let ids = SequentialIdGenerator::new("inv");
        let inv = Investment::create_with_generator(&ids, Id::from_string("p-1"), new_investment())
            .unwrap();
        assert_eq!(inv.id.as_str(), "inv-1");
        assert_eq!(inv.symbol, "AAPL");
        assert_eq!(inv.portfolio_id.as_str(), "p-1");
    }

    #[test]
    fn create_rejects_negative_quantity() {
        let mut new = new_investment();
        new.quantity = dec!(-1);
        let err = Investment::create(Id::new(), new).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Negative {
                field: "quantity",
                value: dec!(-1)
            }
        );
    }

    #[test]
    fn create_rejects_negative_current_price() {
        let mut new = new_investment();
        new.current_price = Some(dec!(-0.01));
        assert!(Investment::create(Id::new(), new).is_err());
    }

    #[test]
    fn set_current_price_rejects_negative_and_keeps_old_value() {
        let mut inv = Investment::create(Id::new(), new_investment()).unwrap();
        inv.set_current_price(dec!(160)).unwrap();
        assert!(inv.set_current_price(dec!(-5)).is_err());
        assert_eq!(inv.current_price, Some(dec!(160)));
    }

    #[test]
    fn create_rejects_amounts_above_the_limit() {
        let mut new = new_investment();
        new.quantity = dec!(100000000000000000);
        new.purchase_price = dec!(100000000000000000);
        let err = Investment::create(Id::new(), new).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { field: "quantity", .. }));

        let mut inv = Investment::create(Id::new(), new_investment()).unwrap();
        assert!(inv.set_current_price(dec!(1000000000001)).is_err());
        assert!(inv.set_quantity(dec!(1000000000001)).is_err());
        assert_eq!(inv.quantity, dec!(10));
    }

    #[test]
    fn serializes_type_field_and_decimal_strings() {
        let inv = Investment::create(Id::from_string("p"), new_investment()).unwrap();
        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["type"], "stock");
        assert_eq!(json["purchase_price"], "150.25");
        assert!(json.get("current_price").is_none());
    }
}
