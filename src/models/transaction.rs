use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::validation::{require_non_negative, require_positive, require_within_limit};
use super::{Id, IdGenerator, UuidIdGenerator, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            other => anyhow::bail!("Invalid transaction type: {other} (expected buy or sell)"),
        }
    }
}

/// A recorded buy or sell against an investment. Stored as JSONL, one line per
/// transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Id,
    pub investment_id: Id,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// User-supplied fields for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub date: NaiveDate,
    pub fees: Option<Decimal>,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_positive("quantity", self.quantity)?;
        require_within_limit("quantity", self.quantity)?;
        require_non_negative("price", self.price)?;
        require_within_limit("price", self.price)?;
        if let Some(fees) = self.fees {
            require_non_negative("fees", fees)?;
            require_within_limit("fees", fees)?;
        }
        Ok(())
    }
}

impl Transaction {
    pub fn create(investment_id: Id, new: NewTransaction) -> Result<Self, ValidationError> {
        Self::create_with_generator(&UuidIdGenerator, investment_id, new)
    }

    pub fn create_with_generator(
        ids: &dyn IdGenerator,
        investment_id: Id,
        new: NewTransaction,
    ) -> Result<Self, ValidationError> {
        new.validate()?;
        Ok(Self {
            id: ids.new_id(),
            investment_id,
            transaction_type: new.transaction_type,
            quantity: new.quantity,
            price: new.price,
            date: new.date,
            fees: new.fees,
            notes: new
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }

    /// Price times quantity, before fees. Saturates for records that
    /// bypassed validation.
    pub fn total(&self) -> Decimal {
        self.price.saturating_mul(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SequentialIdGenerator;
    use rust_decimal_macros::dec;

    fn buy(quantity: Decimal, price: Decimal) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Buy,
            quantity,
            price,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            fees: Some(dec!(1.5)),
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn create_assigns_id_and_drops_blank_notes() {
        let ids = SequentialIdGenerator::new("tx");
        let tx = Transaction::create_with_generator(
            &ids,
            Id::from_string("inv-1"),
            buy(dec!(4), dec!(25)),
        )
        .unwrap();
        assert_eq!(tx.id.as_str(), "tx-1");
        assert_eq!(tx.notes, None);
        assert_eq!(tx.total(), dec!(100));
    }

    #[test]
    fn create_rejects_zero_quantity() {
        let err = Transaction::create(Id::new(), buy(dec!(0), dec!(25))).unwrap_err();
        assert!(matches!(err, ValidationError::NotPositive { field: "quantity", .. }));
    }

    #[test]
    fn create_rejects_negative_fees() {
        let mut new = buy(dec!(1), dec!(25));
        new.fees = Some(dec!(-2));
        assert!(Transaction::create(Id::new(), new).is_err());
    }

    #[test]
    fn create_rejects_amounts_above_the_limit() {
        let err = Transaction::create(Id::new(), buy(dec!(1), dec!(1000000000001))).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { field: "price", .. }));
    }

    #[test]
    fn transaction_type_parses_case_insensitively() {
        assert_eq!("BUY".parse::<TransactionType>().unwrap(), TransactionType::Buy);
        assert_eq!(" sell ".parse::<TransactionType>().unwrap(), TransactionType::Sell);
        assert!("hold".parse::<TransactionType>().is_err());
    }
}
