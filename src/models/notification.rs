use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::{Clock, SystemClock};

use super::validation::require_non_empty;
use super::{Id, IdGenerator, UuidIdGenerator, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PriceAlert,
    PortfolioChange,
    Dividend,
    System,
    #[serde(other)]
    Other,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PriceAlert => "price_alert",
            NotificationKind::PortfolioChange => "portfolio_change",
            NotificationKind::Dividend => "dividend",
            NotificationKind::System => "system",
            NotificationKind::Other => "other",
        }
    }

    /// Lenient parse; anything unrecognised becomes `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "price_alert" => NotificationKind::PriceAlert,
            "portfolio_change" => NotificationKind::PortfolioChange,
            "dividend" => NotificationKind::Dividend,
            "system" => NotificationKind::System,
            _ => NotificationKind::Other,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Id,
    pub user_id: Id,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Id,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new_with_generator(&UuidIdGenerator, &SystemClock, user_id, kind, message)
    }

    pub fn new_with_generator(
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
        user_id: Id,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let message = message.into();
        require_non_empty("message", &message)?;
        Ok(Self {
            id: ids.new_id(),
            user_id,
            kind,
            message,
            read: false,
            created_at: clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_deserializes_as_other() {
        let json = r#"{"id":"n1","user_id":"u","type":"margin_call","message":"m",
            "created_at":"2024-01-01T00:00:00Z"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationKind::Other);
        assert!(!n.read);
    }

    #[test]
    fn parse_accepts_display_spellings() {
        assert_eq!(NotificationKind::parse("Price Alert"), NotificationKind::PriceAlert);
        assert_eq!(NotificationKind::parse("dividend"), NotificationKind::Dividend);
        assert_eq!(NotificationKind::parse("whatever"), NotificationKind::Other);
    }
}
