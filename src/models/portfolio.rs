use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

use super::validation::require_non_empty;
use super::{Id, IdGenerator, Investment, UuidIdGenerator, ValidationError};

/// A named collection of investments owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Populated by storage on read; persisted separately from the header.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub investments: Vec<Investment>,
}

impl Portfolio {
    pub fn new(
        user_id: Id,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        Self::new_with_generator(&UuidIdGenerator, &SystemClock, user_id, name, description)
    }

    pub fn new_with_generator(
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
        user_id: Id,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        require_non_empty("name", &name)?;
        Ok(Self {
            id: ids.new_id(),
            user_id,
            name: name.trim().to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created_at: clock.now(),
            investments: Vec::new(),
        })
    }

    /// The portfolio without its nested investments.
    pub fn header(&self) -> Self {
        Self {
            investments: Vec::new(),
            ..self.clone()
        }
    }

    pub fn with_investments(mut self, investments: Vec<Investment>) -> Self {
        self.investments = investments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::SequentialIdGenerator;
    use chrono::TimeZone;

    #[test]
    fn new_trims_and_drops_blank_description() {
        let ids = SequentialIdGenerator::new("p");
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let portfolio = Portfolio::new_with_generator(
            &ids,
            &clock,
            Id::from_string("user-1"),
            "  Retirement ",
            Some("   ".to_string()),
        )
        .unwrap();

        assert_eq!(portfolio.id.as_str(), "p-1");
        assert_eq!(portfolio.name, "Retirement");
        assert_eq!(portfolio.description, None);
        assert_eq!(portfolio.created_at, clock.now());
    }

    #[test]
    fn new_rejects_empty_name() {
        assert!(Portfolio::new(Id::new(), "", None).is_err());
    }
}
