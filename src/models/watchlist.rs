use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

use super::validation::require_non_empty;
use super::{Id, IdGenerator, UuidIdGenerator, ValidationError};

/// Name given to the watchlist created for users who have none.
pub const DEFAULT_WATCHLIST_NAME: &str = "My Watchlist";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub symbol: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

/// Symbols a user follows without holding them. Holds no price data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    #[serde(default)]
    pub items: Vec<WatchlistItem>,
}

impl Watchlist {
    pub fn new(user_id: Id, name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new_with_generator(&UuidIdGenerator, user_id, name)
    }

    pub fn new_with_generator(
        ids: &dyn IdGenerator,
        user_id: Id,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        require_non_empty("name", &name)?;
        Ok(Self {
            id: ids.new_id(),
            user_id,
            name: name.trim().to_string(),
            items: Vec::new(),
        })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.symbol.eq_ignore_ascii_case(symbol.trim()))
    }

    /// Add a symbol. Returns false (and leaves the list alone) if it is
    /// already watched.
    pub fn add_item(
        &mut self,
        clock: &dyn Clock,
        symbol: &str,
        name: &str,
    ) -> Result<bool, ValidationError> {
        require_non_empty("symbol", symbol)?;
        if self.contains(symbol) {
            return Ok(false);
        }
        let symbol = symbol.trim().to_uppercase();
        let name = match name.trim() {
            "" => symbol.clone(),
            n => n.to_string(),
        };
        self.items.push(WatchlistItem {
            symbol,
            name,
            added_at: clock.now(),
        });
        Ok(true)
    }

    /// Remove a symbol. Returns true if it was present.
    pub fn remove_item(&mut self, symbol: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| !item.symbol.eq_ignore_ascii_case(symbol.trim()));
        self.items.len() != before
    }
}
