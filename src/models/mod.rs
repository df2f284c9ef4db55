mod asset_type;
mod id;
mod id_generator;
mod investment;
mod notification;
mod portfolio;
mod transaction;
mod validation;
mod watchlist;

pub use asset_type::{AssetType, ParseAssetTypeError};
pub use id::{Id, IdError};
pub use id_generator::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use investment::{Investment, NewInvestment};
pub use notification::{Notification, NotificationKind};
pub use portfolio::Portfolio;
pub use transaction::{NewTransaction, Transaction, TransactionType};
pub use validation::{ValidationError, MAX_AMOUNT};
pub use watchlist::{Watchlist, WatchlistItem, DEFAULT_WATCHLIST_NAME};
