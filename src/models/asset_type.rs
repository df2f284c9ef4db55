use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category an investment is grouped under for asset allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Bond,
    Etf,
    MutualFund,
    Crypto,
    Cash,
    RealEstate,
    Commodity,
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 9] = [
        AssetType::Stock,
        AssetType::Bond,
        AssetType::Etf,
        AssetType::MutualFund,
        AssetType::Crypto,
        AssetType::Cash,
        AssetType::RealEstate,
        AssetType::Commodity,
        AssetType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Bond => "bond",
            AssetType::Etf => "etf",
            AssetType::MutualFund => "mutual_fund",
            AssetType::Crypto => "crypto",
            AssetType::Cash => "cash",
            AssetType::RealEstate => "real_estate",
            AssetType::Commodity => "commodity",
            AssetType::Other => "other",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Unknown asset type {0:?} (expected one of: stock, bond, etf, mutual_fund, crypto, cash, \
     real_estate, commodity, other)"
)]
pub struct ParseAssetTypeError(String);

impl FromStr for AssetType {
    type Err = ParseAssetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        AssetType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ParseAssetTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_spellings() {
        assert_eq!("Stock".parse::<AssetType>(), Ok(AssetType::Stock));
        assert_eq!("mutual fund".parse::<AssetType>(), Ok(AssetType::MutualFund));
        assert_eq!("real-estate".parse::<AssetType>(), Ok(AssetType::RealEstate));
        assert!("options".parse::<AssetType>().is_err());
    }

    #[test]
    fn serde_matches_display() {
        for t in AssetType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{t}\""));
        }
    }
}
