use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Id;

/// User id used when neither the config nor the command line names one.
pub const DEFAULT_USER: &str = "default";

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Round currency values to this many decimal places for display.
    ///
    /// Purely presentational; calculations always use full precision.
    pub currency_decimals: Option<u32>,

    /// Render currency values with thousands separators.
    pub currency_grouping: bool,

    /// Optional currency symbol (e.g. "$") prefixed to currency values.
    pub currency_symbol: Option<String>,

    /// When true and `currency_decimals` is set, pad to exactly that many
    /// decimal places.
    pub currency_fixed_decimals: bool,

    /// Decimal places for percentages (ROI, allocation).
    pub percentage_decimals: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_decimals: Some(2),
            currency_grouping: true,
            currency_symbol: Some("$".to_string()),
            currency_fixed_decimals: true,
            percentage_decimals: 2,
        }
    }
}

/// Dashboard composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of recent transactions shown on the dashboard.
    pub recent_transactions: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_transactions: 5,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// The user whose records commands act on.
    #[serde(default = "default_user")]
    pub user: String,

    /// Display/output formatting settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            user: default_user(),
            display: DisplayConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }

    fn resolve(self, config_dir: &Path) -> Result<ResolvedConfig> {
        let data_dir = self.resolve_data_dir(config_dir);
        let user_id = Id::from_string_checked(self.user.trim())
            .context("Invalid `user` in config")?;
        Ok(ResolvedConfig {
            data_dir,
            user_id,
            display: self.display,
            dashboard: self.dashboard,
        })
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved data directory path.
    pub data_dir: PathBuf,

    /// The user whose records commands act on.
    pub user_id: Id,

    /// Display/output formatting settings.
    pub display: DisplayConfig,

    /// Dashboard settings.
    pub dashboard: DashboardConfig,
}

impl ResolvedConfig {
    /// Defaults rooted at `data_dir`; handy for tests and embedding.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            user_id: Id::from_string(DEFAULT_USER),
            display: DisplayConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }

    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        Config::load(&config_path)?.resolve(config_dir)
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Without a file, the config file's intended parent directory becomes
    /// the data directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Config::default().resolve(config_dir)
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./investfolio.toml` if it exists in current directory
/// 2. `~/.local/share/investfolio/investfolio.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("investfolio.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("investfolio").join("investfolio.toml");
    }

    local_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_data_dir_is_config_dir() {
        let config = Config::default();
        let config_dir = Path::new("/home/user/investments");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/home/user/investments")
        );
    }

    #[test]
    fn test_relative_and_absolute_data_dir() {
        let config_dir = Path::new("/home/user/investments");
        let relative = Config {
            data_dir: Some(PathBuf::from("data")),
            ..Default::default()
        };
        assert_eq!(
            relative.resolve_data_dir(config_dir),
            PathBuf::from("/home/user/investments/data")
        );

        let absolute = Config {
            data_dir: Some(PathBuf::from("/srv/investfolio")),
            ..Default::default()
        };
        assert_eq!(
            absolute.resolve_data_dir(config_dir),
            PathBuf::from("/srv/investfolio")
        );
    }

    #[test]
    fn test_load_empty_config_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("investfolio.toml");
        std::fs::File::create(&config_path)?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.data_dir, None);
        assert_eq!(config.user, DEFAULT_USER);
        assert_eq!(config.dashboard.recent_transactions, 5);
        assert_eq!(config.display.percentage_decimals, 2);
        Ok(())
    }

    #[test]
    fn test_load_sections() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("investfolio.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "user = \"alice\"")?;
        writeln!(file, "[display]")?;
        writeln!(file, "currency_symbol = \"€\"")?;
        writeln!(file, "currency_grouping = false")?;
        writeln!(file, "[dashboard]")?;
        writeln!(file, "recent_transactions = 10")?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.user, "alice");
        assert_eq!(config.display.currency_symbol.as_deref(), Some("€"));
        assert!(!config.display.currency_grouping);
        assert_eq!(config.display.currency_decimals, Some(2));
        assert_eq!(config.dashboard.recent_transactions, 10);
        Ok(())
    }

    #[test]
    fn test_resolved_config_rejects_unsafe_user() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("investfolio.toml");
        std::fs::write(&config_path, "user = \"../root\"\n")?;

        let err = ResolvedConfig::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("Invalid `user`"));
        Ok(())
    }

    #[test]
    fn test_resolved_config_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("investfolio.toml");

        let resolved = ResolvedConfig::load_or_default(&config_path)?;
        assert_eq!(resolved.data_dir, dir.path());
        assert_eq!(resolved.user_id.as_str(), DEFAULT_USER);
        Ok(())
    }

    #[test]
    fn test_resolved_config_resolves_relative_data_dir() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("investfolio.toml");
        std::fs::write(&config_path, "data_dir = \"./data\"\n")?;

        let resolved = ResolvedConfig::load(&config_path)?;
        assert_eq!(resolved.data_dir, dir.path().canonicalize()?.join("data"));
        Ok(())
    }
}
