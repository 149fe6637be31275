//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.busview/config.toml`
//! 2. Local config: `.busview/config.toml` (in the given directory)
//! 3. CLI overrides
//!
//! Later sources override earlier ones. Files are merged key by key as raw
//! TOML tables, so a later file may set any value, including a default one.

use crate::error::ConfigError;
use crate::{BusviewConfig, ConfigOverrides};
use std::path::{Path, PathBuf};
use toml::Table;
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".busview";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".busview";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.busview`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config, as written in the file
    global_table: Option<Table>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.busview`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_table: None,
        }
    }

    /// Create a loader with a custom global config directory.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_table: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path below `dir`.
    pub fn local_config_path(&self, dir: &Path) -> PathBuf {
        dir.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for `dir` with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        dir: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BusviewConfig, ConfigError> {
        let mut merged = Table::new();

        if let Some(global) = self.global_table()? {
            merge_tables(&mut merged, global);
        }

        let local_path = self.local_config_path(dir);
        if local_path.exists() {
            debug!("Loading local config from {:?}", local_path);
            merge_tables(&mut merged, load_config_table(&local_path)?);
        } else {
            trace!("Local config not found at {:?}", local_path);
        }

        // Every file was checked on its own, so the merged table decodes as well
        let mut config = table_to_config(&local_path, merged)?;
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load an explicit config file on top of the defaults, then apply overrides.
    ///
    /// Global and local files are ignored.
    pub fn load_file(
        &self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BusviewConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let mut config = table_to_config(path, load_config_table(path)?)?;
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<BusviewConfig>, ConfigError> {
        let Some(table) = self.global_table()? else {
            return Ok(None);
        };
        let path = self.global_config_path().unwrap_or_default();
        table_to_config(&path, table).map(Some)
    }

    /// Raw global table, read once and cached
    fn global_table(&mut self) -> Result<Option<Table>, ConfigError> {
        if let Some(ref table) = self.global_table {
            return Ok(Some(table.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let table = load_config_table(&global_path)?;
        self.global_table = Some(table.clone());

        Ok(Some(table))
    }

    /// Load only the local configuration below `dir`.
    pub fn load_local(&self, dir: &Path) -> Result<Option<BusviewConfig>, ConfigError> {
        let local_path = self.local_config_path(dir);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        let table = load_config_table(&local_path)?;
        table_to_config(&local_path, table).map(Some)
    }

    /// Save configuration to the local config file below `dir`.
    pub fn save_local(&self, dir: &Path, config: &BusviewConfig) -> Result<(), ConfigError> {
        let local_path = self.local_config_path(dir);
        save_config_file(&local_path, config)
    }

    /// Initialize the global configuration.
    ///
    /// Creates `~/.busview/config.toml` with default configuration unless it
    /// already exists.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };
        init_config_dir(global_dir)
    }

    /// Initialize local configuration below `dir`.
    ///
    /// Creates `.busview/config.toml` with default configuration unless it
    /// already exists.
    pub fn init_local(&self, dir: &Path) -> Result<PathBuf, ConfigError> {
        init_config_dir(&dir.join(LOCAL_CONFIG_DIR))
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_table = None;
    }
}

fn init_config_dir(config_dir: &Path) -> Result<PathBuf, ConfigError> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::create_dir(config_dir, e))?;
    }

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        save_config_file(&config_path, &BusviewConfig::default())?;
    }

    Ok(config_path)
}

/// Read a configuration file as a raw table.
///
/// The table is also decoded once so type errors name the file they come from.
fn load_config_table(path: &Path) -> Result<Table, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    let table: Table = toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))?;
    table_to_config(path, table.clone())?;
    Ok(table)
}

/// Decode a raw table, filling unset values with defaults
fn table_to_config(path: &Path, table: Table) -> Result<BusviewConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &BusviewConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge `overlay` into `base`, key by key.
///
/// Nested tables are merged recursively; any other value present in
/// `overlay` replaces the one in `base`.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(nested) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, nested);
                continue;
            }
            base.insert(key, toml::Value::Table(nested));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BusType, ConnectionConfig};
    use tempfile::TempDir;

    fn create_test_config(content: &str, dir: &Path) -> PathBuf {
        let config_dir = dir.join(LOCAL_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn write_global(global_dir: &Path, content: &str) {
        std::fs::create_dir_all(global_dir).unwrap();
        std::fs::write(global_dir.join(CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config, BusviewConfig::default());
    }

    #[test]
    fn test_load_local_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        create_test_config(
            r#"
            [connection]
            service = "org.example.Demo"
            timeout_secs = 5
            "#,
            temp.path(),
        );

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.connection.service.as_deref(), Some("org.example.Demo"));
        assert_eq!(config.connection.timeout_secs, 5);
    }

    #[test]
    fn test_local_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        write_global(
            &global_dir,
            r#"
            [connection]
            bus = "system"
            service = "org.freedesktop.systemd1"

            [logging]
            level = "debug"
            "#,
        );

        create_test_config(
            r#"
            [connection]
            service = "org.freedesktop.login1"
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(
            config.connection.service.as_deref(),
            Some("org.freedesktop.login1")
        );
        // Global values the local file does not set are preserved
        assert_eq!(config.connection.bus, BusType::System);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_all() {
        let temp = TempDir::new().unwrap();

        create_test_config(
            r#"
            [connection]
            service = "org.example.Local"
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let overrides = ConfigOverrides {
            service: Some("org.example.Cli".to_string()),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };

        let config = loader.load(temp.path(), Some(&overrides)).unwrap();

        assert_eq!(config.connection.service.as_deref(), Some("org.example.Cli"));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
            [cache]
            retry_failed = true
            max_depth = 3
            "#,
        )
        .unwrap();

        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let config = loader.load_file(&path, None).unwrap();

        assert!(config.cache.retry_failed);
        assert_eq!(config.cache.max_depth, 3);
        assert_eq!(config.connection, ConnectionConfig::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = create_test_config("[connection\nbus = ", temp.path());

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let err = loader.load(temp.path(), None).unwrap_err();

        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let mut config = BusviewConfig::default();
        config.connection.bus = BusType::System;
        config.logging.level = "warn".to_string();
        loader.save_local(temp.path(), &config).unwrap();

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let loaded = loader.load(temp.path(), None).unwrap();

        assert_eq!(loaded.connection.bus, BusType::System);
        assert_eq!(loaded.logging.level, "warn");
    }

    #[test]
    fn test_init_local_creates_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config_path = loader.init_local(temp.path()).unwrap();

        assert!(config_path.exists());
        assert!(config_path.ends_with(".busview/config.toml"));

        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: BusviewConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, BusviewConfig::default());
    }

    #[test]
    fn test_init_global_keeps_existing_file() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");
        write_global(&global_dir, "[logging]\nlevel = \"error\"\n");

        let loader = ConfigLoader::with_global_dir(&global_dir);
        let path = loader.init_global().unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("error"));
    }

    #[test]
    fn test_local_resets_global_values_to_defaults() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        write_global(
            &global_dir,
            r#"
            [connection]
            bus = "system"
            timeout_secs = 5

            [cache]
            retry_failed = true
            max_depth = 3

            [logging]
            level = "debug"
            ansi = false
            "#,
        );

        create_test_config(
            r#"
            [connection]
            bus = "session"
            timeout_secs = 25

            [cache]
            retry_failed = false
            max_depth = 16

            [logging]
            level = "info"
            ansi = true
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config, BusviewConfig::default());
    }

    #[test]
    fn test_merge_tables_by_presence() {
        let mut base: Table = toml::from_str(
            r#"
            [cache]
            retry_failed = true
            max_depth = 4
            "#,
        )
        .unwrap();
        let overlay: Table = toml::from_str("[cache]\nretry_failed = false\n").unwrap();

        merge_tables(&mut base, overlay);
        let config = table_to_config(Path::new("merged"), base).unwrap();

        assert!(!config.cache.retry_failed);
        assert_eq!(config.cache.max_depth, 4);
    }

    #[test]
    fn test_type_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = create_test_config("[cache]\nmax_depth = \"deep\"\n", temp.path());

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let err = loader.load(temp.path(), None).unwrap_err();

        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_cache_clearing() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");
        write_global(&global_dir, "[logging]\nlevel = \"debug\"\n");

        let mut loader = ConfigLoader::with_global_dir(&global_dir);

        let _ = loader.load_global().unwrap();
        assert!(loader.global_table.is_some());

        loader.clear_cache();
        assert!(loader.global_table.is_none());
    }
}
