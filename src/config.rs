// ABOUTME: Optional TOML configuration for where aliases live and which SSH client runs them
// ABOUTME: Every field has a default, so a missing config file behaves like the stock setup

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ssh: SshConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SshConfig {
    pub binary: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: PathBuf::from("~/.sshort"),
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        SshConfig {
            binary: "ssh".to_string(),
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# sshort configuration

[storage]
# Alias file, one `name|target|extra_args` entry per line
path = "~/.sshort"

[ssh]
# SSH client to launch, looked up in PATH unless it contains a slash
binary = "ssh"
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("sshort").join("config.toml"))
    }

    /// Loads `explicit` if given (it must exist), otherwise the default
    /// location if present, otherwise built-in defaults. `storage_override`
    /// replaces the configured alias file before paths are checked.
    pub fn load(explicit: Option<&Path>, storage_override: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => {
                    tracing::debug!("Loading configuration from {}", path.display());
                    Self::load_from_file(&path)?
                }
                _ => Config::default(),
            },
        };
        if let Some(path) = storage_override {
            config.storage.path = path.to_path_buf();
        }
        config.expand_path()?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the commented default configuration, refusing to overwrite.
    pub fn save_default_config(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Configuration file already exists: {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }

    pub fn expand_path(&mut self) -> Result<()> {
        self.storage.path = expand_tilde(&self.storage.path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let path = self.storage.path.as_os_str();
        if path.is_empty() || path.to_str().is_some_and(|p| p.trim().is_empty()) {
            anyhow::bail!("Storage path cannot be empty");
        }

        if self.ssh.binary.trim().is_empty() {
            anyhow::bail!("SSH binary cannot be empty");
        }

        Ok(())
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage.path
    }
}

fn expand_tilde(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) if !rest.as_os_str().is_empty() => {
            let home = dirs::home_dir().context("Failed to determine home directory")?;
            Ok(home.join(rest))
        }
        _ => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[storage]
path = "/var/lib/sshort/aliases"

[ssh]
binary = "/usr/local/bin/ssh"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.storage_path(), Path::new("/var/lib/sshort/aliases"));
        assert_eq!(config.ssh.binary, "/usr/local/bin/ssh");
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config_str = r#"
[ssh]
binary = "autossh"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.storage_path(), Path::new("~/.sshort"));
        assert_eq!(config.ssh.binary, "autossh");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_invalid_config_wrong_type() {
        let config_str = r#"
[storage]
path = 42
"#;

        let result = Config::load_from_str(config_str);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse configuration"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(expand_tilde(Path::new("~/.sshort")).unwrap(), home.join(".sshort"));
        assert_eq!(
            expand_tilde(Path::new("/absolute/path")).unwrap(),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            expand_tilde(Path::new("relative/path")).unwrap(),
            PathBuf::from("relative/path")
        );
    }

    #[test]
    fn test_config_expand_paths() {
        let mut config = Config::default();
        config.expand_path().unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(config.storage_path(), home.join(".sshort").as_path());
        assert_eq!(config.ssh.binary, "ssh");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path().unwrap();
        assert!(path.to_string_lossy().contains("sshort"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_validate_empty_storage_path() {
        let mut config = Config::default();
        config.storage.path = PathBuf::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Storage path cannot be empty"));
    }

    #[test]
    fn test_validate_empty_ssh_binary() {
        let mut config = Config::default();
        config.ssh.binary = "  ".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SSH binary cannot be empty"));
    }

    #[test]
    fn test_default_config_content_can_be_parsed() {
        let content = Config::default_config_content();
        let config = Config::load_from_str(content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sshort").join("config.toml");

        Config::save_default_config(&path).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, Config::default());

        let again = Config::save_default_config(&path);
        assert!(again.is_err());
        assert!(again.unwrap_err().to_string().contains("already exists"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\npath = \"/tmp/aliases\"\n").unwrap();

        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(config.storage_path(), Path::new("/tmp/aliases"));
        assert_eq!(config.ssh.binary, "ssh");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(dir.path().join("absent.toml").as_path()), None);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read configuration file"));
    }

    #[test]
    fn test_validate_whitespace_storage_path() {
        let mut config = Config::default();
        config.storage.path = PathBuf::from("  ");

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_override_replaces_configured_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\npath = \"/tmp/aliases\"\n").unwrap();
        let alias_file = dir.path().join("other-aliases");

        let config = Config::load(Some(path.as_path()), Some(alias_file.as_path())).unwrap();

        assert_eq!(config.storage_path(), alias_file.as_path());
    }

    #[test]
    fn test_storage_override_is_validated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let result = Config::load(Some(path.as_path()), Some(Path::new("")));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Storage path cannot be empty"));
    }

    #[cfg(unix)]
    #[test]
    fn test_storage_override_keeps_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();
        let alias_file = dir.path().join(OsStr::from_bytes(b"aliases-\xff"));

        let config = Config::load(Some(path.as_path()), Some(alias_file.as_path())).unwrap();

        assert_eq!(config.storage_path(), alias_file.as_path());
    }
}
