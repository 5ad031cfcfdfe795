//! Configuration resolution.
//!
//! Settings come from three layers. Precedence, highest first:
//! CLI flag or environment variable > `<dir>/config.toml` > built-in defaults.
//!
//! ```toml
//! log = "trackflow=debug"
//!
//! [user]
//! name = "Sarah Chen"
//! role = "manager"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TrackflowError};
use crate::permissions::{CurrentUser, Role};

/// Name of the optional config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Filter used when nothing else is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub log: Option<String>,
    pub user: UserSection,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct UserSection {
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub dir: Option<PathBuf>,
    pub user: Option<String>,
    pub role: Option<Role>,
    pub log: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dir: PathBuf,
    pub user: CurrentUser,
    pub log_filter: String,
}

/// Default data directory, `~/.trackflow`.
pub fn default_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".trackflow")
}

/// Read `config.toml` from `dir`. A missing file is an empty config.
pub fn load_config_file(dir: &Path) -> Result<ConfigFile> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let text = fs::read_to_string(&path)?;
    parse_config(&text).map_err(|e| match e {
        TrackflowError::Config(msg) => TrackflowError::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse config file text.
pub fn parse_config(text: &str) -> Result<ConfigFile> {
    toml::from_str(text).map_err(|e| TrackflowError::Config(e.to_string()))
}

/// Merge overrides, the config file and defaults.
pub fn resolve(overrides: Overrides) -> Result<Settings> {
    let dir = overrides.dir.unwrap_or_else(default_dir);
    let file = load_config_file(&dir)?;
    Ok(merge(dir, overrides.user, overrides.role, overrides.log, file))
}

fn merge(
    dir: PathBuf,
    user: Option<String>,
    role: Option<Role>,
    log: Option<String>,
    file: ConfigFile,
) -> Settings {
    let name = user
        .or(file.user.name)
        .or_else(|| std::env::var("USER").ok())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "anonymous".to_string());
    let role = role.or(file.user.role).unwrap_or_default();
    let log_filter = log.or(file.log).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    Settings {
        dir,
        user: CurrentUser::new(name, role),
        log_filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg = parse_config(
            r#"
            log = "trackflow=debug"
            [user]
            name = "Sarah Chen"
            role = "manager"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log.as_deref(), Some("trackflow=debug"));
        assert_eq!(cfg.user.name.as_deref(), Some("Sarah Chen"));
        assert_eq!(cfg.user.role, Some(Role::Manager));
    }

    #[test]
    fn rejects_unknown_keys_and_roles() {
        assert!(matches!(parse_config("colour = \"red\""), Err(TrackflowError::Config(_))));
        assert!(parse_config("[user]\nrole = \"owner\"").is_err());
    }

    #[test]
    fn overrides_beat_file_values() {
        let file = parse_config("log = \"info\"\n[user]\nname = \"File\"\nrole = \"viewer\"").unwrap();
        let s = merge(PathBuf::from("/tmp/x"), Some("Flag".into()), None, None, file);
        assert_eq!(s.user.name, "Flag");
        assert_eq!(s.user.role, Role::Viewer);
        assert_eq!(s.log_filter, "info");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = merge(PathBuf::from("/tmp/x"), Some("me".into()), None, None, ConfigFile::default());
        assert_eq!(s.user.role, Role::Admin);
        assert_eq!(s.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config_file(dir.path()).unwrap(), ConfigFile::default());
    }

    #[test]
    fn broken_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "log = ").unwrap();
        let err = load_config_file(dir.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
