//! runepkg configuration.
//!
//! A plain `key = value` file, looked up as: `RUNEPKG_CONFIG_PATH`
//! environment override, then `/etc/runepkg/runepkgconfig`, then
//! `~/.runepkgconfig`. Values may start with `~/` to mean the home
//! directory.

use std::path::{Path, PathBuf};

use crate::core::error::{Result, RunepkgError};

pub const ENV_CONFIG_PATH: &str = "RUNEPKG_CONFIG_PATH";
pub const SYSTEM_CONFIG: &str = "/etc/runepkg/runepkgconfig";
pub const USER_CONFIG: &str = ".runepkgconfig";

/// Configured filesystem roots for all runepkg state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base directory for all state.
    pub runepkg_dir: PathBuf,
    /// Scratch root for archive extraction.
    pub control_dir: PathBuf,
    /// Persistent package database root.
    pub runepkg_db: PathBuf,
    /// Target filesystem root for payload placement.
    pub install_dir: PathBuf,
}

impl Settings {
    /// Load settings from the first config file found in lookup order.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let content = std::fs::read_to_string(&path)?;
        Self::parse_str(&content, &path)
    }

    /// First existing config file in lookup order.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(explicit) = std::env::var_os(ENV_CONFIG_PATH) {
            let path = PathBuf::from(explicit);
            if path.is_file() {
                return Ok(path);
            }
            return Err(RunepkgError::NotFound(format!(
                "config file {} named by ${ENV_CONFIG_PATH}",
                path.display()
            )));
        }

        let system = PathBuf::from(SYSTEM_CONFIG);
        if system.is_file() {
            return Ok(system);
        }

        if let Some(home_dir) = home::home_dir() {
            let user = home_dir.join(USER_CONFIG);
            if user.is_file() {
                return Ok(user);
            }
        }

        Err(RunepkgError::NotFound(format!(
            "no config file; checked ${ENV_CONFIG_PATH}, {SYSTEM_CONFIG}, and ~/{USER_CONFIG}"
        )))
    }

    /// Parse a config image. `origin` names the file in errors.
    pub fn parse_str(content: &str, origin: &Path) -> Result<Self> {
        let mut runepkg_dir = None;
        let mut control_dir = None;
        let mut runepkg_db = None;
        let mut install_dir = None;

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(RunepkgError::Parse(format!(
                    "{}:{}: expected `key = value`",
                    origin.display(),
                    lineno + 1
                )));
            };
            let value = expand_tilde(value.trim());

            match key.trim() {
                "runepkg_dir" => runepkg_dir = Some(value),
                "control_dir" => control_dir = Some(value),
                "runepkg_db" => runepkg_db = Some(value),
                "install_dir" => install_dir = Some(value),
                other => {
                    tracing::warn!(key = other, file = %origin.display(), "ignoring unknown config key");
                }
            }
        }

        let runepkg_dir = runepkg_dir.ok_or_else(|| {
            RunepkgError::InvalidInput(format!(
                "{} does not set runepkg_dir",
                origin.display()
            ))
        })?;

        Ok(Self {
            control_dir: control_dir.unwrap_or_else(|| runepkg_dir.join("control")),
            runepkg_db: runepkg_db.unwrap_or_else(|| runepkg_dir.join("db")),
            install_dir: install_dir.unwrap_or_else(|| PathBuf::from("/")),
            runepkg_dir,
        })
    }
}

fn expand_tilde(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home_dir) = home::home_dir() {
            return home_dir.join(rest);
        }
    }
    PathBuf::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let settings = Settings::parse_str(
            "# comment\n\
             runepkg_dir = /var/lib/runepkg\n\
             control_dir = /var/lib/runepkg/scratch\n\
             runepkg_db = /var/lib/runepkg/packages\n\
             install_dir = /\n",
            Path::new("test"),
        )
        .unwrap();

        assert_eq!(settings.runepkg_dir, PathBuf::from("/var/lib/runepkg"));
        assert_eq!(settings.control_dir, PathBuf::from("/var/lib/runepkg/scratch"));
        assert_eq!(settings.runepkg_db, PathBuf::from("/var/lib/runepkg/packages"));
        assert_eq!(settings.install_dir, PathBuf::from("/"));
    }

    #[test]
    fn optional_keys_default_under_base() {
        let settings =
            Settings::parse_str("runepkg_dir = /srv/rp\n", Path::new("test")).unwrap();
        assert_eq!(settings.control_dir, PathBuf::from("/srv/rp/control"));
        assert_eq!(settings.runepkg_db, PathBuf::from("/srv/rp/db"));
        assert_eq!(settings.install_dir, PathBuf::from("/"));
    }

    #[test]
    fn missing_base_is_fatal() {
        assert!(Settings::parse_str("install_dir = /\n", Path::new("test")).is_err());
    }

    #[test]
    fn malformed_line_is_a_parse_error() {
        assert!(Settings::parse_str("runepkg_dir\n", Path::new("test")).is_err());
    }

    #[test]
    fn tilde_expands_to_home() {
        let settings =
            Settings::parse_str("runepkg_dir = ~/state\n", Path::new("test")).unwrap();
        if let Some(home_dir) = home::home_dir() {
            assert_eq!(settings.runepkg_dir, home_dir.join("state"));
        }
    }
}
