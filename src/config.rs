use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::model::storage::ConfigFile;
use crate::session;

pub const DEFAULT_BASE_URL: &str = "https://sosika-backend.onrender.com";

/// Values given on the command line (or through their environment variables)
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub config_path: Option<String>,
    pub session_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Option<Duration>,
    pub session_path: PathBuf,
}

impl Config {
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let config_path = session::expand(
            overrides.config_path.as_deref().unwrap_or(session::CONFIG_PATH),
        )?;
        let file = session::read_config(&config_path)?;
        debug!("Config file {:?}: {:?}", config_path, file);
        Self::merge(overrides, file)
    }

    // Flags win over the file, the file wins over defaults
    pub fn merge(overrides: Overrides, file: ConfigFile) -> Result<Self> {
        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid base url {}", base_url))?;
        let timeout = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .map(Duration::from_secs);
        let session_path = session::expand(
            overrides.session_path.as_deref().unwrap_or(session::SESSION_PATH),
        )?;
        Ok(Config {
            base_url,
            timeout,
            session_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::merge(
            Overrides {
                session_path: Some("/tmp/s.json".to_owned()),
                ..Overrides::default()
            },
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://sosika-backend.onrender.com/");
        assert_eq!(config.timeout, None);
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn flag_beats_file() {
        let file = ConfigFile {
            base_url: Some("http://file.local".to_owned()),
            timeout_secs: Some(5),
        };
        let config = Config::merge(
            Overrides {
                base_url: Some("http://flag.local".to_owned()),
                session_path: Some("/tmp/s.json".to_owned()),
                ..Overrides::default()
            },
            file,
        )
        .unwrap();
        assert_eq!(config.base_url.host_str(), Some("flag.local"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn bad_url_is_rejected() {
        let result = Config::merge(
            Overrides {
                base_url: Some("not a url".to_owned()),
                ..Overrides::default()
            },
            ConfigFile::default(),
        );
        assert!(result.is_err());
    }
}
