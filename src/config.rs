use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::CiteError;

pub const CONFIG_FILE: &str = "cite-rel.json";
pub const DEFAULT_OPENCITATIONS_BASE: &str = "https://opencitations.net/index/coci/api/v1";
pub const DEFAULT_CROSSREF_BASE: &str = "https://api.crossref.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub show_citation_relations_tab: Option<bool>,
    #[serde(default)]
    pub opencitations_base: Option<String>,
    #[serde(default)]
    pub crossref_base: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub mailto: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub show_citation_relations_tab: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_citation_relations_tab: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub opencitations_base: String,
    pub crossref_base: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            opencitations_base: DEFAULT_OPENCITATIONS_BASE.to_string(),
            crossref_base: DEFAULT_CROSSREF_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: user_agent(None),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub preferences: Preferences,
    pub http: HttpSettings,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CiteError> {
        let config_path = match path {
            Some(path) => Some(Utf8PathBuf::from(path)),
            None => default_config_paths()
                .into_iter()
                .find(|candidate| candidate.as_std_path().exists()),
        };

        let Some(config_path) = config_path else {
            tracing::debug!("no config file found, using defaults");
            return Self::resolve_config(Config::default());
        };

        tracing::debug!(path = %config_path, "loading config");
        let content = fs::read_to_string(&config_path)
            .map_err(|_| CiteError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| CiteError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CiteError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CiteError::ConfigParse(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let opencitations_base = normalize_base(
            config.opencitations_base.as_deref(),
            DEFAULT_OPENCITATIONS_BASE,
            "opencitations_base",
        )?;
        let crossref_base = normalize_base(
            config.crossref_base.as_deref(),
            DEFAULT_CROSSREF_BASE,
            "crossref_base",
        )?;
        let mailto = config
            .mailto
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        Ok(ResolvedConfig {
            schema_version,
            preferences: Preferences {
                show_citation_relations_tab: config.show_citation_relations_tab.unwrap_or(true),
            },
            http: HttpSettings {
                opencitations_base,
                crossref_base,
                timeout: Duration::from_secs(timeout_secs),
                user_agent: user_agent(mailto),
            },
        })
    }
}

pub fn default_config_paths() -> Vec<Utf8PathBuf> {
    let mut paths = vec![Utf8PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = BaseDirs::new().and_then(|dirs| {
        Utf8PathBuf::from_path_buf(dirs.config_dir().join("citation-relations")).ok()
    }) {
        paths.push(dir.join(CONFIG_FILE));
    }
    paths
}

fn normalize_base(value: Option<&str>, default: &str, field: &str) -> Result<String, CiteError> {
    let Some(value) = value else {
        return Ok(default.to_string());
    };
    let trimmed = value.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CiteError::ConfigParse(format!(
            "{field} must be an http(s) URL, got {value:?}"
        )));
    }
    Ok(trimmed.to_string())
}

fn user_agent(mailto: Option<&str>) -> String {
    match mailto {
        Some(mailto) => format!("cite-rel/{} (mailto:{mailto})", env!("CARGO_PKG_VERSION")),
        None => format!("cite-rel/{}", env!("CARGO_PKG_VERSION")),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert!(resolved.preferences.show_citation_relations_tab);
        assert_eq!(resolved.http.crossref_base, DEFAULT_CROSSREF_BASE);
        assert_eq!(resolved.http.timeout, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Config {
            crossref_base: Some("https://crossref.test/".to_string()),
            ..Config::default()
        };
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.http.crossref_base, "https://crossref.test");
    }

    #[test]
    fn mailto_is_added_to_user_agent() {
        let config = Config {
            mailto: Some("librarian@example.org".to_string()),
            ..Config::default()
        };
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert!(
            resolved
                .http
                .user_agent
                .ends_with("(mailto:librarian@example.org)")
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = Config {
            timeout_secs: Some(0),
            ..Config::default()
        };
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, CiteError::ConfigParse(_));
    }
}
