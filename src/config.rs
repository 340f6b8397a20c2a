use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_APP_LIST_TTL_SECS: u64 = 3600;
const DEFAULT_NEWS_TTL_SECS: u64 = 300;

/// Client configuration, read once at startup. API keys are optional: the
/// Steam app list works without one and RAWG lookups simply stay keyless.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub steam_api_key: Option<String>,
    pub rawg_api_key: Option<String>,
    pub app_list_ttl_secs: u64,
    pub news_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            steam_api_key: None,
            rawg_api_key: None,
            app_list_ttl_secs: DEFAULT_APP_LIST_TTL_SECS,
            news_ttl_secs: DEFAULT_NEWS_TTL_SECS,
        }
    }
}

impl ClientConfig {
    pub fn load() -> Self {
        let config_file = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("patchdeck")
            .join("config.json");
        Self::load_from(&config_file)
    }

    /// Missing or unreadable files fall back to defaults; missing fields
    /// fall back per field.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(file) = std::fs::File::open(path) {
                let reader = std::io::BufReader::new(file);
                if let Ok(cfg) = serde_json::from_reader::<_, ClientConfig>(reader) {
                    return cfg;
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let cfg = ClientConfig::load_from(Path::new("/nonexistent/patchdeck/config.json"));
        assert_eq!(cfg.app_list_ttl_secs, DEFAULT_APP_LIST_TTL_SECS);
        assert!(cfg.steam_api_key.is_none());
    }

    #[test]
    fn test_load_partial_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
        write!(file, r#"{{"rawg_api_key": "abc123", "news_ttl_secs": 60}}"#)
            .expect("Should write config");

        let cfg = ClientConfig::load_from(file.path());
        assert_eq!(cfg.rawg_api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.news_ttl_secs, 60);
        assert_eq!(cfg.app_list_ttl_secs, DEFAULT_APP_LIST_TTL_SECS);
        assert!(cfg.steam_api_key.is_none());
    }

    #[test]
    fn test_load_corrupt_file_gives_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
        write!(file, "not json at all").expect("Should write config");

        let cfg = ClientConfig::load_from(file.path());
        assert_eq!(cfg.news_ttl_secs, DEFAULT_NEWS_TTL_SECS);
    }
}
