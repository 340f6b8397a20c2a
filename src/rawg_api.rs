use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{PatchdeckError, Result};
use crate::http::HttpClient;
use crate::models::AppId;

const BASE_URL: &str = "https://api.rawg.io/api";

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    name: String,
    slug: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameDetail {
    pub id: u64,
    pub name: String,
    pub background_image: Option<String>,
    pub description_raw: Option<String>,
}

/// Outcome of a best-effort name lookup. `resolve_name` never returns `Err`;
/// callers branch on this instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    /// A search hit came back; its name should replace the catalog name.
    Match { name: String, slug: Option<String> },
    /// Every attempt answered cleanly with zero results.
    NoMatch,
    /// A transport or decode failure was swallowed and nothing matched.
    Failed,
}

pub struct RawgClient {
    http: Arc<dyn HttpClient>,
    api_key: Option<String>,
}

impl RawgClient {
    pub fn new(http: Arc<dyn HttpClient>, config: &ClientConfig) -> Self {
        Self {
            http,
            api_key: config.rawg_api_key.clone(),
        }
    }

    fn search_url(&self, term: &str) -> String {
        let mut params = vec![("search", term.to_string()), ("page_size", "1".to_string())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        match Url::parse_with_params(&format!("{}/games", BASE_URL), &params) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/games", BASE_URL),
        }
    }

    fn detail_url(&self, id: u64) -> String {
        match &self.api_key {
            Some(key) => format!("{}/games/{}?key={}", BASE_URL, id, key),
            None => format!("{}/games/{}", BASE_URL, id),
        }
    }

    /// First search hit for a term. A non-success status means the service
    /// answered and found nothing, so it maps to a clean `None`; transport
    /// and decode failures stay errors for the caller to classify.
    async fn first_hit(&self, term: &str) -> Result<Option<SearchHit>> {
        let url = self.search_url(term);
        match self.http.get_json(&url).await {
            Ok(value) => {
                let envelope: SearchEnvelope = serde_json::from_value(value)?;
                Ok(envelope.results.into_iter().next())
            }
            Err(PatchdeckError::Status { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Best-effort two-attempt name lookup: first the app id as a literal
    /// search token, then the fallback name as free text. Failures are
    /// swallowed (logged at debug) and the next attempt still runs, so the
    /// caller only learns the combined outcome.
    pub async fn resolve_name(&self, appid: AppId, fallback_name: Option<&str>) -> NameResolution {
        let mut saw_failure = false;

        let id_term = format!("steam appid:{}", appid);
        match self.first_hit(&id_term).await {
            Ok(Some(hit)) => {
                return NameResolution::Match {
                    name: hit.name,
                    slug: hit.slug,
                }
            }
            Ok(None) => {}
            Err(e) => {
                debug!("name lookup by id token for {} failed: {}", appid, e);
                saw_failure = true;
            }
        }

        if let Some(name) = fallback_name.map(str::trim).filter(|n| !n.is_empty()) {
            match self.first_hit(name).await {
                Ok(Some(hit)) => {
                    return NameResolution::Match {
                        name: hit.name,
                        slug: hit.slug,
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("name lookup by fallback \"{}\" failed: {}", name, e);
                    saw_failure = true;
                }
            }
        }

        if saw_failure {
            NameResolution::Failed
        } else {
            NameResolution::NoMatch
        }
    }

    /// Full game record. Unlike `resolve_name` this is not best-effort.
    pub async fn game_detail(&self, id: u64) -> Result<GameDetail> {
        let value = self.http.get_json(&self.detail_url(id)).await?;
        let detail: GameDetail = serde_json::from_value(value)?;
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;

    const EMPTY_RESULTS: &str = r#"{"results": []}"#;
    const DOTA_HIT: &str = r#"{"results": [{"id": 2, "name": "Dota 2", "slug": "dota-2"}]}"#;

    fn make_client(mock: Arc<MockHttpClient>) -> RawgClient {
        RawgClient::new(mock, &ClientConfig::default())
    }

    #[tokio::test]
    async fn test_resolve_name_matches_on_id_token() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_json(&client.search_url("steam appid:570"), DOTA_HIT);

        let outcome = client.resolve_name(570, Some("dota")).await;
        assert_eq!(
            outcome,
            NameResolution::Match {
                name: "Dota 2".to_string(),
                slug: Some("dota-2".to_string()),
            }
        );
        // Fallback attempt never ran
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_name_falls_back_to_name_query() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_json(&client.search_url("steam appid:570"), EMPTY_RESULTS);
        mock.mock_json(&client.search_url("Dota 2"), DOTA_HIT);

        let outcome = client.resolve_name(570, Some("Dota 2")).await;
        assert!(matches!(outcome, NameResolution::Match { ref name, .. } if name == "Dota 2"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_resolve_name_no_match_when_both_empty() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_json(&client.search_url("steam appid:99"), EMPTY_RESULTS);
        mock.mock_json(&client.search_url("Obscure Game"), EMPTY_RESULTS);

        let outcome = client.resolve_name(99, Some("Obscure Game")).await;
        assert_eq!(outcome, NameResolution::NoMatch);
    }

    #[tokio::test]
    async fn test_resolve_name_status_counts_as_no_match() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_status(&client.search_url("steam appid:99"), 404);
        mock.mock_json(&client.search_url("Obscure Game"), EMPTY_RESULTS);

        let outcome = client.resolve_name(99, Some("Obscure Game")).await;
        assert_eq!(outcome, NameResolution::NoMatch);
    }

    #[tokio::test]
    async fn test_resolve_name_swallows_decode_failure_then_matches() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        // Truncated body: decode failure on the first attempt
        mock.mock_json(&client.search_url("steam appid:570"), "{");
        mock.mock_json(&client.search_url("Dota 2"), DOTA_HIT);

        let outcome = client.resolve_name(570, Some("Dota 2")).await;
        assert!(matches!(outcome, NameResolution::Match { .. }));
    }

    #[tokio::test]
    async fn test_resolve_name_reports_failure_when_nothing_matched() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_json(&client.search_url("steam appid:570"), "{");
        mock.mock_json(&client.search_url("Dota 2"), EMPTY_RESULTS);

        let outcome = client.resolve_name(570, Some("Dota 2")).await;
        assert_eq!(outcome, NameResolution::Failed);
    }

    #[tokio::test]
    async fn test_resolve_name_skips_blank_fallback() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_json(&client.search_url("steam appid:99"), EMPTY_RESULTS);

        let outcome = client.resolve_name(99, Some("   ")).await;
        assert_eq!(outcome, NameResolution::NoMatch);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_search_url_encodes_free_text() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock);

        let url = client.search_url("steam appid:570");
        assert_eq!(
            url,
            "https://api.rawg.io/api/games?search=steam+appid%3A570&page_size=1"
        );
    }

    #[tokio::test]
    async fn test_game_detail_parses() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_json(
            "https://api.rawg.io/api/games/3498",
            r#"{"id": 3498, "name": "Grand Theft Auto V", "background_image": "https://media.rawg.io/gta.jpg", "description_raw": "An open world."}"#,
        );

        let detail = client.game_detail(3498).await.unwrap();
        assert_eq!(detail.name, "Grand Theft Auto V");
        assert_eq!(detail.description_raw.as_deref(), Some("An open world."));
    }

    #[tokio::test]
    async fn test_game_detail_error_propagates() {
        let mock = Arc::new(MockHttpClient::new());
        let client = make_client(mock.clone());
        mock.mock_status("https://api.rawg.io/api/games/3498", 500);

        assert!(client.game_detail(3498).await.is_err());
    }
}
