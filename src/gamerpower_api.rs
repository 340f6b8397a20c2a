use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::warn;

use crate::error::Result;
use crate::http::HttpClient;
use crate::models::Giveaway;

const BASE_URL: &str = "https://www.gamerpower.com/api";

pub struct GiveawaysClient {
    http: Arc<dyn HttpClient>,
    cache: Cache<String, Arc<Vec<Giveaway>>>,
}

impl GiveawaysClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            // The feed rotates a few times a day
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(1800))
                .build(),
        }
    }

    /// Currently running giveaways, in feed order.
    pub async fn giveaways(&self) -> Result<Arc<Vec<Giveaway>>> {
        if let Some(cached) = self.cache.get("live").await {
            return Ok(cached);
        }

        let url = format!("{}/giveaways", BASE_URL);
        let value = self.http.get_json(&url).await?;
        let raw: Vec<serde_json::Value> = serde_json::from_value(value)?;

        let mut giveaways = Vec::new();
        for (i, val) in raw.into_iter().enumerate() {
            match serde_json::from_value::<Giveaway>(val) {
                Ok(g) => giveaways.push(g),
                Err(e) => {
                    warn!("skipping unparsable giveaway at index {}: {}", i, e);
                }
            }
        }

        let giveaways = Arc::new(giveaways);
        self.cache
            .insert("live".to_string(), giveaways.clone())
            .await;

        Ok(giveaways)
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;

    const GIVEAWAYS_URL: &str = "https://www.gamerpower.com/api/giveaways";

    const FEED_JSON: &str = r#"[
        {"id": 2301, "title": "Warhammer Skulls Bundle", "worth": "$9.99", "description": "Free for a week.", "image": "https://www.gamerpower.com/offers/1.jpg", "open_giveaway_url": "https://www.gamerpower.com/open/warhammer"},
        {"id": "zzz"},
        {"id": 2302, "title": "Indie Key Drop", "worth": null, "description": null, "image": null, "open_giveaway_url": "https://www.gamerpower.com/open/indie"}
    ]"#;

    #[tokio::test]
    async fn test_giveaways_parses_and_skips_malformed() {
        let mock = Arc::new(MockHttpClient::new());
        mock.mock_json(GIVEAWAYS_URL, FEED_JSON);
        let client = GiveawaysClient::new(mock.clone());

        let feed = client.giveaways().await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].worth.as_deref(), Some("$9.99"));
        assert_eq!(feed[1].title, "Indie Key Drop");
    }

    #[tokio::test]
    async fn test_giveaways_cached_after_first_fetch() {
        let mock = Arc::new(MockHttpClient::new());
        mock.mock_json(GIVEAWAYS_URL, FEED_JSON);
        let client = GiveawaysClient::new(mock.clone());

        client.giveaways().await.unwrap();
        client.giveaways().await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_giveaways_error_propagates() {
        let mock = Arc::new(MockHttpClient::new());
        mock.mock_status(GIVEAWAYS_URL, 502);
        let client = GiveawaysClient::new(mock);

        assert!(client.giveaways().await.is_err());
    }
}
