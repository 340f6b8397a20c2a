use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{AppId, NewsItem, SteamApp};
use crate::utils;

const BASE_URL: &str = "https://api.steampowered.com";

#[derive(Debug, Deserialize)]
struct AppListEnvelope {
    applist: AppListBody,
}

#[derive(Debug, Deserialize)]
struct AppListBody {
    apps: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    appnews: NewsBody,
}

#[derive(Debug, Deserialize)]
struct NewsBody {
    newsitems: Vec<serde_json::Value>,
}

pub struct SteamClient {
    http: Arc<dyn HttpClient>,
    api_key: Option<String>,
    app_list_cache: Cache<String, Arc<Vec<SteamApp>>>,
    news_cache: Cache<AppId, Arc<Vec<NewsItem>>>,
    fill_lock: tokio::sync::Mutex<()>,
}

impl SteamClient {
    pub fn new(http: Arc<dyn HttpClient>, config: &ClientConfig) -> Self {
        Self {
            http,
            api_key: config.steam_api_key.clone(),
            // The catalog is ~200k entries and changes slowly
            app_list_cache: Cache::builder()
                .time_to_live(Duration::from_secs(config.app_list_ttl_secs))
                .build(),
            // Patch notes move faster
            news_cache: Cache::builder()
                .time_to_live(Duration::from_secs(config.news_ttl_secs))
                .build(),
            fill_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The full app catalog, fetched once and served from cache until the TTL
    /// expires or `invalidate_cache` runs. Concurrent callers during a miss
    /// share a single upstream fetch; a failed fill is not cached, so the
    /// next caller retries.
    pub async fn app_list(&self) -> Result<Arc<Vec<SteamApp>>> {
        if let Some(cached) = self.app_list_cache.get("all_apps").await {
            return Ok(cached);
        }

        // Only one caller fills; the rest queue here and re-check
        let _guard = self.fill_lock.lock().await;
        if let Some(cached) = self.app_list_cache.get("all_apps").await {
            return Ok(cached);
        }

        let url = match &self.api_key {
            Some(key) => format!("{}/ISteamApps/GetAppList/v2/?key={}", BASE_URL, key),
            None => format!("{}/ISteamApps/GetAppList/v2/", BASE_URL),
        };

        debug!("fetching steam app list");
        let value = self.http.get_json(&url).await?;
        let envelope: AppListEnvelope = serde_json::from_value(value)?;

        // Decode per element so one malformed entry doesn't sink the batch
        let mut apps = Vec::new();
        for (i, val) in envelope.applist.apps.into_iter().enumerate() {
            match serde_json::from_value::<SteamApp>(val) {
                Ok(app) if app.appid > 0 && !app.name.is_empty() => apps.push(app),
                Ok(_) => {} // placeholder row
                Err(e) => {
                    warn!("skipping unparsable app list entry at index {}: {}", i, e);
                }
            }
        }

        let apps = Arc::new(apps);
        self.app_list_cache
            .insert("all_apps".to_string(), apps.clone())
            .await;

        Ok(apps)
    }

    /// Case- and diacritic-insensitive substring search over the catalog.
    /// An empty or whitespace query returns the catalog alphabetically;
    /// otherwise matches keep catalog order. Both are truncated to `limit`.
    pub async fn search_apps(&self, query: &str, limit: usize) -> Result<Vec<SteamApp>> {
        let apps = self.app_list().await?;
        let trimmed = query.trim();

        if trimmed.is_empty() {
            let mut all: Vec<SteamApp> = apps.iter().cloned().collect();
            all.sort_by_cached_key(|a| a.name.to_lowercase());
            all.truncate(limit);
            return Ok(all);
        }

        let needle = utils::fold_diacritics(trimmed);
        Ok(apps
            .iter()
            .filter(|a| utils::fold_diacritics(&a.name).contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Catalog entries for the given ids, sorted case-insensitively by name.
    /// Ids missing from the catalog are dropped without error.
    pub async fn apps_by_ids(&self, ids: &[AppId]) -> Result<Vec<SteamApp>> {
        let apps = self.app_list().await?;
        let id_set: HashSet<AppId> = ids.iter().copied().collect();

        let mut found: Vec<SteamApp> = apps
            .iter()
            .filter(|a| id_set.contains(&a.appid))
            .cloned()
            .collect();
        found.sort_by_cached_key(|a| a.name.to_lowercase());

        Ok(found)
    }

    /// Patch notes for one app. Cached per app id, so `count`/`maxlength`
    /// of the first call within the TTL win.
    pub async fn news_for_app(
        &self,
        appid: AppId,
        count: u32,
        maxlength: u32,
    ) -> Result<Arc<Vec<NewsItem>>> {
        if let Some(cached) = self.news_cache.get(&appid).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/ISteamNews/GetNewsForApp/v2/?appid={}&count={}&maxlength={}",
            BASE_URL, appid, count, maxlength
        );

        let value = self.http.get_json(&url).await?;
        let envelope: NewsEnvelope = serde_json::from_value(value)?;

        let mut items = Vec::new();
        for (i, val) in envelope.appnews.newsitems.into_iter().enumerate() {
            match serde_json::from_value::<NewsItem>(val) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("skipping unparsable news item at index {}: {}", i, e);
                }
            }
        }

        let items = Arc::new(items);
        self.news_cache.insert(appid, items.clone()).await;

        Ok(items)
    }

    /// Drops all cached catalog and news state. The next access refetches.
    pub async fn invalidate_cache(&self) {
        self.app_list_cache.invalidate_all();
        self.news_cache.invalidate_all();
    }
}
