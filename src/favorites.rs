use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{PatchdeckError, Result};
use crate::models::{AppId, RawFavorites, Resolution, ResolvedFavorite};
use crate::rawg_api::{NameResolution, RawgClient};
use crate::steam_api::SteamClient;

/// Interprets one persisted favorites payload as catalog ids. Order is
/// preserved, duplicates are kept, and anything that is not a positive
/// integer fitting `AppId` is dropped silently.
pub fn coerce_favorite_ids(raw: &RawFavorites) -> Vec<AppId> {
    match raw {
        RawFavorites::Ints(ints) => ints.iter().copied().filter_map(int_to_app_id).collect(),
        RawFavorites::Strings(strings) => strings
            .iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .filter_map(int_to_app_id)
            .collect(),
        RawFavorites::Mixed(values) => values
            .iter()
            .filter_map(|v| {
                if let Some(i) = v.as_i64() {
                    int_to_app_id(i)
                } else if let Some(s) = v.as_str() {
                    s.parse::<i64>().ok().and_then(int_to_app_id)
                } else {
                    None
                }
            })
            .collect(),
    }
}

fn int_to_app_id(i: i64) -> Option<AppId> {
    if i > 0 {
        AppId::try_from(i).ok()
    } else {
        None
    }
}

/// Supplies the currently signed-in user, if any.
pub trait AuthProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// Persistence backend for per-user favorites. Writes merge into the stored
/// set: `add` unions the id in, `remove` subtracts it, and neither touches
/// the rest of the user's record.
#[async_trait::async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn load_raw(&self, user_id: &str) -> Result<Option<RawFavorites>>;
    async fn add(&self, user_id: &str, appid: AppId) -> Result<()>;
    async fn remove(&self, user_id: &str, appid: AppId) -> Result<()>;
}

/// In-process store. Used in tests, and doubles as the reference for the
/// merge semantics real backends must honor.
#[derive(Default)]
pub struct MemoryFavoritesStore {
    entries: RwLock<HashMap<String, Vec<AppId>>>,
}

impl MemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FavoritesStore for MemoryFavoritesStore {
    async fn load_raw(&self, user_id: &str) -> Result<Option<RawFavorites>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(user_id)
            .map(|ids| RawFavorites::Ints(ids.iter().map(|&id| i64::from(id)).collect())))
    }

    async fn add(&self, user_id: &str, appid: AppId) -> Result<()> {
        let mut entries = self.entries.write().await;
        let ids = entries.entry(user_id.to_string()).or_default();
        if !ids.contains(&appid) {
            ids.push(appid);
        }
        Ok(())
    }

    async fn remove(&self, user_id: &str, appid: AppId) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(ids) = entries.get_mut(user_id) {
            ids.retain(|&id| id != appid);
        }
        Ok(())
    }
}

/// Observable favorites state, replaced wholesale by `refresh`.
#[derive(Debug, Clone, Default)]
pub struct FavoritesSnapshot {
    pub favorites: Vec<ResolvedFavorite>,
    pub error: Option<String>,
}

pub struct FavoritesService {
    steam: Arc<SteamClient>,
    rawg: Arc<RawgClient>,
    store: Arc<dyn FavoritesStore>,
    auth: Arc<dyn AuthProvider>,
    epoch: AtomicU64,
    snapshot: RwLock<FavoritesSnapshot>,
}

impl FavoritesService {
    pub fn new(
        steam: Arc<SteamClient>,
        rawg: Arc<RawgClient>,
        store: Arc<dyn FavoritesStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            steam,
            rawg,
            store,
            auth,
            epoch: AtomicU64::new(0),
            snapshot: RwLock::new(FavoritesSnapshot::default()),
        }
    }

    /// Runs the resolve pipeline without touching the shared snapshot.
    ///
    /// No signed-in user is an empty success with zero requests, as is an
    /// empty or all-garbage stored list. A catalog failure is fatal and
    /// yields no partial list. Name lookups then run concurrently, one per
    /// entry, and a failed lookup only marks its own entry.
    pub async fn resolve_favorites(&self) -> Result<Vec<ResolvedFavorite>> {
        // 1. Auth gate
        let user_id = match self.auth.current_user_id() {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        // 2. Read and coerce the stored ids
        let raw = match self.store.load_raw(&user_id).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        let ids = coerce_favorite_ids(&raw);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // 3. Catalog lookup, fatal on error
        let apps = self.steam.apps_by_ids(&ids).await?;

        // 4. Fan out one name lookup per entry
        let lookups = apps.iter().map(|app| {
            let rawg = Arc::clone(&self.rawg);
            let appid = app.appid;
            let name = app.name.clone();
            async move { rawg.resolve_name(appid, Some(&name)).await }
        });
        let outcomes = join_all(lookups).await;

        // 5. Merge outcomes back in catalog order
        let favorites = apps
            .into_iter()
            .zip(outcomes)
            .map(|(app, outcome)| match outcome {
                NameResolution::Match { name, slug } if !name.is_empty() => ResolvedFavorite {
                    appid: app.appid,
                    name,
                    slug,
                    resolution: Resolution::Enriched,
                },
                NameResolution::Match { .. } | NameResolution::NoMatch => ResolvedFavorite {
                    appid: app.appid,
                    name: app.name,
                    slug: None,
                    resolution: Resolution::CatalogOnly,
                },
                NameResolution::Failed => ResolvedFavorite {
                    appid: app.appid,
                    name: app.name,
                    slug: None,
                    resolution: Resolution::LookupFailed,
                },
            })
            .collect();

        Ok(favorites)
    }

    /// Recomputes the shared snapshot. Every call takes a fresh token; a
    /// call that finishes after a newer one has started skips the write, so
    /// the snapshot never moves backwards. The skipped call still returns
    /// its own result.
    pub async fn refresh(&self) -> Result<Vec<ResolvedFavorite>> {
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.resolve_favorites().await;

        let mut snapshot = self.snapshot.write().await;
        if self.epoch.load(Ordering::SeqCst) != token {
            debug!("discarding stale favorites refresh (token {})", token);
            return result;
        }
        match &result {
            Ok(favorites) => {
                snapshot.favorites = favorites.clone();
                snapshot.error = None;
            }
            Err(e) => {
                // A failed resolve clears the list rather than keep stale rows
                snapshot.favorites.clear();
                snapshot.error = Some(e.to_string());
            }
        }

        result
    }

    /// The last snapshot written by `refresh`.
    pub async fn current(&self) -> FavoritesSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Adds to the signed-in user's favorites, then recomputes.
    pub async fn add_favorite(&self, appid: AppId) -> Result<Vec<ResolvedFavorite>> {
        let user_id = self
            .auth
            .current_user_id()
            .ok_or(PatchdeckError::Unauthenticated)?;
        self.store.add(&user_id, appid).await?;
        self.refresh().await
    }

    /// Removes from the signed-in user's favorites, then recomputes.
    pub async fn remove_favorite(&self, appid: AppId) -> Result<Vec<ResolvedFavorite>> {
        let user_id = self
            .auth
            .current_user_id()
            .ok_or(PatchdeckError::Unauthenticated)?;
        self.store.remove(&user_id, appid).await?;
        self.refresh().await
    }

    /// Membership check against the current snapshot. No network.
    pub async fn is_favorite(&self, appid: AppId) -> bool {
        self.snapshot
            .read()
            .await
            .favorites
            .iter()
            .any(|f| f.appid == appid)
    }
}
