use serde::{Deserialize, Serialize};

use crate::utils;

/// Steam application id. Always positive; 0 marks an invalid entry.
pub type AppId = u32;

/// Storefront capsule image for list rows.
pub fn capsule_url(appid: AppId) -> String {
    format!(
        "https://cdn.cloudflare.steamstatic.com/steam/apps/{}/capsule_184x69.jpg",
        appid
    )
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SteamApp {
    pub appid: AppId,
    pub name: String,
}

impl SteamApp {
    pub fn capsule_url(&self) -> String {
        capsule_url(self.appid)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewsItem {
    pub gid: String,
    pub title: String,
    pub url: String,
    pub contents: String,
    pub date: i64, // Unix seconds
}

impl NewsItem {
    /// Publication date rendered for display, e.g. "Nov 29, 2023".
    pub fn date_formatted(&self) -> String {
        chrono::DateTime::from_timestamp(self.date, 0)
            .map(|dt| dt.format("%b %-d, %Y").to_string())
            .unwrap_or_default()
    }

    /// Body with HTML/BBCode markup removed.
    pub fn plain_contents(&self) -> String {
        utils::strip_markup(&self.contents)
    }
}

/// The shapes a stored favorites array shows up in. Legacy documents hold
/// plain integers, newer ones strings, and hand-edited ones mix both, so
/// each arm is decoded as-is and interpreted by `coerce_favorite_ids`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawFavorites {
    Ints(Vec<i64>),
    Strings(Vec<String>),
    Mixed(Vec<serde_json::Value>),
}

/// How a favorite entry got its display name.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// External lookup returned a name; it replaced the catalog name.
    Enriched,
    /// Lookup found nothing; the catalog name stands.
    CatalogOnly,
    /// Lookup failed (transport/decode); the catalog name stands.
    LookupFailed,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResolvedFavorite {
    pub appid: AppId,
    pub name: String,
    pub slug: Option<String>,
    pub resolution: Resolution,
}

impl ResolvedFavorite {
    pub fn capsule_url(&self) -> String {
        capsule_url(self.appid)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Giveaway {
    pub id: u64,
    pub title: String,
    pub worth: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub open_giveaway_url: String,
}
