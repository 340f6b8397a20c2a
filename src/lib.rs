//! Patchdeck - service core for a Steam patch-notes and favorites tracker.
//!
//! Wraps the external APIs a tracker frontend needs: the Steam catalog and
//! news feeds (`steam_api`), best-effort name enrichment (`rawg_api`), the
//! giveaways feed (`gamerpower_api`), and the favorites pipeline tying them
//! together (`favorites`). All clients are constructed explicitly and talk
//! through the `http::HttpClient` seam, so everything is testable offline.

// Module declarations
pub mod config;
pub mod error;
pub mod favorites;
pub mod gamerpower_api;
pub mod http;
pub mod models;
pub mod rawg_api;
pub mod steam_api;
pub mod utils;

// Re-export commonly used types
pub use error::{PatchdeckError, Result};
