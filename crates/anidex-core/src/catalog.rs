//! Catalog store.
//!
//! The catalog is a JSON object mapping each title to its metadata:
//!
//! ```json
//! {
//!   "Frieren": {
//!     "year": 2023,
//!     "description": "...",
//!     "content": { "Episode 1": "https://embed/1", "Episode 2": "https://embed/2" }
//!   }
//! }
//! ```
//!
//! The document is maintained outside the application and re-read on every
//! request. Parsing is lenient so that one sloppy entry does not blank the
//! whole site: odd field types (a quoted year, a `content` that is not an
//! object) degrade to defaults, and an entry that is not an object at all is
//! skipped with a warning.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One episode: its label and the URL of the embedded player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub label: String,
    pub embed_url: String,
}

/// Metadata for a single catalog title.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeEntry {
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// Episodes in document order; the first one is the default selection.
    #[serde(default, deserialize_with = "episode_list")]
    pub content: Vec<Episode>,
}

impl AnimeEntry {
    /// Year used for ordering; absent years sort as 0.
    pub fn sort_year(&self) -> i64 {
        self.year.unwrap_or(0)
    }

    /// Year as displayed and searched; empty when absent.
    pub fn year_label(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }

    /// Pick the requested episode, falling back to the first one when the
    /// label is missing or unknown. `None` only when there are no episodes.
    pub fn select_episode(&self, requested: Option<&str>) -> Option<&Episode> {
        requested
            .filter(|label| !label.is_empty())
            .and_then(|label| self.content.iter().find(|ep| ep.label == label))
            .or_else(|| self.content.first())
    }
}

/// A loaded catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, AnimeEntry>,
}

impl Catalog {
    /// Load the catalog document. A missing or unreadable document yields an
    /// empty catalog.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "catalog document missing; empty catalog");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read catalog");
                return Self::default();
            }
        };

        Self::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse catalog");
            Self::default()
        })
    }

    /// Parse a catalog from raw JSON. Fails only when the document is not a
    /// JSON object; individual entries that cannot be read are skipped.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let raw: serde_json::Map<String, Value> = serde_json::from_slice(bytes)?;
        let entries = raw
            .into_iter()
            .filter_map(|(title, value)| {
                if !value.is_object() {
                    tracing::warn!(title = %title, "skipping catalog entry that is not an object");
                    return None;
                }
                match serde_json::from_value::<AnimeEntry>(value) {
                    Ok(entry) => Some((title, entry)),
                    Err(e) => {
                        tracing::warn!(title = %title, error = %e, "skipping malformed catalog entry");
                        None
                    }
                }
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact (case-sensitive) title lookup.
    pub fn get(&self, title: &str) -> Option<&AnimeEntry> {
        self.entries.get(title)
    }

    /// The `n` most recent titles: descending year, then ascending title
    /// compared case-insensitively.
    pub fn latest(&self, n: usize) -> Vec<(&str, &AnimeEntry)> {
        let mut items: Vec<(&str, &AnimeEntry)> = self
            .entries
            .iter()
            .map(|(title, entry)| (title.as_str(), entry))
            .collect();
        items.sort_by_cached_key(|(title, entry)| (-entry.sort_year(), title.to_lowercase()));
        items.truncate(n);
        items
    }

    /// Titles whose name or year contains `query` (case-insensitive), sorted
    /// ascending by title. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<(&str, &AnimeEntry)> {
        let query = query.trim().to_lowercase();
        let mut items: Vec<(&str, &AnimeEntry)> = self
            .entries
            .iter()
            .filter(|(title, entry)| {
                query.is_empty()
                    || title.to_lowercase().contains(&query)
                    || entry.year_label().to_lowercase().contains(&query)
            })
            .map(|(title, entry)| (title.as_str(), entry))
            .collect();
        items.sort_by_cached_key(|(title, _)| title.to_lowercase());
        items
    }
}

// ---------------------------------------------------------------------------
// Lenient field parsers
// ---------------------------------------------------------------------------

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(value_to_string).unwrap_or_default())
}

fn episode_list<'de, D>(deserializer: D) -> Result<Vec<Episode>, D::Error>
where
    D: Deserializer<'de>,
{
    // serde_json is built with `preserve_order`, so the map iterates in
    // document order. Anything but an object means no playable episodes.
    let map = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    Ok(map
        .into_iter()
        .map(|(label, url)| Episode {
            label,
            embed_url: value_to_string(url),
        })
        .collect())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
