//! Catalog and sponsor feed parsing.

use super::{
    errors::{FeedError, FeedResult},
    models::{Entry, PLACEHOLDER_URL, Sponsor},
};
use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashSet, path::PathBuf};
use url::Url;

/// Source of a raw feed document
///
/// Network loading lives outside this crate; hosts implement this port for
/// whatever transport they use.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw document
    async fn fetch(&self) -> FeedResult<String>;
}

/// Feed backed by an in-memory document
#[derive(Debug, Clone)]
pub struct StaticFeed(String);

impl StaticFeed {
    pub fn new(document: impl Into<String>) -> Self {
        Self(document.into())
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> FeedResult<String> {
        Ok(self.0.clone())
    }
}

/// Feed read from a file on disk
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeed {
    async fn fetch(&self) -> FeedResult<String> {
        log::debug!("Reading feed from {}", self.path.display());
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Parse a number catalog document
///
/// Expects `{"numbers": [{"number": 1, "italian": "...", "dialect": "..."}]}`.
/// Items whose `number` is not a positive integer (or a numeric string) are
/// discarded, duplicates keep their first occurrence, and the result is sorted
/// ascending.
///
/// # Errors
///
/// * `FeedError::Json` - document is not JSON
/// * `FeedError::Malformed` - `numbers` is missing or not a list
/// * `FeedError::Empty` - no item survived validation
pub fn parse_entries(document: &str) -> FeedResult<Vec<Entry>> {
    let root: Value = serde_json::from_str(document)?;
    let items = root
        .get("numbers")
        .and_then(Value::as_array)
        .ok_or_else(|| FeedError::Malformed("expected a `numbers` list".to_string()))?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());
    let mut discarded = 0usize;

    for item in items {
        let Some(number) = item.get("number").and_then(parse_number) else {
            discarded += 1;
            continue;
        };

        if !seen.insert(number) {
            discarded += 1;
            continue;
        }

        entries.push(Entry {
            number,
            label: non_empty_str(item, "italian").unwrap_or_default(),
            dialect_label: non_empty_str(item, "dialect"),
        });
    }

    if discarded > 0 {
        log::warn!("Discarded {} invalid catalog entries", discarded);
    }

    if entries.is_empty() {
        return Err(FeedError::Empty("numbers"));
    }

    entries.sort_by_key(|entry| entry.number);
    Ok(entries)
}

/// Parse a sponsor feed document
///
/// Accepts `{"sponsors": [...]}` or a bare list. Items without a `logo` are
/// discarded; `url` is sanitized with [`sanitize_url`].
pub fn parse_sponsors(document: &str) -> FeedResult<Vec<Sponsor>> {
    let root: Value = serde_json::from_str(document)?;
    let items = match &root {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("sponsors")
            .and_then(Value::as_array)
            .ok_or_else(|| FeedError::Malformed("expected a `sponsors` list".to_string()))?,
        _ => {
            return Err(FeedError::Malformed(
                "expected a list or an object".to_string(),
            ));
        }
    };

    let sponsors: Vec<Sponsor> = items
        .iter()
        .filter_map(|item| {
            let logo_ref = non_empty_str(item, "logo")?;
            let raw_url = item.get("url").and_then(Value::as_str).unwrap_or_default();

            Some(Sponsor {
                logo_ref,
                target_url: sanitize_url(raw_url),
                display_name: non_empty_str(item, "name"),
                showcase_only: item
                    .get("onlyShowcase")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            })
        })
        .collect();

    if sponsors.len() < items.len() {
        log::warn!(
            "Discarded {} sponsors without a logo",
            items.len() - sponsors.len()
        );
    }

    Ok(sponsors)
}

/// Coerce a sponsor link to an absolute http(s) URL, or `"#"`
///
/// The link is kept as written when it parses; anything the URL parser
/// rejects, or a parsed URL without an http(s) scheme and a host, becomes
/// the placeholder.
pub fn sanitize_url(raw: &str) -> String {
    let trimmed = raw.trim();

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            trimmed.to_string()
        }
        Ok(url) => {
            log::debug!("Sponsor link '{}' has no http(s) host", url);
            PLACEHOLDER_URL.to_string()
        }
        Err(e) => {
            log::debug!("Sponsor link '{}' is not a valid URL: {}", trimmed, e);
            PLACEHOLDER_URL.to_string()
        }
    }
}

fn parse_number(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };

    u32::try_from(number).ok().filter(|n| *n >= 1)
}

fn non_empty_str(item: &Value, field: &str) -> Option<String> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
