//! Game state snapshot and partial updates.

use crate::catalog::{Entry, Sponsor};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Message reported once when the persisted snapshot cannot be trusted
pub const STORAGE_CORRUPTED_MESSAGE: &str =
    "Saved game data was corrupted and has been discarded. A new game has started.";

/// Loading status of a feed-backed part of the state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "idle"),
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Ready => write!(f, "ready"),
            LoadStatus::Error => write!(f, "error"),
        }
    }
}

/// One committed draw, as shown in the history list
///
/// Only `number` is required when decoding. A missing or unreadable
/// timestamp decodes as `None` and a malformed sponsor as no sponsor, so
/// saves written by older builds keep their progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub number: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_sponsor")]
    pub sponsor: Option<Sponsor>,
}

impl HistoryRecord {
    /// Record a draw happening now
    pub fn now(number: u32, sponsor: Option<Sponsor>) -> Self {
        Self {
            number,
            timestamp: Some(Utc::now()),
            sponsor,
        }
    }
}

/// RFC 3339, or an ISO date-time without offset read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

fn lenient_sponsor<'de, D>(deserializer: D) -> Result<Option<Sponsor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Full value of the game at one instant
///
/// Snapshots are never mutated in place; [`GameStore`](super::GameStore)
/// produces a new one for every applied [`StateUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub entries: Vec<Entry>,
    pub drawn_numbers: Vec<u32>,
    pub selected_number: Option<u32>,
    /// Newest first
    pub history: Vec<HistoryRecord>,
    pub status: LoadStatus,
    pub sponsor_status: LoadStatus,
    pub sponsors: Vec<Sponsor>,
    pub active_sponsor: Option<Sponsor>,
    pub audio_enabled: bool,
    pub is_drawing: bool,
    pub last_error: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            drawn_numbers: Vec::new(),
            selected_number: None,
            history: Vec::new(),
            status: LoadStatus::Idle,
            sponsor_status: LoadStatus::Idle,
            sponsors: Vec::new(),
            active_sponsor: None,
            audio_enabled: true,
            is_drawing: false,
            last_error: None,
        }
    }
}

impl GameState {
    /// Whether a catalog is loaded and usable for drawing
    ///
    /// A failed reload keeps the previous entries playable; a reload in
    /// progress blocks draws until it settles.
    pub fn is_catalog_ready(&self) -> bool {
        self.status != LoadStatus::Loading && !self.entries.is_empty()
    }

    /// Whether `number` has been drawn
    pub fn is_drawn(&self, number: u32) -> bool {
        self.drawn_numbers.contains(&number)
    }

    /// Catalog numbers not drawn yet, ascending
    pub fn remaining_numbers(&self) -> Vec<u32> {
        let drawn: HashSet<u32> = self.drawn_numbers.iter().copied().collect();
        self.entries
            .iter()
            .map(|entry| entry.number)
            .filter(|number| !drawn.contains(number))
            .collect()
    }

    /// `(drawn, total)` counted over the loaded catalog
    pub fn progress(&self) -> (usize, usize) {
        let total = self.entries.len();
        (total - self.remaining_numbers().len(), total)
    }

    /// Catalog entry for `number`; entries are kept sorted by number
    pub fn entry(&self, number: u32) -> Option<&Entry> {
        self.entries
            .binary_search_by_key(&number, |entry| entry.number)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Most recently drawn number
    pub fn last_drawn(&self) -> Option<u32> {
        self.drawn_numbers.last().copied()
    }

    /// Sponsors taking part in draw-time rotation
    pub fn rotation_sponsors(&self) -> impl Iterator<Item = &Sponsor> {
        self.sponsors.iter().filter(|s| s.is_rotation_eligible())
    }

    /// Sponsors for the static showcase list
    pub fn showcase_sponsors(&self) -> impl Iterator<Item = &Sponsor> {
        self.sponsors.iter().filter(|s| s.showcase_only)
    }

    /// Merge `update` into a copy of this snapshot
    pub fn apply(&self, update: StateUpdate) -> Self {
        let mut next = self.clone();

        if let Some(entries) = update.entries {
            next.entries = entries;
        }
        if let Some(drawn_numbers) = update.drawn_numbers {
            next.drawn_numbers = drawn_numbers;
        }
        if let Some(selected_number) = update.selected_number {
            next.selected_number = selected_number;
        }
        if let Some(history) = update.history {
            next.history = history;
        }
        if let Some(status) = update.status {
            next.status = status;
        }
        if let Some(sponsor_status) = update.sponsor_status {
            next.sponsor_status = sponsor_status;
        }
        if let Some(sponsors) = update.sponsors {
            next.sponsors = sponsors;
        }
        if let Some(active_sponsor) = update.active_sponsor {
            next.active_sponsor = active_sponsor;
        }
        if let Some(audio_enabled) = update.audio_enabled {
            next.audio_enabled = audio_enabled;
        }
        if let Some(is_drawing) = update.is_drawing {
            next.is_drawing = is_drawing;
        }
        if let Some(last_error) = update.last_error {
            next.last_error = last_error;
        }

        next
    }
}

/// Partial update merged into a [`GameState`]
///
/// `None` leaves a field untouched. Nullable fields are doubly optional so an
/// update can clear them with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub entries: Option<Vec<Entry>>,
    pub drawn_numbers: Option<Vec<u32>>,
    pub selected_number: Option<Option<u32>>,
    pub history: Option<Vec<HistoryRecord>>,
    pub status: Option<LoadStatus>,
    pub sponsor_status: Option<LoadStatus>,
    pub sponsors: Option<Vec<Sponsor>>,
    pub active_sponsor: Option<Option<Sponsor>>,
    pub audio_enabled: Option<bool>,
    pub is_drawing: Option<bool>,
    pub last_error: Option<Option<String>>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn drawn_numbers(mut self, drawn_numbers: Vec<u32>) -> Self {
        self.drawn_numbers = Some(drawn_numbers);
        self
    }

    pub fn selected_number(mut self, selected_number: Option<u32>) -> Self {
        self.selected_number = Some(selected_number);
        self
    }

    pub fn history(mut self, history: Vec<HistoryRecord>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn status(mut self, status: LoadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sponsor_status(mut self, sponsor_status: LoadStatus) -> Self {
        self.sponsor_status = Some(sponsor_status);
        self
    }

    pub fn sponsors(mut self, sponsors: Vec<Sponsor>) -> Self {
        self.sponsors = Some(sponsors);
        self
    }

    pub fn active_sponsor(mut self, active_sponsor: Option<Sponsor>) -> Self {
        self.active_sponsor = Some(active_sponsor);
        self
    }

    pub fn audio_enabled(mut self, audio_enabled: bool) -> Self {
        self.audio_enabled = Some(audio_enabled);
        self
    }

    pub fn is_drawing(mut self, is_drawing: bool) -> Self {
        self.is_drawing = Some(is_drawing);
        self
    }

    pub fn last_error(mut self, last_error: Option<String>) -> Self {
        self.last_error = Some(last_error);
        self
    }
}
