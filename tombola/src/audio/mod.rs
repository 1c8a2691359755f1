//! Audio module providing the speech port used to announce drawn numbers.
//!
//! Playback itself lives outside this crate. Hosts implement [`Announcer`]
//! for their speech backend; the draw engine only builds the ordered list of
//! messages and hands it over when audio is enabled and supported.

pub mod errors;

pub use errors::{AnnounceError, AnnounceResult};

use crate::catalog::Entry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub text: String,
    pub locale: String,
}

impl Announcement {
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
        }
    }
}

/// Messages announcing `entry`: the number, its meaning, then the dialect meaning
pub fn announcements_for(entry: &Entry, locale: &str) -> Vec<Announcement> {
    let mut messages = vec![Announcement::new(entry.number.to_string(), locale)];

    if !entry.label.is_empty() {
        messages.push(Announcement::new(entry.label.clone(), locale));
    }

    if let Some(dialect) = entry.dialect_label.as_ref().filter(|d| !d.is_empty()) {
        messages.push(Announcement::new(dialect.clone(), locale));
    }

    messages
}

/// Speech output port
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Whether this host can speak at all
    fn is_supported(&self) -> bool;

    /// Speak `messages` one after another, resolving when the last one ends
    async fn speak(&self, messages: &[Announcement]) -> AnnounceResult<()>;

    /// Interrupt anything being spoken
    fn cancel(&self);
}

/// Announcer for hosts without speech; every request is skipped
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAnnouncer;

#[async_trait]
impl Announcer for SilentAnnouncer {
    fn is_supported(&self) -> bool {
        false
    }

    async fn speak(&self, _messages: &[Announcement]) -> AnnounceResult<()> {
        Err(AnnounceError::Unsupported)
    }

    fn cancel(&self) {}
}

/// Announcer that records requests instead of speaking them
///
/// Useful for headless hosts that forward announcements elsewhere, and for
/// tests.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    spoken: Mutex<Vec<Vec<Announcement>>>,
    cancellations: Mutex<usize>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, oldest first
    pub fn spoken(&self) -> Vec<Vec<Announcement>> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of cancel requests received
    pub fn cancellations(&self) -> usize {
        self.cancellations.lock().map(|c| *c).unwrap_or_default()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    fn is_supported(&self) -> bool {
        true
    }

    async fn speak(&self, messages: &[Announcement]) -> AnnounceResult<()> {
        self.spoken
            .lock()
            .map_err(|_| AnnounceError::Failed("recorder lock poisoned".to_string()))?
            .push(messages.to_vec());
        Ok(())
    }

    fn cancel(&self) {
        if let Ok(mut count) = self.cancellations.lock() {
            *count += 1;
        }
    }
}
