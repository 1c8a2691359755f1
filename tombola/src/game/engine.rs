//! Draw engine orchestrating draws, resets and feed loading.

use super::{
    rotator::SponsorRotator,
    state::{GameState, HistoryRecord, LoadStatus, StateUpdate},
    store::GameStore,
};
use crate::{
    audio::{Announcer, announcements_for},
    catalog::{
        Entry, FeedError, FeedResult, FeedSource, Sponsor, parse_entries, parse_sponsors,
    },
};
use rand::seq::IndexedRandom;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// A committed draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnNumber {
    pub number: u32,
    pub entry: Entry,
    pub sponsor: Option<Sponsor>,
}

/// Notifications for renderer and audio collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TombolaEvent {
    /// A number was drawn and committed
    NumberDrawn(DrawnNumber),
    /// Progress was wiped
    GameReset,
    /// A draw was requested with nothing left to draw; displays should refresh
    BoardRefresh,
}

/// Result of a draw request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// A number was drawn
    Drawn(DrawnNumber),
    /// Another draw is in flight
    AlreadyDrawing,
    /// The catalog is not loaded
    CatalogNotReady,
    /// Every catalog number has been drawn
    Exhausted,
    /// The draw task died before committing; state was restored
    Aborted,
}

impl DrawOutcome {
    /// The drawn number, if any
    pub fn drawn(&self) -> Option<&DrawnNumber> {
        match self {
            DrawOutcome::Drawn(drawn) => Some(drawn),
            _ => None,
        }
    }
}

/// Result of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset,
    /// Nothing drawn yet
    NothingToReset,
    /// A draw is in flight
    DrawInProgress,
}

/// Orchestrates draw transactions against a shared [`GameStore`]
///
/// Draws are single-flight: `isDrawing` is set atomically when a draw starts
/// and any request observing it is rejected. The commit runs on its own task,
/// so a caller dropping its future cannot leave the flag stuck.
pub struct DrawEngine {
    store: Arc<GameStore>,
    rotator: Mutex<SponsorRotator>,
    announcer: Arc<dyn Announcer>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<TombolaEvent>>>,
}

impl DrawEngine {
    /// Create an engine over `store`, announcing through `announcer`
    pub fn new(store: Arc<GameStore>, announcer: Arc<dyn Announcer>) -> Arc<Self> {
        Arc::new(Self {
            store,
            rotator: Mutex::new(SponsorRotator::new()),
            announcer,
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn store(&self) -> &Arc<GameStore> {
        &self.store
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<GameState> {
        self.store.snapshot()
    }

    /// Receive every event emitted from now on
    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<TombolaEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        lock(&self.listeners).push(sender);
        receiver
    }

    /// Draw one number
    ///
    /// No-op when a draw is already running, the catalog is not loaded, or
    /// every number is out. Otherwise waits for the configured draw delay,
    /// commits the number with the next sponsor, notifies listeners and
    /// announces the entry.
    pub async fn draw(self: &Arc<Self>) -> DrawOutcome {
        let mut rejection = None;
        self.store.update_if(
            |state| {
                rejection = check_draw_preconditions(state);
                rejection
                    .is_none()
                    .then(|| StateUpdate::new().is_drawing(true))
            },
            false,
        );

        if let Some(outcome) = rejection {
            log::debug!("Draw rejected: {:?}", outcome);
            if outcome == DrawOutcome::Exhausted {
                self.emit(TombolaEvent::BoardRefresh);
            }
            return outcome;
        }

        let engine = Arc::clone(self);
        let delay = self.store.config().draw_delay();
        let task = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            engine.commit_draw()
        });

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Draw task failed: {}", e);
                self.store.set_state(StateUpdate::new().is_drawing(false));
                DrawOutcome::Aborted
            }
        };

        if let DrawOutcome::Drawn(drawn) = &outcome {
            log::info!(
                "Drew {} ({}), sponsor: {}",
                drawn.number,
                drawn.entry.label,
                drawn.sponsor.as_ref().map_or("none", Sponsor::label)
            );
            self.emit(TombolaEvent::NumberDrawn(drawn.clone()));
            self.announce(&drawn.entry).await;
        }

        outcome
    }

    /// Wipe progress and start a new game
    pub fn reset(&self) -> ResetOutcome {
        let state = self.store.snapshot();

        if state.is_drawing {
            return ResetOutcome::DrawInProgress;
        }

        if state.drawn_numbers.is_empty() {
            return ResetOutcome::NothingToReset;
        }

        self.announcer.cancel();
        self.store.reset();
        lock(&self.rotator).reset();

        log::info!(
            "Game reset after {} drawn numbers",
            state.drawn_numbers.len()
        );
        self.emit(TombolaEvent::GameReset);

        ResetOutcome::Reset
    }

    /// Load the number catalog from `source`
    ///
    /// On failure the previous catalog stays in place and the error is
    /// reported through `status` and `lastError`.
    pub async fn load_catalog(&self, source: &dyn FeedSource) -> FeedResult<usize> {
        self.store
            .set_state(StateUpdate::new().status(LoadStatus::Loading));

        let max_number = self.store.config().max_number;
        let loaded = source
            .fetch()
            .await
            .and_then(|document| parse_entries(&document))
            .map(|entries| {
                let total = entries.len();
                let entries: Vec<Entry> = entries
                    .into_iter()
                    .filter(|entry| entry.number <= max_number)
                    .collect();
                let skipped = total - entries.len();
                (entries, skipped)
            });

        match loaded {
            Ok((entries, skipped)) if !entries.is_empty() => {
                let count = entries.len();
                self.store.set_state(
                    StateUpdate::new()
                        .entries(entries)
                        .status(LoadStatus::Ready),
                );
                log::info!("Loaded catalog with {} numbers", count);

                if skipped > 0 {
                    log::warn!("Ignored {} catalog entries above {}", skipped, max_number);
                    self.report_error(format!(
                        "{skipped} numbers above {max_number} were left out of the game"
                    ));
                }
                Ok(count)
            }
            Ok(_) => {
                let err = FeedError::Empty("numbers");
                self.fail_catalog(&err);
                Err(err)
            }
            Err(e) => {
                self.fail_catalog(&e);
                Err(e)
            }
        }
    }

    /// Load the sponsor list from `source`
    ///
    /// Sponsors are optional: on failure rotation degrades to "no sponsor"
    /// and drawing keeps working.
    pub async fn load_sponsors(&self, source: &dyn FeedSource) -> FeedResult<usize> {
        self.store
            .set_state(StateUpdate::new().sponsor_status(LoadStatus::Loading));

        match source
            .fetch()
            .await
            .and_then(|document| parse_sponsors(&document))
        {
            Ok(sponsors) => {
                let count = sponsors.len();
                let eligible = {
                    let mut rotator = lock(&self.rotator);
                    rotator.set_sponsors(&sponsors);
                    rotator.len()
                };

                self.store.set_state(
                    StateUpdate::new()
                        .sponsors(sponsors)
                        .sponsor_status(LoadStatus::Ready),
                );
                log::info!("Loaded {} sponsors ({} in rotation)", count, eligible);
                Ok(count)
            }
            Err(e) => {
                log::warn!("Failed to load sponsors: {}", e);
                lock(&self.rotator).set_sponsors(&[]);

                self.store.set_state(
                    StateUpdate::new()
                        .sponsors(Vec::new())
                        .sponsor_status(LoadStatus::Error),
                );
                self.report_error(format!("Unable to load sponsors: {e}"));
                Err(e)
            }
        }
    }

    /// Sponsor shown with the latest draw
    pub fn current_sponsor(&self) -> Option<Sponsor> {
        lock(&self.rotator).peek().cloned()
    }

    /// Toggle spoken announcements; disabling stops current speech
    pub fn set_audio_enabled(&self, enabled: bool) {
        if !enabled {
            self.announcer.cancel();
        }
        self.store.set_audio_enabled(enabled);
    }

    /// Show an already drawn number
    pub fn select_number(&self, number: u32) -> bool {
        self.store.select_number(number)
    }

    fn commit_draw(&self) -> DrawOutcome {
        let max_history = self.store.config().max_history;
        let mut drawn = None;

        self.store.update_if(
            |state| {
                let remaining = state.remaining_numbers();
                let Some(entry) = remaining
                    .choose(&mut rand::rng())
                    .and_then(|&number| state.entry(number))
                    .cloned()
                else {
                    return Some(StateUpdate::new().is_drawing(false));
                };

                let sponsor = lock(&self.rotator).next_sponsor();

                let mut drawn_numbers = state.drawn_numbers.clone();
                drawn_numbers.push(entry.number);

                let mut history = Vec::with_capacity(max_history);
                history.push(HistoryRecord::now(entry.number, sponsor.clone()));
                history.extend(state.history.iter().cloned());
                history.truncate(max_history);

                let update = StateUpdate::new()
                    .drawn_numbers(drawn_numbers)
                    .history(history)
                    .selected_number(Some(entry.number))
                    .active_sponsor(sponsor.clone())
                    .is_drawing(false);

                drawn = Some(DrawnNumber {
                    number: entry.number,
                    entry,
                    sponsor,
                });

                Some(update)
            },
            true,
        );

        drawn.map_or(DrawOutcome::Exhausted, DrawOutcome::Drawn)
    }

    async fn announce(&self, entry: &Entry) {
        if !self.store.snapshot().audio_enabled || !self.announcer.is_supported() {
            return;
        }

        let messages = announcements_for(entry, &self.store.config().speech_locale);
        self.announcer.cancel();

        if let Err(e) = self.announcer.speak(&messages).await {
            log::warn!("Failed to announce {}: {}", entry.number, e);
        }
    }

    fn fail_catalog(&self, err: &FeedError) {
        log::error!("Failed to load catalog: {}", err);
        self.store
            .set_state(StateUpdate::new().status(LoadStatus::Error));
        self.report_error(format!("Unable to load the numbers: {err}"));
    }

    /// Surface `message` through `lastError` unless an earlier error is still
    /// waiting to be cleared
    fn report_error(&self, message: String) {
        let reported = self.store.update_if(
            |state| {
                state
                    .last_error
                    .is_none()
                    .then(|| StateUpdate::new().last_error(Some(message)))
            },
            false,
        );

        if !reported {
            log::debug!("Kept pending error over a newer one");
        }
    }

    fn emit(&self, event: TombolaEvent) {
        lock(&self.listeners).retain(|listener| listener.send(event.clone()).is_ok());
    }
}

fn check_draw_preconditions(state: &GameState) -> Option<DrawOutcome> {
    if state.is_drawing {
        Some(DrawOutcome::AlreadyDrawing)
    } else if !state.is_catalog_ready() {
        Some(DrawOutcome::CatalogNotReady)
    } else if state.remaining_numbers().is_empty() {
        Some(DrawOutcome::Exhausted)
    } else {
        None
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
