//! Single source of truth for the game, with change subscriptions.

use super::state::{GameState, STORAGE_CORRUPTED_MESSAGE, StateUpdate};
use crate::{
    config::TombolaConfig,
    storage::{PersistedSnapshot, PersistenceCodec, Storage},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::mpsc;

/// Subscription identifier
pub type SubscriptionId = u64;

/// Result of restoring a previous session from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Nothing was stored
    Fresh,
    /// A valid snapshot was merged
    Restored { drawn: usize },
    /// The stored snapshot was discarded
    Corrupted,
}

/// Receiver side of a state subscription
///
/// The first snapshot is queued at subscribe time; every applied update
/// queues one more. Dropping the subscription unsubscribes lazily.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Arc<GameState>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next snapshot; `None` once unsubscribed
    pub async fn recv(&mut self) -> Option<Arc<GameState>> {
        self.receiver.recv().await
    }

    /// Take a queued snapshot without waiting
    pub fn try_recv(&mut self) -> Option<Arc<GameState>> {
        self.receiver.try_recv().ok()
    }
}

struct StoreInner {
    state: Arc<GameState>,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<Arc<GameState>>>,
    next_subscription_id: SubscriptionId,
}

/// Owner of the current [`GameState`] snapshot
///
/// All mutation goes through one mutex-guarded "apply partial update" path,
/// so updates are totally ordered and subscribers only ever see complete
/// snapshots. The lock is never held across an await point.
pub struct GameStore {
    inner: Mutex<StoreInner>,
    codec: PersistenceCodec,
    config: TombolaConfig,
}

impl GameStore {
    /// Create a store with empty defaults
    ///
    /// # Arguments
    ///
    /// * `config` - Storage keys and bounds
    /// * `storage` - Durable key-value port
    pub fn new(config: TombolaConfig, storage: Arc<dyn Storage>) -> Self {
        let codec = PersistenceCodec::new(storage, config.max_number);

        Self {
            inner: Mutex::new(StoreInner {
                state: Arc::new(GameState::default()),
                subscribers: HashMap::new(),
                next_subscription_id: 1,
            }),
            codec,
            config,
        }
    }

    pub fn config(&self) -> &TombolaConfig {
        &self.config
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<GameState> {
        self.lock().state.clone()
    }

    /// Merge `update` and notify subscribers
    pub fn set_state(&self, update: StateUpdate) {
        self.update_if(|_| Some(update), false);
    }

    /// Merge `update`, persist the `{drawnNumbers, history}` slice, notify
    pub fn set_state_persisted(&self, update: StateUpdate) {
        self.update_if(|_| Some(update), true);
    }

    /// Atomically inspect the snapshot and optionally apply an update
    ///
    /// Returns whether an update was applied.
    pub fn update_if<F>(&self, f: F, persist: bool) -> bool
    where
        F: FnOnce(&GameState) -> Option<StateUpdate>,
    {
        let mut inner = self.lock();

        let Some(update) = f(inner.state.as_ref()) else {
            return false;
        };

        let next = Arc::new(inner.state.apply(update));
        inner.state = next.clone();

        if persist {
            self.codec.persist(
                &self.config.state_key,
                &PersistedSnapshot {
                    drawn_numbers: next.drawn_numbers.clone(),
                    history: next.history.clone(),
                },
            );
        }

        inner
            .subscribers
            .retain(|_, sender| sender.send(next.clone()).is_ok());

        true
    }

    /// Subscribe to snapshots, starting with the current one
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();

        let id = inner.next_subscription_id;
        inner.next_subscription_id += 1;

        // Receiver is alive, so this cannot fail
        let _ = sender.send(inner.state.clone());
        inner.subscribers.insert(id, sender);

        Subscription { id, receiver }
    }

    /// Stop delivering snapshots to `id`; unknown ids are ignored
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|_, sender| !sender.is_closed());
        inner.subscribers.len()
    }

    /// Restore the previous session from storage
    ///
    /// A valid snapshot restores `drawnNumbers` and `history` and selects the
    /// last drawn number. A corrupt one is removed from storage and reported
    /// through `lastError`. The audio flag is restored independently and
    /// defaults to enabled.
    pub fn hydrate(&self) -> HydrateOutcome {
        let audio_enabled = self.read_audio_flag();
        let outcome = self.codec.parse(&self.config.state_key);

        let (update, result) = match outcome.state {
            Some(mut snapshot) => {
                snapshot.history.truncate(self.config.max_history);
                let drawn = snapshot.drawn_numbers.len();
                let selected = snapshot.drawn_numbers.last().copied();

                (
                    StateUpdate::new()
                        .drawn_numbers(snapshot.drawn_numbers)
                        .history(snapshot.history)
                        .selected_number(selected),
                    HydrateOutcome::Restored { drawn },
                )
            }
            None if outcome.invalid => {
                self.codec.clear(&self.config.state_key);
                (
                    StateUpdate::new()
                        .drawn_numbers(Vec::new())
                        .history(Vec::new())
                        .selected_number(None)
                        .last_error(Some(STORAGE_CORRUPTED_MESSAGE.to_string())),
                    HydrateOutcome::Corrupted,
                )
            }
            None => (StateUpdate::new(), HydrateOutcome::Fresh),
        };

        self.set_state(update.audio_enabled(audio_enabled));

        match result {
            HydrateOutcome::Restored { drawn } => {
                log::info!("Restored previous game with {} drawn numbers", drawn)
            }
            HydrateOutcome::Corrupted => log::warn!("Discarded corrupted saved game"),
            HydrateOutcome::Fresh => log::debug!("No saved game found"),
        }

        result
    }

    /// Clear persisted progress and the in-memory draw state
    ///
    /// `audioEnabled` and the loaded catalog are left alone.
    pub fn reset(&self) {
        self.codec.clear(&self.config.state_key);
        self.set_state(
            StateUpdate::new()
                .drawn_numbers(Vec::new())
                .history(Vec::new())
                .selected_number(None)
                .active_sponsor(None)
                .last_error(None),
        );
    }

    /// Toggle audio and remember the choice across sessions
    pub fn set_audio_enabled(&self, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        if let Err(e) = self.codec.storage().set(&self.config.audio_key, value) {
            log::warn!("Failed to persist audio preference: {}", e);
        }

        self.set_state(StateUpdate::new().audio_enabled(enabled));
    }

    /// Select an already drawn number; returns false if it was not drawn
    pub fn select_number(&self, number: u32) -> bool {
        self.update_if(
            |state| {
                state
                    .is_drawn(number)
                    .then(|| StateUpdate::new().selected_number(Some(number)))
            },
            false,
        )
    }

    /// Dismiss the current error message
    pub fn clear_error(&self) {
        self.update_if(
            |state| {
                state
                    .last_error
                    .is_some()
                    .then(|| StateUpdate::new().last_error(None))
            },
            false,
        );
    }

    fn read_audio_flag(&self) -> bool {
        match self.codec.storage().get(&self.config.audio_key) {
            Ok(Some(value)) => value.trim() != "false",
            Ok(None) => true,
            Err(e) => {
                log::warn!("Failed to read audio preference: {}", e);
                true
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // Snapshots are swapped whole, so a poisoned lock still guards valid state
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
