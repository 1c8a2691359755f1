//! Game module: state, sponsor rotation and the draw engine.

/// Draw transactions, resets and feed loading.
pub mod engine;

/// Round-robin sponsor rotation.
pub mod rotator;

/// Immutable snapshots and partial updates.
pub mod state;

/// Snapshot ownership, persistence and subscriptions.
pub mod store;

pub use engine::{DrawEngine, DrawOutcome, DrawnNumber, ResetOutcome, TombolaEvent};
pub use rotator::SponsorRotator;
pub use state::{GameState, HistoryRecord, LoadStatus, STORAGE_CORRUPTED_MESSAGE, StateUpdate};
pub use store::{GameStore, HydrateOutcome, Subscription, SubscriptionId};
