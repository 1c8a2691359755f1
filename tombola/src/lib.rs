//! # Tombola
//!
//! Draw engine for tombola, the Italian bingo game played with the numbers
//! 1 to 90.
//!
//! The crate owns the authoritative game state and everything with real
//! invariants around it: the draw algorithm, round-robin sponsor rotation,
//! and the persistence layer that lets a game survive restarts. Rendering,
//! speech playback and network transport are left to the host, which plugs
//! in through small ports ([`storage::Storage`], [`catalog::FeedSource`],
//! [`audio::Announcer`]).
//!
//! ## Architecture
//!
//! - **Catalog**: validated number entries and sponsors parsed from JSON feeds
//! - **Storage**: key-value port and the codec for the persisted snapshot
//! - **GameStore**: single source of truth with change subscriptions
//! - **SponsorRotator**: sequential sponsor cycle across draws
//! - **DrawEngine**: single-flight draw transactions, resets, feed loading
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tombola::{
//!     DrawEngine, DrawOutcome, GameStore, TombolaConfig,
//!     audio::SilentAnnouncer, catalog::StaticFeed, storage::MemoryStorage,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(GameStore::new(TombolaConfig::instant(), Arc::new(MemoryStorage::new())));
//! store.hydrate();
//!
//! let engine = DrawEngine::new(store, Arc::new(SilentAnnouncer));
//! engine
//!     .load_catalog(&StaticFeed::new(r#"{"numbers": [{"number": 1, "italian": "L'Italia"}]}"#))
//!     .await
//!     .unwrap();
//!
//! assert!(matches!(engine.draw().await, DrawOutcome::Drawn(_)));
//! assert_eq!(engine.draw().await, DrawOutcome::Exhausted);
//! # }
//! ```

/// Speech port for announcing drawn numbers.
pub mod audio;

/// Number and sponsor feeds.
pub mod catalog;

/// Engine configuration.
pub mod config;

/// Game state, sponsor rotation and the draw engine.
pub mod game;

/// Durable key-value storage and the snapshot codec.
pub mod storage;

pub use config::{ConfigError, TombolaConfig};
pub use game::{
    DrawEngine, DrawOutcome, DrawnNumber, GameState, GameStore, HistoryRecord, LoadStatus,
    ResetOutcome, StateUpdate, TombolaEvent,
};
