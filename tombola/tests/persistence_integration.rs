//! Integration tests for saving and restoring games across sessions.

use std::{path::PathBuf, sync::Arc};

use tombola::{
    DrawEngine, DrawOutcome, GameStore, TombolaConfig,
    audio::SilentAnnouncer,
    catalog::StaticFeed,
    game::{HydrateOutcome, STORAGE_CORRUPTED_MESSAGE},
    storage::{FileStorage, MemoryStorage, Storage},
};

const CATALOG: &str = r#"{"numbers": [
    {"number": 1, "italian": "L'Italia"},
    {"number": 7, "italian": "Il vasetto"},
    {"number": 90, "italian": "La paura"}
]}"#;

/// Generate a unique temp path for a file-backed store
fn unique_path(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{}_{}.json",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap()
    ))
}

async fn session(storage: Arc<dyn Storage>) -> (Arc<DrawEngine>, HydrateOutcome) {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = Arc::new(GameStore::new(TombolaConfig::instant(), storage));
    let outcome = store.hydrate();
    let engine = DrawEngine::new(store, Arc::new(SilentAnnouncer));
    engine
        .load_catalog(&StaticFeed::new(CATALOG))
        .await
        .expect("catalog loads");
    (engine, outcome)
}

#[tokio::test]
async fn test_progress_survives_restart() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let (engine, outcome) = session(storage.clone()).await;
    assert_eq!(outcome, HydrateOutcome::Fresh);
    engine.draw().await;
    engine.draw().await;
    let drawn = engine.snapshot().drawn_numbers.clone();
    drop(engine);

    let (engine, outcome) = session(storage).await;
    assert_eq!(outcome, HydrateOutcome::Restored { drawn: 2 });

    let state = engine.snapshot();
    assert_eq!(state.drawn_numbers, drawn);
    assert_eq!(state.selected_number, drawn.last().copied());
    assert_eq!(state.history.len(), 2);

    // Only the one remaining number can come out
    let remaining = state.remaining_numbers();
    assert_eq!(remaining.len(), 1);
    let last = engine.draw().await;
    assert_eq!(last.drawn().map(|d| d.number), Some(remaining[0]));
    assert_eq!(engine.draw().await, DrawOutcome::Exhausted);
}

#[tokio::test]
async fn test_hydrate_valid_snapshot_selects_number() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            &TombolaConfig::default().state_key,
            r#"{"drawnNumbers": [7], "history": []}"#,
        )
        .unwrap();

    let (engine, _) = session(storage).await;
    let state = engine.snapshot();
    assert_eq!(state.selected_number, Some(7));
    assert_eq!(state.remaining_numbers(), vec![1, 90]);
}

#[tokio::test]
async fn test_corrupted_storage_starts_fresh() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(&TombolaConfig::default().state_key, "not-json")
        .unwrap();

    let (engine, outcome) = session(storage).await;
    assert_eq!(outcome, HydrateOutcome::Corrupted);

    let state = engine.snapshot();
    assert!(state.drawn_numbers.is_empty());
    assert_eq!(state.last_error.as_deref(), Some(STORAGE_CORRUPTED_MESSAGE));

    // Game remains playable
    assert!(matches!(engine.draw().await, DrawOutcome::Drawn(_)));
}

#[tokio::test]
async fn test_full_storage_does_not_block_play() {
    let storage = Arc::new(MemoryStorage::with_quota(16));
    let (engine, _) = session(storage.clone()).await;

    for _ in 0..3 {
        assert!(matches!(engine.draw().await, DrawOutcome::Drawn(_)));
    }

    assert_eq!(engine.snapshot().drawn_numbers.len(), 3);
    assert!(
        storage
            .get(&TombolaConfig::default().state_key)
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_audio_preference_survives_reset_and_restart() {
    let path = unique_path("tombola_audio");
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&path));

    let (engine, _) = session(storage.clone()).await;
    engine.set_audio_enabled(false);
    engine.draw().await;
    engine.reset();
    drop(engine);

    let (engine, outcome) = session(Arc::new(FileStorage::new(&path))).await;
    assert_eq!(outcome, HydrateOutcome::Fresh);
    assert!(!engine.snapshot().audio_enabled);

    std::fs::remove_file(&path).ok();
}
