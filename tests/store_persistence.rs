mod common;

use std::time::Duration;

use merlin::catalog::banners;
use merlin::store::{ProfileUpdate, Store, StoreOptions};

const S: u64 = 1;

#[tokio::test]
async fn flushed_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    store.update_profile(S, 10, ProfileUpdate::bio("persist me")).unwrap();
    store.add_marriage(S, 10, 20).unwrap();
    store.unlock_cosmetic(S, 10, banners().get("fire").unwrap()).unwrap();
    store.record_message(S, 10, 25);
    store.add_warning(S, 20, "caps", None);
    store.add_friend(S, 10, 30).unwrap();
    store.shutdown().await.unwrap();
    let expected = store.snapshot();

    let reopened = common::open_store(dir.path()).await;
    assert_eq!(reopened.snapshot(), expected);
    assert_eq!(reopened.get_profile(S, 10).bio, "persist me");
    assert_eq!(reopened.get_marriage(S, 20).unwrap().partner, 10);
    assert!(reopened.has_cosmetic(S, 10, "fire"));
    assert_eq!(reopened.get_level_record(S, 10).xp, 25);
}

#[tokio::test]
async fn document_uses_section_names_as_top_level_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;
    store.get_profile(S, 10);
    store.unlock_cosmetic(S, 10, banners().get("ice").unwrap()).unwrap();
    assert!(store.flush().await.unwrap());

    let raw = std::fs::read_to_string(common::data_file(dir.path())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in [
        "muted_users",
        "warnings",
        "user_levels",
        "marriages",
        "children",
        "friends",
        "reputation",
        "gifts",
        "user_profiles",
        "achievements",
        "backgrounds",
    ] {
        assert!(value.get(key).is_some(), "missing section {}", key);
    }
    assert_eq!(value["backgrounds"]["1"]["10"][0]["id"], "ice");
    assert_eq!(value["user_profiles"]["1"]["10"]["banner"], "assassin");
    assert!(value["user_profiles"]["1"]["10"].get("color").is_none());
}

#[tokio::test]
async fn flush_without_changes_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;
    assert!(!store.flush().await.unwrap());
    assert!(!common::data_file(dir.path()).exists());

    // a rejected mutation is not a change either
    store.add_reputation(S, 10, 1);
    store.flush().await.unwrap();
    assert!(store.unmute(S, 10).is_err());
    assert!(!store.flush().await.unwrap());
}

#[tokio::test]
async fn background_flusher_saves_without_explicit_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::data_file(dir.path());
    let store = Store::open(StoreOptions::new(&path).with_debounce(Duration::from_millis(10))).await;
    store.add_gift(S, 10);

    let mut saved = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if let Ok(raw) = std::fs::read_to_string(&path) {
            if raw.contains("\"gifts\"") && raw.contains("\"10\": 1") {
                saved = true;
                break;
            }
        }
    }
    assert!(saved, "flusher never wrote the gift");
    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::data_file(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let store = common::open_store(dir.path()).await;
    assert_eq!(store.stats().profiles, 0);
    store.get_profile(S, 10);
    store.shutdown().await.unwrap();

    let reopened = common::open_store(dir.path()).await;
    assert_eq!(reopened.stats().profiles, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    let mut handles = Vec::new();
    for task in 0..8u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50u64 {
                store.add_reputation(S, 10, 1);
                store.record_message(S, 100 + task, 1);
                if i % 10 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(store.get_reputation(S, 10), 400);
    store.shutdown().await.unwrap();

    let reopened = common::open_store(dir.path()).await;
    assert_eq!(reopened.get_reputation(S, 10), 400);
    for task in 0..8u64 {
        assert_eq!(reopened.get_level_record(S, 100 + task).messages, 50);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_marriages_keep_pairs_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    // everyone tries to marry user 1; exactly one wins
    let mut handles = Vec::new();
    for suitor in 2..20u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.add_marriage(S, suitor, 1).is_ok() }));
    }
    let mut wins = 0;
    for h in handles {
        if h.await.unwrap() {
            wins += 1;
        }
    }
    assert_eq!(wins, 1);
    let partner = store.get_marriage(S, 1).unwrap().partner;
    assert_eq!(store.get_marriage(S, partner).unwrap().partner, 1);
    assert_eq!(store.stats().marriages, 1);
}

#[tokio::test]
async fn notification_flag_defaults_on_for_older_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::data_file(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"user_levels": {"1": {"10": {"xp": 5, "messages": 1}}}}"#).unwrap();

    let store = common::open_store(dir.path()).await;
    let rec = store.get_level_record(S, 10);
    assert_eq!((rec.xp, rec.messages), (5, 1));
    assert!(rec.level_up_notifications);

    assert!(!store.toggle_level_notifications(S, 10));
    store.shutdown().await.unwrap();

    let reopened = common::open_store(dir.path()).await;
    assert!(!reopened.get_level_record(S, 10).level_up_notifications);
    assert!(reopened.toggle_level_notifications(S, 10));
}
