mod common;

use merlin::catalog::{achievements, banners};
use merlin::store::{ProfileUpdate, Rejection};

const S: u64 = 1;

#[tokio::test]
async fn profile_is_created_on_first_read() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    let profile = store.get_profile(S, 10);
    assert_eq!(profile.bio, "No bio set yet...");
    assert_eq!(profile.title, "Newcomer");
    assert_eq!(profile.banner, "assassin");
    assert!(profile.badges.is_empty());
    assert_eq!(store.stats().profiles, 1);

    // same server, other user; other server, same user
    assert_eq!(store.get_profile(2, 10).banner, "assassin");
    assert_eq!(store.stats().profiles, 2);
}

#[tokio::test]
async fn rejected_bio_leaves_profile_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    let updated = store.update_profile(S, 10, ProfileUpdate::bio("hi there")).unwrap();
    assert_eq!(updated.bio, "hi there");
    assert!(updated.last_updated >= updated.created_at);

    let err = store
        .update_profile(S, 10, ProfileUpdate::bio("x".repeat(201)))
        .unwrap_err();
    assert_eq!(err, Rejection::BioTooLong { max: 200 });
    assert_eq!(err.to_string(), "bio too long (max 200 characters)");
    assert_eq!(store.get_profile(S, 10).bio, "hi there");

    let err = store
        .update_profile(S, 10, ProfileUpdate::title("t".repeat(26)))
        .unwrap_err();
    assert_eq!(err, Rejection::TitleTooLong { max: 25 });
}

#[tokio::test]
async fn marriage_is_symmetric_and_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    let record = store.add_marriage(S, 10, 20).unwrap();
    assert_eq!(record.partner, 20);
    assert_eq!(store.get_marriage(S, 10).unwrap().partner, 20);
    assert_eq!(store.get_marriage(S, 20).unwrap().partner, 10);
    assert_eq!(
        store.get_marriage(S, 10).unwrap().married_at,
        store.get_marriage(S, 20).unwrap().married_at
    );

    assert_eq!(store.add_marriage(S, 10, 30), Err(Rejection::AlreadyMarried));
    assert_eq!(store.add_marriage(S, 30, 20), Err(Rejection::PartnerAlreadyMarried));
    assert_eq!(store.add_marriage(S, 30, 30), Err(Rejection::SelfTarget));
    assert!(!store.is_married(S, 30));
    // marriages are per server
    assert!(!store.is_married(2, 10));

    assert_eq!(store.remove_marriage(S, 20), Some(10));
    assert!(!store.is_married(S, 10));
    assert!(!store.is_married(S, 20));
    assert_eq!(store.remove_marriage(S, 20), None);
    assert_eq!(store.stats().marriages, 0);
}

#[tokio::test]
async fn children_require_marriage() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    assert_eq!(store.add_child(S, 10, "Pip"), Err(Rejection::NotMarried));
    store.add_marriage(S, 10, 20).unwrap();
    assert_eq!(store.add_child(S, 10, "  Pip "), Ok(1));
    assert_eq!(store.add_child(S, 10, ""), Err(Rejection::EmptyText("child name")));

    let kids = store.get_children(S, 10);
    assert_eq!(kids.len(), 1);
    assert_eq!(kids[0].name, "Pip");
    assert_eq!(kids[0].level, 1);
    assert_eq!(kids[0].happiness, 100);
}

#[tokio::test]
async fn friends_are_directed_and_limited() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = merlin::store::StoreOptions::new(common::data_file(dir.path()));
    opts.max_friends = 2;
    let store = merlin::store::Store::open(opts).await;

    assert_eq!(store.add_friend(S, 10, 20), Ok(true));
    assert_eq!(store.add_friend(S, 10, 20), Ok(false));
    assert_eq!(store.add_friend(S, 10, 10), Err(Rejection::SelfTarget));
    assert_eq!(store.get_friends(S, 10), vec![20]);
    assert!(store.get_friends(S, 20).is_empty());

    assert_eq!(store.add_friend(S, 10, 30), Ok(true));
    assert_eq!(store.add_friend(S, 10, 40), Err(Rejection::FriendLimit { max: 2 }));

    assert!(store.remove_friend(S, 10, 20));
    assert!(!store.remove_friend(S, 10, 20));
    assert_eq!(store.get_friends(S, 10), vec![30]);
}

#[tokio::test]
async fn cosmetic_unlock_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;
    let catalog = banners();
    let aura = catalog.find_by_name("AURA").unwrap();
    assert_eq!(aura.id, "aura_farmer");

    assert!(store.unlock_cosmetic(S, 10, aura).is_ok());
    let before = store.snapshot();
    let err = store.unlock_cosmetic(S, 10, aura).unwrap_err();
    assert_eq!(err, Rejection::AlreadyUnlocked);
    assert_eq!(err.to_string(), "already unlocked");
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.get_unlocked_cosmetics(S, 10).len(), 1);

    // the starter banner is always owned
    assert!(store.has_cosmetic(S, 10, "assassin"));
    let assassin = catalog.get("assassin").unwrap();
    assert_eq!(store.unlock_cosmetic(S, 10, assassin), Err(Rejection::AlreadyUnlocked));
}

#[tokio::test]
async fn only_owned_cosmetics_can_be_equipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;
    let catalog = banners();

    assert_eq!(
        store.set_active_cosmetic(S, 10, "neon"),
        Err(Rejection::NotUnlocked("neon".into()))
    );
    assert_eq!(store.get_profile(S, 10).banner, "assassin");

    store.unlock_cosmetic(S, 10, catalog.get("neon").unwrap()).unwrap();
    store.set_active_cosmetic(S, 10, "neon").unwrap();
    assert_eq!(store.get_profile(S, 10).banner, "neon");

    store.set_active_cosmetic(S, 10, "assassin").unwrap();
    assert_eq!(store.get_profile(S, 10).banner, "assassin");
}

#[tokio::test]
async fn achievements_and_badges_are_awarded_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;
    let defs = achievements();
    let first = defs.get("first_message").unwrap();

    assert!(store.add_achievement(S, 10, first));
    assert!(!store.add_achievement(S, 10, first));
    let earned = store.get_achievements(S, 10);
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].rarity, "common");

    store.give_badge(S, 10, "vip").unwrap();
    assert_eq!(store.give_badge(S, 10, "vip"), Err(Rejection::AlreadyHasBadge));
    assert_eq!(store.get_profile(S, 10).badges, vec!["vip".to_string()]);
}

#[tokio::test]
async fn counters_and_levels() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    assert_eq!(store.add_reputation(S, 10, 1), 1);
    assert_eq!(store.add_reputation(S, 10, 1), 2);
    assert_eq!(store.get_reputation(S, 11), 0);
    assert_eq!(store.add_gift(S, 10), 1);
    assert_eq!(store.increment_profile_views(S, 10), 1);

    let (before, after) = store.record_message(S, 10, 20);
    assert_eq!((before.xp, before.messages), (0, 0));
    assert_eq!((after.xp, after.messages), (20, 1));
    store.record_message(S, 11, 0);
    store.add_xp(S, 11, 500);
    assert_eq!(store.get_level_record(S, 11).messages, 1);

    let board = store.leaderboard(S, 10);
    let ids: Vec<u64> = board.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![11, 10]);

    assert_eq!(store.set_xp(S, 11, 5).xp, 5);
    assert_eq!(store.leaderboard(S, 1)[0].0, 10);
}

#[tokio::test]
async fn warnings_and_mutes() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::open_store(dir.path()).await;

    assert_eq!(store.add_warning(S, 10, "", Some(1)), 1);
    assert_eq!(store.add_warning(S, 10, "spam", None), 2);
    let warnings = store.get_warnings(S, 10);
    assert_eq!(warnings[0].reason, "No reason provided");
    assert_eq!(warnings[0].issued_by, Some(1));
    assert_eq!(store.clear_warnings(S, 10), 2);
    assert_eq!(store.clear_warnings(S, 10), 0);

    store.mute(S, 10, None);
    assert!(store.is_muted(S, 10));
    assert_eq!(store.muted_users(S).len(), 1);
    store.unmute(S, 10).unwrap();
    assert!(!store.is_muted(S, 10));
    assert_eq!(store.unmute(S, 10), Err(Rejection::NotMuted));

    // a zero-length mute is already over; the check lifts it
    store.mute(S, 11, Some(0));
    assert!(!store.is_muted(S, 11));
    assert!(store.muted_users(S).is_empty());

    store.mute(S, 12, Some(3600));
    assert!(store.is_muted(S, 12));
}
