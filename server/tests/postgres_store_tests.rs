mod common;

use std::sync::Arc;

use ::common::{Leaderboard, LeaderboardEntry};
use server::cache::MemoryCache;
use server::db::models::Player;
use server::db::{PostgresStore, ScoreStore, StoreError};
use server::names::{NameError, NameResolver};
use server::{Actor, EntryService, LeaderboardError};
use uuid::Uuid;

use crate::common::TestDatabaseGuard;

async fn player(store: &PostgresStore, name: &str) -> Uuid {
    let player = Player {
        id: Uuid::new_v4(),
        username: name.to_string(),
    };
    store.upsert_player(&player).await.unwrap();
    player.id
}

#[tokio::test]
async fn test_leaderboard_crud() {
    require_database!();
    let db = TestDatabaseGuard::new("test_leaderboard_crud").await.unwrap();
    let store = PostgresStore::new(db.pool());

    let draft = Leaderboard::new("Weekly", 5).unwrap().with_bounds(10, 1000).unwrap();
    let mut created = store.add_leaderboard(&draft).await.unwrap();
    assert!(created.id() > 0);
    assert_eq!(store.get_leaderboard(created.id()).await.unwrap(), Some(created.clone()));

    created.set_name("Monthly").unwrap();
    created.set_num_of_top_scores(3).unwrap();
    store.update_leaderboard(&created).await.unwrap();
    assert_eq!(store.get_leaderboards().await.unwrap(), vec![created.clone()]);

    let ghost = created.clone().with_id(created.id() + 1000);
    assert!(matches!(store.update_leaderboard(&ghost).await, Err(StoreError::Conflict)));

    store.delete_leaderboard(created.id()).await.unwrap();
    assert!(store.get_leaderboard(created.id()).await.unwrap().is_none());
    assert!(matches!(
        store.delete_leaderboard(created.id()).await,
        Err(StoreError::NotFound)
    ));

    db.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_entry_queries() {
    require_database!();
    let db = TestDatabaseGuard::new("test_entry_queries").await.unwrap();
    let store = PostgresStore::new(db.pool());

    let board = store
        .add_leaderboard(&Leaderboard::new("Weekly", 2).unwrap())
        .await
        .unwrap();
    let ana = player(&store, "Ana").await;
    let bob = player(&store, "Bob").await;
    let cat = player(&store, "Cat").await;

    let mut ana_entry = store
        .add_entry(&LeaderboardEntry::new(&board, ana, 30).unwrap())
        .await
        .unwrap();
    store.add_entry(&LeaderboardEntry::new(&board, bob, 20).unwrap()).await.unwrap();
    store.add_entry(&LeaderboardEntry::new(&board, cat, 10).unwrap()).await.unwrap();

    let top: Vec<Uuid> = store
        .get_top_n(&board)
        .await
        .unwrap()
        .iter()
        .map(LeaderboardEntry::player_id)
        .collect();
    assert_eq!(top, vec![ana, bob]);
    assert_eq!(store.get_entries_at_or_above(board.id(), 20).await.unwrap().len(), 2);

    ana_entry.set_score(&board, 5).unwrap();
    store.update_entry(&ana_entry).await.unwrap();
    let reloaded = store.get_entry_by_player(board.id(), ana).await.unwrap().unwrap();
    assert_eq!(reloaded, ana_entry);

    store.delete_entry(ana_entry.id()).await.unwrap();
    assert!(store.get_entry_by_id(ana_entry.id()).await.unwrap().is_none());
    assert!(matches!(store.update_entry(&ana_entry).await, Err(StoreError::Conflict)));

    store.delete_leaderboard(board.id()).await.unwrap();
    assert!(store.get_entry_by_player(board.id(), bob).await.unwrap().is_none());

    db.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_entry_for_unseeded_player() {
    require_database!();
    let db = TestDatabaseGuard::new("test_entry_for_unseeded_player").await.unwrap();
    let store = Arc::new(PostgresStore::new(db.pool()));

    let board = store
        .add_leaderboard(&Leaderboard::new("Weekly", 2).unwrap())
        .await
        .unwrap();
    let stranger = Uuid::new_v4();

    let entry = LeaderboardEntry::new(&board, stranger, 10).unwrap();
    assert!(matches!(
        store.add_entry(&entry).await,
        Err(StoreError::UnknownPlayer(id)) if id == stranger
    ));

    let entries = EntryService::new(store.clone(), store.clone(), Arc::new(MemoryCache::new()));
    assert!(matches!(
        entries.submit(Some(&Actor::player(stranger)), board.id(), 10).await,
        Err(LeaderboardError::Unauthorized)
    ));
    assert!(store.get_entry_by_player(board.id(), stranger).await.unwrap().is_none());

    drop(entries);
    drop(store);
    db.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_entry_for_deleted_leaderboard() {
    require_database!();
    let db = TestDatabaseGuard::new("test_entry_for_deleted_leaderboard").await.unwrap();
    let store = PostgresStore::new(db.pool());

    let board = store
        .add_leaderboard(&Leaderboard::new("Gone", 2).unwrap())
        .await
        .unwrap();
    let ana = player(&store, "Ana").await;
    store.delete_leaderboard(board.id()).await.unwrap();

    let entry = LeaderboardEntry::new(&board, ana, 10).unwrap();
    assert!(matches!(store.add_entry(&entry).await, Err(StoreError::NotFound)));

    db.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_display_names() {
    require_database!();
    let db = TestDatabaseGuard::new("test_display_names").await.unwrap();
    let store = PostgresStore::new(db.pool());

    let zara = player(&store, "Zara").await;
    assert_eq!(store.display_name(zara).await.unwrap(), "Zara");
    assert!(matches!(
        store.display_name(Uuid::new_v4()).await,
        Err(NameError::UnknownPlayer(_))
    ));

    db.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tie_break_against_postgres() {
    require_database!();
    let db = TestDatabaseGuard::new("test_tie_break_against_postgres").await.unwrap();
    let store = Arc::new(PostgresStore::new(db.pool()));

    let board = store
        .add_leaderboard(&Leaderboard::new("Ties", 2).unwrap())
        .await
        .unwrap();
    let a = player(&store, "Zara").await;
    let b = player(&store, "Amir").await;
    let c = player(&store, "Carl").await;

    let entries = EntryService::new(store.clone(), store.clone(), Arc::new(MemoryCache::new()));
    for (id, score) in [(a, 100), (b, 100), (c, 50)] {
        entries.submit(Some(&Actor::player(id)), board.id(), score).await.unwrap();
    }

    assert_eq!(entries.get_rank(board.id(), a).await.unwrap(), 2);
    assert_eq!(entries.get_rank(board.id(), b).await.unwrap(), 1);
    assert_eq!(entries.get_rank(board.id(), c).await.unwrap(), 3);
    let top: Vec<Uuid> = entries
        .get_top_n(&board)
        .await
        .unwrap()
        .iter()
        .map(|e| e.player_id)
        .collect();
    assert_eq!(top, vec![b, a]);

    drop(entries);
    drop(store);
    db.cleanup().await.unwrap();
}
