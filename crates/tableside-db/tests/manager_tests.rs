//! End-to-end scenarios for the table-session manager.
//!
//! Single-caller scenarios run against an in-memory database. Concurrency
//! scenarios need several connections, so they use a file-backed database in
//! a temporary directory.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use tableside_core::{ErrorKind, TableStatus};
use tableside_db::{Database, DbConfig, TableSessionManager};
use tempfile::TempDir;

async fn in_memory_manager() -> TableSessionManager {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    TableSessionManager::new(db)
}

async fn file_manager(dir: &TempDir) -> TableSessionManager {
    let config = DbConfig::new(dir.path().join("tableside.db")).max_connections(8);
    let db = Database::new(config).await.unwrap();
    TableSessionManager::new(db)
}

#[tokio::test]
async fn scenario_t1_resolve_reuse_deactivate_resolve() {
    let manager = in_memory_manager().await;
    manager
        .database()
        .tables()
        .create_with_code(5, "abc123")
        .await
        .unwrap();

    let s1 = manager.resolve_session_for_code("abc123").await.unwrap();
    assert_eq!(s1.table.number, 5);
    assert_eq!(s1.table.status, TableStatus::Occupied);

    let again = manager.resolve_session_for_code("abc123").await.unwrap();
    assert_eq!(again.session.id, s1.session.id);

    manager.deactivate_session(&s1.session.id).await.unwrap();

    let s2 = manager.resolve_session_for_code("abc123").await.unwrap();
    assert_ne!(s2.session.id, s1.session.id);
    assert!(s2.table.is_bound_to(&s2.session.id));
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let manager = in_memory_manager().await;
    manager.create_table(1).await.unwrap();

    let err = manager.resolve_session_for_code("zzz").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn expired_session_is_never_reused() {
    let manager = in_memory_manager().await;
    let table = manager.create_table(3).await.unwrap();

    let first = manager.resolve_session_for_code(&table.code).await.unwrap();

    sqlx::query("UPDATE sessions SET expires_at = ?2 WHERE id = ?1")
        .bind(&first.session.id)
        .bind(Utc::now() - Duration::seconds(1))
        .execute(manager.database().pool())
        .await
        .unwrap();

    let err = manager
        .get_live_session(&first.session.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Expired));

    let second = manager.resolve_session_for_code(&table.code).await.unwrap();
    assert_ne!(second.session.id, first.session.id);
    assert!(second.session.is_valid_at(Utc::now()));
}

#[tokio::test]
async fn cleaning_then_resolve_occupies_with_new_session() {
    let manager = in_memory_manager().await;
    let table = manager.create_table(4).await.unwrap();
    let first = manager.resolve_session_for_code(&table.code).await.unwrap();

    let cleaning = manager
        .set_table_status(table.id, TableStatus::Cleaning, None)
        .await
        .unwrap();
    assert_eq!(cleaning.status, TableStatus::Cleaning);

    let second = manager.resolve_session_for_code(&table.code).await.unwrap();
    assert_eq!(second.table.status, TableStatus::Occupied);
    assert_ne!(second.session.id, first.session.id);

    // Staff finish the cycle.
    let available = manager
        .set_table_status(table.id, "available".parse().unwrap(), None)
        .await
        .unwrap();
    assert_eq!(available.status, TableStatus::Available);
    assert_eq!(available.active_session_id, None);
}

#[tokio::test]
async fn occupy_with_other_tables_session_is_rejected() {
    let manager = in_memory_manager().await;
    let t1 = manager.create_table(1).await.unwrap();
    let t2 = manager.create_table(2).await.unwrap();
    let s2 = manager.resolve_session_for_code(&t2.code).await.unwrap();

    let err = manager
        .set_table_status(t1.id, TableStatus::Occupied, Some(&s2.session.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidTransition));
}

#[test]
fn unrecognized_status_string_is_invalid_transition() {
    let err = "closed".parse::<TableStatus>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolves_share_one_session() {
    let dir = TempDir::new().unwrap();
    let manager = file_manager(&dir).await;
    let table = manager.create_table(9).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let manager = manager.clone();
        let code = table.code.clone();
        handles.push(tokio::spawn(async move {
            manager.resolve_session_for_code(&code).await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let resolved = handle.await.unwrap().unwrap();
        ids.insert(resolved.session.id);
    }
    assert_eq!(ids.len(), 1, "all scans must see the same session");

    let live = manager
        .database()
        .sessions()
        .count_live_for_table(table.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(live, 1);

    let stored = manager.get_table(table.id).await.unwrap();
    assert!(ids.contains(stored.active_session_id.as_deref().unwrap()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn staff_and_scans_race_keeps_one_live_session() {
    let dir = TempDir::new().unwrap();
    let manager = file_manager(&dir).await;
    let table = manager.create_table(10).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let manager = manager.clone();
        let code = table.code.clone();
        let table_id = table.id;
        handles.push(tokio::spawn(async move {
            if i % 5 == 0 {
                manager
                    .set_table_status(table_id, TableStatus::Cleaning, None)
                    .await
                    .map(|_| ())
            } else {
                manager.resolve_session_for_code(&code).await.map(|_| ())
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let now = Utc::now();
    let live = manager
        .database()
        .sessions()
        .count_live_for_table(table.id, now)
        .await
        .unwrap();
    assert!(live <= 1);

    let stored = manager.get_table(table.id).await.unwrap();
    match stored.bound_session_id() {
        Some(id) => {
            assert_eq!(live, 1);
            assert!(manager.get_live_session(id).await.is_ok());
        }
        None => assert_eq!(live, 0),
    }
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let (code, session_id) = {
        let manager = file_manager(&dir).await;
        let table = manager.create_table(1).await.unwrap();
        let resolved = manager.resolve_session_for_code(&table.code).await.unwrap();
        manager.database().close().await;
        (table.code, resolved.session.id)
    };

    let manager = file_manager(&dir).await;
    let resolved = manager.resolve_session_for_code(&code).await.unwrap();
    assert_eq!(resolved.session.id, session_id);
}
