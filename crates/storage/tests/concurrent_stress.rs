//! Concurrent access tests for the in-memory stores.
//!
//! Many course pages may add resources or resolve tickets at once; these
//! tests check that ids stay unique and sessions stay isolated under load.

#![allow(clippy::expect_used, clippy::panic)]

use std::collections::HashSet;

use edusharing_storage::{
    CachedTicket, CourseId, MemoryRecordStore, MemoryTicketSessionStore, NewResourceRecord,
    ResourceRecordStore, TicketSessionStore, UserId,
};
use tokio::task::JoinSet;

/// Number of concurrent tasks.
const CONCURRENCY: usize = 16;

/// Operations per task.
const OPS_PER_TASK: usize = 50;

fn new_record(object_url: &str) -> NewResourceRecord {
    NewResourceRecord::builder().course(CourseId::from(1)).object_url(object_url).build()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_inserts_assign_unique_ids() {
    let store = MemoryRecordStore::new();

    let mut set = JoinSet::new();
    for task_id in 0..CONCURRENCY {
        let store = store.clone();
        set.spawn(async move {
            let mut ids = Vec::with_capacity(OPS_PER_TASK);
            for i in 0..OPS_PER_TASK {
                let url = format!("ccrep://home/node-{task_id}-{i}");
                ids.push(store.insert_record(new_record(&url)).await.expect("insert"));
            }
            ids
        });
    }

    let mut seen = HashSet::new();
    while let Some(result) = set.join_next().await {
        for id in result.expect("task panicked") {
            assert!(seen.insert(id), "id {id} assigned twice");
        }
    }
    assert_eq!(seen.len(), CONCURRENCY * OPS_PER_TASK);
    assert_eq!(store.len(), CONCURRENCY * OPS_PER_TASK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_and_deletes_leave_consistent_rows() {
    let store = MemoryRecordStore::new();
    let mut ids = Vec::new();
    for i in 0..CONCURRENCY {
        let url = format!("ccrep://home/{i}");
        ids.push(store.insert_record(new_record(&url)).await.expect("insert"));
    }

    let mut set = JoinSet::new();
    for (n, id) in ids.iter().copied().enumerate() {
        let store = store.clone();
        set.spawn(async move {
            let mut record = store.get_record(id).await.expect("get").expect("exists");
            if n % 2 == 0 {
                store.delete_record(id).await.expect("delete");
            } else {
                record.usage_id = Some(format!("usage-{n}"));
                store.update_record(&record).await.expect("update");
            }
        });
    }
    while let Some(result) = set.join_next().await {
        result.expect("task panicked");
    }

    let rows = store.snapshot();
    assert_eq!(rows.len(), CONCURRENCY / 2);
    assert!(rows.iter().all(|r| r.is_linked()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_sessions_do_not_cross() {
    let store = MemoryTicketSessionStore::new();

    let mut set = JoinSet::new();
    for task_id in 0..CONCURRENCY {
        let store = store.clone();
        set.spawn(async move {
            let user = UserId::from(i64::try_from(task_id).expect("small id"));
            for i in 0..OPS_PER_TASK {
                let ticket = format!("ticket-{task_id}-{i}");
                store.put(user, CachedTicket::unvalidated(ticket.clone())).await.expect("put");
                let cached = store.get(user).await.expect("get").expect("present");
                assert_eq!(cached.ticket.as_str(), ticket);
            }
        });
    }
    while let Some(result) = set.join_next().await {
        result.expect("task panicked");
    }
}
