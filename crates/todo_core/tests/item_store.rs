use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use todo_core::{ItemStore, Task, TaskDraft, TaskStore};

fn checked_flags(tasks: &[Task]) -> Vec<bool> {
    tasks.iter().map(|task| task.is_checked).collect()
}

#[test]
fn insert_publishes_exactly_one_new_unchecked_row() {
    let store = ItemStore::open_in_memory().unwrap();
    store.insert(TaskDraft::new("seed", "existing")).unwrap();
    let mut rx = store.observe_all();
    let before: HashSet<_> = rx.borrow_and_update().iter().map(|task| task.id).collect();

    let draft = TaskDraft::new("Milk", "2 liters");
    let inserted = store.insert(draft.clone()).unwrap();

    assert!(rx.has_changed().unwrap());
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), before.len() + 1);
    let new_rows: Vec<_> = snapshot
        .iter()
        .filter(|task| !before.contains(&task.id))
        .collect();
    assert_eq!(new_rows.len(), 1);
    assert_eq!(new_rows[0], &inserted);
    assert_eq!(new_rows[0].name, draft.name);
    assert_eq!(new_rows[0].detail, draft.detail);
    assert!(!new_rows[0].is_checked);
}

#[test]
fn insert_always_creates_unchecked_rows() {
    let store = ItemStore::open_in_memory().unwrap();
    let draft: TaskDraft =
        serde_json::from_str(r#"{"name":"Milk","detail":"2 liters","is_checked":true}"#).unwrap();

    let inserted = store.insert(draft).unwrap();

    assert!(!inserted.is_checked);
    assert_eq!(store.get(inserted.id).unwrap(), Some(inserted.clone()));
    assert_eq!(store.snapshot(), vec![inserted]);
}

#[test]
fn snapshot_is_ordered_by_insertion() {
    let store = ItemStore::open_in_memory().unwrap();
    let ids: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| store.insert(TaskDraft::new(name, "x")).unwrap().id)
        .collect();

    let snapshot_ids: Vec<_> = store.snapshot().into_iter().map(|task| task.id).collect();
    assert_eq!(snapshot_ids, ids);
}

#[test]
fn double_toggle_restores_checked_flag() {
    let store = ItemStore::open_in_memory().unwrap();
    let original = store.insert(TaskDraft::new("Milk", "2 liters")).unwrap();

    let once = original.toggled();
    store.update(&once).unwrap();
    assert_eq!(store.get(original.id).unwrap(), Some(once.clone()));

    store.update(&once.toggled()).unwrap();
    assert_eq!(store.get(original.id).unwrap(), Some(original));
}

#[test]
fn update_of_vanished_id_is_a_silent_no_op() {
    let store = ItemStore::open_in_memory().unwrap();
    let task = store.insert(TaskDraft::new("Milk", "2 liters")).unwrap();
    store.update(&task.toggled()).unwrap();
    store.delete_where_checked().unwrap();

    store.update(&task).unwrap();
    assert!(store.snapshot().is_empty());
    assert_eq!(store.get(task.id).unwrap(), None);
}

#[test]
fn delete_where_checked_keeps_unchecked_rows_unchanged() {
    let store = ItemStore::open_in_memory().unwrap();
    let mut unchecked = Vec::new();
    for index in 0..6 {
        let task = store
            .insert(TaskDraft::new(format!("task {index}"), "x"))
            .unwrap();
        if index % 2 == 0 {
            store.update(&task.toggled()).unwrap();
        } else {
            unchecked.push(task);
        }
    }

    store.delete_where_checked().unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.iter().all(|task| !task.is_checked));
    assert_eq!(snapshot, unchecked);
}

#[test]
fn delete_where_checked_is_idempotent() {
    let store = ItemStore::open_in_memory().unwrap();
    let keep = store.insert(TaskDraft::new("keep", "x")).unwrap();
    let done = store.insert(TaskDraft::new("done", "x")).unwrap();
    store.update(&done.toggled()).unwrap();

    store.delete_where_checked().unwrap();
    let after_first = store.snapshot();
    store.delete_where_checked().unwrap();
    let after_second = store.snapshot();

    assert_eq!(after_first, vec![keep]);
    assert_eq!(after_first, after_second);
}

#[test]
fn delete_where_checked_on_empty_table_succeeds() {
    let store = ItemStore::open_in_memory().unwrap();
    store.delete_where_checked().unwrap();
    assert!(store.snapshot().is_empty());
}

#[test]
fn milk_and_bread_scenario() {
    let store = ItemStore::open_in_memory().unwrap();
    let mut rx = store.observe_all();

    let milk = store.insert(TaskDraft::new("Milk", "2 liters")).unwrap();
    assert_eq!(checked_flags(&rx.borrow_and_update()), [false]);

    store.update(&milk.toggled()).unwrap();
    assert_eq!(checked_flags(&rx.borrow_and_update()), [true]);

    store.insert(TaskDraft::new("Bread", "1 loaf")).unwrap();
    assert_eq!(rx.borrow_and_update().len(), 2);

    store.delete_where_checked().unwrap();
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Bread");
}

#[test]
fn latest_snapshot_wins_for_slow_subscribers() {
    let store = ItemStore::open_in_memory().unwrap();
    let mut rx = store.observe_all();

    for name in ["a", "b", "c"] {
        store.insert(TaskDraft::new(name, "x")).unwrap();
    }

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 3);
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn every_subscriber_receives_each_mutation() {
    let store = ItemStore::open_in_memory().unwrap();
    let mut first = store.observe_all();
    let mut second = store.observe_all();
    assert_eq!(store.subscriber_count(), 2);

    store.insert(TaskDraft::new("Milk", "2 liters")).unwrap();

    assert_eq!(first.borrow_and_update().len(), 1);
    assert_eq!(second.borrow_and_update().len(), 1);
}

#[test]
fn reopening_file_store_keeps_rows_and_never_reuses_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("item_database.sqlite3");

    let removed = {
        let store = ItemStore::open(&path).unwrap();
        store.insert(TaskDraft::new("Bread", "1 loaf")).unwrap();
        let milk = store.insert(TaskDraft::new("Milk", "2 liters")).unwrap();
        store.update(&milk.toggled()).unwrap();
        store.delete_where_checked().unwrap();
        milk
    };

    let store = ItemStore::open(&path).unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Bread");

    let next = store.insert(TaskDraft::new("Eggs", "12")).unwrap();
    assert!(next.id > removed.id);
}

#[tokio::test]
async fn subscriber_on_another_task_sees_committed_snapshot() {
    let store = Arc::new(ItemStore::open_in_memory().unwrap());
    let mut rx = store.observe_all();

    let waiter = tokio::spawn(async move {
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        snapshot
    });

    let writer = Arc::clone(&store);
    std::thread::spawn(move || {
        writer.insert(TaskDraft::new("Milk", "2 liters")).unwrap();
    })
    .join()
    .unwrap();

    let snapshot = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("subscriber should be notified")
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Milk");
}
