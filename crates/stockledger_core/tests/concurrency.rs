use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use stockledger_core::{Inventory, LedgerError, Movement, MovementRequest, MovementType};
use uuid::Uuid;

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Opens a second connection that holds the write lock until dropped or
/// committed.
fn hold_write_lock(path: &Path) -> Connection {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch("BEGIN IMMEDIATE;").unwrap();
    conn
}

fn seeded_database(stock: i64) -> (tempfile::TempDir, PathBuf, Uuid) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock.sqlite3");
    let mut inventory = Inventory::open(&path).unwrap();
    let item = inventory.create_item("Widget", "pcs", 1).unwrap();
    if stock > 0 {
        inventory
            .record_movement(&MovementRequest::new(
                item.id,
                MovementType::In,
                stock,
                "Receiving",
            ))
            .unwrap();
    }
    inventory.close().unwrap();
    (dir, path, item.id)
}

fn spawn_writers(
    path: &Path,
    writers: usize,
    request: MovementRequest,
) -> Vec<Result<i64, LedgerError>> {
    let barrier = Arc::new(Barrier::new(writers));
    let handles: Vec<_> = (0..writers)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.to_path_buf();
            let request = request.clone();
            thread::spawn(move || {
                // All writers start at once; allow extra attempts.
                let mut inventory = Inventory::open(&path)
                    .unwrap()
                    .with_max_conflict_attempts(10);
                barrier.wait();
                inventory
                    .record_movement(&request)
                    .map(|applied| applied.item.current_stock)
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn competing_issues_of_the_last_units_let_exactly_one_win() {
    let quantity = 7;
    let (_dir, path, item_id) = seeded_database(quantity);

    let results = spawn_writers(
        &path,
        2,
        MovementRequest::new(item_id, MovementType::Out, quantity, "Dispatch"),
    );

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let insufficient = results
        .iter()
        .filter(|result| {
            matches!(
                result,
                Err(LedgerError::InsufficientStock {
                    requested: 7,
                    available: 0,
                    ..
                })
            )
        })
        .count();
    assert_eq!(successes, 1, "results: {results:?}");
    assert_eq!(insufficient, 1, "results: {results:?}");

    let inventory = Inventory::open(&path).unwrap();
    assert_eq!(inventory.get_item(item_id).unwrap().current_stock, 0);
    assert_eq!(inventory.movements_for_item(item_id).unwrap().len(), 2);
}

#[test]
fn parallel_receipts_lose_no_updates() {
    let writers = 8;
    let (_dir, path, item_id) = seeded_database(0);

    let results = spawn_writers(
        &path,
        writers,
        MovementRequest::new(item_id, MovementType::In, 5, "Receiving"),
    );
    assert!(results.iter().all(Result::is_ok), "results: {results:?}");

    let mut observed: Vec<i64> = results.into_iter().map(Result::unwrap).collect();
    observed.sort_unstable();
    let expected: Vec<i64> = (1..=writers as i64).map(|n| n * 5).collect();
    assert_eq!(observed, expected);

    let inventory = Inventory::open(&path).unwrap();
    let history = inventory.movements_for_item(item_id).unwrap();
    let stock = inventory.get_item(item_id).unwrap().current_stock;
    assert_eq!(stock, 40);
    assert_eq!(
        history.iter().map(Movement::signed_quantity).sum::<i64>(),
        stock
    );
}

#[test]
fn writes_to_different_items_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock.sqlite3");
    let setup = Inventory::open(&path).unwrap();
    let item_ids: Vec<Uuid> = (0..4)
        .map(|n| setup.create_item(&format!("Item {n}"), "pcs", 0).unwrap().id)
        .collect();
    setup.close().unwrap();

    let handles: Vec<_> = item_ids
        .iter()
        .map(|&item_id| {
            let path = path.clone();
            thread::spawn(move || {
                let mut inventory = Inventory::open(&path)
                    .unwrap()
                    .with_max_conflict_attempts(10);
                for _ in 0..10 {
                    inventory
                        .record_movement(&MovementRequest::new(
                            item_id,
                            MovementType::In,
                            2,
                            "Receiving",
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let inventory = Inventory::open(&path).unwrap();
    for item_id in item_ids {
        assert_eq!(inventory.get_item(item_id).unwrap().current_stock, 20);
    }
    assert_eq!(inventory.summary().unwrap().total_stock, 80);
}

#[test]
fn queued_writers_stamp_movements_after_acquiring_the_lock() {
    let (_dir, path, item_id) = seeded_database(0);
    let blocker = hold_write_lock(&path);

    let handles: Vec<_> = ["First", "Second"]
        .into_iter()
        .map(|person| {
            let path = path.clone();
            let handle = thread::spawn(move || {
                let mut inventory = Inventory::open(&path).unwrap();
                inventory
                    .record_movement(&MovementRequest::new(
                        item_id,
                        MovementType::In,
                        1,
                        person,
                    ))
                    .unwrap()
            });
            thread::sleep(Duration::from_millis(300));
            handle
        })
        .collect();

    thread::sleep(Duration::from_millis(300));
    let released_at = epoch_ms();
    blocker.execute_batch("COMMIT;").unwrap();
    let applied: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for entry in &applied {
        assert!(
            entry.movement.created_at >= released_at,
            "created_at={} released_at={released_at}",
            entry.movement.created_at
        );
    }

    let inventory = Inventory::open(&path).unwrap();
    let history = inventory.movements_for_item(item_id).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].created_at <= history[1].created_at);

    let item = inventory.get_item(item_id).unwrap();
    assert_eq!(item.current_stock, 2);
    assert_eq!(item.last_updated, history[1].created_at);

    let recent = inventory.list_recent_movements(2).unwrap();
    assert_eq!(recent[0].id, history[1].id);
}

#[test]
fn lock_held_past_busy_timeout_surfaces_as_conflict() {
    let (_dir, path, item_id) = seeded_database(3);
    let mut inventory = Inventory::open(&path)
        .unwrap()
        .with_max_conflict_attempts(1);
    let blocker = hold_write_lock(&path);

    let err = inventory
        .record_movement(&MovementRequest::new(
            item_id,
            MovementType::Out,
            1,
            "Dispatch",
        ))
        .unwrap_err();
    assert!(
        matches!(err, LedgerError::Conflict { attempts: 1, item_id: id } if id == item_id),
        "err: {err:?}"
    );

    blocker.execute_batch("ROLLBACK;").unwrap();
    assert_eq!(inventory.get_item(item_id).unwrap().current_stock, 3);
    assert_eq!(inventory.movements_for_item(item_id).unwrap().len(), 1);
}
