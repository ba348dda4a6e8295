use stockledger_core::{
    AlertTier, Inventory, LedgerError, Movement, MovementRequest, MovementType, ValidationError,
};
use uuid::Uuid;

fn signed_sum(movements: &[Movement]) -> i64 {
    movements.iter().map(Movement::signed_quantity).sum()
}

fn receive(inventory: &mut Inventory, item_id: Uuid, quantity: i64) -> i64 {
    inventory
        .record_movement(&MovementRequest::new(
            item_id,
            MovementType::In,
            quantity,
            "Receiving",
        ))
        .unwrap()
        .item
        .current_stock
}

fn issue(inventory: &mut Inventory, item_id: Uuid, quantity: i64) -> Result<i64, LedgerError> {
    inventory
        .record_movement(&MovementRequest::new(
            item_id,
            MovementType::Out,
            quantity,
            "Dispatch",
        ))
        .map(|applied| applied.item.current_stock)
}

#[test]
fn widget_scenario_end_to_end() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let widget = inventory.create_item("Widget", "pcs", 5).unwrap();
    assert_eq!(widget.current_stock, 0);

    assert_eq!(receive(&mut inventory, widget.id, 20), 20);
    assert_eq!(
        inventory.get_item(widget.id).unwrap().alert_tier(),
        AlertTier::Healthy
    );

    assert_eq!(issue(&mut inventory, widget.id, 16).unwrap(), 4);
    assert_eq!(
        inventory.get_item(widget.id).unwrap().alert_tier(),
        AlertTier::Low
    );

    let err = issue(&mut inventory, widget.id, 10).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientStock {
            requested: 10,
            available: 4,
            ..
        }
    ));
    assert_eq!(inventory.get_item(widget.id).unwrap().current_stock, 4);
}

#[test]
fn stock_equals_signed_sum_of_movements() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let item = inventory.create_item("Cable", "m", 0).unwrap();

    receive(&mut inventory, item.id, 30);
    issue(&mut inventory, item.id, 7).unwrap();
    receive(&mut inventory, item.id, 2);
    issue(&mut inventory, item.id, 25).unwrap();
    assert!(matches!(
        issue(&mut inventory, item.id, 1_000),
        Err(LedgerError::InsufficientStock {
            requested: 1_000,
            available: 0,
            ..
        })
    ));
    receive(&mut inventory, item.id, 11);

    let history = inventory.movements_for_item(item.id).unwrap();
    let stock = inventory.get_item(item.id).unwrap().current_stock;

    assert_eq!(history.len(), 5);
    assert_eq!(stock, 11);
    assert_eq!(signed_sum(&history), stock);
    assert_eq!(
        history.iter().map(|movement| movement.kind).collect::<Vec<_>>(),
        [
            MovementType::In,
            MovementType::Out,
            MovementType::In,
            MovementType::Out,
            MovementType::In,
        ]
    );
}

#[test]
fn out_may_empty_stock_exactly() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let item = inventory.create_item("Gloves", "pair", 2).unwrap();
    receive(&mut inventory, item.id, 6);

    assert_eq!(issue(&mut inventory, item.id, 6).unwrap(), 0);
    assert!(matches!(
        issue(&mut inventory, item.id, 1),
        Err(LedgerError::InsufficientStock { available: 0, .. })
    ));
}

#[test]
fn rejected_movements_leave_no_trace() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let item = inventory.create_item("Widget", "pcs", 5).unwrap();
    receive(&mut inventory, item.id, 3);
    let before = inventory.get_item(item.id).unwrap();

    let insufficient = issue(&mut inventory, item.id, 4).unwrap_err();
    assert!(matches!(insufficient, LedgerError::InsufficientStock { .. }));

    let zero = inventory
        .record_movement(&MovementRequest::new(item.id, MovementType::In, 0, "Ana"))
        .unwrap_err();
    assert!(matches!(
        zero,
        LedgerError::Validation(ValidationError::NonPositiveQuantity(0))
    ));

    let nobody = inventory
        .record_movement(&MovementRequest::new(item.id, MovementType::In, 2, "  "))
        .unwrap_err();
    assert!(matches!(
        nobody,
        LedgerError::Validation(ValidationError::EmptyResponsiblePerson)
    ));

    let after = inventory.get_item(item.id).unwrap();
    assert_eq!(after.current_stock, before.current_stock);
    assert_eq!(after.last_updated, before.last_updated);
    assert_eq!(inventory.movements_for_item(item.id).unwrap().len(), 1);
}

#[test]
fn unknown_item_is_not_found_and_records_nothing() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = inventory
        .record_movement(&MovementRequest::new(missing, MovementType::In, 1, "Ana"))
        .unwrap_err();

    assert!(matches!(err, LedgerError::NotFound(id) if id == missing));
    assert!(inventory.list_recent_movements(10).unwrap().is_empty());
}

#[test]
fn overflowing_receipt_is_a_validation_error() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let item = inventory.create_item("Grains", "g", 0).unwrap();
    receive(&mut inventory, item.id, i64::MAX);

    let err = inventory
        .record_movement(&MovementRequest::new(item.id, MovementType::In, 1, "Ana"))
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::StockOverflow { .. })
    ));
    assert_eq!(inventory.get_item(item.id).unwrap().current_stock, i64::MAX);
}

#[test]
fn recorded_movement_snapshots_item_and_metadata() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let item = inventory.create_item("Widget", "pcs", 5).unwrap();

    let applied = inventory
        .record_movement(
            &MovementRequest::new(item.id, MovementType::In, 12, " Charyl ")
                .with_request_code(" RFQ-2002CORE-25-004275 ")
                .with_remarks("   "),
        )
        .unwrap();

    let movement = &applied.movement;
    assert_eq!(movement.item_id, item.id);
    assert_eq!(movement.item_name, "Widget");
    assert_eq!(movement.quantity, 12);
    assert_eq!(movement.kind, MovementType::In);
    assert_eq!(movement.request_code.as_deref(), Some("RFQ-2002CORE-25-004275"));
    assert_eq!(movement.responsible_person, "Charyl");
    assert_eq!(movement.remarks, None);
    assert_eq!(applied.item.last_updated, movement.created_at);

    let stored = inventory.get_item(item.id).unwrap();
    assert_eq!(stored, applied.item);
    assert_eq!(inventory.list_recent_movements(1).unwrap(), [movement.clone()]);
}

#[test]
fn recent_movements_are_newest_first_and_truncated() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let bolts = inventory.create_item("Bolts", "pcs", 0).unwrap();
    let nuts = inventory.create_item("Nuts", "pcs", 0).unwrap();

    receive(&mut inventory, bolts.id, 1);
    receive(&mut inventory, nuts.id, 2);
    receive(&mut inventory, bolts.id, 3);
    issue(&mut inventory, nuts.id, 2).unwrap();

    let recent = inventory.list_recent_movements(3).unwrap();
    let shape: Vec<_> = recent
        .iter()
        .map(|movement| (movement.item_name.as_str(), movement.signed_quantity()))
        .collect();
    assert_eq!(shape, [("Nuts", -2), ("Bolts", 3), ("Nuts", 2)]);

    assert_eq!(inventory.list_recent_movements(50).unwrap().len(), 4);
    assert!(inventory.list_recent_movements(0).unwrap().is_empty());
}

#[test]
fn history_of_deleted_item_stays_readable() {
    let mut inventory = Inventory::open_in_memory().unwrap();
    let item = inventory.create_item("Widget", "pcs", 5).unwrap();
    receive(&mut inventory, item.id, 8);
    issue(&mut inventory, item.id, 3).unwrap();

    inventory.delete_item(item.id).unwrap();

    let history = inventory.movements_for_item(item.id).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|movement| movement.item_name == "Widget"));
    assert_eq!(inventory.list_recent_movements(10).unwrap().len(), 2);

    let err = issue(&mut inventory, item.id, 1).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[test]
fn file_backed_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock.sqlite3");

    let mut inventory = Inventory::open(&path).unwrap();
    let item = inventory.create_item("Widget", "pcs", 5).unwrap();
    receive(&mut inventory, item.id, 9);
    inventory.close().unwrap();

    let reopened = Inventory::open(&path).unwrap();
    assert_eq!(reopened.get_item(item.id).unwrap().current_stock, 9);
    assert_eq!(reopened.movements_for_item(item.id).unwrap().len(), 1);
}
