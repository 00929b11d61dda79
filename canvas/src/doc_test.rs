#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn make_item(id: i64, x: f64, y: f64) -> Item {
    let mut item = Item::new(ItemId::Server(id), ItemKind::StickyNote, Point::new(x, y));
    item.z_index = id;
    item
}

fn store_with(items: Vec<Item>) -> ItemStore {
    let mut store = ItemStore::new();
    store.load_snapshot(items);
    store
}

// =============================================================
// ItemId
// =============================================================

#[test]
fn pending_ids_are_unique() {
    assert_ne!(ItemId::new_pending(), ItemId::new_pending());
}

#[test]
fn server_accessor() {
    assert_eq!(ItemId::Server(7).server(), Some(7));
    assert_eq!(ItemId::new_pending().server(), None);
    assert!(ItemId::new_pending().is_pending());
    assert!(!ItemId::Server(1).is_pending());
}

#[test]
fn display_formats() {
    assert_eq!(ItemId::Server(42).to_string(), "42");
    assert!(ItemId::new_pending().to_string().starts_with("pending:"));
}

// =============================================================
// ResizeCorner
// =============================================================

#[test]
fn bottom_right_changes_both_dimensions() {
    let size = ResizeCorner::BottomRight.apply(Size::new(180.0, 160.0), Point::new(20.0, -10.0));
    assert_eq!(size, Size::new(200.0, 150.0));
}

#[test]
fn right_changes_width_only() {
    let size = ResizeCorner::Right.apply(Size::new(180.0, 160.0), Point::new(20.0, 99.0));
    assert_eq!(size, Size::new(200.0, 160.0));
}

#[test]
fn bottom_changes_height_only() {
    let size = ResizeCorner::Bottom.apply(Size::new(180.0, 160.0), Point::new(99.0, 40.0));
    assert_eq!(size, Size::new(180.0, 200.0));
}

#[test]
fn resize_clamps_to_floor() {
    let size = ResizeCorner::BottomRight.apply(Size::new(180.0, 160.0), Point::new(-200.0, -200.0));
    assert_eq!(size, Size::new(MIN_ITEM_WIDTH, MIN_ITEM_HEIGHT));
}

#[test]
fn resize_floor_holds_for_any_delta_sequence() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let id = ItemId::Server(1);
    let deltas = [(-500.0, 10.0), (30.0, -900.0), (-1.0, -1.0), (1e9, -1e9), (-1e9, 1e9), (0.5, 0.25)];
    for corner in ResizeCorner::ALL {
        for (dx, dy) in deltas {
            store.resize(&id, corner, Point::new(dx, dy));
            let item = store.get(&id).unwrap();
            assert!(item.width >= MIN_ITEM_WIDTH);
            assert!(item.height >= MIN_ITEM_HEIGHT);
        }
    }
}

#[test]
fn handle_anchors() {
    let item = make_item(1, 10.0, 20.0);
    assert_eq!(ResizeCorner::BottomRight.anchor(&item), Point::new(160.0, 140.0));
    assert_eq!(ResizeCorner::Right.anchor(&item), Point::new(160.0, 80.0));
    assert_eq!(ResizeCorner::Bottom.anchor(&item), Point::new(85.0, 140.0));
}

// =============================================================
// Item
// =============================================================

#[test]
fn new_item_uses_kind_defaults() {
    let item = Item::new(ItemId::Server(1), ItemKind::TodoList, Point::new(5.0, 6.0));
    assert_eq!(item.size(), Size::new(200.0, 200.0));
    assert_eq!(item.position(), Point::new(5.0, 6.0));
    assert!(!item.deleted);
    assert!(item.data.is_object());
}

#[test]
fn contains_is_inclusive_of_edges() {
    let item = make_item(1, 0.0, 0.0);
    assert!(item.contains(Point::new(0.0, 0.0)));
    assert!(item.contains(Point::new(150.0, 120.0)));
    assert!(!item.contains(Point::new(150.1, 60.0)));
}

// =============================================================
// ItemStore: create / insert / snapshot
// =============================================================

#[test]
fn create_returns_pending_item_on_top() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0), make_item(5, 0.0, 0.0)]);
    let item = store.create(ItemKind::Link, Point::new(100.0, 100.0));
    assert!(item.id.is_pending());
    assert_eq!(item.z_index, 6);
    assert_eq!(store.get(&item.id), Some(&item));
}

#[test]
fn create_in_empty_store_starts_at_zero() {
    let mut store = ItemStore::new();
    let item = store.create(ItemKind::StickyNote, Point::new(0.0, 0.0));
    assert_eq!(item.z_index, 0);
}

#[test]
fn insert_normalizes_bad_payload_and_size() {
    let mut store = ItemStore::new();
    let mut item = make_item(1, 0.0, 0.0);
    item.data = json!("not an object");
    item.width = 3.0;
    item.height = -4.0;
    store.insert(item);
    let stored = store.get(&ItemId::Server(1)).unwrap();
    assert_eq!(stored.data, json!({}));
    assert_eq!(stored.width, MIN_ITEM_WIDTH);
    assert_eq!(stored.height, MIN_ITEM_HEIGHT);
}

#[test]
fn insert_replacing_keeps_order() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0), make_item(2, 0.0, 0.0)]);
    store.insert(make_item(1, 50.0, 50.0));
    let ids: Vec<ItemId> = store.all(false).iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![ItemId::Server(1), ItemId::Server(2)]);
    assert_eq!(store.get(&ItemId::Server(1)).unwrap().x, 50.0);
}

#[test]
fn load_snapshot_replaces_contents() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    store.load_snapshot(vec![make_item(2, 0.0, 0.0)]);
    assert!(!store.contains(&ItemId::Server(1)));
    assert!(store.contains(&ItemId::Server(2)));
    assert_eq!(store.len(), 1);
}

// =============================================================
// ItemStore: patch / move / resize
// =============================================================

#[test]
fn patch_data_merges_fields() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let id = ItemId::Server(1);
    assert!(store.patch_data(&id, &json!({ "text": "hello" })));
    let data = &store.get(&id).unwrap().data;
    assert_eq!(data["text"], "hello");
    assert_eq!(data["title"], "New Note");
}

#[test]
fn patch_data_null_removes_key() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let id = ItemId::Server(1);
    assert!(store.patch_data(&id, &json!({ "title": null })));
    assert!(store.get(&id).unwrap().data.get("title").is_none());
}

#[test]
fn patch_data_unchanged_returns_false() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    assert!(!store.patch_data(&ItemId::Server(1), &json!({ "title": "New Note" })));
}

#[test]
fn patch_data_non_object_patch_is_rejected() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    assert!(!store.patch_data(&ItemId::Server(1), &json!([1, 2])));
}

#[test]
fn patch_data_missing_item_is_noop() {
    let mut store = ItemStore::new();
    assert!(!store.patch_data(&ItemId::Server(9), &json!({ "text": "x" })));
    assert!(store.is_empty());
}

#[test]
fn move_item_sets_position() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    assert!(store.move_item(&ItemId::Server(1), 300.0, 250.0));
    assert_eq!(store.get(&ItemId::Server(1)).unwrap().position(), Point::new(300.0, 250.0));
}

#[test]
fn move_missing_item_is_noop() {
    let mut store = ItemStore::new();
    assert!(!store.move_item(&ItemId::Server(1), 1.0, 1.0));
}

#[test]
fn resize_from_uses_base_not_current() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let id = ItemId::Server(1);
    let base = Size::new(150.0, 120.0);
    store.resize_from(&id, ResizeCorner::BottomRight, base, Point::new(10.0, 10.0));
    store.resize_from(&id, ResizeCorner::BottomRight, base, Point::new(20.0, 20.0));
    assert_eq!(store.get(&id).unwrap().size(), Size::new(170.0, 140.0));
}

#[test]
fn resize_missing_item_is_noop() {
    let mut store = ItemStore::new();
    assert!(!store.resize(&ItemId::Server(1), ResizeCorner::Right, Point::new(5.0, 5.0)));
}

// =============================================================
// ItemStore: soft delete / restore
// =============================================================

#[test]
fn soft_deleted_item_hidden_from_all_false() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0), make_item(2, 0.0, 0.0)]);
    assert!(store.soft_delete(&ItemId::Server(1)));
    let visible: Vec<ItemId> = store.all(false).iter().map(|i| i.id).collect();
    let everything: Vec<ItemId> = store.all(true).iter().map(|i| i.id).collect();
    assert_eq!(visible, vec![ItemId::Server(2)]);
    assert_eq!(everything, vec![ItemId::Server(1), ItemId::Server(2)]);
}

#[test]
fn soft_delete_sets_marker_and_restore_clears_it() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let id = ItemId::Server(1);
    store.soft_delete(&id);
    assert!(store.get(&id).unwrap().deleted_at.is_some());
    assert!(store.restore(&id));
    let item = store.get(&id).unwrap();
    assert!(!item.deleted);
    assert!(item.deleted_at.is_none());
    assert_eq!(store.all(false).len(), 1);
}

#[test]
fn double_delete_and_double_restore_report_no_change() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let id = ItemId::Server(1);
    assert!(!store.restore(&id));
    assert!(store.soft_delete(&id));
    assert!(!store.soft_delete(&id));
}

#[test]
fn delete_and_restore_missing_are_noops() {
    let mut store = ItemStore::new();
    assert!(!store.soft_delete(&ItemId::Server(3)));
    assert!(!store.restore(&ItemId::Server(3)));
}

// =============================================================
// ItemStore: overwrite / confirm
// =============================================================

#[test]
fn overwrite_restores_fields_but_not_tombstone() {
    let original = make_item(1, 10.0, 20.0);
    let mut store = store_with(vec![original.clone()]);
    let id = ItemId::Server(1);
    store.move_item(&id, 500.0, 500.0);
    store.patch_data(&id, &json!({ "text": "changed" }));
    store.soft_delete(&id);
    assert!(store.overwrite(&original));
    let item = store.get(&id).unwrap();
    assert_eq!(item.position(), Point::new(10.0, 20.0));
    assert_eq!(item.data, original.data);
    assert!(item.deleted);
}

#[test]
fn overwrite_missing_is_noop() {
    let mut store = ItemStore::new();
    assert!(!store.overwrite(&make_item(1, 0.0, 0.0)));
}

#[test]
fn confirm_rekeys_with_server_fields() {
    let mut store = store_with(vec![make_item(1, 0.0, 0.0)]);
    let pending = store.create(ItemKind::StickyNote, Point::new(100.0, 100.0));
    let mut confirmed = pending.clone();
    confirmed.id = ItemId::Server(77);
    confirmed.x = 101.0;
    assert!(store.confirm(&pending.id, confirmed, false));
    assert!(!store.contains(&pending.id));
    let item = store.get(&ItemId::Server(77)).unwrap();
    assert_eq!(item.x, 101.0);
    let ids: Vec<ItemId> = store.all(false).iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![ItemId::Server(1), ItemId::Server(77)]);
}

#[test]
fn confirm_keep_local_only_changes_id() {
    let mut store = ItemStore::new();
    let pending = store.create(ItemKind::StickyNote, Point::new(100.0, 100.0));
    store.move_item(&pending.id, 300.0, 250.0);
    let mut confirmed = pending.clone();
    confirmed.id = ItemId::Server(5);
    assert!(store.confirm(&pending.id, confirmed, true));
    assert_eq!(store.get(&ItemId::Server(5)).unwrap().position(), Point::new(300.0, 250.0));
    assert_eq!(store.len(), 1);
}

#[test]
fn confirm_missing_pending_is_noop() {
    let mut store = ItemStore::new();
    assert!(!store.confirm(&ItemId::new_pending(), make_item(1, 0.0, 0.0), false));
    assert!(store.is_empty());
}

// =============================================================
// ItemStore: ordering
// =============================================================

#[test]
fn sorted_items_orders_by_z_then_insertion() {
    let mut a = make_item(1, 0.0, 0.0);
    a.z_index = 5;
    let mut b = make_item(2, 0.0, 0.0);
    b.z_index = 1;
    let mut c = make_item(3, 0.0, 0.0);
    c.z_index = 1;
    let store = store_with(vec![a, b, c]);
    let ids: Vec<ItemId> = store.sorted_items().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![ItemId::Server(2), ItemId::Server(3), ItemId::Server(1)]);
}

#[test]
fn all_is_restartable() {
    let store = store_with(vec![make_item(1, 0.0, 0.0), make_item(2, 0.0, 0.0)]);
    assert_eq!(store.all(false), store.all(false));
}
