use serde_json::json;

use super::*;
use crate::kind::ItemKind;

// =============================================================
// Tool / Modifiers / Key
// =============================================================

#[test]
fn default_tool_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn command_modifier_accepts_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.command());
}

#[test]
fn key_comparison_ignores_case() {
    assert!(Key("Z".into()).is("z"));
    assert!(Key("Escape".into()).is("escape"));
    assert!(!Key("Enter".into()).is("Escape"));
}

// =============================================================
// PointerTarget
// =============================================================

#[test]
fn miss_is_canvas() {
    assert_eq!(PointerTarget::from_hit(None), PointerTarget::Canvas);
}

#[test]
fn body_hit_is_item() {
    let id = ItemId::Server(3);
    let target = PointerTarget::from_hit(Some(Hit { item_id: id, part: HitPart::Body }));
    assert_eq!(target, PointerTarget::Item(id));
}

#[test]
fn handle_hit_is_handle() {
    let id = ItemId::Server(3);
    let target = PointerTarget::from_hit(Some(Hit { item_id: id, part: HitPart::ResizeHandle(ResizeCorner::Bottom) }));
    assert_eq!(target, PointerTarget::Handle(id, ResizeCorner::Bottom));
}

// =============================================================
// BoardSession
// =============================================================

#[test]
fn session_default_is_empty() {
    let session = BoardSession::default();
    assert_eq!(session.tool, Tool::Select);
    assert!(session.selected_id.is_none());
    assert!(session.edit.is_none());
}

#[test]
fn session_remap_updates_selection_and_draft() {
    let old = ItemId::new_pending();
    let new = ItemId::Server(10);
    let mut session = BoardSession {
        tool: Tool::Select,
        selected_id: Some(old),
        edit: Some(EditDraft { id: old, patch: json!({}) }),
    };
    session.remap(&old, new);
    assert_eq!(session.selected_id, Some(new));
    assert_eq!(session.edit.as_ref().map(|e| e.id), Some(new));
}

#[test]
fn session_remap_ignores_other_ids() {
    let mut session = BoardSession { selected_id: Some(ItemId::Server(1)), ..Default::default() };
    session.remap(&ItemId::Server(2), ItemId::Server(3));
    assert_eq!(session.selected_id, Some(ItemId::Server(1)));
}

// =============================================================
// GestureState
// =============================================================

#[test]
fn default_gesture_is_idle() {
    assert!(matches!(GestureState::default(), GestureState::Idle));
    assert!(!GestureState::Idle.is_active());
}

#[test]
fn editing_is_not_an_active_pointer_session() {
    assert!(!GestureState::Editing { id: ItemId::Server(1) }.is_active());
    assert!(GestureState::Panning { last_screen: Point::new(0.0, 0.0) }.is_active());
    assert!(GestureState::FreehandDrawing { points: Vec::new() }.is_active());
}

#[test]
fn gesture_remap_rewrites_drag_target_and_pre_image() {
    let old = ItemId::new_pending();
    let item = Item::new(old, ItemKind::StickyNote, Point::new(0.0, 0.0));
    let mut state = GestureState::DraggingItem {
        id: old,
        start_screen: Point::new(0.0, 0.0),
        pre_image: Box::new(item),
        moved: false,
    };
    state.remap(&old, ItemId::Server(4));
    let GestureState::DraggingItem { id, pre_image, .. } = state else {
        panic!("expected DraggingItem");
    };
    assert_eq!(id, ItemId::Server(4));
    assert_eq!(pre_image.id, ItemId::Server(4));
}
