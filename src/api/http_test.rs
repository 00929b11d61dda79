use canvas::doc::ItemId;
use canvas::kind::ItemKind;
use canvas::viewport::Point;

use super::*;

#[test]
fn endpoints_follow_service_routes() {
    let base = "http://localhost:8080";
    assert_eq!(items_url(base), "http://localhost:8080/api/items");
    assert_eq!(item_url(base, 12), "http://localhost:8080/api/items/12");
    assert_eq!(undelete_url(base, 12), "http://localhost:8080/api/items/12/undelete");
    assert_eq!(user_url(base), "http://localhost:8080/auth/user");
}

#[test]
fn client_builds_from_default_config() {
    let api = HttpItemApi::new(&BoardConfig::default()).unwrap();
    assert_eq!(api.base_url(), "http://localhost:8080");
}

#[test]
fn retain_visible_filters_tombstones() {
    let live = Item::new(ItemId::Server(1), ItemKind::StickyNote, Point::new(0.0, 0.0));
    let mut gone = Item::new(ItemId::Server(2), ItemKind::StickyNote, Point::new(0.0, 0.0));
    gone.deleted = true;

    let visible = retain_visible(vec![live.clone(), gone.clone()], false);
    assert_eq!(visible, vec![live.clone()]);

    let all = retain_visible(vec![live, gone], true);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn unreachable_service_is_a_connect_error() {
    let config = BoardConfig {
        api_url: "http://127.0.0.1:9".into(),
        timeouts: crate::config::HttpTimeouts { request_secs: 2, connect_secs: 1 },
        ..BoardConfig::default()
    };
    let api = HttpItemApi::new(&config).unwrap();
    let err = api.list_items(false).await.unwrap_err();
    assert!(matches!(err, ApiError::Connect(_)));
    assert!(err.retryable());
    assert!(err.never_applied());
}
