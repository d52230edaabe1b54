//! Full session recovery episodes

use crate::support::{blob, flow_over, page, store_with_config, FlakyStore, COLLECTION};
use login_flow::storage::StorageError;
use login_flow::{
    ConfigStore, FetchQueue, LoginFlow, LoginFlowError, OutputStore, Page, SessionOutcome,
    SqliteStore,
};
use serde_json::{json, Map};
use std::sync::Arc;

fn failed_page(gid: &str, cookie: &str) -> Page {
    page(json!({
        "gid": gid,
        "url": format!("https://example.com/{}", gid),
        "status": "fetching_failed",
        "response_status_code": 302,
        "total_requests": 2,
        "headers": {"Cookie": cookie},
        "vars": {"login_flow_cookie": cookie, "category": "books"}
    }))
}

fn login_page() -> Page {
    page(json!({"url": "https://example.com/login", "page_type": "login"}))
}

#[test]
fn test_stale_current_cookie_is_held() {
    let store = store_with_config(json!({"expired": false, "cookie": "s=AAA"}));
    let mut flow = flow_over(store.clone(), 100);
    let mut queue: Vec<Page> = Vec::new();

    let outcome = flow
        .fix_session(&failed_page("orders", "s=AAA"), &mut queue)
        .expect("fix_session failed");

    assert_eq!(
        outcome,
        SessionOutcome::Held {
            gid: "orders".to_string()
        }
    );
    assert!(queue.is_empty());
    assert!(flow.is_expired().unwrap());

    let held = store.find_output(COLLECTION, "orders").unwrap().unwrap();
    assert_eq!(held.get("fetched"), Some(&json!("0")));
}

#[test]
fn test_outdated_cookie_is_refetched() {
    let store = store_with_config(json!({"expired": false, "cookie": "s=BBB"}));
    let mut flow = flow_over(store.clone(), 100);
    let mut queue: Vec<Page> = Vec::new();

    let outcome = flow
        .fix_session(&failed_page("orders", "s=AAA"), &mut queue)
        .expect("fix_session failed");

    assert_eq!(outcome, SessionOutcome::Refetched);
    assert!(!flow.is_expired().unwrap());
    assert_eq!(store.count_outputs(COLLECTION, &Map::new()).unwrap(), 0);

    assert_eq!(queue.len(), 1);
    assert_eq!(
        queue[0].clone().into_value(),
        json!({
            "url": "https://example.com/orders",
            "cookie": "s=BBB",
            "headers": {"Cookie": "s=BBB"},
            "vars": {"login_flow_cookie": "s=BBB", "category": "books"}
        })
    );
}

#[test]
fn test_full_episode() {
    let store = store_with_config(json!({"expired": false, "cookie": "s=AAA"}));
    let mut flow = flow_over(store.clone(), 2);
    let mut queue: Vec<Page> = Vec::new();

    // First failure detects the stale cookie and triggers a login
    for gid in ["a", "b", "c"] {
        flow.fix_session_with(&failed_page(gid, "s=AAA"), &mut queue, |queue| {
            Ok(queue.enqueue(&[login_page()])?)
        })
        .expect("fix_session failed");
    }
    assert_eq!(queue.len(), 3);
    assert!(queue.iter().all(|p| p.get("page_type") == Some(&json!("login"))));
    assert_eq!(flow.pending_count().unwrap(), 3);
    queue.clear();

    // The host logs in again and stores the new cookie
    flow.renew_session(json!("s=NEW")).expect("renew failed");

    let report = flow.restore_held_pages(&mut queue).expect("restore failed");
    assert_eq!(report.restored, 3);
    assert_eq!(report.batches, 2);
    assert_eq!(flow.pending_count().unwrap(), 0);

    for restored in &queue {
        assert_eq!(restored.var("login_flow_cookie"), Some(&json!("s=NEW")));
        assert_eq!(restored.var("category"), Some(&json!("books")));
        assert_eq!(restored.get("headers"), Some(&json!({"Cookie": "s=NEW"})));
        assert!(!restored.contains_key("gid"));
        assert!(!restored.contains_key("status"));
        assert!(!restored.contains_key("total_requests"));
    }
    queue.clear();

    // A late failure that still carries the old cookie is repaired directly
    let outcome = flow
        .fix_session(&failed_page("d", "s=AAA"), &mut queue)
        .expect("fix_session failed");
    assert_eq!(outcome, SessionOutcome::Refetched);
    assert_eq!(queue[0].var("login_flow_cookie"), Some(&json!("s=NEW")));

    // History is retained
    assert_eq!(store.count_outputs(COLLECTION, &Map::new()).unwrap(), 3);
}

#[test]
fn test_keep_response_keys_on_hold() {
    let store = store_with_config(json!({"expired": true, "cookie": "s=AAA"}));
    let mut flow = LoginFlow::builder()
        .store(store.clone())
        .keep_response_keys(true)
        .build()
        .expect("Failed to build flow");
    let mut queue: Vec<Page> = Vec::new();

    flow.fix_session(&failed_page("orders", "s=AAA"), &mut queue)
        .expect("fix_session failed");

    let held = store.find_output(COLLECTION, "orders").unwrap().unwrap();
    let held_page = held.get("page").unwrap();
    assert_eq!(held_page.get("status"), Some(&json!("fetching_failed")));
    assert_eq!(held_page.get("gid"), Some(&json!("orders")));
}

#[test]
fn test_custom_collection_and_keys() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    store
        .save_config("shop_login", &blob(json!({"expired": false, "cookie": "sid=1"})))
        .unwrap();
    let mut flow = LoginFlow::builder()
        .store(store.clone())
        .collection("shop_held")
        .config_key("shop_login")
        .vars_key("shop_cookie")
        .build()
        .expect("Failed to build flow");
    let mut queue: Vec<Page> = Vec::new();
    let failed = page(json!({"gid": "p1", "vars": {"shop_cookie": "sid=1"}}));

    flow.fix_session(&failed, &mut queue).expect("fix_session failed");

    assert!(store.find_output("shop_held", "p1").unwrap().is_some());
    assert_eq!(store.count_outputs(COLLECTION, &Map::new()).unwrap(), 0);
    let config = store.find_config("shop_login").unwrap().unwrap();
    assert_eq!(config.get("expired"), Some(&json!(true)));
}

#[test]
fn test_restore_into_sqlite_fetch_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("login_flow.db");

    let store = Arc::new(SqliteStore::new(&path).unwrap());
    store
        .save_config("login_flow", &blob(json!({"expired": true, "cookie": "s=AAA"})))
        .unwrap();
    let mut flow = flow_over(store, 100);
    let mut scratch: Vec<Page> = Vec::new();
    flow.fix_session(&failed_page("a", "s=AAA"), &mut scratch)
        .expect("fix_session failed");
    flow.renew_session(json!("s=BBB")).unwrap();

    let mut queue = SqliteStore::new(&path).unwrap();
    flow.restore_held_pages(&mut queue).expect("restore failed");

    let queued = queue.queued_pages().unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].var("login_flow_cookie"), Some(&json!("s=BBB")));
}

#[test]
fn test_failed_hold_write_is_returned_without_login() {
    let inner = SqliteStore::new_in_memory().unwrap();
    inner
        .save_config("login_flow", &blob(json!({"expired": true, "cookie": "s=AAA"})))
        .unwrap();
    let store = Arc::new(FlakyStore::new(inner));
    store.fail_saves.set(true);
    let mut flow = flow_over(store.clone(), 100);
    let mut queue: Vec<Page> = Vec::new();

    let result = flow.fix_session_with(&failed_page("a", "s=AAA"), &mut queue, |queue| {
        Ok(queue.enqueue(&[login_page()])?)
    });

    assert!(matches!(
        result,
        Err(LoginFlowError::Store(StorageError::Sqlite(_)))
    ));
    assert!(queue.is_empty());
    assert_eq!(store.count_outputs(COLLECTION, &Map::new()).unwrap(), 0);
}
