mod common;

use common::{harness, listing, manager_with_store, raw_event, FlakyTransientStore};
use eventbrite_api::common::constants::{EVENT_DETAILS, EVENT_SEARCH, USER_OWNED_EVENTS};
use eventbrite_api::common::types::Pagination;
use eventbrite_api::query::{EventQuery, QueryVars};
use eventbrite_api::template;
use std::sync::Arc;

fn ids(posts: &[eventbrite_api::common::types::NormalizedEvent]) -> Vec<String> {
    posts.iter().map(|e| e.id.clone()).collect()
}

#[tokio::test]
async fn test_small_listing_end_to_end() {
    let h = harness();
    h.caller.respond(EVENT_SEARCH, listing(1, 3, 3));
    let query = EventQuery::new(h.manager.clone());

    let state = query
        .get_records(QueryVars {
            status: Some("live".into()),
            paged: Some(1),
            ..Default::default()
        })
        .await;

    assert!(state.error.is_none());
    assert_eq!(state.found_posts, 3);
    assert_eq!(state.max_num_pages, 1);
    assert_eq!(ids(&state.posts), vec!["1", "2", "3"]);
    assert_eq!(state.posts[0].title, "Event 1");
    assert!(template::paging_nav(&state).is_none());
    assert_eq!(h.caller.calls()[0].params.get("sort_by"), Some("date"));
}

#[tokio::test]
async fn test_limit_caps_found_posts() {
    let h = harness();
    h.caller.respond(EVENT_SEARCH, listing(1, 50, 50));

    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars {
            limit: Some(2),
            ..Default::default()
        })
        .await;

    assert_eq!(state.found_posts, 2);
    assert_eq!(state.max_num_pages, 1);
    assert_eq!(ids(&state.posts), vec!["1", "2"]);
}

#[tokio::test]
async fn test_single_event_query() {
    let h = harness();
    h.caller.respond(EVENT_DETAILS, raw_event(12345678901, "Solo"));

    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars {
            event_id: Some(12345678901),
            paged: Some(4),
            ..Default::default()
        })
        .await;

    assert_eq!(state.found_posts, 1);
    assert_eq!(state.max_num_pages, 1);
    assert_eq!(ids(&state.posts), vec!["12345678901"]);
    assert_eq!(state.api_results.as_ref().unwrap().pagination, Pagination::single());
    assert_eq!(
        Pagination::single(),
        Pagination { object_count: 1, page_number: 1, page_size: 1, page_count: 1 }
    );
    assert_eq!(h.caller.calls()[0].endpoint, EVENT_DETAILS);
}

#[tokio::test]
async fn test_page_seven_reads_second_remote_page() {
    let h = harness();
    h.caller.respond(EVENT_SEARCH, listing(51, 50, 137));

    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars {
            paged: Some(7),
            ..Default::default()
        })
        .await;

    let call = &h.caller.calls()[0];
    assert_eq!(call.params.get("page"), Some("2"));

    // Remote events 51..100; logical page 7 starts at offset 10.
    assert_eq!(state.posts.len(), 10);
    assert_eq!(state.posts.first().unwrap().id, "61");
    assert_eq!(state.posts.last().unwrap().id, "70");
    assert_eq!(state.found_posts, 137);
    assert_eq!(state.max_num_pages, 14);
    assert!(!state.offset_overflow);

    let nav = template::paging_nav(&state).unwrap();
    assert_eq!(nav.current, 7);
    assert!(!nav.show_all);
}

#[tokio::test]
async fn test_remote_failure_yields_empty_result() {
    let h = harness();
    h.caller.fail(true);

    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars::default())
        .await;

    assert!(state.posts.is_empty());
    assert!(!state.have_posts());
    assert_eq!(state.found_posts, 0);
    assert_eq!(state.max_num_pages, 0);
    assert_eq!(state.error.as_ref().and_then(|e| e.status()), Some(500));
}

#[tokio::test]
async fn test_nopaging_returns_whole_remote_page() {
    let h = harness();
    h.caller.respond(EVENT_SEARCH, listing(1, 23, 23));

    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars {
            nopaging: true,
            ..Default::default()
        })
        .await;

    assert_eq!(state.posts.len(), 23);
    assert_eq!(state.found_posts, 23);
    assert_eq!(state.max_num_pages, 1);
}

#[tokio::test]
async fn test_page_past_filtered_events_is_flagged() {
    let h = harness();
    h.caller.respond(EVENT_SEARCH, listing(1, 50, 50));

    // Only odd IDs sit at venue v1, so 25 events survive the filter.
    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars {
            paged: Some(4),
            venue_id: Some("v1".into()),
            ..Default::default()
        })
        .await;

    assert!(state.posts.is_empty());
    assert!(state.offset_overflow);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_private_listing_uses_owned_events() {
    let h = harness();
    h.caller.respond(USER_OWNED_EVENTS, listing(1, 12, 12));

    let state = EventQuery::new(h.manager.clone())
        .get_records(QueryVars {
            display_private: true,
            paged: Some(2),
            exclude: vec!["11".into()],
            ..Default::default()
        })
        .await;

    let call = &h.caller.calls()[0];
    assert_eq!(call.endpoint, USER_OWNED_EVENTS);
    assert_eq!(call.params.get("status"), Some("live"));
    assert_eq!(call.params.get("order_by"), Some("start_asc"));
    assert_eq!(ids(&state.posts), vec!["12"]);
    assert_eq!(state.max_num_pages, 2);
}

#[tokio::test]
async fn test_listing_survives_cache_write_failure() {
    let (caller, manager) = manager_with_store(Arc::new(FlakyTransientStore::new(false, true)));
    caller.respond(EVENT_SEARCH, listing(1, 3, 3));

    let state = EventQuery::new(manager).get_records(QueryVars::default()).await;

    assert!(state.error.is_none());
    assert_eq!(ids(&state.posts), vec!["1", "2", "3"]);
    assert_eq!(state.found_posts, 3);
}
