//! Projection of raw Eventbrite event objects onto [`NormalizedEvent`].
//!
//! Each field is looked up by path; anything missing becomes an empty value
//! so callers never have to deal with absent fields.

use crate::common::types::{EventTime, NormalizedEvent, Party, RawEvent, TicketClass};
use serde_json::Value;

/// Walk `path` into `value`, returning `None` if any segment is missing or null.
fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .filter(|v| !v.is_null())
}

/// String at `path`. Numbers and booleans are rendered, IDs often arrive as either.
fn text(value: &Value, path: &[&str]) -> String {
    match at(value, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn flag(value: &Value, path: &[&str]) -> bool {
    match at(value, path) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true" || s == "1",
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

fn event_time(value: &Value, key: &str) -> EventTime {
    EventTime {
        timezone: text(value, &[key, "timezone"]),
        local: text(value, &[key, "local"]),
        utc: text(value, &[key, "utc"]),
    }
}

fn party(value: &Value, key: &str) -> Party {
    Party {
        id: text(value, &[key, "id"]),
        name: text(value, &[key, "name"]),
    }
}

fn ticket_class(value: &Value) -> TicketClass {
    TicketClass {
        id: text(value, &["id"]),
        name: text(value, &["name"]),
        free: flag(value, &["free"]),
        cost: text(value, &["cost", "display"]),
    }
}

pub fn map_event(raw: &RawEvent) -> NormalizedEvent {
    let tickets = at(raw, &["ticket_classes"])
        .and_then(Value::as_array)
        .map(|classes| classes.iter().map(ticket_class).collect())
        .unwrap_or_default();

    NormalizedEvent {
        id: text(raw, &["id"]),
        title: text(raw, &["name", "text"]),
        content: text(raw, &["description", "html"]),
        post_date: text(raw, &["start", "local"]),
        post_date_gmt: text(raw, &["start", "utc"]),
        url: text(raw, &["url"]),
        logo_url: text(raw, &["logo", "url"]),
        public: flag(raw, &["listed"]),
        start: event_time(raw, "start"),
        end: event_time(raw, "end"),
        organizer: party(raw, "organizer"),
        venue: party(raw, "venue"),
        category_id: text(raw, &["category_id"]),
        subcategory_id: text(raw, &["subcategory_id"]),
        format_id: text(raw, &["format_id"]),
        tickets,
    }
}

pub fn map_events(raw: &[RawEvent]) -> Vec<NormalizedEvent> {
    raw.iter().map(map_event).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_full_event() {
        let raw = json!({
            "id": "12345678901",
            "name": { "text": "Summer Concert", "html": "<b>Summer Concert</b>" },
            "description": { "text": "Music", "html": "<p>Music</p>" },
            "url": "https://www.eventbrite.com/e/summer-concert-12345678901",
            "logo": { "url": "https://img.evbuc.com/logo.png" },
            "listed": true,
            "start": { "timezone": "America/Los_Angeles", "local": "2025-07-01T19:00:00", "utc": "2025-07-02T02:00:00Z" },
            "end": { "timezone": "America/Los_Angeles", "local": "2025-07-01T23:00:00", "utc": "2025-07-02T06:00:00Z" },
            "organizer": { "id": "555", "name": "Parks Dept" },
            "venue": { "id": 777, "name": "Gas Works Park" },
            "category_id": "103",
            "subcategory_id": "3004",
            "format_id": "6",
            "ticket_classes": [
                { "id": "1", "name": "General", "free": false, "cost": { "display": "$10.00" } },
                { "id": "2", "name": "Kids", "free": true }
            ]
        });

        let event = map_event(&raw);
        assert_eq!(event.id, "12345678901");
        assert_eq!(event.title, "Summer Concert");
        assert_eq!(event.content, "<p>Music</p>");
        assert_eq!(event.post_date, "2025-07-01T19:00:00");
        assert_eq!(event.post_date_gmt, "2025-07-02T02:00:00Z");
        assert_eq!(event.logo_url, "https://img.evbuc.com/logo.png");
        assert!(event.public);
        assert_eq!(event.end.utc, "2025-07-02T06:00:00Z");
        assert_eq!(event.organizer, Party { id: "555".into(), name: "Parks Dept".into() });
        assert_eq!(event.venue.id, "777");
        assert_eq!(event.format_id, "6");
        assert_eq!(event.tickets.len(), 2);
        assert_eq!(event.tickets[0].cost, "$10.00");
        assert!(event.tickets[1].free);
        assert_eq!(event.tickets[1].cost, "");
    }

    #[test]
    fn test_missing_paths_become_empty() {
        let event = map_event(&json!({ "id": 42, "venue": null, "organizer": {} }));
        assert_eq!(event.id, "42");
        assert_eq!(event.title, "");
        assert_eq!(event.venue, Party::default());
        assert_eq!(event.organizer, Party::default());
        assert_eq!(event.start, EventTime::default());
        assert!(!event.public);
        assert!(event.tickets.is_empty());
    }

    #[test]
    fn test_non_object_input_maps_to_empty_record() {
        assert_eq!(map_event(&json!("not an event")), NormalizedEvent::default());
    }
}
