//! Display helpers for listings and single events.
//!
//! Every helper takes the event or query it renders explicitly.

use crate::common::types::{NormalizedEvent, Party};
use crate::query::QueryState;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

// Above this many pages the navigation collapses into ranges.
const SHOW_ALL_PAGES_MAX: u64 = 10;

/// Lowercase, dash-separated form of `text` for use in URLs.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_CHARS.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// The title wrapped in `before`/`after`, or `None` when the event has no title.
pub fn the_title(event: &NormalizedEvent, before: &str, after: &str) -> Option<String> {
    if event.title.is_empty() {
        return None;
    }
    Some(format!("{before}{}{after}", event.title))
}

pub fn the_content(event: &NormalizedEvent) -> String {
    event.content.replace("]]>", "]]&gt;")
}

fn join(base: &str, tail: &str) -> String {
    format!("{}/{}/", base.trim_end_matches('/'), tail)
}

fn slug_and_id(name: &str, id: &str) -> String {
    match slugify(name) {
        slug if slug.is_empty() => id.to_string(),
        slug => format!("{slug}-{id}"),
    }
}

/// `<base>/<title-slug>-<id>/`
pub fn permalink(base: &str, event: &NormalizedEvent) -> String {
    join(base, &slug_and_id(&event.title, &event.id))
}

/// `<base>/organizer/<name-slug>-<id>/`
pub fn organizer_link(base: &str, organizer: &Party) -> String {
    join(base, &format!("organizer/{}", slug_and_id(&organizer.name, &organizer.id)))
}

/// `<base>/venue/<name-slug>-<id>/`
pub fn venue_link(base: &str, venue: &Party) -> String {
    join(base, &format!("venue/{}", slug_and_id(&venue.name, &venue.id)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagingNav {
    pub current: u64,
    pub total: u64,
    pub show_all: bool,
    pub prev: Option<u64>,
    pub next: Option<u64>,
}

/// Navigation for a listing, or `None` when everything fits on one page.
pub fn paging_nav(state: &QueryState) -> Option<PagingNav> {
    let total = state.max_num_pages;
    if total < 2 {
        return None;
    }
    let current = state.query_vars.page().min(total);
    Some(PagingNav {
        current,
        total,
        show_all: total <= SHOW_ALL_PAGES_MAX,
        prev: (current > 1).then(|| current - 1),
        next: (current < total).then(|| current + 1),
    })
}
