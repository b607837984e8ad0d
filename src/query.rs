//! Host-style event queries on top of the cached API.
//!
//! The API pages in blocks of 50 events while listings show 10 per page, so
//! every logical page lives inside one remote page: logical pages 1-5 come
//! from remote page 1 at offsets 0, 10, 20, 30, 40; logical page 6 starts
//! remote page 2 at offset 0, and so on. Filters the API does not support
//! are applied locally to the one remote page that backs the request.

use crate::common::constants::{LOGICAL_PAGE_SIZE, PAGES_PER_REMOTE_PAGE};
use crate::common::error::{ApiError, Result};
use crate::common::types::{ApiResults, NormalizedEvent, Params};
use crate::endpoints::PAGE_PARAM;
use crate::manager::Manager;
use crate::mapper::map_events;
use crate::observability::{emit_counter, emit_histogram, MetricName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Query variables accepted from the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryVars {
    #[serde(alias = "page")]
    pub paged: Option<u64>,
    /// Accepted but not honoured; listings always use 10 per page.
    pub posts_per_page: Option<u64>,
    pub limit: Option<usize>,
    pub organizer_id: Option<String>,
    pub venue_id: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub format_id: Option<String>,
    #[serde(rename = "post__not_in")]
    pub exclude: Vec<String>,
    pub display_private: bool,
    pub nopaging: bool,
    #[serde(rename = "p")]
    pub event_id: Option<u64>,
    /// Status for private listings; ignored by the public search.
    pub status: Option<String>,
}

impl QueryVars {
    pub fn page(&self) -> u64 {
        self.paged.filter(|p| *p > 0).unwrap_or(1)
    }
}

/// Everything one query run produced
#[derive(Debug, Default)]
pub struct QueryState {
    pub query_vars: QueryVars,
    pub params: Params,
    pub api_results: Option<ApiResults>,
    pub posts: Vec<NormalizedEvent>,
    pub found_posts: u64,
    pub max_num_pages: u64,
    /// The requested page starts past the end of the events that survived filtering.
    pub offset_overflow: bool,
    pub error: Option<ApiError>,
}

impl QueryState {
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn have_posts(&self) -> bool {
        !self.posts.is_empty()
    }
}

/// Remote page holding `logical_page`.
pub fn remote_page_for(logical_page: u64) -> u64 {
    logical_page.max(1).div_ceil(PAGES_PER_REMOTE_PAGE)
}

/// Offset of `logical_page` inside its remote page.
pub fn page_offset(logical_page: u64) -> usize {
    (((logical_page.max(1) - 1) % PAGES_PER_REMOTE_PAGE) * LOGICAL_PAGE_SIZE) as usize
}

/// Remote parameters for a listing query.
pub fn build_params(vars: &QueryVars) -> Params {
    let mut params = Params::new();

    if vars.display_private {
        params.set("status", vars.status.as_deref().unwrap_or("live"));
        params.set("order_by", "start_asc");
    } else {
        params.set("sort_by", "date");
        if let Some(organizer) = vars.organizer_id.as_deref().filter(|o| !o.is_empty()) {
            params.set("organizer.id", organizer);
        }
        if vars.status.is_some() {
            debug!("Ignoring status filter for public event search");
        }
    }

    let remote_page = remote_page_for(vars.page());
    if remote_page > 1 {
        params.set(PAGE_PARAM, remote_page.to_string());
    }
    params
}

fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
    match wanted.as_deref() {
        Some(w) if !w.is_empty() => w == actual,
        _ => true,
    }
}

/// Local filters the API cannot apply, then the hard limit.
pub fn apply_filters(events: Vec<NormalizedEvent>, vars: &QueryVars) -> Vec<NormalizedEvent> {
    let mut events: Vec<NormalizedEvent> = events
        .into_iter()
        .filter(|e| !vars.exclude.iter().any(|id| *id == e.id))
        .filter(|e| field_matches(&vars.organizer_id, &e.organizer.id))
        .filter(|e| field_matches(&vars.venue_id, &e.venue.id))
        .filter(|e| field_matches(&vars.category_id, &e.category_id))
        .filter(|e| field_matches(&vars.subcategory_id, &e.subcategory_id))
        .filter(|e| field_matches(&vars.format_id, &e.format_id))
        .collect();

    if let Some(limit) = vars.limit {
        events.truncate(limit);
    }
    events
}

/// The window of `events` shown on `logical_page`. The flag is set when the
/// page starts beyond the available events.
pub fn slice_page(events: &[NormalizedEvent], logical_page: u64) -> (Vec<NormalizedEvent>, bool) {
    let offset = page_offset(logical_page);
    if offset > 0 && offset >= events.len() {
        return (Vec::new(), true);
    }
    let end = (offset + LOGICAL_PAGE_SIZE as usize).min(events.len());
    (events[offset..end].to_vec(), false)
}

/// Found count after a limit: the surviving events when the limit cut the
/// reported total, the API's total otherwise.
pub fn found_posts(vars: &QueryVars, object_count: u64, filtered: usize) -> u64 {
    match vars.limit {
        Some(limit) if (limit as u64) < object_count => filtered as u64,
        _ => object_count,
    }
}

pub fn max_num_pages(found_posts: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    found_posts.div_ceil(page_size)
}

pub struct EventQuery {
    manager: Arc<Manager>,
}

impl EventQuery {
    pub fn new(manager: Arc<Manager>) -> Self {
        Self { manager }
    }

    /// Run a query. Failures yield an empty result with the error attached.
    #[instrument(skip(self, vars), fields(page = vars.page()))]
    pub async fn get_records(&self, vars: QueryVars) -> QueryState {
        emit_counter(MetricName::QueryRuns, 1);
        let mut state = QueryState {
            params: if vars.event_id.is_some() { Params::new() } else { build_params(&vars) },
            query_vars: vars,
            ..Default::default()
        };

        match self.fetch(&state.query_vars, &state.params).await {
            Ok(results) => {
                self.paginate(&mut state, &results);
                state.api_results = Some(results);
            }
            Err(e) => {
                warn!("Event query failed, returning no events: {}", e);
                emit_counter(MetricName::QueryFailures, 1);
                state.error = Some(e);
            }
        }

        emit_histogram(MetricName::QueryFoundPosts, state.found_posts as f64);
        state
    }

    async fn fetch(&self, vars: &QueryVars, params: &Params) -> Result<ApiResults> {
        if let Some(id) = vars.event_id {
            return self.manager.get_event(&id.to_string(), false).await;
        }
        if vars.display_private {
            self.manager.get_user_owned_events(params, false).await
        } else {
            self.manager.do_event_search(params, false).await
        }
    }

    fn paginate(&self, state: &mut QueryState, results: &ApiResults) {
        let vars = &state.query_vars;
        if vars.posts_per_page.is_some() {
            debug!("posts_per_page is not supported, using {}", LOGICAL_PAGE_SIZE);
        }

        let filtered = apply_filters(map_events(&results.events), vars);
        let found = found_posts(vars, results.pagination.object_count, filtered.len());

        // Single events always sit on the first page.
        let page = if vars.event_id.is_some() { 1 } else { vars.page() };

        let (posts, page_size) = if vars.nopaging {
            let size = filtered.len() as u64;
            (filtered, size)
        } else {
            let (window, overflow) = slice_page(&filtered, page);
            if overflow {
                warn!(
                    page,
                    available = filtered.len(),
                    "Requested page starts past the events available on remote page {}",
                    remote_page_for(page)
                );
                state.offset_overflow = true;
            }
            (window, LOGICAL_PAGE_SIZE)
        };

        state.found_posts = found;
        state.max_num_pages = max_num_pages(found, page_size);
        state.posts = posts;

        info!(
            "Query returned {} events ({} found, {} pages)",
            state.posts.len(),
            state.found_posts,
            state.max_num_pages
        );
    }
}
