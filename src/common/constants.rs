/// Names and fixed values shared across the crate.
/// Endpoint names are the identifiers the registry, cache keys and CLI agree on.

// Service name used by credential lifecycle notifications
pub const SERVICE_NAME: &str = "eventbrite";

// Supported endpoints
pub const EVENT_SEARCH: &str = "event_search";
pub const EVENT_DETAILS: &str = "event_details";
pub const USER_OWNED_EVENTS: &str = "user_owned_events";

// Persisted option names
pub const TOKEN_OPTION: &str = "eventbrite_api_token";
pub const TRANSIENTS_OPTION: &str = "eventbrite_api_transients";

// Cache keys are this prefix followed by a hex digest
pub const TRANSIENT_PREFIX: &str = "eventbrite_";

pub const DEFAULT_API_BASE: &str = "https://www.eventbriteapi.com/v3/";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const REMOTE_CALL_TIMEOUT_SECS: u64 = 30;

// Pagination geometry: one remote page holds five logical pages
pub const REMOTE_PAGE_SIZE: u64 = 50;
pub const LOGICAL_PAGE_SIZE: u64 = 10;
pub const PAGES_PER_REMOTE_PAGE: u64 = REMOTE_PAGE_SIZE / LOGICAL_PAGE_SIZE;

// Event IDs on eventbrite.com are at least this many digits
pub const MIN_EVENT_ID_DIGITS: usize = 10;

/// Get all endpoint names supported out of the box
pub fn get_supported_endpoints() -> Vec<&'static str> {
    vec![EVENT_SEARCH, EVENT_DETAILS, USER_OWNED_EVENTS]
}
