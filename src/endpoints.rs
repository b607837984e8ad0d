//! Static table of supported Eventbrite endpoints and their valid parameters.
//!
//! Validation fails closed: an unknown endpoint, an unknown parameter, or a
//! value outside an enumerated domain rejects the whole call.

use crate::common::constants::{EVENT_DETAILS, EVENT_SEARCH, USER_OWNED_EVENTS};
use crate::common::error::{ApiError, Result};
use crate::common::types::Params;
use reqwest::Method;
use std::collections::BTreeMap;
use tracing::debug;

/// Pagination parameter accepted by every endpoint
pub const PAGE_PARAM: &str = "page";

const DATE_KEYWORDS: &[&str] = &[
    "today",
    "tomorrow",
    "this_week",
    "this_weekend",
    "next_week",
    "this_month",
];

/// Allowed values for one parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamDomain {
    Any,
    OneOf(Vec<String>),
}

impl ParamDomain {
    fn one_of(values: &[&str]) -> Self {
        ParamDomain::OneOf(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn allows(&self, value: &str) -> bool {
        match self {
            ParamDomain::Any => true,
            ParamDomain::OneOf(values) => values.iter().any(|v| v == value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub name: String,
    /// Path relative to the API base. `{user_id}` is replaced with the token's user.
    pub path: String,
    pub method: Method,
    pub valid_params: BTreeMap<String, ParamDomain>,
}

impl EndpointSpec {
    pub fn new(name: &str, path: &str, method: Method) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            method,
            valid_params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, domain: ParamDomain) -> Self {
        self.valid_params.insert(name.to_string(), domain);
        self
    }

    fn any(self, names: &[&str]) -> Self {
        names.iter().fold(self, |spec, name| spec.param(name, ParamDomain::Any))
    }
}

#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, EndpointSpec>,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::eventbrite()
    }
}

impl EndpointRegistry {
    pub fn empty() -> Self {
        Self {
            endpoints: BTreeMap::new(),
        }
    }

    /// The endpoints this crate talks to, with the parameter names and value
    /// lists the Eventbrite v3 API accepts.
    pub fn eventbrite() -> Self {
        let event_search = EndpointSpec::new(EVENT_SEARCH, "events/search/", Method::GET)
            .any(&[
                "q",
                "location.address",
                "location.within",
                "location.latitude",
                "location.longitude",
                "location.viewport.northeast.latitude",
                "location.viewport.northeast.longitude",
                "location.viewport.southwest.latitude",
                "location.viewport.southwest.longitude",
                "organizer.id",
                "user.id",
                "tracking_code",
                "categories",
                "subcategories",
                "formats",
                "start_date.range_start",
                "start_date.range_end",
                "date_created.range_start",
                "date_created.range_end",
                "date_modified.range_start",
                "date_modified.range_end",
                "include_all_series_instances",
                "include_unavailable_events",
            ])
            .param(
                "sort_by",
                ParamDomain::one_of(&["id", "date", "name", "city", "distance", "best"]),
            )
            .param("price", ParamDomain::one_of(&["free", "paid"]))
            .param("start_date.keyword", ParamDomain::one_of(DATE_KEYWORDS))
            .param("date_created.keyword", ParamDomain::one_of(DATE_KEYWORDS))
            .param("date_modified.keyword", ParamDomain::one_of(DATE_KEYWORDS))
            .param("popular", ParamDomain::one_of(&["true", "false"]));

        // `p` carries no meaning remotely; it only distinguishes cache entries per event.
        let event_details =
            EndpointSpec::new(EVENT_DETAILS, "events/", Method::GET).param("p", ParamDomain::Any);

        let user_owned_events =
            EndpointSpec::new(USER_OWNED_EVENTS, "users/{user_id}/owned_events/", Method::GET)
                .param(
                    "status",
                    ParamDomain::one_of(&["all", "cancelled", "draft", "ended", "live", "started"]),
                )
                .param(
                    "order_by",
                    ParamDomain::one_of(&["start_asc", "start_desc", "created_asc", "created_desc"]),
                );

        Self::empty()
            .with_endpoint(event_search)
            .with_endpoint(event_details)
            .with_endpoint(user_owned_events)
    }

    pub fn with_endpoint(mut self, spec: EndpointSpec) -> Self {
        self.endpoints.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, endpoint: &str) -> Option<&EndpointSpec> {
        self.endpoints.get(endpoint)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(|k| k.as_str())
    }

    pub fn validate(&self, endpoint: &str, params: &Params) -> bool {
        self.check(endpoint, params).is_ok()
    }

    /// Like [`validate`](Self::validate) but reports why a call was rejected.
    pub fn check(&self, endpoint: &str, params: &Params) -> Result<&EndpointSpec> {
        let spec = self
            .get(endpoint)
            .ok_or_else(|| ApiError::UnknownEndpoint(endpoint.to_string()))?;

        let invalid = |reason: String| {
            debug!(endpoint, %reason, "Rejected request parameters");
            ApiError::InvalidParams {
                endpoint: endpoint.to_string(),
                reason,
            }
        };

        for (key, value) in params.iter() {
            if key == PAGE_PARAM {
                match value.parse::<u64>() {
                    Ok(page) if page > 0 => continue,
                    _ => return Err(invalid(format!("page must be a positive integer, got '{value}'"))),
                }
            }

            let domain = spec
                .valid_params
                .get(key)
                .ok_or_else(|| invalid(format!("unknown parameter '{key}'")))?;

            if !domain.allows(value) {
                return Err(invalid(format!("'{value}' is not an allowed value for '{key}'")));
            }
        }

        Ok(spec)
    }
}
