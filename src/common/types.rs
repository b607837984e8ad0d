use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw event object as returned by the remote API
pub type RawEvent = Value;

/// Request parameters in insertion order.
///
/// Order matters: the cache key is computed over the values as they were
/// inserted, and GET query strings are serialized in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a parameter, replacing an existing value in place so its position is kept.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    /// All values joined without separator, in insertion order.
    pub fn concat_values(&self) -> String {
        self.0.iter().map(|(_, v)| v.as_str()).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Pagination block of a remote listing response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub object_count: u64,
    #[serde(default)]
    pub page_number: u64,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub page_count: u64,
}

impl Pagination {
    /// Pagination of a result set holding exactly one object.
    pub fn single() -> Self {
        Self {
            object_count: 1,
            page_number: 1,
            page_size: 1,
            page_count: 1,
        }
    }
}

/// A remote listing response: one remote page of raw events plus pagination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResults {
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Start or end time of an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    pub timezone: String,
    pub local: String,
    pub utc: String,
}

/// Organizer or venue reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClass {
    pub id: String,
    pub name: String,
    pub free: bool,
    pub cost: String,
}

/// Host-shaped event record. Every field is always present; missing source
/// data shows up as an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    pub content: String,
    pub post_date: String,
    pub post_date_gmt: String,
    pub url: String,
    pub logo_url: String,
    pub public: bool,
    pub start: EventTime,
    pub end: EventTime,
    pub organizer: Party,
    pub venue: Party,
    pub category_id: String,
    pub subcategory_id: String,
    pub format_id: String,
    pub tickets: Vec<TicketClass>,
}

/// The host's native content-object shape
pub trait ContentObject {
    fn object_id(&self) -> &str;
    fn title(&self) -> &str;
    fn body(&self) -> &str;
    fn author(&self) -> &str;
    fn post_status(&self) -> &'static str;
}

impl ContentObject for NormalizedEvent {
    fn object_id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn author(&self) -> &str {
        &self.organizer.name
    }

    fn post_status(&self) -> &'static str {
        if self.public {
            "publish"
        } else {
            "private"
        }
    }
}

/// An access credential issued by the credential provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: String,
    pub access_token: String,
    pub user_id: Option<String>,
}
