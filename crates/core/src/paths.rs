//! The routing table built up by the inspector pipeline.
//!
//! A path is a tuple of URL, HTTP method, and destination. URLs are relative
//! to the context root, matched exactly and case-sensitively. Storage is a
//! map-of-maps with the URL as outer key; both levels are sorted so that
//! output is deterministic. Inspectors are allowed (and expected) to replace
//! or retract the destinations that an earlier stage registered for a URL.
//!
//! Not intended for use by concurrent threads: each inspection run owns its
//! repository exclusively.

use std::collections::BTreeMap;
use std::fmt;

/// Request methods that a destination can be registered under. `Any` is a
/// wildcard: it answers lookups only when no specific method is registered
/// for the URL. The derived ordering exists for deterministic iteration and
/// carries no other meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Any,
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Maps a request-method name (as it appears in framework configuration)
    /// to a key. Names outside the supported set return `None`.
    pub fn from_name(name: &str) -> Option<HttpMethod> {
        match name {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HttpMethod::Any => "",
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

/// The resolved handler bound to a URL/method pair. Inspectors provide their
/// own implementations; a destination is immutable once constructed.
pub trait Destination: fmt::Display {
    /// Returns `true` if this destination is handled by the named class.
    /// This is the primary mechanism for recognizing front-controller
    /// registrations that a later pipeline stage must retract.
    fn is_implemented_by(&self, class_name: &str) -> bool;
}

#[derive(Default)]
pub struct PathRepo {
    urls: BTreeMap<String, BTreeMap<HttpMethod, Box<dyn Destination>>>,
}

impl PathRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a destination that responds to all request methods, replacing
    /// every existing destination for the URL.
    pub fn put_all(&mut self, url: impl Into<String>, destination: Box<dyn Destination>) {
        let methods = self.urls.entry(url.into()).or_default();
        methods.clear();
        methods.insert(HttpMethod::Any, destination);
    }

    /// Stores a destination that responds to a specific request method. An
    /// existing `Any` entry is left in place and remains the answer for every
    /// other method.
    pub fn put(
        &mut self,
        url: impl Into<String>,
        method: HttpMethod,
        destination: Box<dyn Destination>,
    ) {
        self.urls
            .entry(url.into())
            .or_default()
            .insert(method, destination);
    }

    /// Replaces the entire method map for a URL. Used when composing several
    /// resolved destinations for one URL at once.
    pub fn replace(
        &mut self,
        url: impl Into<String>,
        methods: BTreeMap<HttpMethod, Box<dyn Destination>>,
    ) {
        let url = url.into();
        if methods.is_empty() {
            self.urls.remove(&url);
        } else {
            self.urls.insert(url, methods);
        }
    }

    /// Retrieves the destination for a URL and method, falling back to the
    /// URL's `Any` entry when no specific entry exists.
    pub fn get(&self, url: &str, method: HttpMethod) -> Option<&dyn Destination> {
        let methods = self.urls.get(url)?;
        methods
            .get(&method)
            .or_else(|| methods.get(&HttpMethod::Any))
            .map(|destination| destination.as_ref())
    }

    /// Returns a read-only snapshot of the method map for a URL, empty if
    /// nothing is registered. An `Any` registration appears as a single
    /// entry, possibly shadowed by explicit methods on lookup.
    pub fn destinations(&self, url: &str) -> BTreeMap<HttpMethod, &dyn Destination> {
        self.urls
            .get(url)
            .map(|methods| {
                methods
                    .iter()
                    .map(|(method, destination)| (*method, destination.as_ref()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deletes a single method entry, returning its destination. A URL whose
    /// method map becomes empty disappears from iteration entirely.
    pub fn remove(&mut self, url: &str, method: HttpMethod) -> Option<Box<dyn Destination>> {
        let methods = self.urls.get_mut(url)?;
        let removed = methods.remove(&method);
        if methods.is_empty() {
            self.urls.remove(url);
        }
        removed
    }

    /// Iterates the registered URLs in sorted order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
