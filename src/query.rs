//! Query descriptions: resource path, filters, includes, pagination knobs.

use std::collections::HashSet;
use std::fmt::Display;


/// Ordered list of include names to embed in a response.
///
/// A single name promotes to a one-element list at this boundary, so callers
/// can pass `"country"` or `["country", "season"]` interchangeably without
/// any risk of a bare string being iterated character-by-character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Includes(Vec<String>);

impl Includes {
    pub fn none() -> Self {
        Includes(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Comma-joined value for the `include` query parameter, in caller order.
    pub fn to_param(&self) -> String {
        self.0.join(",")
    }
}

impl From<&str> for Includes {
    fn from(name: &str) -> Self {
        Includes(vec![name.to_string()])
    }
}

impl From<String> for Includes {
    fn from(name: String) -> Self {
        Includes(vec![name])
    }
}

impl From<Vec<String>> for Includes {
    fn from(names: Vec<String>) -> Self {
        Includes(names)
    }
}

impl From<Vec<&str>> for Includes {
    fn from(names: Vec<&str>) -> Self {
        Includes(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Includes {
    fn from(names: [&str; N]) -> Self {
        Includes(names.iter().map(|n| n.to_string()).collect())
    }
}

impl FromIterator<String> for Includes {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Includes(iter.into_iter().collect())
    }
}

/// Client-side post-filter for endpoints where the API is known to ignore a
/// foreign-key filter beyond the first page (e.g. fixtures by league ids).
#[derive(Debug, Clone)]
pub struct ForeignKeyFilter {
    pub field: String,
    pub allowed: HashSet<i64>,
}

impl ForeignKeyFilter {
    pub fn new(field: impl Into<String>, allowed: impl IntoIterator<Item = i64>) -> Self {
        ForeignKeyFilter {
            field: field.into(),
            allowed: allowed.into_iter().collect(),
        }
    }
}

/// One API query: resource path, pass-through filters, includes, and paging.
/// Immutable once issued to the fetch engine.
#[derive(Debug, Clone)]
pub struct Query {
    path: String,
    params: Vec<(String, String)>,
    includes: Includes,
    start_page: u32,
    per_page: Option<u32>,
    post_filter: Option<ForeignKeyFilter>,
}

impl Query {
    pub fn new(path: impl Into<String>) -> Self {
        Query {
            path: path.into(),
            params: Vec::new(),
            includes: Includes::none(),
            start_page: 1,
            per_page: None,
            post_filter: None,
        }
    }

    pub fn includes(mut self, includes: impl Into<Includes>) -> Self {
        self.includes = includes.into();
        self
    }

    /// Add a pass-through filter parameter, sent verbatim.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn post_filter(mut self, filter: ForeignKeyFilter) -> Self {
        self.post_filter = Some(filter);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn include_names(&self) -> &Includes {
        &self.includes
    }

    pub(crate) fn first_page(&self) -> u32 {
        self.start_page
    }

    pub(crate) fn filter(&self) -> Option<&ForeignKeyFilter> {
        self.post_filter.as_ref()
    }

    /// Full parameter list for one page request. The `include` parameter is
    /// always present, matching the upstream request shape.
    pub(crate) fn params_for_page(&self, page: u32) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        params.push(("include".to_string(), self.includes.to_param()));
        params.push(("page".to_string(), page.to_string()));
        if let Some(per_page) = self.per_page {
            params.push(("per_page".to_string(), per_page.to_string()));
        }
        params
    }
}

/// Comma-join a list of values for an API parameter (ids, markets, ...).
pub fn csv<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
