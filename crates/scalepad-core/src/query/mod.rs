//! Query encoding for list endpoints.
//!
//! Pure functions: filter maps and sort lists in, ordered `(key, value)`
//! string pairs out. The request executor turns the pairs into a URL query
//! string.

mod filters;
mod sort;

pub use filters::{
    encode_filters, format_value, needs_quoting, FilterClause, FilterOp, FilterValue, Filters,
};
pub use sort::{ascending, descending, encode_sort, SortParam};

/// Options accepted by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub page_size: Option<u32>,
    pub cursor: Option<String>,
    pub filters: Filters,
    pub sort: Vec<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, clause: FilterClause) -> Self {
        self.filters.insert(field, clause);
        self
    }

    pub fn sort_by(mut self, token: impl Into<String>) -> Self {
        self.sort.push(token.into());
        self
    }

    /// Query pairs in wire order: `page_size`, `cursor`, filters, sort.
    /// A zero page size and an empty cursor are omitted.
    pub fn to_query(&self, sort_param: SortParam) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(size) = self.page_size.filter(|s| *s > 0) {
            pairs.push(("page_size".to_string(), size.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("cursor".to_string(), cursor.to_string()));
        }
        pairs.extend(encode_filters(&self.filters));
        if let Some(sort) = encode_sort(&self.sort) {
            pairs.push((sort_param.as_str().to_string(), sort));
        }
        pairs
    }
}

/// Form-encodes query pairs (`a=1&filter%5Bx%5D=eq%3A+y`).
pub fn encode_query_string(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}
