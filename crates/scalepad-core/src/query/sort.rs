//! Sort specifications: `[+|-]<field>` tokens, comma-joined in order.

/// Query parameter that carries the sort value; chosen per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortParam {
    #[default]
    Sort,
    SortBy,
}

impl SortParam {
    pub fn as_str(self) -> &'static str {
        match self {
            SortParam::Sort => "sort",
            SortParam::SortBy => "sort_by",
        }
    }
}

/// `+field`.
pub fn ascending(field: &str) -> String {
    format!("+{}", field)
}

/// `-field`.
pub fn descending(field: &str) -> String {
    format!("-{}", field)
}

/// Joins sort tokens with commas, keeping order and each token's prefix.
/// Returns `None` for an empty list so no sort parameter is sent.
pub fn encode_sort<S: AsRef<str>>(sorts: &[S]) -> Option<String> {
    if sorts.is_empty() {
        return None;
    }
    Some(
        sorts
            .iter()
            .map(|s| -> &str { s.as_ref() })
            .collect::<Vec<_>>()
            .join(","),
    )
}
