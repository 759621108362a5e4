//! Filter clauses and their `filter[<field>]=<op>: <value>` wire encoding.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Filter operators understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    In,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl FilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::In => "in",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
        }
    }

    /// Parses the wire name of an operator (`"eq"`, `"in"`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(FilterOp::Eq),
            "in" => Some(FilterOp::In),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

impl FilterValue {
    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::List(_))
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Str(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Str(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl<S: Into<String>> From<Vec<S>> for FilterValue {
    fn from(v: Vec<S>) -> Self {
        FilterValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// A single `op: value` condition on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub op: FilterOp,
    pub value: FilterValue,
}

impl FilterClause {
    /// Builds a clause without checking that `op` and `value` agree.
    /// Prefer the typed constructors below.
    pub fn new(op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            op,
            value: value.into(),
        }
    }

    pub fn eq(value: impl Into<FilterValue>) -> Self {
        Self::new(FilterOp::Eq, value)
    }

    pub fn any_of<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            op: FilterOp::In,
            value: FilterValue::List(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn lt(value: impl Into<FilterValue>) -> Self {
        Self::new(FilterOp::Lt, value)
    }

    pub fn lte(value: impl Into<FilterValue>) -> Self {
        Self::new(FilterOp::Lte, value)
    }

    pub fn gt(value: impl Into<FilterValue>) -> Self {
        Self::new(FilterOp::Gt, value)
    }

    pub fn gte(value: impl Into<FilterValue>) -> Self {
        Self::new(FilterOp::Gte, value)
    }

    /// `in` takes a list; every other operator takes a scalar.
    pub fn is_well_formed(&self) -> bool {
        (self.op == FilterOp::In) == self.value.is_list()
    }
}

/// Field → clause map that remembers insertion order.
///
/// Inserting an existing field replaces its clause in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, FilterClause)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, clause: FilterClause) {
        let field = field.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = clause,
            None => self.entries.push((field, clause)),
        }
    }

    /// Builder form of [`Filters::insert`].
    pub fn with(mut self, field: impl Into<String>, clause: FilterClause) -> Self {
        self.insert(field, clause);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FilterClause> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterClause)> {
        self.entries.iter().map(|(f, c)| (f.as_str(), c))
    }
}

impl<K: Into<String>> FromIterator<(K, FilterClause)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, FilterClause)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (field, clause) in iter {
            filters.insert(field, clause);
        }
        filters
    }
}

/// Encodes every clause as a `(filter[<field>], "<op>: <value>")` pair, in
/// insertion order.
pub fn encode_filters(filters: &Filters) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(field, clause)| {
            (
                format!("filter[{}]", field),
                format!("{}: {}", clause.op, format_value(&clause.value)),
            )
        })
        .collect()
}

/// Formats a value, quoting each scalar (or list element) that needs it.
/// Embedded `"` characters are passed through unescaped.
pub fn format_value(value: &FilterValue) -> String {
    match value {
        FilterValue::List(items) => items
            .iter()
            .map(|item| quote_if_needed(item))
            .collect::<Vec<_>>()
            .join(","),
        FilterValue::Str(s) => quote_if_needed(s),
        FilterValue::Int(n) => quote_if_needed(&n.to_string()),
        FilterValue::Float(n) => quote_if_needed(&format_float(*n)),
        FilterValue::Bool(b) => quote_if_needed(&b.to_string()),
    }
}

/// Shortest round-trip digits, switching to `d.ddde±x` notation outside
/// `1e-7 < |n| < 1e21`, following JavaScript's number-to-string rules. Both
/// zeros print as `0`.
fn format_float(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let scientific = format!("{:e}", n);
    let Some((mantissa, exp)) = scientific.split_once('e') else {
        return n.to_string();
    };
    match exp.parse::<i32>() {
        Ok(exp) if !(-7 < exp && exp < 21) => {
            let sign = if exp > 0 { "+" } else { "" };
            format!("{}e{}{}", mantissa, sign, exp)
        }
        _ => n.to_string(),
    }
}

fn quote_if_needed(s: &str) -> String {
    if needs_quoting(s) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// True when `value` contains a comma, colon or space, or the whole word
/// `OR` / `AND`, any of which the API would read as its own syntax.
pub fn needs_quoting(value: &str) -> bool {
    value.contains([',', ':', ' ']) || boolean_keyword().is_match(value)
}

fn boolean_keyword() -> &'static Regex {
    static KEYWORD: OnceLock<Regex> = OnceLock::new();
    KEYWORD.get_or_init(|| Regex::new(r"\b(?:OR|AND)\b").expect("valid regex pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_value(clause: FilterClause) -> String {
        let filters = Filters::new().with("f", clause);
        encode_filters(&filters).remove(0).1
    }

    #[test]
    fn plain_scalars_are_not_quoted() {
        assert_eq!(encoded_value(FilterClause::eq("WORKSTATION")), "eq: WORKSTATION");
        assert_eq!(encoded_value(FilterClause::lte(8_000_000_000_i64)), "lte: 8000000000");
        assert_eq!(encoded_value(FilterClause::gt(1.5)), "gt: 1.5");
        assert_eq!(encoded_value(FilterClause::eq(true)), "eq: true");
    }

    #[test]
    fn special_characters_force_quotes() {
        assert_eq!(encoded_value(FilterClause::eq("a,b")), "eq: \"a,b\"");
        assert_eq!(encoded_value(FilterClause::eq("10:30")), "eq: \"10:30\"");
        assert_eq!(encoded_value(FilterClause::eq("Acme Corp")), "eq: \"Acme Corp\"");
    }

    #[test]
    fn boolean_keywords_quoted_only_as_whole_words() {
        assert!(needs_quoting("OR"));
        assert!(needs_quoting("this-OR-that"));
        assert!(needs_quoting("AND"));
        assert!(needs_quoting("x.AND"));
        assert!(!needs_quoting("ORDER"));
        assert!(!needs_quoting("BRAND"));
        assert!(!needs_quoting("OR_1"));
        assert!(!needs_quoting("or"));
    }

    #[test]
    fn floats_switch_to_exponent_form_at_the_extremes() {
        assert_eq!(format_value(&FilterValue::Float(1e21)), "1e+21");
        assert_eq!(format_value(&FilterValue::Float(1e20)), "100000000000000000000");
        assert_eq!(format_value(&FilterValue::Float(1e-7)), "1e-7");
        assert_eq!(format_value(&FilterValue::Float(-2.5e-8)), "-2.5e-8");
        assert_eq!(format_value(&FilterValue::Float(0.000001)), "0.000001");
        assert_eq!(format_value(&FilterValue::Float(1.2345e25)), "1.2345e+25");
        assert_eq!(format_value(&FilterValue::Float(-0.0)), "0");
        assert_eq!(format_value(&FilterValue::Float(-3.25)), "-3.25");
    }

    #[test]
    fn keyword_check_uses_word_boundaries() {
        assert!(needs_quoting("x-AND-y"));
        assert!(needs_quoting("(OR)"));
        assert!(!needs_quoting("aORb"));
        assert!(!needs_quoting("ANDROID"));
        assert!(!needs_quoting("And"));
    }

    #[test]
    fn in_lists_join_elements_and_quote_individually() {
        let clause = FilterClause::any_of(["SERVER", "WORKSTATION", "Big Box"]);
        assert_eq!(encoded_value(clause), "in: SERVER,WORKSTATION,\"Big Box\"");
    }

    #[test]
    fn embedded_quotes_are_not_escaped() {
        assert_eq!(encoded_value(FilterClause::eq("say \"hi\"")), "eq: \"say \"hi\"\"");
        assert_eq!(encoded_value(FilterClause::eq("x\"y")), "eq: x\"y");
    }

    #[test]
    fn keys_use_dotted_field_paths_in_insertion_order() {
        let filters = Filters::new()
            .with("type", FilterClause::eq("WORKSTATION"))
            .with("configuration.ram_bytes", FilterClause::lte(8_000_000_000_i64))
            .with("client_id", FilterClause::eq("c1"));
        let pairs = encode_filters(&filters);
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["filter[type]", "filter[configuration.ram_bytes]", "filter[client_id]"]
        );
    }

    #[test]
    fn reinserting_a_field_keeps_its_position() {
        let mut filters = Filters::new();
        filters.insert("a", FilterClause::eq("1"));
        filters.insert("b", FilterClause::eq("2"));
        filters.insert("a", FilterClause::eq("3"));
        let pairs = encode_filters(&filters);
        assert_eq!(pairs[0], ("filter[a]".to_string(), "eq: 3".to_string()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn empty_filters_encode_to_nothing() {
        assert!(encode_filters(&Filters::new()).is_empty());
    }

    #[test]
    fn well_formed_checks_op_value_agreement() {
        assert!(FilterClause::eq("x").is_well_formed());
        assert!(FilterClause::any_of(["a"]).is_well_formed());
        assert!(!FilterClause::new(FilterOp::In, "a").is_well_formed());
        assert!(!FilterClause::new(FilterOp::Eq, vec!["a", "b"]).is_well_formed());
    }

    #[test]
    fn op_names_round_trip() {
        for op in [
            FilterOp::Eq,
            FilterOp::In,
            FilterOp::Lt,
            FilterOp::Lte,
            FilterOp::Gt,
            FilterOp::Gte,
        ] {
            assert_eq!(FilterOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(FilterOp::parse("ne"), None);
    }
}
