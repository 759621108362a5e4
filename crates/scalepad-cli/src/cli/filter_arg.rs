//! `--filter FIELD=OP:VALUE` argument parsing.

use scalepad_core::query::{FilterClause, FilterOp, FilterValue};

/// Parses `FIELD=OP:VALUE`. `in` takes a comma-separated list; other
/// operators take a scalar read as integer, then float, then `true`/`false`,
/// otherwise string.
pub fn parse_filter(arg: &str) -> Result<(String, FilterClause), String> {
    let (field, rest) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=OP:VALUE, got {:?}", arg))?;
    let field = field.trim();
    if field.is_empty() {
        return Err("filter field is empty".to_string());
    }
    let (op, value) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected OP:VALUE after {}=, got {:?}", field, rest))?;
    let op = FilterOp::parse(op.trim())
        .ok_or_else(|| format!("unknown filter operator {:?} (eq, in, lt, lte, gt, gte)", op))?;

    let clause = if op == FilterOp::In {
        let values: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(format!("`in` filter on {} needs at least one value", field));
        }
        FilterClause::any_of(values)
    } else {
        FilterClause::new(op, parse_scalar(value))
    };
    Ok((field.to_string(), clause))
}

fn parse_scalar(value: &str) -> FilterValue {
    if let Ok(i) = value.parse::<i64>() {
        return FilterValue::Int(i);
    }
    if let Ok(f) = value.parse::<f64>() {
        if f.is_finite() {
            return FilterValue::Float(f);
        }
    }
    match value {
        "true" => FilterValue::Bool(true),
        "false" => FilterValue::Bool(false),
        _ => FilterValue::Str(value.to_string()),
    }
}
