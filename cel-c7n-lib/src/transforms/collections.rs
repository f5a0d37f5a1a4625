use cel_interpreter::Value;

/// True when some element of `left` does not appear in `right`
///
/// Both lists are treated as sets. Only the emptiness of the difference is reported; the
/// differing elements themselves are not returned.
#[must_use]
pub fn difference(left: &[Value], right: &[Value]) -> bool {
    left.iter().any(|item| !right.contains(item))
}

/// True when at least one element appears in both lists
#[must_use]
pub fn intersect(left: &[Value], right: &[Value]) -> bool {
    left.iter().any(|item| right.contains(item))
}

/// Number of distinct elements in a list
#[must_use]
pub fn unique_size(items: &[Value]) -> usize {
    let mut seen: Vec<&Value> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen.len()
}

/// True when a value carries content: not null, not false, not zero, not empty
#[must_use]
pub fn present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::UInt(u) => *u != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Bytes(b) => !b.is_empty(),
        Value::List(l) => !l.is_empty(),
        Value::Map(m) => !m.map.is_empty(),
        Value::Duration(d) => *d != chrono::Duration::zero(),
        _ => true,
    }
}

/// Negation of [`present`]
#[must_use]
pub fn absent(value: &Value) -> bool {
    !present(value)
}
