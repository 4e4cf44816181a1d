use toml::{Table, Value};

/// Applies `PREFIX<sep>KEY<sep>NESTED=value` variables on top of `table`.
///
/// Path segments are lowercased; values are coerced to the most specific
/// TOML type: boolean, integer, float, or string.
pub fn apply_env_vars<I>(table: &mut Table, prefix: &str, separator: &str, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    assert!(!separator.is_empty(), "separator must not be empty");
    let prefix_with_sep = format!("{prefix}{separator}");

    for (key, value) in vars {
        let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
            continue;
        };
        if path_str.is_empty() {
            continue;
        }

        let path: Vec<String> = path_str
            .split(separator)
            .map(|s| s.to_lowercase())
            .collect();
        insert_at_path(table, &path, coerce_value(&value));
    }
}

fn insert_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert(first.clone(), value);
        return;
    }

    if !matches!(table.get(first), Some(Value::Table(_))) {
        table.insert(first.clone(), Value::Table(Table::new()));
    }
    if let Some(Value::Table(nested)) = table.get_mut(first) {
        insert_at_path(nested, rest, value);
    }
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
