//! Diff generation between value snapshots
//!
//! Produces human-readable change descriptions and the per-field changes
//! used when a whole object is updated at once.

use serde_json::Value;

/// A change to one top-level field of an object snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// Collect the top-level field changes between two object snapshots
///
/// Fields missing on one side are reported against `null`. Non-object
/// snapshots yield no field changes.
pub fn field_changes(before: &Value, after: &Value) -> Vec<FieldChange> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return Vec::new();
    };

    let mut changes = Vec::new();

    for (key, before_val) in before_obj {
        let after_val = after_obj.get(key).unwrap_or(&Value::Null);
        if before_val != after_val {
            changes.push(FieldChange {
                field: key.clone(),
                old: before_val.clone(),
                new: after_val.clone(),
            });
        }
    }

    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) {
            changes.push(FieldChange {
                field: key.clone(),
                old: Value::Null,
                new: after_val.clone(),
            });
        }
    }

    changes
}

/// Generate a human-readable description of a change
///
/// Objects are summarized by their changed top-level fields. Returns `None`
/// when the two values are equal.
pub fn describe_change(before: &Value, after: &Value) -> Option<String> {
    if before == after {
        return None;
    }

    match (before, after) {
        (Value::Object(_), Value::Object(_)) => {
            let changes: Vec<String> = field_changes(before, after)
                .iter()
                .map(|change| {
                    format!(
                        "{}: {} -> {}",
                        change.field,
                        format_value(&change.old),
                        format_value(&change.new)
                    )
                })
                .collect();
            Some(changes.join(", "))
        }
        _ => Some(format!(
            "{} -> {}",
            format_value(before),
            format_value(after)
        )),
    }
}

/// Format a value for compact display
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
