//! Diff generation for audit logging
//!
//! Generates human-readable diffs between before and after values
//! for audit log entries.

use serde_json::Value;

/// Generate a human-readable diff between two JSON values
///
/// Returns a string describing the changes in a user-friendly format.
/// Only includes top-level field changes for readability.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            // Modified and removed fields
            for (key, before_val) in before_obj {
                match after_obj.get(key) {
                    Some(after_val) if before_val != after_val => {
                        changes.push(format!(
                            "{}: {} -> {}",
                            key,
                            format_value(before_val),
                            format_value(after_val)
                        ));
                    }
                    Some(_) => {}
                    None => {
                        changes.push(format!("{}: {} -> (removed)", key, format_value(before_val)));
                    }
                }
            }

            // Added fields
            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            if changes.is_empty() {
                None
            } else {
                Some(changes.join(", "))
            }
        }
        _ => {
            if before != after {
                Some(format!("{} -> {}", format_value(before), format_value(after)))
            } else {
                None
            }
        }
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.len() > 50 {
                format!("\"{}...\"", &s[..47])
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_changes() {
        let v = json!({"name": "Checking"});
        assert_eq!(generate_diff(&v, &v), None);
    }

    #[test]
    fn test_field_change() {
        let before = json!({"cleared": false, "amount": -5000});
        let after = json!({"cleared": true, "amount": -5000});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "cleared: false -> true");
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"old_field": 1});
        let after = json!({"new_field": 2});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("old_field: 1 -> (removed)"));
        assert!(diff.contains("new_field: (added) -> 2"));
    }

    #[test]
    fn test_non_object_values() {
        let diff = generate_diff(&json!(1), &json!(2)).unwrap();
        assert_eq!(diff, "1 -> 2");
    }
}
