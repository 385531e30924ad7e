//! Locating record lists inside loosely shaped HQ responses
//!
//! HQ deployments disagree on response envelopes: some return a bare JSON
//! array, some wrap it under a named key (`Users`, `workspaces`, `items`),
//! some nest it under `Data`/`Result`. The extractor hides all of that.

use serde_json::Value;

/// Extract a list of records from an arbitrary decoded response.
///
/// Tries each preferred key (plus its camelCase, PascalCase, and snake_case
/// spellings) in order, then falls back to treating the value itself as a
/// list, then to common wrapper keys, then to the first list-valued member.
/// Absence of data is normal: returns an empty vec, never an error.
pub fn extract_list(json: &Value, preferred_keys: &[&str]) -> Vec<Value> {
    match json {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            for key in expand_keys(preferred_keys) {
                if let Some(Value::Array(items)) = lookup_path(json, &key) {
                    return items.clone();
                }
            }

            // Some HQ builds wrap lists under Data/Result.
            for wrapper in ["data", "Data", "result", "Result"] {
                match map.get(wrapper) {
                    Some(Value::Array(items)) => return items.clone(),
                    Some(Value::Object(inner)) => {
                        for value in inner.values() {
                            if let Value::Array(items) = value {
                                return items.clone();
                            }
                        }
                    }
                    _ => {}
                }
            }

            // Last resort: first top-level list of any name.
            for value in map.values() {
                if let Value::Array(items) = value {
                    return items.clone();
                }
            }

            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Resolve a key as a path: segments separated by `.` traverse nested
/// objects.
fn lookup_path<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = json;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Expand each key into its common casing variants, deduplicated in order.
fn expand_keys(preferred_keys: &[&str]) -> Vec<String> {
    let mut expanded = Vec::new();
    for key in preferred_keys {
        for variant in [
            key.to_string(),
            to_camel_case(key),
            to_pascal_case(key),
            to_snake_case(key),
        ] {
            if !expanded.contains(&variant) {
                expanded.push(variant);
            }
        }
    }
    expanded
}

fn split_words(key: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(current.clone());
                current.clear();
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
            current.push(c.to_ascii_lowercase());
        } else {
            current.push(c.to_ascii_lowercase());
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn to_camel_case(key: &str) -> String {
    let words = split_words(key);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

fn to_pascal_case(key: &str) -> String {
    split_words(key).iter().map(|w| capitalize(w)).collect()
}

fn to_snake_case(key: &str) -> String {
    split_words(key).join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_list_under_preferred_key() {
        let json = json!({"workspaces": [{"name": "main"}]});
        let items = extract_list(&json, &["workspaces"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "main");
    }

    #[test]
    fn finds_list_under_pascal_case_variant() {
        let json = json!({"Workspaces": [{"name": "main"}, {"name": "other"}]});
        let items = extract_list(&json, &["workspaces"]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn finds_list_under_snake_case_variant() {
        let json = json!({"field_staff": [{"id": 1}]});
        let items = extract_list(&json, &["FieldStaff"]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn preserves_element_order() {
        let json = json!({"users": [{"id": "a"}, {"id": "b"}, {"id": "c"}]});
        let items = extract_list(&json, &["users"]);
        let ids: Vec<&str> = items.iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn plain_array_returned_as_is() {
        let json = json!([{"id": 1}, {"id": 2}]);
        let items = extract_list(&json, &["users"]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn unwraps_data_wrapper_list() {
        let json = json!({"Data": [{"id": 1}]});
        let items = extract_list(&json, &["users"]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn unwraps_nested_list_inside_result_object() {
        let json = json!({"Result": {"total": 2, "rows": [{"id": 1}, {"id": 2}]}});
        let items = extract_list(&json, &["users"]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn falls_back_to_first_top_level_list() {
        let json = json!({"count": 1, "records": [{"id": 9}]});
        let items = extract_list(&json, &["users"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], 9);
    }

    #[test]
    fn dotted_preferred_key_traverses_objects() {
        let json = json!({"payload": {"rows": [{"id": 1}]}});
        let items = extract_list(&json, &["payload.rows"]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn no_match_yields_empty_list() {
        assert!(extract_list(&json!({"count": 3}), &["users"]).is_empty());
        assert!(extract_list(&json!("scalar"), &["users"]).is_empty());
        assert!(extract_list(&json!(null), &["users"]).is_empty());
        assert!(extract_list(&json!(42), &["users"]).is_empty());
    }

    #[test]
    fn preferred_key_wins_over_wrapper() {
        let json = json!({"Data": [{"id": "wrapped"}], "users": [{"id": "direct"}]});
        let items = extract_list(&json, &["users"]);
        assert_eq!(items[0]["id"], "direct");
    }

    #[test]
    fn casing_helpers() {
        assert_eq!(to_camel_case("field_staff"), "fieldStaff");
        assert_eq!(to_pascal_case("field_staff"), "FieldStaff");
        assert_eq!(to_snake_case("FieldStaff"), "field_staff");
        assert_eq!(to_snake_case("workspaces"), "workspaces");
        assert_eq!(to_pascal_case("users"), "Users");
    }
}
