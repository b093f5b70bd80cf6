//! Utility functions for tag merging and value normalization

use std::collections::HashMap;

use stratus_core::resource::Value;

/// Caller tags with `Name` set, overriding any caller-supplied `Name`
pub fn tags_with_name(tags: &HashMap<String, String>, name: &str) -> Value {
    let mut merged = tags.clone();
    merged.insert("Name".to_string(), name.to_string());
    Value::string_map(&merged)
}

/// `Name` defaulted to the given name, caller-supplied `Name` wins
pub fn tags_with_default_name(tags: &HashMap<String, String>, name: &str) -> Value {
    let mut merged = HashMap::from([("Name".to_string(), name.to_string())]);
    merged.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    Value::string_map(&merged)
}

/// Capitalize the first letter of each word and lowercase the rest
/// (e.g., "gateway" -> "Gateway", "INTERFACE" -> "Interface")
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
