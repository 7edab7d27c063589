//! Contact-list handling for `getContacts` responses.
//!
//! The read API is loosely shaped: depending on the account the list sits
//! under `data`, under `contacts`, or is the body itself. Values are compared
//! the way the Mini App front end compares them, by their string form.

use serde_json::Value;

/// Whether a JSON value counts as "present" (JavaScript truthiness).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a scalar JSON value, as `String(value)` would render it.
///
/// Arrays and objects have no useful string form and yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e21 {
                    Some(format!("{f:.0}"))
                } else {
                    Some(f.to_string())
                }
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Pull the contact list out of a `getContacts` body.
///
/// Picks the first truthy value among `data`, `contacts` and the body
/// itself. Returns `None` when the selected value is not an array.
pub fn extract_contact_list(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            let selected = ["data", "contacts"]
                .into_iter()
                .filter_map(|key| map.remove(key))
                .find(is_truthy);

            match selected {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }
        }
        other if !is_truthy(&other) => Some(Vec::new()),
        _ => None,
    }
}

/// Find the first contact whose `telegram_id` stringifies to `telegram_id`.
pub fn find_contact<'a>(contacts: &'a [Value], telegram_id: &str) -> Option<&'a Value> {
    contacts.iter().find(|contact| {
        contact
            .get("telegram_id")
            .and_then(scalar_to_string)
            .is_some_and(|id| id == telegram_id)
    })
}
