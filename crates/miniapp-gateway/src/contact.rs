//! Contact prefill results.

use serde::Serialize;
use serde_json::Value;

/// Result of a contact lookup, serialized as `{found: false}` or
/// `{found: true, name, phone, firstName, lastName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactLookup {
    pub found: bool,
    #[serde(flatten)]
    pub contact: Option<NormalizedContact>,
}

impl ContactLookup {
    pub fn not_found() -> Self {
        Self {
            found: false,
            contact: None,
        }
    }

    pub fn found(contact: NormalizedContact) -> Self {
        Self {
            found: true,
            contact: Some(contact),
        }
    }
}

/// CRM contact reduced to the fields the registration form needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedContact {
    pub name: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}

impl NormalizedContact {
    /// Normalize a raw CRM contact; missing or non-string fields become empty.
    pub fn from_crm(contact: &Value) -> Self {
        let field = |key: &str| contact.get(key).and_then(Value::as_str).unwrap_or_default();
        Self::from_parts(field("name"), field("phone"))
    }

    /// Trim both fields and split the name into first token and remainder.
    pub fn from_parts(name: &str, phone: &str) -> Self {
        let name = name.trim();
        let mut tokens = name.split_whitespace();
        let first_name = tokens.next().unwrap_or_default().to_string();
        let last_name = tokens.collect::<Vec<_>>().join(" ");

        Self {
            name: name.to_string(),
            phone: phone.trim().to_string(),
            first_name,
            last_name,
        }
    }
}
