//! Leadteh wire types.

use crate::contacts::is_truthy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lookup key used for Mini App registrations.
pub const CONTACT_BY_TELEGRAM_ID: &str = "telegram_id";

/// `source` variable attached to every registration.
pub const REGISTRATION_SOURCE_TAG: &str = "telegram-webapp-registration";

/// `registration_source` variable attached to every registration.
pub const MINI_APP_SOURCE_TAG: &str = "telegram_mini_app";

/// Payload posted to a Leadteh inner webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Which contact field `search` is matched against
    pub contact_by: String,
    /// Lookup value; `"null"` when the contact is anonymous
    pub search: String,
    /// Contact variables written verbatim by the CRM
    pub variables: WebhookVariables,
}

/// Contact variables carried by a [`WebhookEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookVariables {
    pub customer_name: String,
    pub customer_phone: String,
    pub telegram_user_name: String,
    pub telegram_id: Option<u64>,
    pub source: String,
    /// ISO-8601 timestamp with millisecond precision
    pub ts: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub registration_date: String,
    pub registration_source: String,
}

/// Successful webhook response.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookReply {
    pub status: u16,
    /// Parsed JSON body, `Null` when the body was empty or not JSON
    pub body: Value,
}

/// Raw upstream body with its JSON interpretation, if any.
#[derive(Debug, Clone)]
pub struct ResponseBody {
    text: String,
    json: Option<Value>,
}

impl ResponseBody {
    pub fn new(text: String) -> Self {
        let json = if text.is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };
        Self { text, json }
    }

    /// The JSON body when it is meaningful, otherwise `Null`.
    pub fn into_json(self) -> Value {
        self.json.filter(is_truthy).unwrap_or(Value::Null)
    }

    /// Best available body for diagnostics: JSON, then raw text, then `Null`.
    pub fn into_diagnostic(self) -> Value {
        match self.json.filter(is_truthy) {
            Some(json) => json,
            None if !self.text.is_empty() => Value::String(self.text),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_body_json() {
        let body = ResponseBody::new(r#"{"status":"ok"}"#.to_string());
        assert_eq!(body.into_json(), json!({"status": "ok"}));
    }

    #[test]
    fn test_response_body_text() {
        let body = ResponseBody::new("Bad Gateway".to_string());
        assert_eq!(body.clone().into_json(), Value::Null);
        assert_eq!(body.into_diagnostic(), json!("Bad Gateway"));
    }

    #[test]
    fn test_response_body_empty() {
        let body = ResponseBody::new(String::new());
        assert_eq!(body.clone().into_json(), Value::Null);
        assert_eq!(body.into_diagnostic(), Value::Null);
    }

    #[test]
    fn test_envelope_serializes_null_telegram_id() {
        let envelope = WebhookEnvelope {
            contact_by: CONTACT_BY_TELEGRAM_ID.to_string(),
            search: "null".to_string(),
            variables: WebhookVariables {
                customer_name: "A B".to_string(),
                customer_phone: "+79991234567".to_string(),
                telegram_user_name: "A B".to_string(),
                telegram_id: None,
                source: REGISTRATION_SOURCE_TAG.to_string(),
                ts: "2025-01-01T00:00:00.000Z".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                registration_date: "2025-01-01".to_string(),
                registration_source: MINI_APP_SOURCE_TAG.to_string(),
            },
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["contact_by"], "telegram_id");
        assert_eq!(value["search"], "null");
        assert!(value["variables"]["telegram_id"].is_null());
        assert_eq!(value["variables"]["registration_source"], "telegram_mini_app");
    }
}
