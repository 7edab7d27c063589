//! Registration payloads: boundary parsing, validation and the CRM envelope.

use chrono::{DateTime, SecondsFormat, Utc};
use leadteh_client::{
    WebhookEnvelope, WebhookVariables, CONTACT_BY_TELEGRAM_ID, MINI_APP_SOURCE_TAG,
    REGISTRATION_SOURCE_TAG,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Request body could not be turned into a [`RegistrationRequest`].
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Invalid JSON body")]
    NotAnObject,

    #[error("Invalid JSON body: {0}")]
    Field(#[source] serde_json::Error),
}

/// Field validation failures, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("telegram_id must be a positive integer")]
    TelegramId,

    #[error("firstName and lastName are required")]
    MissingName,

    #[error("Invalid phone format. Expected +7XXXXXXXXXX")]
    Phone,
}

/// Registration form as submitted by the Mini App.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Any JSON value; checked by [`RegistrationRequest::validate`]
    #[serde(default, alias = "telegram_id")]
    pub telegram_id: Option<Value>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Telegram launch context
    #[serde(default)]
    pub telegram: Option<TelegramContext>,
}

/// Telegram launch context forwarded by the Mini App.
#[derive(Debug, Default, Deserialize)]
pub struct TelegramContext {
    #[serde(default, rename = "initData")]
    pub init_data: Option<String>,
}

/// A registration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub telegram_id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RegistrationRequest {
    /// Parse a raw request body.
    ///
    /// A JSON string body is decoded a second time, since some clients
    /// post the form as string-encoded JSON.
    pub fn from_body(body: &[u8]) -> Result<Self, BodyError> {
        let value = match serde_json::from_slice::<Value>(body) {
            Ok(Value::String(inner)) => {
                serde_json::from_str::<Value>(&inner).map_err(|_| BodyError::NotAnObject)?
            }
            Ok(value) => value,
            Err(_) => return Err(BodyError::NotAnObject),
        };

        if !value.is_object() {
            return Err(BodyError::NotAnObject);
        }

        serde_json::from_value(value).map_err(BodyError::Field)
    }

    /// initData string, if the client sent one.
    pub fn init_data(&self) -> Option<&str> {
        self.telegram.as_ref()?.init_data.as_deref()
    }

    /// Validate and normalize the form.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let telegram_id = self
            .telegram_id
            .as_ref()
            .map(parse_telegram_id)
            .transpose()?;

        let first_name = trimmed(&self.first_name);
        let last_name = trimmed(&self.last_name);
        let phone = trimmed(&self.phone);

        if first_name.is_empty() || last_name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if !is_valid_phone(&phone) {
            return Err(ValidationError::Phone);
        }

        Ok(Registration {
            telegram_id,
            first_name,
            last_name,
            phone,
        })
    }
}

fn trimmed(field: &Option<String>) -> String {
    field.as_deref().unwrap_or_default().trim().to_string()
}

/// Accept positive integers, including floats with no fractional part.
pub fn parse_telegram_id(value: &Value) -> Result<u64, ValidationError> {
    let Value::Number(number) = value else {
        return Err(ValidationError::TelegramId);
    };

    if let Some(id) = number.as_u64() {
        return if id > 0 {
            Ok(id)
        } else {
            Err(ValidationError::TelegramId)
        };
    }

    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f > 0.0 && f < u64::MAX as f64 => Ok(f as u64),
        _ => Err(ValidationError::TelegramId),
    }
}

/// `+7` followed by exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone
        .strip_prefix("+7")
        .is_some_and(|rest| rest.len() == 10 && rest.bytes().all(|b| b.is_ascii_digit()))
}

impl Registration {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// CRM webhook payload for this registration, stamped with `now`.
    pub fn to_envelope(&self, now: DateTime<Utc>) -> WebhookEnvelope {
        let search = self
            .telegram_id
            .map_or_else(|| "null".to_string(), |id| id.to_string());

        WebhookEnvelope {
            contact_by: CONTACT_BY_TELEGRAM_ID.to_string(),
            search,
            variables: WebhookVariables {
                customer_name: self.full_name(),
                customer_phone: self.phone.clone(),
                telegram_user_name: self.full_name(),
                telegram_id: self.telegram_id,
                source: REGISTRATION_SOURCE_TAG.to_string(),
                ts: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                registration_date: now.format("%Y-%m-%d").to_string(),
                registration_source: MINI_APP_SOURCE_TAG.to_string(),
            },
        }
    }
}
