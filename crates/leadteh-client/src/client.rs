//! Leadteh HTTP client.

use crate::contacts::extract_contact_list;
use crate::error::LeadtehError;
use crate::types::{ResponseBody, WebhookEnvelope, WebhookReply};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Leadteh CRM client.
///
/// Wraps the contact-listing read API and a single inner webhook. One
/// instance is shared by every request; the underlying connection pool is
/// reused.
#[derive(Clone)]
pub struct LeadtehClient {
    client: Client,
    api_url: String,
    webhook_url: String,
    bot_id: u64,
    page_size: u32,
}

impl LeadtehClient {
    /// Create a new Leadteh client.
    pub fn new(
        api_url: impl Into<String>,
        webhook_url: impl Into<String>,
        bot_id: u64,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, LeadtehError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            webhook_url: webhook_url.into(),
            bot_id,
            page_size,
        })
    }

    /// Bot whose contacts are listed.
    pub fn bot_id(&self) -> u64 {
        self.bot_id
    }

    /// Inner webhook receiving registrations.
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Fetch one page of contacts for the configured bot.
    ///
    /// Returns the raw contact objects; see [`crate::find_contact`] for
    /// matching.
    #[instrument(skip(self, api_token), fields(bot_id = self.bot_id))]
    pub async fn get_contacts(
        &self,
        api_token: &SecretString,
    ) -> Result<Vec<Value>, LeadtehError> {
        let bot_id = self.bot_id.to_string();
        let count = self.page_size.to_string();

        let response = self
            .client
            .get(format!("{}/getContacts", self.api_url))
            .query(&[
                ("bot_id", bot_id.as_str()),
                ("count", count.as_str()),
                ("with", "variables"),
                ("api_token", api_token.expose_secret().as_str()),
            ])
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Leadteh getContacts failed");
            return Err(LeadtehError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        let contacts = extract_contact_list(body)
            .ok_or_else(|| LeadtehError::UnexpectedBody("contact list is not an array".into()))?;

        debug!(count = contacts.len(), "Fetched Leadteh contacts");
        Ok(contacts)
    }

    /// Post an envelope to the inner webhook.
    ///
    /// A non-success status is returned as [`LeadtehError::Webhook`] carrying
    /// the upstream body for diagnosis.
    #[instrument(skip(self, envelope), fields(search = %envelope.search))]
    pub async fn send_webhook(
        &self,
        envelope: &WebhookEnvelope,
    ) -> Result<WebhookReply, LeadtehError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = ResponseBody::new(response.text().await.unwrap_or_default());

        if !status.is_success() {
            warn!(status = %status, "Leadteh webhook rejected registration");
            return Err(LeadtehError::Webhook {
                status: status.as_u16(),
                body: body.into_diagnostic(),
            });
        }

        debug!(status = %status, "Leadteh webhook accepted registration");
        Ok(WebhookReply {
            status: status.as_u16(),
            body: body.into_json(),
        })
    }
}
