//! Leadteh CRM client: contact listing and inner-webhook delivery.

mod client;
mod contacts;
mod error;
mod types;

pub use client::LeadtehClient;
pub use contacts::{extract_contact_list, find_contact, is_truthy, scalar_to_string};
pub use error::LeadtehError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> LeadtehClient {
        LeadtehClient::new(
            format!("{}/api/v1", mock_server.uri()),
            format!("{}/inner_webhook/test-hook", mock_server.uri()),
            257034,
            500,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn test_token() -> SecretString {
        SecretString::new("test-token".to_string())
    }

    fn test_envelope() -> WebhookEnvelope {
        WebhookEnvelope {
            contact_by: CONTACT_BY_TELEGRAM_ID.to_string(),
            search: "42".to_string(),
            variables: WebhookVariables {
                customer_name: "Ivan Petrov".to_string(),
                customer_phone: "+79991234567".to_string(),
                telegram_user_name: "Ivan Petrov".to_string(),
                telegram_id: Some(42),
                source: REGISTRATION_SOURCE_TAG.to_string(),
                ts: "2025-03-01T09:30:00.123Z".to_string(),
                first_name: "Ivan".to_string(),
                last_name: "Petrov".to_string(),
                registration_date: "2025-03-01".to_string(),
                registration_source: MINI_APP_SOURCE_TAG.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_get_contacts_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/getContacts"))
            .and(query_param("bot_id", "257034"))
            .and(query_param("count", "500"))
            .and(query_param("with", "variables"))
            .and(query_param("api_token", "test-token"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"telegram_id": 1, "name": "One"},
                    {"telegram_id": 2, "name": "Two"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let contacts = client.get_contacts(&test_token()).await.unwrap();

        assert_eq!(contacts.len(), 2);
        assert_eq!(find_contact(&contacts, "2").unwrap()["name"], "Two");
    }

    #[tokio::test]
    async fn test_get_contacts_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/getContacts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthenticated"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_contacts(&test_token()).await;

        assert!(matches!(result, Err(LeadtehError::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_get_contacts_invalid_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/getContacts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_contacts(&test_token()).await;

        assert!(matches!(result, Err(LeadtehError::Json(_))));
    }

    #[tokio::test]
    async fn test_get_contacts_non_list_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/getContacts"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"total": 0}})),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_contacts(&test_token()).await;

        assert!(matches!(result, Err(LeadtehError::UnexpectedBody(_))));
    }

    #[tokio::test]
    async fn test_send_webhook_success() {
        let mock_server = MockServer::start().await;
        let envelope = test_envelope();

        Mock::given(method("POST"))
            .and(path("/inner_webhook/test-hook"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(&envelope))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let reply = client.send_webhook(&envelope).await.unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_send_webhook_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/inner_webhook/test-hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let reply = client.send_webhook(&test_envelope()).await.unwrap();

        assert!(reply.body.is_null());
    }

    #[tokio::test]
    async fn test_send_webhook_rejected_with_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/inner_webhook/test-hook"))
            .respond_with(ResponseTemplate::new(404).set_body_string("webhook not found"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.send_webhook(&test_envelope()).await;

        match result {
            Err(LeadtehError::Webhook { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, serde_json::json!("webhook not found"));
            }
            other => panic!("expected webhook error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_webhook_rejected_with_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/inner_webhook/test-hook"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(serde_json::json!({"error": "bad"})),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.send_webhook(&test_envelope()).await;

        assert!(matches!(
            result,
            Err(LeadtehError::Webhook { status: 422, ref body }) if body["error"] == "bad"
        ));
    }

    #[tokio::test]
    async fn test_send_webhook_connection_refused() {
        let client = LeadtehClient::new(
            "http://127.0.0.1:1",
            "http://127.0.0.1:1/inner_webhook/none",
            1,
            1,
            Duration::from_secs(1),
        )
        .unwrap();

        let result = client.send_webhook(&test_envelope()).await;
        assert!(matches!(result, Err(LeadtehError::Http(_))));
    }

    #[test]
    fn test_client_accessors() {
        let client = LeadtehClient::new(
            "https://app.leadteh.ru/api/v1/",
            "https://example.leadteh.ru/inner_webhook/x",
            257034,
            500,
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(client.bot_id(), 257034);
        assert_eq!(client.webhook_url(), "https://example.leadteh.ru/inner_webhook/x");
    }
}
