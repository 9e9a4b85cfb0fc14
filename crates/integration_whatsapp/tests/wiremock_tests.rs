//! Integration tests for WhatsApp client using WireMock
//!
//! These tests mock the Meta Graph API to verify request shapes, headers and
//! status mapping without making actual API calls.

use domain::{MessageContent, OutboundMessage, PhoneNumber, ReplyButton};
use integration_whatsapp::{WhatsAppClient, WhatsAppClientConfig, WhatsAppError};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, header_exists, method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

const MESSAGES_PATH: &str = "/v18.0/123456789/messages";

fn test_config(base_url: &str) -> WhatsAppClientConfig {
    WhatsAppClientConfig {
        api_url: base_url.to_string(),
        access_token: "test_access_token".to_string(),
        phone_number_id: "123456789".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn client_for(server: &MockServer) -> WhatsAppClient {
    WhatsAppClient::new(test_config(&server.uri())).expect("Failed to create client")
}

fn recipient() -> PhoneNumber {
    PhoneNumber::new("+49 123 456 7890").unwrap()
}

fn text(body: &str) -> OutboundMessage {
    OutboundMessage::text(recipient(), body).unwrap()
}

/// Sample success response for a send
fn send_message_success_response() -> serde_json::Value {
    json!({
        "messaging_product": "whatsapp",
        "contacts": [{
            "input": "491234567890",
            "wa_id": "491234567890"
        }],
        "messages": [{
            "id": "wamid.HBgNNDkxMjM0NTY3ODkwFQIAERgSMEQ3RkE2NTYxQTY5MTlBMjJBAA=="
        }]
    })
}

/// Sample API error response
fn api_error_response(code: i32, message: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "type": "OAuthException",
            "fbtrace_id": "AbcDefGhiJkL"
        }
    })
}

// =============================================================================
// Send Message Tests
// =============================================================================

#[tokio::test]
async fn send_text_posts_expected_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(header("authorization", "Bearer test_access_token"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": "491234567890",
            "type": "text",
            "text": {"body": "Hello from tests"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(send_message_success_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .send(&text("Hello from tests"))
        .await
        .unwrap();

    assert_eq!(response.messaging_product, "whatsapp");
    assert_eq!(response.wa_id(), Some("491234567890"));
    assert!(response.message_id().unwrap().starts_with("wamid."));
}

#[tokio::test]
async fn send_includes_api_key_header_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(header("x-api-key", "gateway-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(send_message_success_response()))
        .expect(1)
        .mount(&server)
        .await;

    let config = WhatsAppClientConfig {
        api_key: Some("gateway-key".to_string()),
        ..test_config(&server.uri())
    };
    let client = WhatsAppClient::new(config).unwrap();

    assert!(client.send(&text("hi")).await.is_ok());
}

#[tokio::test]
async fn send_image_posts_media_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(body_partial_json(json!({
            "type": "image",
            "image": {"link": "https://example.com/cat.png", "caption": "A cat"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(send_message_success_response()))
        .expect(1)
        .mount(&server)
        .await;

    let message = OutboundMessage::new(
        recipient(),
        MessageContent::Image {
            link: "https://example.com/cat.png".to_string(),
            caption: Some("A cat".to_string()),
        },
    )
    .unwrap();

    assert!(client_for(&server).send(&message).await.is_ok());
}

#[tokio::test]
async fn send_buttons_posts_interactive_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(body_partial_json(json!({
            "type": "interactive",
            "interactive": {
                "type": "button",
                "body": {"text": "Continue?"},
                "action": {"buttons": [{"type": "reply", "reply": {"id": "go", "title": "Go"}}]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(send_message_success_response()))
        .expect(1)
        .mount(&server)
        .await;

    let message = OutboundMessage::new(
        recipient(),
        MessageContent::Buttons {
            body: "Continue?".to_string(),
            buttons: vec![ReplyButton {
                id: "go".to_string(),
                title: "Go".to_string(),
            }],
            header: None,
            footer: None,
        },
    )
    .unwrap();

    assert!(client_for(&server).send(&message).await.is_ok());
}

#[tokio::test]
async fn send_template_posts_template_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(body_partial_json(json!({
            "type": "template",
            "template": {"name": "hello_world", "language": {"code": "en_US"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(send_message_success_response()))
        .expect(1)
        .mount(&server)
        .await;

    let message = OutboundMessage::new(
        recipient(),
        MessageContent::Template {
            name: "hello_world".to_string(),
            language: "en_US".to_string(),
            parameters: vec![],
        },
    )
    .unwrap();

    assert!(client_for(&server).send(&message).await.is_ok());
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(api_error_response(190, "Invalid OAuth access token.")),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).send(&text("hi")).await;
    match result {
        Err(WhatsAppError::Authentication(message)) => {
            assert_eq!(message, "Invalid OAuth access token.");
        },
        other => panic!("Expected Authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_maps_to_not_found_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(api_error_response(803, "Unknown phone number id")),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).send(&text("hi")).await;
    assert!(matches!(result, Err(WhatsAppError::NotFound(_))));
}

#[tokio::test]
async fn bad_request_carries_vendor_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(api_error_response(
                131_009,
                "(#131009) Parameter value is not valid",
            )),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).send(&text("hi")).await;
    match result {
        Err(WhatsAppError::BadRequest(message)) => {
            assert!(message.contains("Parameter value is not valid"));
        },
        other => panic!("Expected BadRequest error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_api_error_with_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let result = client_for(&server).send(&text("hi")).await;
    match result {
        Err(WhatsAppError::Api { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream unavailable");
        },
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_without_json_keeps_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("plain failure"))
        .mount(&server)
        .await;

    let result = client_for(&server).send(&text("hi")).await;
    match result {
        Err(WhatsAppError::BadRequest(message)) => assert_eq!(message, "plain failure"),
        other => panic!("Expected BadRequest error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client_for(&server).send(&text("hi")).await;
    assert!(matches!(result, Err(WhatsAppError::Serialization(_))));
}

// =============================================================================
// Availability Tests
// =============================================================================

#[tokio::test]
async fn is_available_uses_business_profile_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v18.0/123456789/whatsapp_business_profile"))
        .and(query_param("fields", "about,address,description,vertical"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{}]})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).is_available().await);
}

#[tokio::test]
async fn is_available_false_on_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v18.0/123456789/whatsapp_business_profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!client_for(&server).is_available().await);
}

#[tokio::test]
async fn is_available_false_when_unreachable() {
    let config = test_config("http://127.0.0.1:1");
    let client = WhatsAppClient::new(config).unwrap();
    assert!(!client.is_available().await);
}
