//! Tests for `DeepLClient` against a local axum server standing in for the DeepL API.

#![cfg(feature = "mcp-server")]

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use deepl_mcp::clients::deepl::DeepLClient;
use deepl_mcp::config::DeepLConfig;
use deepl_mcp::provider::{
    DocumentHandle, DocumentState, ProviderError, TranslateOptions, TranslationProvider,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;

const KEY: &str = "test-key:fx";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("DeepL-Auth-Key {}", KEY))
        .unwrap_or(false)
}

async fn translate(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::FORBIDDEN, Json(json!({"message": "Wrong endpoint"})));
    }
    if body["target_lang"] == json!("XX") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Bad request", "detail": "Value for 'target_lang' not supported."})),
        );
    }
    if body["target_lang"] == json!("QQ") {
        return (StatusCode::from_u16(456).unwrap(), Json(json!({"message": "Quota exceeded"})));
    }
    let translations: Vec<Value> = body["text"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            json!({
                "detected_source_language": "EN",
                "text": format!("{}:{}", body["target_lang"].as_str().unwrap(), t.as_str().unwrap()),
            })
        })
        .collect();
    (StatusCode::OK, Json(json!({ "translations": translations })))
}

async fn languages(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    if query.get("type").map(String::as_str) == Some("target") {
        Json(json!([
            {"language": "DE", "name": "German", "supports_formality": true},
            {"language": "JA", "name": "Japanese", "supports_formality": false}
        ]))
    } else {
        Json(json!([{"language": "EN", "name": "English"}]))
    }
}

async fn document_status(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["document_key"], json!("key-1"));
    Json(json!({"document_id": id, "status": "done", "billed_characters": 42}))
}

async fn start_api() -> String {
    let app = Router::new()
        .route("/v2/translate", post(translate))
        .route("/v2/languages", get(languages))
        .route(
            "/v2/usage",
            get(|| async { Json(json!({"character_count": 180118, "character_limit": 1250000})) }),
        )
        .route(
            "/v2/glossary-language-pairs",
            get(|| async {
                Json(json!({"supported_languages": [{"source_lang": "de", "target_lang": "en"}]}))
            }),
        )
        .route("/v2/document/{id}", post(document_status))
        .route(
            "/v2/document/{id}/result",
            post(|| async { "übersetzt".as_bytes().to_vec() }),
        );

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{}", addr)
}

async fn client() -> DeepLClient {
    let url = start_api().await;
    DeepLClient::new(DeepLConfig::new(KEY).with_server_url(url)).unwrap()
}

#[tokio::test]
async fn test_connect_checks_usage() {
    let url = start_api().await;
    let client = DeepLClient::connect(DeepLConfig::new(KEY).with_server_url(url))
        .await
        .unwrap();
    let usage = client.usage().await.unwrap();
    assert_eq!(usage.character.count, 180118);
    assert_eq!(usage.character.finite_limit(), Some(1250000));
    assert!(usage.document.is_none());
}

#[tokio::test]
async fn test_translate_batch_preserves_order() {
    let client = client().await;
    let texts = vec!["one".to_string(), "two".to_string()];

    let results = client
        .translate_batch(&texts, &TranslateOptions::new("DE"))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "DE:one");
    assert_eq!(results[1].text, "DE:two");
    assert_eq!(results[1].detected_source_lang, "EN");
}

#[tokio::test]
async fn test_wrong_key_maps_to_authorization_error() {
    let url = start_api().await;
    let client = DeepLClient::new(DeepLConfig::new("bogus").with_server_url(url)).unwrap();

    let err = client
        .translate_text("Hi", &TranslateOptions::new("DE"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Authorization("Wrong endpoint".into()));
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let client = client().await;

    let bad = client
        .translate_text("Hi", &TranslateOptions::new("XX"))
        .await
        .unwrap_err();
    assert_eq!(
        bad.to_string(),
        "Provider error (HTTP 400): Bad request, Value for 'target_lang' not supported."
    );

    let quota = client
        .translate_text("Hi", &TranslateOptions::new("QQ"))
        .await
        .unwrap_err();
    assert_eq!(quota, ProviderError::QuotaExceeded("Quota exceeded".into()));
}

#[tokio::test]
async fn test_language_catalogues() {
    let client = client().await;

    let sources = client.source_languages().await.unwrap();
    assert_eq!(sources[0].code, "EN");
    assert_eq!(sources[0].supports_formality, None);

    let targets = client.target_languages().await.unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].supports_formality, Some(true));

    let pairs = client.glossary_languages().await.unwrap();
    assert_eq!(pairs[0].source_lang, "de");
}

#[tokio::test]
async fn test_document_status_and_download() {
    let client = client().await;
    let handle = DocumentHandle {
        document_id: "doc-1".into(),
        document_key: "key-1".into(),
    };

    let status = client.document_status(&handle).await.unwrap();
    assert_eq!(status.state, DocumentState::Done);
    assert_eq!(status.billed_characters, Some(42));

    let bytes = client.download_document(&handle).await.unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "übersetzt");
}
