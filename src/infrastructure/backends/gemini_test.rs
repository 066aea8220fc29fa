use anyhow::bail;
use anyhow::Result;
use serde_json::json;
use test_utils::blocked_body_fixture;
use test_utils::completion_body_fixture;

use super::parse_reply;
use super::Candidate;
use super::CandidateContent;
use super::CompletionResponse;
use super::ContentPart;
use super::Gemini;
use super::Model;
use super::ModelListResponse;
use crate::domain::models::Author;
use crate::domain::models::Backend;
use crate::domain::models::BackendError;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Message;

impl Gemini {
    fn with_url(url: String) -> Gemini {
        return Gemini {
            url,
            token: "abc".to_string(),
            model: "model-1".to_string(),
            timeout: "200".to_string(),
        };
    }
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/model-1?key=abc")
        .with_status(200)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/model-1?key=abc")
        .with_status(500)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks_without_a_token() {
    let backend = Gemini {
        url: "http://localhost:3000".to_string(),
        token: "".to_string(),
        model: "model-1".to_string(),
        timeout: "200".to_string(),
    };

    let res = backend.health_check().await;
    assert!(res.is_err());
}

#[tokio::test]
async fn it_lists_models() -> Result<()> {
    let body = serde_json::to_string(&ModelListResponse {
        models: vec![
            Model {
                name: "first".to_string(),
                supported_generation_methods: vec!["generateContent".to_string()],
            },
            Model {
                name: "second".to_string(),
                supported_generation_methods: vec!["generateContent".to_string()],
            },
            Model {
                name: "embedder".to_string(),
                supported_generation_methods: vec!["embedContent".to_string()],
            },
        ],
    })?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models?key=abc")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.list_models().await?;
    mock.assert();

    assert_eq!(res, vec!["first".to_string(), "second".to_string()]);

    return Ok(());
}

#[tokio::test]
async fn it_gets_completions() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .match_body(mockito::Matcher::Json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hello"}]}
            ]
        })))
        .with_status(200)
        .with_body(completion_body_fixture())
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Hello")]);
    let res = backend.get_completion(prompt).await;

    mock.assert();
    assert_eq!(res.unwrap(), "Hi there");

    return Ok(());
}

#[tokio::test]
async fn it_serializes_the_full_history() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .match_body(mockito::Matcher::Json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hello"}]},
                {"role": "model", "parts": [{"text": "Hi there"}]},
                {"role": "user", "parts": [{"text": "How are you?"}]}
            ]
        })))
        .with_status(200)
        .with_body(completion_body_fixture())
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![
        Message::new(Author::User, "Hello"),
        Message::new(Author::Model, "Hi there"),
        Message::new(Author::User, "How are you?"),
    ]);
    backend.get_completion(prompt).await.unwrap();

    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_surfaces_blocked_content_as_a_reply() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(200)
        .with_body(blocked_body_fixture())
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Tell me a secret")]);
    let res = backend.get_completion(prompt).await.unwrap();

    mock.assert();
    insta::assert_snapshot!(res, @"[Response Blocked] The content may have violated safety policies. Reason: SAFETY");

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_when_the_response_has_no_text() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(200)
        .with_body("{\"candidates\": []}")
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Hello")]);
    let res = backend.get_completion(prompt).await.unwrap();

    mock.assert();
    insta::assert_snapshot!(res, @"No response text found from the AI.");

    return Ok(());
}

#[tokio::test]
async fn it_classifies_endpoint_errors_with_a_provider_message() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(500)
        .with_body("{\"error\": {\"message\": \"quota exceeded\"}}")
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Hi")]);
    let err = backend.get_completion(prompt).await.unwrap_err();

    mock.assert();
    match err {
        BackendError::Endpoint { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "quota exceeded");
        }
        _ => bail!("Wrong error variant"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_classifies_endpoint_errors_without_a_provider_message() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(503)
        .with_body("temporarily unavailable")
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Hi")]);
    let err = backend.get_completion(prompt).await.unwrap_err();

    mock.assert();
    match err {
        BackendError::Endpoint { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "API Error: Status 503");
        }
        _ => bail!("Wrong error variant"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_classifies_decode_errors() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(200)
        .with_body("definitely not json")
        .create();

    let backend = Gemini::with_url(server.url());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Hi")]);
    let err = backend.get_completion(prompt).await.unwrap_err();

    mock.assert();
    match err {
        BackendError::Decode(_) => {}
        _ => bail!("Wrong error variant"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_classifies_transport_errors() -> Result<()> {

    // Nothing listens on this port.
    let backend = Gemini::with_url("http://127.0.0.1:1".to_string());
    let prompt = BackendPrompt::new(vec![Message::new(Author::User, "Hi")]);
    let err = backend.get_completion(prompt).await.unwrap_err();

    match err {
        BackendError::Transport(_) => {}
        _ => bail!("Wrong error variant"),
    }

    return Ok(());
}

#[test]
fn it_parses_the_same_body_to_the_same_reply() {
    let res = CompletionResponse {
        candidates: vec![Candidate {
            content: Some(CandidateContent {
                parts: vec![ContentPart {
                    text: "Hi there".to_string(),
                }],
            }),
            finish_reason: Some("STOP".to_string()),
        }],
    };

    assert_eq!(parse_reply(res.clone()), "Hi there");
    assert_eq!(parse_reply(res.clone()), parse_reply(res));
}

#[test]
fn it_prefers_candidate_text_over_the_finish_reason() {
    let res = CompletionResponse {
        candidates: vec![Candidate {
            content: Some(CandidateContent {
                parts: vec![ContentPart {
                    text: "Partial answer".to_string(),
                }],
            }),
            finish_reason: Some("MAX_TOKENS".to_string()),
        }],
    };

    assert_eq!(parse_reply(res), "Partial answer");
}

#[test]
fn it_reports_the_finish_reason_when_the_text_is_empty() {
    let res = CompletionResponse {
        candidates: vec![Candidate {
            content: Some(CandidateContent { parts: vec![] }),
            finish_reason: Some("RECITATION".to_string()),
        }],
    };

    insta::assert_snapshot!(parse_reply(res), @"[Response Blocked] The content may have violated safety policies. Reason: RECITATION");
}

#[test]
fn it_falls_back_on_a_normal_stop_with_no_text() {
    let res = CompletionResponse {
        candidates: vec![Candidate {
            content: None,
            finish_reason: Some("STOP".to_string()),
        }],
    };

    insta::assert_snapshot!(parse_reply(res), @"No response text found from the AI.");
}
