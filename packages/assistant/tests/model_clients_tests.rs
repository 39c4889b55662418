use asisten_assistant::embeddings::{Embedder, OllamaEmbedder, OpenAiEmbedder};
use asisten_assistant::llm::{LlmClient, LlmRequest, Message, OllamaClient};
use asisten_assistant::{AssistantConfig, AssistantError};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(prompt: &str) -> LlmRequest {
    LlmRequest {
        messages: vec![Message::user(prompt)],
        temperature: 0.3,
    }
}

fn ollama_config(server: &MockServer) -> AssistantConfig {
    AssistantConfig::default().with_ollama_base_url(server.uri())
}

#[tokio::test]
async fn test_ollama_chat_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2:3b",
            "stream": false,
            "options": { "temperature": 0.3 },
            "messages": [{ "role": "user", "content": "Apa itu data pribadi?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2:3b",
            "message": { "role": "assistant", "content": "  Data pribadi adalah...  " },
            "done": true,
            "prompt_eval_count": 42,
            "eval_count": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server)).expect("client creation");
    let response = client
        .complete(&request("Apa itu data pribadi?"))
        .await
        .expect("completion");

    assert_eq!(response.content, "Data pribadi adalah...");
    assert_eq!(response.input_tokens, 42);
    assert_eq!(response.output_tokens, 7);
}

#[tokio::test]
async fn test_ollama_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "model 'x' not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server)).expect("client creation");
    let err = client.complete(&request("halo")).await.unwrap_err();

    match err {
        AssistantError::ApiError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "model 'x' not found");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ollama_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(3)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server)).expect("client creation");
    let err = client.complete(&request("halo")).await.unwrap_err();

    assert!(matches!(
        err,
        AssistantError::RetriesExhausted { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_ollama_empty_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "role": "assistant", "content": "   " },
            "done": true
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&ollama_config(&server)).expect("client creation");
    let err = client.complete(&request("halo")).await.unwrap_err();

    assert!(matches!(err, AssistantError::EmptyResponse));
}

#[tokio::test]
async fn test_ollama_embeddings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "model": "nomic-embed-text",
            "input": ["satu", "dua"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "nomic-embed-text",
            "embeddings": [[1.0, 0.0], [0.0, 1.0]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(&ollama_config(&server)).expect("embedder creation");
    let vectors = embedder
        .embed(&["satu".to_string(), "dua".to_string()])
        .await
        .expect("embeddings");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_ollama_embedding_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [[1.0, 0.0]] })),
        )
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(&ollama_config(&server)).expect("embedder creation");
    let err = embedder
        .embed(&["satu".to_string(), "dua".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::Embedding(_)));
}

#[tokio::test]
async fn test_openai_embeddings_are_reordered() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "text-embedding-3-large" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AssistantConfig::default().with_openai_embeddings(server.uri(), "sk-test");
    let embedder = OpenAiEmbedder::new(&config).expect("embedder creation");
    let vectors = embedder
        .embed(&["satu".to_string(), "dua".to_string()])
        .await
        .expect("embeddings");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_openai_error_message_is_extracted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AssistantConfig::default().with_openai_embeddings(server.uri(), "sk-wrong");
    let embedder = OpenAiEmbedder::new(&config).expect("embedder creation");
    let err = embedder.embed(&["satu".to_string()]).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "model API error (status 401): Incorrect API key provided"
    );
}
