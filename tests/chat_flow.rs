use std::fs;

use pdf_chat_lib::commands::{chat, documents, AppState, CommandError};
use pdf_chat_lib::config::ProviderKind;
use pdf_chat_lib::llm::LlmError;
use pdf_chat_lib::{AppSettings, Role, Session};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one HTTP request with a canned response and hand back the
/// request body that was received.
async fn one_shot_server(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length: usize = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string()
    });

    (format!("http://{addr}/v1"), handle)
}

fn state_for(base_url: String) -> AppState {
    let state = AppState::new(AppSettings {
        provider: ProviderKind::OpenAi,
        model: "gpt-test".into(),
        openai_api_key: Some("sk-test".into()),
        openai_base_url: base_url,
        request_timeout_secs: 10,
        ..AppSettings::default()
    })
    .unwrap();
    // Keep a proxy configured in the environment away from the local stub
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    AppState { client, ..state }
}

#[tokio::test]
async fn test_ask_sends_document_context_and_records_turns() {
    let (base_url, server) = one_shot_server(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"  It is about otters.  "}}]}"#,
    )
    .await;
    let state = state_for(base_url);
    let mut session = Session::new(&state.settings).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("otters.txt");
    fs::write(&path, "Otters   hold hands\nwhile sleeping.").unwrap();
    let report = documents::process_documents(&state, &mut session, &[path]);
    assert_eq!(report.loaded.len(), 1);

    let answer = chat::ask(&state, &mut session, "What is this about?")
        .await
        .unwrap();
    assert_eq!(answer, "It is about otters.");

    let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(sent["model"], "gpt-test");
    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(
        messages[1]["content"],
        "PDF Content:\n\n[Page 1]\nOtters hold hands while sleeping."
    );
    assert_eq!(messages[2]["content"], "What is this about?");

    let history = session.history.get_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].content, "It is about otters.");
}

#[tokio::test]
async fn test_failed_request_leaves_history_untouched() {
    let (base_url, server) = one_shot_server("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let state = state_for(base_url);
    let mut session = Session::new(&state.settings).unwrap();

    let err = chat::ask(&state, &mut session, "Anyone there?")
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(
        err,
        CommandError::Llm(LlmError::Api { status: 500, .. })
    ));
    assert_eq!(err.user_message(), "Error: model service returned status 500");
    assert!(session.history.is_empty());
}

#[tokio::test]
async fn test_unreachable_service_is_a_connect_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = state_for(format!("http://{addr}/v1"));
    let mut session = Session::new(&state.settings).unwrap();

    let err = chat::ask(&state, &mut session, "Hello?").await.unwrap_err();
    assert!(matches!(err, CommandError::Llm(LlmError::Connect(_))));
    assert!(err.user_message().contains("ollama serve"));
}
