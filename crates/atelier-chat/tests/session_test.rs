use atelier_chat::{ChatError, ChatOrchestrator, ChatSession, TitleGenerator};
use atelier_context::ThreadContext;
use atelier_llm::{ClientFactory, Content, PollinationsConfig};
use atelier_persist::{ChatMessage, MemoryThreadStore, ThreadStore};
use mockito::{Matcher, ServerGuard};
use serde_json::json;
use std::sync::Arc;

struct Harness {
    store: Arc<MemoryThreadStore>,
    context: Arc<ThreadContext>,
    session: ChatSession,
}

async fn harness(server: &ServerGuard) -> Harness {
    let client = ClientFactory::create_chat_client(
        PollinationsConfig::new().with_base_url(server.url()),
    )
    .unwrap();
    let store = Arc::new(MemoryThreadStore::new());
    let context = Arc::new(ThreadContext::load(store.clone(), None).await.unwrap());
    let session = ChatSession::new(
        context.clone(),
        ChatOrchestrator::new(client.clone()),
        TitleGenerator::new(client),
    );
    Harness {
        store,
        context,
        session,
    }
}

async fn mock_chat_reply(server: &mut ServerGuard, reply: &str) -> mockito::Mock {
    server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "max_tokens": 500 })))
        .with_status(200)
        .with_body(json!({ "choices": [{ "message": { "content": reply } }] }).to_string())
        .create_async()
        .await
}

async fn mock_title(server: &mut ServerGuard, title: &str) -> mockito::Mock {
    server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "model": "openai-reasoning" })))
        .with_status(200)
        .with_body(json!({ "choices": [{ "message": { "content": title } }] }).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_send_stores_exchange_and_renames_thread() {
    let mut server = mockito::Server::new_async().await;
    let chat = mock_chat_reply(&mut server, "Paris.").await;
    let title = mock_title(&mut server, "French Capital").await;

    let h = harness(&server).await;
    let id = h.context.create_thread(None).await.unwrap();

    let outcome = h.session.send("  Capital of France?  ", None).await.unwrap();
    assert_eq!(outcome.reply, "Paris.");
    assert_eq!(outcome.thread_id, id);

    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(
        stored.messages,
        vec![
            ChatMessage::user("Capital of France?"),
            ChatMessage::assistant("Paris.")
        ]
    );
    assert_eq!(stored.title, "French Capital");
    assert_eq!(outcome.thread, Some(stored));

    chat.assert_async().await;
    title.assert_async().await;
}

#[tokio::test]
async fn test_not_found_from_completion_leaves_thread_unchanged() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/openai")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let h = harness(&server).await;
    let id = h.context.create_thread(None).await.unwrap();
    let before = h.store.get(&id).await.unwrap().unwrap();

    let err = h.session.send("hello", None).await.unwrap_err();
    assert!(matches!(err, ChatError::Completion(_)));
    assert!(err.to_string().contains("404"));

    assert_eq!(h.store.get(&id).await.unwrap().unwrap(), before);
    assert!(h.context.active_thread().await.unwrap().messages.is_empty());
}

#[tokio::test]
async fn test_attachment_without_text_uses_describe_prompt_and_keeps_title() {
    let mut server = mockito::Server::new_async().await;
    let chat = server
        .mock("POST", "/openai")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""text":"Please describe this image\.""#.to_string()),
            Matcher::Regex(r#""image_url":\{"url":"data:image/png;base64,AA"\}"#.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"A dot."}}]}"#)
        .create_async()
        .await;
    let title = server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "model": "openai-reasoning" })))
        .expect(0)
        .create_async()
        .await;

    let h = harness(&server).await;
    let id = h.context.create_thread(None).await.unwrap();

    h.session
        .send("", Some("data:image/png;base64,AA"))
        .await
        .unwrap();

    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(
        stored.messages[0].content,
        Content::text_with_image("Please describe this image.", "data:image/png;base64,AA")
    );
    assert_eq!(stored.title, "Thread 1");

    chat.assert_async().await;
    title.assert_async().await;
}

#[tokio::test]
async fn test_title_failure_is_ignored() {
    let mut server = mockito::Server::new_async().await;
    mock_chat_reply(&mut server, "Sure.").await;
    server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "model": "openai-reasoning" })))
        .with_status(500)
        .create_async()
        .await;

    let h = harness(&server).await;
    let id = h.context.create_thread(None).await.unwrap();

    let outcome = h.session.send("help me", None).await.unwrap();
    assert_eq!(outcome.reply, "Sure.");
    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Thread 1");
    assert_eq!(stored.messages.len(), 2);
}

#[tokio::test]
async fn test_send_uses_thread_model_and_style() {
    let mut server = mockito::Server::new_async().await;
    let chat = server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "model": "mistral", "max_tokens": 500 })))
        .with_status(200)
        .with_body(r#"{"reply":"ok"}"#)
        .create_async()
        .await;
    mock_title(&mut server, "Mistral Chat").await;

    let h = harness(&server).await;
    h.context.create_thread(None).await.unwrap();
    h.session.set_model("mistral").await.unwrap();
    h.session.set_style("concise").await.unwrap();

    let active = h.context.active_thread().await.unwrap();
    assert_eq!(active.style, "concise");

    h.session.send("hi", None).await.unwrap();
    chat.assert_async().await;
}

#[tokio::test]
async fn test_send_requires_active_thread_and_content() {
    let server = mockito::Server::new_async().await;
    let h = harness(&server).await;

    assert!(matches!(
        h.session.send("hi", None).await,
        Err(ChatError::NoActiveThread)
    ));
    assert!(matches!(
        h.session.set_model("llama").await,
        Err(ChatError::NoActiveThread)
    ));

    h.context.create_thread(None).await.unwrap();
    assert!(matches!(
        h.session.send("   ", None).await,
        Err(ChatError::EmptyMessage)
    ));
}

#[tokio::test]
async fn test_send_to_unknown_thread() {
    let server = mockito::Server::new_async().await;
    let h = harness(&server).await;
    let err = h.session.send_to("ghost", "hi", None).await.unwrap_err();
    assert!(matches!(err, ChatError::ThreadNotFound(id) if id == "ghost"));
}
