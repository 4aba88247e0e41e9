//! Stub question-answering backend for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use codechat_chat::HttpAskClient;
use codechat_core::config::ServerConfig;

/// A request the stub backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Json {
        path: &'static str,
        body: Value,
    },
    Multipart {
        question: String,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

#[derive(Clone)]
pub struct Backend {
    pub answer: String,
    pub received: Arc<Mutex<Vec<Received>>>,
}

impl Backend {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// `/ask_text` takes JSON, `/ask` takes multipart.
    pub fn multipart_router(&self) -> Router {
        Router::new()
            .route("/ask_text", post(ask_text))
            .route("/ask", post(ask_multipart))
            .with_state(self.clone())
    }

    /// `/ask` takes JSON `{"question": ..}`.
    pub fn question_router(&self) -> Router {
        Router::new()
            .route("/ask", post(ask_question))
            .with_state(self.clone())
    }
}

async fn ask_text(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.received.lock().unwrap().push(Received::Json {
        path: "/ask_text",
        body,
    });
    Json(json!({ "answer": backend.answer }))
}

async fn ask_question(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.received.lock().unwrap().push(Received::Json { path: "/ask", body });
    Json(json!({
        "answer": backend.answer,
        "snippets": ["int main(void)"],
        "files": [{ "path": "lprint.c" }],
    }))
}

async fn ask_multipart(State(backend): State<Backend>, mut multipart: Multipart) -> Json<Value> {
    let mut question = String::new();
    let mut file_name = None;
    let mut content_type = None;
    let mut bytes = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => question = field.text().await.unwrap(),
            "file" => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                bytes = field.bytes().await.unwrap().to_vec();
            }
            _ => {}
        }
    }

    backend.received.lock().unwrap().push(Received::Multipart {
        question,
        file_name,
        content_type,
        bytes,
    });
    Json(json!({ "answer": backend.answer }))
}

/// Router answering every question with `status` and a JSON body.
pub fn status_router(status: StatusCode) -> Router {
    let handler = move || async move { (status, Json(json!({ "answer": "ignored" }))) };
    Router::new()
        .route("/ask_text", post(handler.clone()))
        .route("/ask", post(handler))
}

/// Router answering 200 with a body that is not an answer.
pub fn malformed_router() -> Router {
    Router::new().route(
        "/ask_text",
        post(|| async { Json(json!({ "detail": "no answer here" })) }),
    )
}

/// HTTP client that ignores any proxy set in the environment.
pub fn client(server: ServerConfig) -> HttpAskClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpAskClient::with_client(http, server)
}

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
pub async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
