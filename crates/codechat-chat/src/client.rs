//! Outbound question requests.
//!
//! Two encodings, selected by attachment presence:
//! - no attachment: JSON `{"prompt": ..}` to the text endpoint, or
//!   `{"question": ..}` to the ask endpoint, depending on configuration;
//! - attachment: multipart form with a `question` field and a `file` part
//!   posted to the ask endpoint.
//!
//! Every endpoint answers with `{"answer": ".."}`. Any non-2xx status is a
//! failure whatever the body says.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use codechat_core::config::{ServerConfig, TextEncoding};
use codechat_core::error::CodechatError;
use codechat_core::types::Attachment;

use crate::error::ChatError;

/// One question, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskRequest {
    Text {
        question: String,
    },
    WithAttachment {
        question: String,
        attachment: Attachment,
    },
}

impl AskRequest {
    pub fn new(question: String, attachment: Option<Attachment>) -> Self {
        match attachment {
            Some(attachment) => AskRequest::WithAttachment {
                question,
                attachment,
            },
            None => AskRequest::Text { question },
        }
    }

    pub fn question(&self) -> &str {
        match self {
            AskRequest::Text { question } | AskRequest::WithAttachment { question, .. } => question,
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            AskRequest::Text { .. } => None,
            AskRequest::WithAttachment { attachment, .. } => Some(attachment),
        }
    }
}

/// Sends a question and returns the answer text.
#[async_trait]
pub trait AskClient: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize)]
struct PromptBody<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct QuestionBody<'a> {
    question: &'a str,
}

/// Response body shared by every endpoint. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerBody {
    pub answer: String,
}

/// [`AskClient`] talking to the backend over HTTP.
///
/// No timeout is applied: a request that never completes leaves its
/// placeholder pending.
#[derive(Debug, Clone)]
pub struct HttpAskClient {
    client: Client,
    server: ServerConfig,
}

impl HttpAskClient {
    pub fn new(server: ServerConfig) -> Result<Self, CodechatError> {
        let client = Client::builder()
            .user_agent(concat!("codechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CodechatError::Http(e.to_string()))?;
        Ok(Self::with_client(client, server))
    }

    pub fn with_client(client: Client, server: ServerConfig) -> Self {
        Self { client, server }
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    async fn send_text(&self, question: &str) -> Result<reqwest::Response, ChatError> {
        let request = match self.server.text_encoding {
            TextEncoding::Prompt => self
                .client
                .post(self.server.endpoint(&self.server.ask_text_path))
                .json(&PromptBody { prompt: question }),
            TextEncoding::Question => self
                .client
                .post(self.server.endpoint(&self.server.ask_path))
                .json(&QuestionBody { question }),
        };
        Ok(request.send().await?)
    }

    async fn send_multipart(
        &self,
        question: &str,
        attachment: &Attachment,
    ) -> Result<reqwest::Response, ChatError> {
        let bytes = tokio::fs::read(&attachment.path).await.map_err(|e| {
            ChatError::Attachment(format!("{}: {}", attachment.path.display(), e))
        })?;
        tracing::debug!(
            file_name = %attachment.file_name,
            size = bytes.len(),
            "Attaching file"
        );

        let part = Part::bytes(bytes)
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.mime_type())
            .map_err(|e| ChatError::Attachment(e.to_string()))?;
        let form = Form::new()
            .text("question", question.to_string())
            .part("file", part);

        Ok(self
            .client
            .post(self.server.endpoint(&self.server.ask_path))
            .multipart(form)
            .send()
            .await?)
    }
}

#[async_trait]
impl AskClient for HttpAskClient {
    async fn ask(&self, request: &AskRequest) -> Result<String, ChatError> {
        let response = match request {
            AskRequest::Text { question } => self.send_text(question).await?,
            AskRequest::WithAttachment {
                question,
                attachment,
            } => self.send_multipart(question, attachment).await?,
        };

        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %response.url(), "Backend responded");
        if !status.is_success() {
            return Err(ChatError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_answer(&body)
    }
}

/// Extract the answer text from a response body.
pub fn parse_answer(body: &[u8]) -> Result<String, ChatError> {
    serde_json::from_slice::<AnswerBody>(body)
        .map(|b| b.answer)
        .map_err(|e| ChatError::InvalidResponse(e.to_string()))
}
