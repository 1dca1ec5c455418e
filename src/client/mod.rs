pub mod http;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use self::http::HttpChatClient;

#[derive(Serialize, Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}

/// What the endpoint answered when the exchange itself went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Reply(Option<String>),
    AppError {
        status: u16,
        body: String,
    },
}

/// The exchange did not complete: unreachable host, aborted request or a
/// success body that could not be decoded.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, message: &str) -> Result<ReplyOutcome, TransportError>;

    fn endpoint(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint_url: String,
    pub timeout: Option<Duration>,
}

pub fn new_client(
    config: &ClientConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = HttpChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_single_message_field() {
        let body = serde_json::to_string(&ChatRequest { message: "hello".into() }).unwrap();
        assert_eq!(body, r#"{"message":"hello"}"#);
    }

    #[test]
    fn response_without_reply_parses_as_none() {
        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.reply, None);
        let resp: ChatResponse = serde_json::from_str(r#"{"reply":"hi there"}"#).unwrap();
        assert_eq!(resp.reply.as_deref(), Some("hi there"));
    }

    #[test]
    fn rejects_invalid_endpoint_url() {
        let config = ClientConfig {
            endpoint_url: "not a url".into(),
            timeout: None,
        };
        assert!(new_client(&config).is_err());
    }
}
