use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE } };
use std::error::Error as StdError;
use url::Url;

use super::{ ChatClient, ChatRequest, ChatResponse, ClientConfig, ReplyOutcome, TransportError };

pub struct HttpChatClient {
    http: HttpClient,
    url: Url,
}

impl HttpChatClient {
    pub fn new(
        endpoint_url: &str,
        timeout: Option<std::time::Duration>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let url = Url::parse(endpoint_url)
            .map_err(|e| format!("Invalid chat endpoint URL '{}': {}", endpoint_url, e))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(&config.endpoint_url, config.timeout)
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, message: &str) -> Result<ReplyOutcome, TransportError> {
        let req = ChatRequest {
            message: message.to_string(),
        };

        let resp = self.http.post(self.url.clone()).json(&req).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await?;
            warn!("Chat endpoint returned {}: {}", status, body);
            return Ok(ReplyOutcome::AppError {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.json::<ChatResponse>().await?;
        debug!("Chat endpoint replied ({} chars)", body.reply.as_deref().map_or(0, str::len));
        Ok(ReplyOutcome::Reply(body.reply))
    }

    fn endpoint(&self) -> String {
        self.url.to_string()
    }
}
