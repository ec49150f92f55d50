//! Client for submitting messages to the Webhooker API

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::message::{Message, MessageParts};
use crate::{Config, Result};

/// Response body of a successful `POST /messages` request
#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

/// The API client used to send messages to Webhooker, which relays them to
/// all subscriptions with a matching tenant key
#[derive(Debug, Clone)]
pub struct WebhookerClient {
    config: Config,
    http_client: Client,
}

impl WebhookerClient {
    /// Create a client with default parameters and the specified API key
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self::new(Config::with_key(api_key))
    }

    /// Create a client from a configuration
    pub fn new(config: Config) -> Self {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Send a message to Webhooker
    ///
    /// Finalizes the message (which fails synchronously on validation
    /// violations, before any request is made) and submits it. On success the
    /// server-issued id is written onto `message` itself, so the caller-held
    /// instance reports [`is_sent`](Message::is_sent); the id is also
    /// returned. On failure the message is left unsent and can be sent again
    /// as-is.
    pub async fn send(&self, message: &mut Message) -> Result<String> {
        let payload = message.to_payload()?;
        let url = self.messages_url()?;

        debug!("sending {} message to {}", payload.event_type, url);

        let response = self
            .http_client
            .post(url)
            .header("X-API-Key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if let Err(err) = response.error_for_status_ref() {
            warn!(
                "message submission failed with status {}",
                response.status()
            );
            return Err(err.into());
        }

        let created: CreatedMessage = response.json().await?;
        info!("message accepted with id {}", created.id);
        message.set_id(created.id.clone());

        Ok(created.id)
    }

    /// Hydrate a message from the provided parts and send it, returning the
    /// sent instance
    pub async fn send_parts(&self, parts: MessageParts) -> Result<Message> {
        let mut message = Message::from_parts(parts);
        self.send(&mut message).await?;
        Ok(message)
    }

    /// Get the configuration this client was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn messages_url(&self) -> Result<Url> {
        let url = format!("{}/messages", self.config.domain.trim_end_matches('/'));
        Ok(Url::parse(&url)?)
    }
}
