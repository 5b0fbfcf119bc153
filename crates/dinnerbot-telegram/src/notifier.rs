//! Telegram Bot API delivery.
//!
//! The HTTP client is the outbound channel: it is built by `start()`,
//! shared by every send, and dropped by `close()`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dinnerbot_core::{AppConfig, Notifier, Recommendation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::TelegramError;
use crate::render::{render_recommendation, split_message, MESSAGE_LENGTH_LIMIT};

/// [`Notifier`] that posts to a single Telegram chat.
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    base_url: String,
    timeout: Duration,
    timezone: Tz,
    client: RwLock<Option<Client>>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Creates a notifier from application configuration. Nothing is
    /// validated here; missing credentials make each send fail.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(
            &config.telegram_bot_token,
            &config.telegram_chat_id,
            &config.timezone,
            config.http_timeout_secs,
            &config.telegram_api_base,
        )
    }

    /// Creates a notifier with a custom Bot API base URL.
    #[must_use]
    pub fn with_base_url(
        bot_token: &str,
        chat_id: &str,
        timezone: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Self {
        Self {
            bot_token: bot_token.trim().to_owned(),
            chat_id: chat_id.trim().to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(timeout_secs),
            timezone: timezone.trim().parse::<Tz>().unwrap_or(Tz::UTC),
            client: RwLock::new(None),
        }
    }

    /// Whether `start()` has opened the channel and `close()` has not yet run.
    pub async fn is_started(&self) -> bool {
        self.client.read().await.is_some()
    }

    async fn deliver(&self, text: &str) -> Result<(), TelegramError> {
        if self.bot_token.is_empty() {
            return Err(TelegramError::MissingCredential("TELEGRAM_BOT_TOKEN"));
        }
        if self.chat_id.is_empty() {
            return Err(TelegramError::MissingCredential("TELEGRAM_CHAT_ID"));
        }
        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or(TelegramError::NotStarted)?;

        let chunks = split_message(text, MESSAGE_LENGTH_LIMIT);
        if chunks.is_empty() {
            return Err(TelegramError::EmptyMessage);
        }
        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            self.post_message(&client, chunk).await?;
            tracing::debug!(part = index + 1, total, "telegram: message part delivered");
        }
        Ok(())
    }

    async fn post_message(&self, client: &Client, text: &str) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let response = client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<BotApiResponse>(&body).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            other => Err(TelegramError::Api {
                status: status.as_u16(),
                description: other
                    .and_then(|api| api.description)
                    .unwrap_or_else(|| "unexpected response".to_string()),
            }),
        }
    }
}

impl Notifier for TelegramNotifier {
    type Error = TelegramError;

    async fn start(&self) -> Result<(), TelegramError> {
        let mut slot = self.client.write().await;
        if slot.is_some() {
            return Ok(());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("dinnerbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        *slot = Some(client);
        tracing::info!("telegram: notifier started");
        Ok(())
    }

    async fn close(&self) {
        if self.client.write().await.take().is_some() {
            tracing::info!("telegram: notifier closed");
        }
    }

    async fn send_message(&self, text: &str) -> bool {
        match self.deliver(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "telegram: message delivery failed");
                false
            }
        }
    }

    async fn send_recommendation(&self, recommendation: &Recommendation) -> bool {
        let text = render_recommendation(recommendation, self.now());
        self.send_message(&text).await
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}
