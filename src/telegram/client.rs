use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::*;

const API_BASE: &str = "https://api.telegram.org";

/// Sends one banner photo with caption and buttons to a chat.
#[async_trait]
pub trait PhotoSender {
    async fn send_photo(
        &self,
        chat_id: &str,
        photo_url: &str,
        caption: Option<&str>,
        keyboard: &InlineKeyboard,
    ) -> Result<()>;
}

/// Bot API client, built once per run from the bot token.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(API_BASE, bot_token, timeout_secs)
    }

    pub fn with_base_url(api_base: &str, bot_token: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        })
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("HTTP POST {} failed", method))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", method, status, body);
        }
        let parsed: TgResponse<T> = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Failed to parse {} response", method))?;
        if !parsed.ok {
            bail!(
                "{} rejected: {}",
                method,
                parsed.description.unwrap_or_else(|| "no description".into())
            );
        }
        parsed
            .result
            .with_context(|| format!("{} returned ok without a result", method))
    }
}

/// Empty captions are dropped rather than sent as "".
pub fn effective_caption(caption: Option<&str>) -> Option<&str> {
    caption.filter(|c| !c.trim().is_empty())
}

#[async_trait]
impl PhotoSender for TelegramClient {
    async fn send_photo(
        &self,
        chat_id: &str,
        photo_url: &str,
        caption: Option<&str>,
        keyboard: &InlineKeyboard,
    ) -> Result<()> {
        let caption = effective_caption(caption);
        let req = SendPhotoRequest {
            chat_id,
            photo: photo_url,
            caption,
            parse_mode: caption.map(|_| "HTML"),
            reply_markup: keyboard,
        };
        let msg: TgMessage = self.post("sendPhoto", &req).await?;
        debug!(message_id = msg.message_id, chat_id, "Photo sent");
        Ok(())
    }
}
