use std::sync::{Arc, OnceLock};

use anyhow::Result;
use futures::future::join_all;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{config::SETTINGS, error::AgentError, util::http};

static TELEGRAM: Lazy<Arc<OnceLock<Telegram>>> = Lazy::new(|| Arc::new(OnceLock::new()));

struct Telegram {
    send_message_url: String,
}

impl Telegram {
    pub fn new() -> Self {
        Self {
            send_message_url: format!(
                "https://api.telegram.org/bot{}/sendMessage",
                SETTINGS.bot.telegram.token
            ),
        }
    }

    /// Fan the message out to every configured chat, first error wins.
    pub async fn send(&self, message: &str) -> Result<()> {
        let futures: Vec<_> = SETTINGS
            .bot
            .telegram
            .chat_ids
            .iter()
            .map(|id| self.send_message(SendMessageRequest::new(*id, message)))
            .collect();

        join_all(futures)
            .await
            .into_iter()
            .find(|res| res.is_err())
            .unwrap_or_else(|| Ok(()))
    }

    async fn send_message(&self, payload: SendMessageRequest<'_>) -> Result<()> {
        let response = http::post_use_json::<SendMessageRequest, SendMessageResponse>(
            &self.send_message_url,
            None,
            Some(&payload),
        )
        .await
        .map_err(|err| AgentError::DeliveryError(format!("{:?}", err)))?;

        if !response.ok {
            return Err(AgentError::DeliveryError(
                response
                    .description
                    .unwrap_or_else(|| "chat API returned ok=false".to_string()),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Telegram {
    fn default() -> Self {
        Self::new()
    }
}

fn get_client() -> Result<&'static Telegram> {
    ensure_credentials()?;

    Ok(TELEGRAM.get_or_init(Telegram::new))
}

/// Missing delivery credentials short-circuit before any network call.
pub fn ensure_credentials() -> Result<()> {
    let telegram = &SETTINGS.bot.telegram;

    if telegram.token.is_empty() {
        return Err(AgentError::MissingCredentials("telegram token is not configured".to_string()).into());
    }

    if telegram.chat_ids.is_empty() {
        return Err(AgentError::MissingCredentials("no telegram chat id is configured".to_string()).into());
    }

    Ok(())
}

#[derive(Serialize, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
    result: Option<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    message_id: i64,
}

#[derive(Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

impl<'a> SendMessageRequest<'a> {
    pub fn new(chat_id: i64, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest { chat_id, text }
    }
}

pub async fn send(msg: &str) -> Result<()> {
    get_client()?.send(msg).await
}

#[cfg(test)]
mod tests {
    use std::env;

    use crate::logging;

    use super::*;

    #[test]
    fn test_parse_send_message_response() {
        let body = r#"{"ok": false, "description": "Unauthorized"}"#;
        let response: SendMessageResponse = serde_json::from_str(body).unwrap();

        assert!(!response.ok);
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_send_message() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 test_send_message".to_string());
        let msg = format!(
            "test_send_message \r\nRust OS/Arch: {}/{}\r\n",
            env::consts::OS,
            env::consts::ARCH
        );

        if let Err(why) = send(&msg).await {
            logging::debug_file_async(format!("Failed to send because {:?}", why));
        }

        logging::debug_file_async("結束 test_send_message".to_string());
    }
}
