use anyhow::{anyhow, Result};
use reqwest::header;
use serde::{Deserialize, Serialize};

use crate::{config::SETTINGS, error::AgentError, logging, util::http};

/// 行情解讀失敗時插入訊息的替代字串，與真正的解讀明顯區隔
pub const UNAVAILABLE_PLACEHOLDER: &str = "(market commentary unavailable)";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: Option<String>,
}

/// 請文字生成服務解讀今日行情
///
/// Best-effort, a single call bounded by the shared HTTP timeout. Any failure
/// comes back as a visibly distinct placeholder string so the pipeline still
/// delivers a message, never as a crash.
pub async fn generate_explanation(summary_text: &str) -> String {
    match request_explanation(summary_text).await {
        Ok(text) => text,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to narrative::generate_explanation because {:?}",
                why
            ));
            UNAVAILABLE_PLACEHOLDER.to_string()
        }
    }
}

async fn request_explanation(summary_text: &str) -> Result<String> {
    let narrative = &SETTINGS.narrative;
    if narrative.api_key.is_empty() {
        return Err(AgentError::NarrativeServiceError("api key is not configured".to_string()).into());
    }

    let prompt = build_prompt(summary_text);
    let payload = ChatCompletionRequest {
        model: &narrative.model,
        messages: vec![ChatMessage {
            role: "user",
            content: &prompt,
        }],
        max_tokens: 150,
    };

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", narrative.api_key))
            .map_err(|why| anyhow!("Failed to build authorization header because {:?}", why))?,
    );

    let response = http::post_use_json::<ChatCompletionRequest, ChatCompletionResponse>(
        &narrative.api_url,
        Some(headers),
        Some(&payload),
    )
    .await?;

    if let Some(why) = response.error {
        return Err(AgentError::NarrativeServiceError(
            why.message.unwrap_or_else(|| "unknown error".to_string()),
        )
        .into());
    }

    response
        .choices
        .and_then(|mut choices| {
            if choices.is_empty() {
                None
            } else {
                choices.remove(0).message.content
            }
        })
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            AgentError::NarrativeServiceError("response contains no generated text".to_string())
                .into()
        })
}

fn build_prompt(summary_text: &str) -> String {
    format!(
        "Today's Indian stock market summary:\n{}\n\nWrite a 3-4 line brief explanation of why the market was positive or negative today.",
        summary_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt("Sensex: 80049.67, positive by 263.82 points (0.33%)");
        assert!(prompt.contains("Sensex: 80049.67"));
        assert!(prompt.contains("3-4 line"));
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{"error": {"message": "Incorrect API key provided"}}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();

        assert!(response.choices.is_none());
        assert_eq!(
            response.error.unwrap().message.as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[test]
    fn test_parse_completion_payload() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": " Markets rose on banking strength. "}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let content = response.choices.unwrap().remove(0).message.content.unwrap();

        assert_eq!(content.trim(), "Markets rose on banking strength.");
    }

    #[tokio::test]
    #[ignore]
    async fn test_generate_explanation() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 generate_explanation".to_string());

        let text = generate_explanation(
            "Sensex: 80049.67, positive by 263.82 points (0.33%)\nNifty 50: 24374.05, positive by 91.85 points (0.38%)",
        )
        .await;
        dbg!(&text);

        logging::debug_file_async("結束 generate_explanation".to_string());
    }
}
