use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Semaphore;

use crate::{logging::Logger, util};

/// A semaphore for limiting concurrent requests.
///
/// 限制最多 5 個並發請求，避免被目標網站封禁。
static SEMAPHORE: Lazy<Semaphore> = Lazy::new(|| Semaphore::new(5));

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        util::ensure_rustls_crypto_provider();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(30))
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== HTTP/2 =====
            // 讓 reqwest 自動協商協議版本，Telegram 對 HTTP/2 幀大小有特殊要求
            .http2_keep_alive_interval(Duration::from_secs(30))
            .http2_keep_alive_timeout(Duration::from_secs(10))
            .http2_keep_alive_while_idle(true)
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and deserializes the JSON response into the specified type.
pub async fn get_json<RES: DeserializeOwned>(url: &str) -> Result<RES> {
    get_response(url, None)
        .await?
        .json::<RES>()
        .await
        .map_err(|e| anyhow!("Error parsing response JSON: {:?}", e))
}

pub async fn get_response(url: &str, headers: Option<header::HeaderMap>) -> Result<Response> {
    send(Method::GET, url, headers, None::<fn(_) -> _>).await
}

/// Performs an HTTP GET request and returns the response as text.
pub async fn get(url: &str, headers: Option<header::HeaderMap>) -> Result<String> {
    get_response(url, headers)
        .await?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Performs an HTTP POST request with JSON request and response, and specified headers.
pub async fn post_use_json<REQ, RES>(
    url: &str,
    headers: Option<header::HeaderMap>,
    req: Option<&REQ>,
) -> Result<RES>
where
    REQ: Serialize,
    RES: DeserializeOwned,
{
    let res = send(
        Method::POST,
        url,
        headers,
        Some(
            |rb: RequestBuilder| {
                if let Some(r) = req {
                    rb.json(r)
                } else {
                    rb
                }
            },
        ),
    )
    .await?;

    let res_body = res
        .text()
        .await
        .map_err(|e| anyhow!("Error reading response body: {}", e))?;

    serde_json::from_str(&res_body)
        .map_err(|e| anyhow!("Error parsing response JSON({}): {:?}", &res_body, e))
}

/// HTTP 請求失敗時的最大重試次數。
const MAX_RETRIES: usize = 2;

/// Sends an HTTP request using the specified method, URL, headers, and body with retries on failure.
///
/// This function will attempt to send the request up to MAX_RETRIES times. If a
/// request attempt fails, it logs the error and retries the request after a
/// delay. The delay increases with each attempt.
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb = client.request(method, url);
    let mut last_error = String::new();

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    for attempt in 1..=MAX_RETRIES {
        let msg = format!("Attempt {} to send {}", attempt, visit_log);
        let rb_clone = rb
            .try_clone()
            .ok_or_else(|| anyhow!("Failed to clone RequestBuilder"))?;
        let permit = SEMAPHORE.acquire().await;
        let start = Instant::now();
        let res = rb_clone.send().await;
        let elapsed = start.elapsed().as_millis();

        // 請求延遲，避免被目標網站封禁
        tokio::time::sleep(Duration::from_millis(300)).await;
        drop(permit);

        match res {
            Ok(response) => {
                LOGGER.info(format!("{} {} ms", msg, elapsed));
                return Ok(response);
            }
            Err(why) => {
                last_error = format!("{:?}", why);
                LOGGER.error(format!("{} failed because {:?}. {} ms", msg, why, elapsed));
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt as u32))).await;

                    continue;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to send request to {} after {} attempts; last error: {}",
        url,
        MAX_RETRIES,
        last_error
    ))
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_get() {
        match get("https://httpbin.org/ip", None).await {
            Ok(body) => {
                logging::debug_file_async(format!("request_get:{:?}", body));
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to get because {:?}", why));
            }
        }
    }
}
