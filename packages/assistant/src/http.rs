//! HTTP client wrapper for the model servers.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AssistantError, Result};

/// User agent string identifying this assistant.
const USER_AGENT: &str = concat!("asisten-hukum/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts for transient failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Create a configured HTTP client.
pub fn create_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Pull a readable message out of an error body.
///
/// Both Ollama (`{"error": "..."}`) and OpenAI (`{"error": {"message": "..."}}`)
/// wrap their messages differently; anything else is returned verbatim.
fn error_message(body: String) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) else {
        return body;
    };
    match value.get("error") {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(error) => error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or(body),
        None => body,
    }
}

/// POST a JSON body and decode the JSON response, with retry logic.
///
/// Uses exponential backoff for transient failures (connection errors,
/// timeouts, 5xx responses). Client errors (4xx) fail immediately.
pub async fn post_json<B, T>(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let mut request = client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    let text = response.text().await.unwrap_or_default();
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("server error {status}: {}", error_message(text)));
                    continue;
                }

                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(AssistantError::ApiError {
                        status: status.as_u16(),
                        message: error_message(text),
                    });
                }

                return response
                    .json::<T>()
                    .await
                    .map_err(|e| AssistantError::ResponseParse(e.to_string()));
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(AssistantError::Http(e));
            }
        }
    }

    Err(AssistantError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        assert!(create_client(5).is_ok());
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error":"model 'x' not found"}"#.to_string()),
            "model 'x' not found"
        );
        assert_eq!(
            error_message(r#"{"error":{"message":"Incorrect API key","type":"invalid"}}"#.to_string()),
            "Incorrect API key"
        );
        assert_eq!(error_message("Bad Gateway".to_string()), "Bad Gateway");
    }
}
