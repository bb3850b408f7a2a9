use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{AskOptions, QueryGateway, QueryResult};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::ask::{AskRequest, AskResponse};
use crate::models::breach::{EmailCheckRequest, EmailCheckResponse};
use crate::models::mode::Mode;

/// JSON-over-HTTP client for the Shield Mate API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("HTTP client error: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, cancel: &CancellationToken) -> AppResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let url = self.endpoint(path);
        log::debug!("POST {}", url);

        let request = async {
            let resp = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| AppError::Transport(format!("HTTP request error: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(AppError::Http {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                });
            }

            let text = resp
                .text()
                .await
                .map_err(|e| AppError::Transport(format!("Read body error: {e}")))?;
            Ok(serde_json::from_str::<R>(&text)?)
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("POST {} cancelled", url);
                Err(AppError::Cancelled)
            }
            result = request => result,
        }
    }
}

#[async_trait]
impl QueryGateway for HttpGateway {
    async fn ask(
        &self,
        mode: Mode,
        text: &str,
        options: &AskOptions,
        cancel: &CancellationToken,
    ) -> AppResult<QueryResult> {
        if mode.is_breach_check() {
            let body = EmailCheckRequest {
                question: text.to_string(),
                email: None,
                with_ai: true,
                include_unverified: options.include_unverified,
                truncate: options.truncate,
                domain: options.domain.clone(),
            };
            let resp: EmailCheckResponse = self
                .post_json(&format!("/ask/{}", mode.key()), &body, cancel)
                .await?;
            log::info!("Breach check returned {} breaches", resp.count);
            Ok(QueryResult::BreachCheck(resp))
        } else {
            let body = AskRequest { q: text.to_string() };
            let resp: AskResponse = self
                .post_json(&format!("/ask/{}", mode.key()), &body, cancel)
                .await?;
            log::info!(
                "Answer received for {} (model={:?})",
                mode,
                resp.model.as_deref().unwrap_or("unknown")
            );
            Ok(QueryResult::Text(resp))
        }
    }

    async fn health(&self) -> AppResult<bool> {
        let resp = self
            .client
            .get(self.endpoint("/healthz"))
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("HTTP request error: {e}")))?;

        if !resp.status().is_success() {
            return Ok(false);
        }
        let body: HealthResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Read body error: {e}")))?;
        Ok(body.ok)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    async fn ask_handler(
        State(seen): State<Seen>,
        Path(mode): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        seen.lock().unwrap().push((mode.clone(), body.clone()));
        match mode.as_str() {
            "emailbreached" => Json(json!({
                "email": body["question"],
                "count": 3,
                "breaches": [
                    {"Name": "A", "Title": "A", "Domain": "a.com", "BreachDate": "2020-01-01",
                     "AddedDate": "2020-02-01", "PwnCount": 10, "DataClasses": ["Passwords"],
                     "IsVerified": true, "IsSensitive": false}
                ],
                "ai_summary": "Rotate your passwords."
            }))
            .into_response(),
            "cybersec" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            _ if body["q"] == "odd status" => {
                (StatusCode::from_u16(599).unwrap(), "??").into_response()
            }
            "wifisec" => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!({"answer": "too late"})).into_response()
            }
            _ => Json(json!({
                "topic": mode,
                "answer": "looks fine",
                "model": "gpt-4.1-mini",
                "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
            }))
            .into_response(),
        }
    }

    async fn serve() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/ask/:mode", post(ask_handler))
            .route("/healthz", get(|| async { Json(json!({"ok": true})) }))
            .with_state(Arc::clone(&seen));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/"), seen)
    }

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_text_mode_posts_q() {
        let (base, seen) = serve().await;
        let gw = gateway(&base);

        let result = gw
            .ask(Mode::Phishing, "is this link safe?", &AskOptions::default(), &CancellationToken::new())
            .await
            .unwrap();

        let QueryResult::Text(resp) = result else {
            panic!("expected text answer");
        };
        assert_eq!(resp.answer, "looks fine");
        assert_eq!(resp.model.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(resp.usage.and_then(|u| u.total_tokens), Some(7));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "phishng");
        assert_eq!(seen[0].1, json!({"q": "is this link safe?"}));
    }

    #[tokio::test]
    async fn test_breach_mode_posts_question() {
        let (base, seen) = serve().await;
        let gw = gateway(&base);
        let options = AskOptions {
            include_unverified: true,
            truncate: false,
            domain: Some("a.com".into()),
        };

        let result = gw
            .ask(Mode::EmailBreached, "me@example.com", &options, &CancellationToken::new())
            .await
            .unwrap();

        let QueryResult::BreachCheck(resp) = result else {
            panic!("expected breach result");
        };
        assert_eq!(resp.email, "me@example.com");
        assert_eq!(resp.count, 3);
        assert_eq!(resp.breaches[0].domain.as_deref(), Some("a.com"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "emailbreached");
        assert_eq!(
            seen[0].1,
            json!({
                "question": "me@example.com",
                "email": null,
                "with_ai": true,
                "include_unverified": true,
                "truncate": false,
                "domain": "a.com"
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base, _) = serve().await;
        let err = gateway(&base)
            .ask(Mode::GeneralSecurity, "help", &AskOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_unregistered_status_has_fallback_text() {
        let (base, _) = serve().await;
        let err = gateway(&base)
            .ask(Mode::Phishing, "odd status", &AskOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 599 Unknown");
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let (base, _) = serve().await;
        let gw = gateway(&base);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = gw
            .ask(Mode::WifiSecurity, "router?", &AskOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _) = serve().await;
        assert!(gateway(&base).health().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{addr}"))
            .ask(Mode::Phishing, "hi", &AskOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }
}
