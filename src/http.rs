use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy)]
pub(crate) struct FetchConfig {
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) attempts: usize,
    pub(crate) retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

enum FetchFailure {
    // Worth another attempt: 408/429/5xx or a transport-level error.
    Transient(String),
    Fatal(String),
}

/// Fetches `url` as text with `Cache-Control: no-store`, so intermediary
/// caches never serve a stale catalog. Transient failures are retried per
/// `config`; hard client errors fail immediately.
pub(crate) fn get_text_no_store(
    url: &str,
    query: &[(String, String)],
    config: FetchConfig,
) -> Result<String> {
    let attempts = config.attempts.max(1);
    let mut last_failure = String::new();

    for attempt in 1..=attempts {
        match fetch_once(url, query, config) {
            Ok(body) => return Ok(body),
            Err(FetchFailure::Fatal(reason)) => {
                return Err(anyhow!("request failed: {reason}"));
            }
            Err(FetchFailure::Transient(reason)) => {
                last_failure = reason;
                if attempt < attempts {
                    thread::sleep(config.retry_delay);
                }
            }
        }
    }

    Err(anyhow!(
        "request failed after {attempts} attempt(s): {last_failure}"
    ))
}

fn fetch_once(
    url: &str,
    query: &[(String, String)],
    config: FetchConfig,
) -> Result<String, FetchFailure> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout_read(config.read_timeout)
        .timeout_write(config.read_timeout)
        .build();

    let mut request = agent.get(url).set("Cache-Control", "no-store");
    for (key, value) in query {
        request = request.query(key, value);
    }

    match request.call() {
        Ok(response) => response
            .into_string()
            .map_err(|err| FetchFailure::Fatal(format!("response decode failed: {err}"))),
        Err(ureq::Error::Status(status, response)) => {
            let reason = describe_status(status, response);
            if is_transient_status(status) {
                Err(FetchFailure::Transient(reason))
            } else {
                Err(FetchFailure::Fatal(reason))
            }
        }
        Err(ureq::Error::Transport(err)) => {
            Err(FetchFailure::Transient(format!("transport error: {err}")))
        }
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

fn describe_status(status: u16, response: ureq::Response) -> String {
    let body = response.into_string().unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP status {status}")
    } else {
        let excerpt = body.chars().take(240).collect::<String>();
        format!("HTTP status {status} ({excerpt})")
    }
}
