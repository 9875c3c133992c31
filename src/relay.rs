use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::error::FetchError;
use crate::http_client::HttpGet;

/// Cross-origin relay that echoes the target response inside a JSON envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub url: String,
    pub param: String,
    pub field: String,
}

impl RelayConfig {
    pub fn wrap(&self, target: &str) -> Result<String, FetchError> {
        let url = Url::parse_with_params(&self.url, &[(self.param.as_str(), target)])
            .map_err(|err| FetchError::Transport(format!("invalid relay url: {err}")))?;
        Ok(url.into())
    }
}

/// Issues GETs either directly or through a relay, always handing back the
/// origin's body.
#[derive(Clone)]
pub struct Transport {
    http: Arc<dyn HttpGet>,
    relay: Option<RelayConfig>,
}

impl Transport {
    pub fn new(http: Arc<dyn HttpGet>, relay: Option<RelayConfig>) -> Self {
        Self { http, relay }
    }

    pub fn direct(http: Arc<dyn HttpGet>) -> Self {
        Self::new(http, None)
    }

    pub fn fetch_body(&self, target: &str) -> Result<String, FetchError> {
        match &self.relay {
            None => {
                let (status, body) = self.http.get_text(target)?;
                if !(200..300).contains(&status) || status == 204 {
                    return Err(FetchError::from_status(status, body));
                }
                Ok(body)
            }
            Some(relay) => {
                let url = relay.wrap(target)?;
                let (status, body) = self.http.get_text(&url)?;
                if !(200..300).contains(&status) {
                    return Err(FetchError::from_status(status, body));
                }
                unwrap_envelope(&body, &relay.field)
            }
        }
    }
}

/// Extracts the origin body from a relay envelope such as
/// `{"contents": "...", "status": {"http_code": 200}}`.
pub fn unwrap_envelope(raw: &str, field: &str) -> Result<String, FetchError> {
    let root: Value = serde_json::from_str(raw.trim())?;
    let Value::Object(map) = root else {
        return Err(FetchError::Payload(
            "relay envelope is not an object".to_string(),
        ));
    };

    if let Some(code) = map
        .get("status")
        .and_then(|status| status.get("http_code"))
        .and_then(Value::as_u64)
    {
        let code = u16::try_from(code).map_err(|_| {
            FetchError::Payload(format!("relay reported an invalid status code: {code}"))
        })?;
        if !(200..300).contains(&code) || code == 204 {
            let body = map
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(FetchError::from_status(code, body));
        }
    }

    match map.get(field) {
        Some(Value::String(s)) if s.trim().is_empty() => Err(FetchError::NotFound),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(FetchError::NotFound),
        Some(other) => Ok(other.to_string()),
    }
}
