use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::error::FetchError;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client; the timeout of the first caller sticks.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// Plain GET returning status code and body text.
pub trait HttpGet: Send + Sync {
    fn get_text(&self, url: &str) -> Result<(u16, String), FetchError>;
}

#[derive(Clone)]
pub struct ReqwestGet {
    client: &'static Client,
}

impl ReqwestGet {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

impl HttpGet for ReqwestGet {
    fn get_text(&self, url: &str) -> Result<(u16, String), FetchError> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok((status, body))
    }
}
