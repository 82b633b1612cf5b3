/// Outbound HTTP plumbing shared by the feed fetcher and webhook delivery.
///
/// `HttpFetch` is the seam the fetcher depends on, so tests can serve the
/// feed from memory instead of the network.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FeedError;

const USER_AGENT: &str = concat!("wxwarn_service/", env!("CARGO_PKG_VERSION"));

/// Builds a blocking client with the service user agent and a request
/// timeout, so a hung endpoint cannot stall a fetch or a delivery worker.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Retrieves a text body from a URL.
pub trait HttpFetch: Send + Sync {
    fn get_text(&self, url: &str) -> Result<String, FeedError>;
}

/// `HttpFetch` over reqwest's blocking client.
pub struct ReqwestFetch {
    client: Client,
}

impl ReqwestFetch {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

impl HttpFetch for ReqwestFetch {
    fn get_text(&self, url: &str) -> Result<String, FeedError> {
        let transport = |e: reqwest::Error| FeedError::Transport {
            url: url.to_string(),
            details: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(transport)
    }
}
