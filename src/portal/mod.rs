pub mod markup;
pub mod session;

#[cfg(feature = "browser")]
pub mod browser;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

use crate::config::PortalConfig;
use crate::error::AppError;
use crate::portal::session::SessionCookie;

pub use markup::{ListingEntry, MoodleMarkup, NewsMarkup};
pub use session::{FileSessionProvider, SessionProvider};

const USER_AGENT: &str = concat!("coursewatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// An HTTP transport already carrying the portal session credential.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PortalResponse, AppError>;
}

pub struct PortalClient {
    client: Client,
}

impl PortalClient {
    pub fn new(config: &PortalConfig, cookie: &SessionCookie) -> Result<Self, AppError> {
        let cookie_header = HeaderValue::from_str(&cookie.header_value())
            .map_err(|e| AppError::MissingCredential(format!("session cookie is not a valid header: {}", e)))?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie_header);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for PortalClient {
    async fn get(&self, url: &str) -> Result<PortalResponse, AppError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        tracing::debug!("GET {} -> {}", url, status);

        Ok(PortalResponse {
            url: final_url,
            status,
            body,
        })
    }
}
