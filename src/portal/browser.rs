//! Interactive login through a headless Chromium.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::{info, warn};

use crate::config::BrowserLoginConfig;
use crate::error::AppError;
use crate::portal::session::{SessionCookie, SessionProvider};

const USERNAME_FIELD: &str = "#username";
const PASSWORD_FIELD: &str = "#password";
const SUBMIT_BUTTON: &str = "button[type=submit], input[type=submit]";

pub struct BrowserSessionProvider {
    config: BrowserLoginConfig,
    cookie_name: String,
}

impl BrowserSessionProvider {
    pub fn new(config: BrowserLoginConfig, cookie_name: impl Into<String>) -> Self {
        Self {
            config,
            cookie_name: cookie_name.into(),
        }
    }

    async fn login(&self, browser: &Browser) -> Result<SessionCookie, AppError> {
        let page = browser.new_page(self.config.login_url.as_str()).await.map_err(browser_error)?;

        page.find_element(USERNAME_FIELD)
            .await
            .map_err(browser_error)?
            .click()
            .await
            .map_err(browser_error)?
            .type_str(&self.config.username)
            .await
            .map_err(browser_error)?;

        page.find_element(PASSWORD_FIELD)
            .await
            .map_err(browser_error)?
            .click()
            .await
            .map_err(browser_error)?
            .type_str(&self.config.password)
            .await
            .map_err(browser_error)?;

        page.find_element(SUBMIT_BUTTON)
            .await
            .map_err(browser_error)?
            .click()
            .await
            .map_err(browser_error)?;

        page.wait_for_navigation().await.map_err(browser_error)?;

        let cookies = page.get_cookies().await.map_err(browser_error)?;
        cookies
            .into_iter()
            .find(|c| c.name == self.cookie_name)
            .map(|c| SessionCookie {
                name: c.name,
                value: c.value,
            })
            .ok_or_else(|| {
                AppError::MissingCredential(format!("no {} cookie after browser login", self.cookie_name))
            })
    }
}

fn browser_error(e: impl std::fmt::Display) -> AppError {
    AppError::Browser(e.to_string())
}

#[async_trait]
impl SessionProvider for BrowserSessionProvider {
    async fn acquire(&self) -> Result<SessionCookie, AppError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(AppError::Browser)?;

        let (mut browser, mut handler) = Browser::launch(browser_config).await.map_err(browser_error)?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!("Logging in through browser at {}", self.config.login_url);
        let result = self.login(&browser).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = browser.wait().await;
        events.abort();

        result
    }
}
