use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::error::AppError;

#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Produces the portal session credential before polling starts.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn acquire(&self) -> Result<SessionCookie, AppError>;
}

/// Reads a session value pasted from a logged-in browser into a text file.
pub struct FileSessionProvider {
    path: PathBuf,
    cookie_name: String,
}

impl FileSessionProvider {
    pub fn new(path: impl Into<PathBuf>, cookie_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for FileSessionProvider {
    async fn acquire(&self) -> Result<SessionCookie, AppError> {
        let missing = || {
            AppError::MissingCredential(format!(
                "File {} not found. Please create the file with {} value.",
                self.path.display(),
                self.cookie_name
            ))
        };

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|_| missing())?;

        let value = raw.trim();
        if value.is_empty() {
            return Err(missing());
        }

        info!("Loaded session cookie from {}", self.path.display());

        Ok(SessionCookie {
            name: self.cookie_name.clone(),
            value: value.to_string(),
        })
    }
}
