use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_PORTAL_URL: &str = "https://courses.finki.ukim.mk";
pub const DEFAULT_COOKIE_NAME: &str = "MoodleSession";

/// How the session cookie is obtained before polling starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    File,
    Browser,
}

impl FromStr for AuthMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(AuthMode::File),
            "browser" => Ok(AuthMode::Browser),
            other => Err(AppError::Config(format!("unknown AUTH_MODE: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    pub cookie_name: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BrowserLoginConfig {
    pub login_url: String,
    pub username: String,
    pub password: String,
    pub chrome_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub portal: PortalConfig,
    pub auth_mode: AuthMode,
    pub session_file: PathBuf,
    pub poll_delay: Duration,
    pub max_cycles: Option<u64>,
    pub log_dir: PathBuf,
    pub acknowledge_fatal: bool,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("PORTAL_URL").unwrap_or_else(|_| DEFAULT_PORTAL_URL.to_string());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://database.db".to_string()),
            portal: PortalConfig {
                base_url,
                cookie_name: env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string()),
                request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
            },
            auth_mode: match env::var("AUTH_MODE") {
                Ok(mode) => mode.parse()?,
                Err(_) => AuthMode::File,
            },
            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| "session.txt".to_string())
                .into(),
            poll_delay: Duration::from_secs(parse_var("POLL_DELAY_SECS", 30)?),
            max_cycles: optional_var("MAX_CYCLES")?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()).into(),
            acknowledge_fatal: parse_var("ACKNOWLEDGE_FATAL", true)?,
        })
    }

    /// Credentials for the browser front-end; only required in browser mode.
    pub fn browser_login(&self) -> Result<BrowserLoginConfig, AppError> {
        let username = env::var("PORTAL_USERNAME")
            .map_err(|_| AppError::MissingCredential("PORTAL_USERNAME is not set".to_string()))?;
        let password = env::var("PORTAL_PASSWORD")
            .map_err(|_| AppError::MissingCredential("PORTAL_PASSWORD is not set".to_string()))?;
        let login_url = env::var("PORTAL_LOGIN_URL")
            .unwrap_or_else(|_| format!("{}/login/index.php", self.portal.base_url.trim_end_matches('/')));

        Ok(BrowserLoginConfig {
            login_url,
            username,
            password,
            chrome_path: env::var("CHROME_PATH").ok().filter(|s| !s.is_empty()).map(PathBuf::from),
        })
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    Ok(optional_var(key)?.unwrap_or(default))
}

fn optional_var<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mode_parses_case_insensitively() {
        assert_eq!("File".parse::<AuthMode>().unwrap(), AuthMode::File);
        assert_eq!(" browser ".parse::<AuthMode>().unwrap(), AuthMode::Browser);
        assert!("cookie-jar".parse::<AuthMode>().is_err());
    }
}
