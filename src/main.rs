use std::sync::Arc;

use tracing::error;

use coursewatch::config::{AppConfig, AuthMode};
use coursewatch::error::AppError;
use coursewatch::logging;
use coursewatch::portal::markup::MarkupSelectors;
use coursewatch::portal::{FileSessionProvider, MoodleMarkup, PortalClient, SessionProvider};
use coursewatch::services::{NewsPoller, shutdown_on};
use coursewatch::db;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match AppConfig::new_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let log_guard = match logging::init(&config.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to set up logging: {}", e);
            std::process::exit(1);
        }
    };

    let Err(e) = run(&config).await else {
        log_guard.finish();
        return;
    };

    error!("An error occurred. Reason: {}", e);
    if e.is_fatal() && config.acknowledge_fatal {
        acknowledge().await;
    }
    log_guard.finish();

    let code = e.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
}

async fn run(config: &AppConfig) -> Result<(), AppError> {
    let provider = session_provider(config)?;
    let cookie = provider.acquire().await?;

    let transport = Arc::new(PortalClient::new(&config.portal, &cookie)?);
    let markup = Arc::new(MoodleMarkup::new(&MarkupSelectors::default())?);
    let pool = db::connect(&config.database_url).await?;

    let poller = NewsPoller::new(pool.clone(), transport, markup, &config.portal.base_url, config.poll_delay)
        .with_max_cycles(config.max_cycles);

    let result = poller
        .start(shutdown_on(tokio::signal::ctrl_c()))
        .await;

    pool.close().await;
    result.map(|_| ())
}

fn session_provider(config: &AppConfig) -> Result<Box<dyn SessionProvider>, AppError> {
    match config.auth_mode {
        AuthMode::File => Ok(Box::new(FileSessionProvider::new(
            &config.session_file,
            &config.portal.cookie_name,
        ))),
        #[cfg(feature = "browser")]
        AuthMode::Browser => Ok(Box::new(coursewatch::portal::browser::BrowserSessionProvider::new(
            config.browser_login()?,
            &config.portal.cookie_name,
        ))),
        #[cfg(not(feature = "browser"))]
        AuthMode::Browser => Err(AppError::Config(
            "AUTH_MODE=browser requires building with the `browser` feature".to_string(),
        )),
    }
}

async fn acknowledge() {
    eprintln!("Press Enter to exit...");
    let _ = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)
    })
    .await;
}
