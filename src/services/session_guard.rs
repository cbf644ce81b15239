use tracing::info;

use crate::error::AppError;
use crate::portal::{NewsMarkup, Transport};

/// Confirms once, before polling, that the portal accepts the session.
pub async fn validate(
    transport: &dyn Transport,
    markup: &dyn NewsMarkup,
    landing_url: &str,
) -> Result<(), AppError> {
    let response = transport
        .get(landing_url)
        .await
        .map_err(|e| AppError::SessionRejected(e.to_string()))?;

    if !response.is_success() || !markup.is_authenticated(&response.body) {
        return Err(AppError::SessionRejected(format!(
            "no logged-in user on {} (HTTP {})",
            landing_url, response.status
        )));
    }

    info!("Logged in successfully.");
    Ok(())
}
