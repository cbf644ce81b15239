use std::sync::Arc;

use crate::error::FetchFailure;
use crate::models::FetchedAnnouncement;
use crate::portal::{NewsMarkup, PortalResponse, Transport};

/// Retrieves the newest announcement of a course: one request for the
/// listing, one for the detail page.
pub struct AnnouncementFetcher {
    transport: Arc<dyn Transport>,
    markup: Arc<dyn NewsMarkup>,
}

impl AnnouncementFetcher {
    pub fn new(transport: Arc<dyn Transport>, markup: Arc<dyn NewsMarkup>) -> Self {
        Self { transport, markup }
    }

    pub async fn fetch(&self, course_url: &str) -> Result<FetchedAnnouncement, FetchFailure> {
        let listing = self.get(course_url).await?;
        let entry = self.markup.parse_listing(&listing.body, &listing.url)?;

        let detail = self.get(&entry.detail_url).await?;
        let body_text = self.markup.parse_body(&detail.body)?;

        Ok(FetchedAnnouncement {
            title: entry.title,
            body_text,
            timestamp: entry.timestamp,
        })
    }

    async fn get(&self, url: &str) -> Result<PortalResponse, FetchFailure> {
        let response = self
            .transport
            .get(url)
            .await
            .map_err(|e| FetchFailure::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(FetchFailure::Network(format!("HTTP {} from {}", response.status, url)));
        }

        Ok(response)
    }
}
