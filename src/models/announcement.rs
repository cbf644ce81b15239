use chrono::{DateTime, Utc};

/// The latest announcement as it currently appears on the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAnnouncement {
    pub title: String,
    pub body_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Renders `02 March 2024 09:00` style dates for the audit log.
pub fn format_news_date(date: &DateTime<Utc>) -> String {
    date.format("%d %B %Y %H:%M").to_string()
}
