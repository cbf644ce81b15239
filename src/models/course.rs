use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;

use crate::models::FetchedAnnouncement;

/// A monitored course and the last announcement recorded for it.
///
/// `news`, `message` and `news_date` are all `None` until the first
/// announcement is stored, after which they are written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCourse {
    pub id: i64,
    pub name: String,
    pub short_name: String,
    pub url: String,
    pub news: Option<String>,
    pub message: Option<String>,
    pub news_date: Option<DateTime<Utc>>,
}

impl TrackedCourse {
    /// Mirror a committed update into the in-memory record.
    pub fn record(&mut self, announcement: &FetchedAnnouncement) {
        self.news = Some(announcement.title.clone());
        self.message = Some(announcement.body_text.clone());
        self.news_date = Some(announcement.timestamp);
    }
}

/// Row shape of `COURSE_NEWS`. Dates are stored as naive UTC text.
#[derive(Debug, FromRow)]
pub(crate) struct CourseRow {
    pub id: i64,
    pub name: Option<String>,
    pub short_name: String,
    pub url: Option<String>,
    pub news_date: Option<NaiveDateTime>,
    pub news: Option<String>,
    pub message: Option<String>,
}

impl From<CourseRow> for TrackedCourse {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            short_name: row.short_name,
            url: row.url.unwrap_or_default(),
            news: row.news,
            message: row.message,
            news_date: row.news_date.map(|d| d.and_utc()),
        }
    }
}
