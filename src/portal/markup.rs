//! Portal-specific HTML extraction.
//!
//! Everything that depends on the portal's current markup lives here, behind
//! [`NewsMarkup`], so a markup change never reaches change detection or
//! storage. The Moodle rules below are inherited from observation of the
//! live site and are not guaranteed by the portal.

use chrono::{DateTime, Utc};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, FetchFailure};

/// The most recent entry on a course's news listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub detail_url: String,
    pub timestamp: DateTime<Utc>,
}

pub trait NewsMarkup: Send + Sync {
    /// Locate the newest announcement on a listing page.
    fn parse_listing(&self, html: &str, page_url: &str) -> Result<ListingEntry, FetchFailure>;

    /// Extract the announcement body from its detail page.
    fn parse_body(&self, html: &str) -> Result<String, FetchFailure>;

    /// Whether a landing page was rendered for a logged-in user.
    fn is_authenticated(&self, html: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct MarkupSelectors {
    pub entry_link: String,
    pub timestamp: String,
    /// Which `timestamp` match carries the announcement date.
    pub timestamp_index: usize,
    pub timestamp_attr: String,
    pub content: String,
    pub paragraph: String,
    pub login_marker: String,
}

impl Default for MarkupSelectors {
    fn default() -> Self {
        Self {
            entry_link: "a.w-100.h-100.d-block".to_string(),
            timestamp: "time".to_string(),
            timestamp_index: 1,
            timestamp_attr: "data-timestamp".to_string(),
            content: "div.post-content-container".to_string(),
            paragraph: "p".to_string(),
            login_marker: "span.usertext.mr-1".to_string(),
        }
    }
}

pub struct MoodleMarkup {
    entry_link: Selector,
    timestamp: Selector,
    timestamp_index: usize,
    timestamp_attr: String,
    content: Selector,
    paragraph: Selector,
    login_marker: Selector,
}

impl MoodleMarkup {
    pub fn new(selectors: &MarkupSelectors) -> Result<Self, AppError> {
        Ok(Self {
            entry_link: compile(&selectors.entry_link)?,
            timestamp: compile(&selectors.timestamp)?,
            timestamp_index: selectors.timestamp_index,
            timestamp_attr: selectors.timestamp_attr.clone(),
            content: compile(&selectors.content)?,
            paragraph: compile(&selectors.paragraph)?,
            login_marker: compile(&selectors.login_marker)?,
        })
    }

    fn parse_timestamp(&self, document: &Html) -> Result<DateTime<Utc>, FetchFailure> {
        let element = document
            .select(&self.timestamp)
            .nth(self.timestamp_index)
            .ok_or_else(|| FetchFailure::Parse(format!("timestamp element #{} not found", self.timestamp_index)))?;

        let raw = element
            .value()
            .attr(&self.timestamp_attr)
            .ok_or_else(|| FetchFailure::Parse(format!("timestamp element has no {}", self.timestamp_attr)))?;

        epoch_to_utc(raw)
    }
}

fn compile(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::Config(format!("invalid selector {:?}: {:?}", selector, e)))
}

/// Epoch seconds, possibly fractional, truncated to whole seconds.
fn epoch_to_utc(raw: &str) -> Result<DateTime<Utc>, FetchFailure> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FetchFailure::Parse(format!("malformed timestamp: {}", raw)))?;

    if !seconds.is_finite() {
        return Err(FetchFailure::Parse(format!("malformed timestamp: {}", raw)));
    }

    DateTime::from_timestamp(seconds.trunc() as i64, 0)
        .ok_or_else(|| FetchFailure::Parse(format!("timestamp out of range: {}", raw)))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl NewsMarkup for MoodleMarkup {
    fn parse_listing(&self, html: &str, page_url: &str) -> Result<ListingEntry, FetchFailure> {
        let document = Html::parse_document(html);

        let link = document
            .select(&self.entry_link)
            .next()
            .ok_or_else(|| FetchFailure::Parse("no announcement link on listing".to_string()))?;

        let title = link
            .value()
            .attr("title")
            .ok_or_else(|| FetchFailure::Parse("announcement link has no title".to_string()))?
            .to_string();

        let href = link
            .value()
            .attr("href")
            .ok_or_else(|| FetchFailure::Parse("announcement link has no href".to_string()))?;

        let detail_url = Url::parse(page_url)
            .and_then(|base| base.join(href))
            .map_err(|e| FetchFailure::Parse(format!("bad announcement link {}: {}", href, e)))?
            .to_string();

        let timestamp = self.parse_timestamp(&document)?;

        Ok(ListingEntry {
            title,
            detail_url,
            timestamp,
        })
    }

    fn parse_body(&self, html: &str) -> Result<String, FetchFailure> {
        let document = Html::parse_document(html);

        let container = document
            .select(&self.content)
            .next()
            .ok_or_else(|| FetchFailure::Parse("post content container not found".to_string()))?;

        let paragraphs: Vec<String> = container.select(&self.paragraph).map(text_of).collect();

        Ok(paragraphs.join("\n"))
    }

    fn is_authenticated(&self, html: &str) -> bool {
        Html::parse_document(html)
            .select(&self.login_marker)
            .next()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <time data-timestamp="1700000000">header clock</time>
          <div class="discussion">
            <a class="w-100 h-100 d-block" title="Midterm moved" href="/mod/forum/discuss.php?d=42"></a>
            <time data-timestamp="1709287200.5">1 March</time>
          </div>
          <a class="w-100 h-100 d-block" title="Older post" href="/mod/forum/discuss.php?d=41"></a>
        </body></html>
    "#;

    fn markup() -> MoodleMarkup {
        MoodleMarkup::new(&MarkupSelectors::default()).unwrap()
    }

    #[test]
    fn listing_uses_first_link_and_second_timestamp() {
        let entry = markup()
            .parse_listing(LISTING, "https://portal.test/mod/forum/view.php?id=7")
            .unwrap();

        assert_eq!(entry.title, "Midterm moved");
        assert_eq!(entry.detail_url, "https://portal.test/mod/forum/discuss.php?d=42");
        assert_eq!(entry.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn listing_without_second_timestamp_is_a_parse_failure() {
        let html = r#"<a class="w-100 h-100 d-block" title="x" href="/x"></a><time data-timestamp="1"></time>"#;
        let err = markup().parse_listing(html, "https://portal.test/").unwrap_err();
        assert!(matches!(err, FetchFailure::Parse(_)));
    }

    #[test]
    fn malformed_timestamp_is_a_parse_failure() {
        let html = r#"<a class="w-100 h-100 d-block" title="x" href="/x"></a>
            <time data-timestamp="1"></time><time data-timestamp="soon"></time>"#;
        let err = markup().parse_listing(html, "https://portal.test/").unwrap_err();
        assert_eq!(err, FetchFailure::Parse("malformed timestamp: soon".to_string()));
    }

    #[test]
    fn body_joins_paragraphs_in_order() {
        let html = r#"
            <p>outside</p>
            <div class="post-content-container">
              <p>  Room changed to A1 </p>
              <div><p>Bring your <b>ID</b>.</p></div>
            </div>
        "#;
        assert_eq!(markup().parse_body(html).unwrap(), "Room changed to A1\nBring your ID.");
    }

    #[test]
    fn body_without_container_fails() {
        assert!(markup().parse_body("<p>hi</p>").is_err());
    }

    #[test]
    fn login_marker_detection() {
        let markup = markup();
        assert!(markup.is_authenticated(r#"<span class="usertext mr-1">Jane Doe</span>"#));
        assert!(!markup.is_authenticated(r#"<a href="/login/index.php">Log in</a>"#));
    }
}
