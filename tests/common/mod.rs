#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coursewatch::db::MIGRATOR;
use coursewatch::error::AppError;
use coursewatch::portal::{PortalResponse, Transport};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub const LANDING: &str = "https://portal.test/";

pub enum Page {
    Html(String),
    Status(u16),
    Unreachable,
}

/// In-memory portal recording every requested URL.
#[derive(Default)]
pub struct FakePortal {
    pages: Mutex<HashMap<String, Page>>,
    requests: Mutex<Vec<String>>,
}

impl FakePortal {
    pub fn set(&self, url: &str, page: Page) {
        self.pages.lock().unwrap().insert(url.to_string(), page);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Serves a listing at `course_url` whose newest post links to `detail_url`.
    pub fn announce(&self, course_url: &str, detail_url: &str, title: &str, at: DateTime<Utc>, paragraphs: &[&str]) {
        self.set(course_url, Page::Html(listing(title, detail_url, at)));
        self.set(detail_url, Page::Html(detail(paragraphs)));
    }
}

#[async_trait]
impl Transport for FakePortal {
    async fn get(&self, url: &str) -> Result<PortalResponse, AppError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(Page::Html(body)) => Ok(PortalResponse {
                url: url.to_string(),
                status: 200,
                body: body.clone(),
            }),
            Some(Page::Status(status)) => Ok(PortalResponse {
                url: url.to_string(),
                status: *status,
                body: String::new(),
            }),
            Some(Page::Unreachable) | None => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused: {}", url),
            ))),
        }
    }
}

pub fn listing(title: &str, detail_url: &str, at: DateTime<Utc>) -> String {
    format!(
        r#"<html><body>
            <time data-timestamp="1">now</time>
            <a class="w-100 h-100 d-block" title="{title}" href="{detail_url}"></a>
            <time data-timestamp="{ts}">posted</time>
        </body></html>"#,
        ts = at.timestamp()
    )
}

pub fn detail(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(r#"<div class="post-content-container">{}</div>"#, body)
}

pub fn logged_in_page() -> String {
    r#"<nav><span class="usertext mr-1">Test Student</span></nav>"#.to_string()
}

pub async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn seed_course(
    db: &SqlitePool,
    short_name: &str,
    url: &str,
    news: Option<(&str, &str, DateTime<Utc>)>,
) {
    sqlx::query("INSERT INTO COURSE_NEWS (name, short_name, url, news, message, news_date) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(format!("Course {}", short_name))
        .bind(short_name)
        .bind(url)
        .bind(news.map(|n| n.0))
        .bind(news.map(|n| n.1))
        .bind(news.map(|n| n.2.naive_utc()))
        .execute(db)
        .await
        .expect("Failed to seed course");
}
