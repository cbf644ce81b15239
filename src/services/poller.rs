use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{debug, error, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::TrackedCourse;
use crate::portal::{NewsMarkup, Transport};
use crate::services::detector::{UpdateDecision, should_update};
use crate::services::fetcher::AnnouncementFetcher;
use crate::services::session_guard;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollStats {
    pub cycles: u64,
    pub checked: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub fetch_failures: usize,
    pub store_failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CourseOutcome {
    Updated,
    Unchanged,
    FetchFailed,
    StoreFailed,
}

impl PollStats {
    fn record(&mut self, outcome: CourseOutcome) {
        self.checked += 1;
        match outcome {
            CourseOutcome::Updated => self.updated += 1,
            CourseOutcome::Unchanged => self.unchanged += 1,
            CourseOutcome::FetchFailed => self.fetch_failures += 1,
            CourseOutcome::StoreFailed => self.store_failures += 1,
        }
    }
}

/// Resolves when `signal` fires. A signal that cannot be installed never
/// resolves, so the poller keeps running instead of stopping at once.
pub async fn shutdown_on<F, E>(signal: F)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = signal.await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Drives fetch, detect and store over every tracked course, forever or
/// until `max_cycles` is reached or the shutdown future resolves.
pub struct NewsPoller {
    db: SqlitePool,
    transport: Arc<dyn Transport>,
    markup: Arc<dyn NewsMarkup>,
    fetcher: AnnouncementFetcher,
    landing_url: String,
    delay: Duration,
    max_cycles: Option<u64>,
}

impl NewsPoller {
    pub fn new(
        db: SqlitePool,
        transport: Arc<dyn Transport>,
        markup: Arc<dyn NewsMarkup>,
        landing_url: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            fetcher: AnnouncementFetcher::new(transport.clone(), markup.clone()),
            db,
            transport,
            markup,
            landing_url: landing_url.into(),
            delay,
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Loads the course set, validates the session, then polls.
    ///
    /// Courses added to the store after this point are not picked up.
    pub async fn start<F>(&self, shutdown: F) -> Result<PollStats, AppError>
    where
        F: Future<Output = ()>,
    {
        let courses = repository::fetch_tracked_courses(&self.db).await?;
        debug!("Loaded {} tracked courses", courses.len());

        session_guard::validate(self.transport.as_ref(), self.markup.as_ref(), &self.landing_url).await?;

        self.run(courses, shutdown).await
    }

    pub async fn run<F>(&self, mut courses: Vec<TrackedCourse>, shutdown: F) -> Result<PollStats, AppError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = PollStats::default();

        if courses.is_empty() {
            warn!("No courses to track; cycles will be empty");
        }

        loop {
            if self.max_cycles.is_some_and(|max| stats.cycles >= max) {
                debug!("Stopping after {} cycles", stats.cycles);
                return Ok(stats);
            }

            for course in courses.iter_mut() {
                let outcome = self.poll_course(course).await;
                stats.record(outcome);

                if self.pace(shutdown.as_mut()).await {
                    debug!("Interrupted, stopping poll loop");
                    return Ok(stats);
                }
            }

            if courses.is_empty() && self.pace(shutdown.as_mut()).await {
                debug!("Interrupted, stopping poll loop");
                return Ok(stats);
            }

            stats.cycles += 1;
            debug!("Cycle {} finished: {:?}", stats.cycles, stats);
        }
    }

    /// Every failure is absorbed here so one course never stops the others.
    async fn poll_course(&self, course: &mut TrackedCourse) -> CourseOutcome {
        let fetched = self
            .fetcher
            .fetch(&course.url)
            .await
            .inspect_err(|failure| error!("[{}] {}", course.short_name, failure))
            .ok();

        let kind = match should_update(course, fetched.as_ref()) {
            UpdateDecision::NoOp if fetched.is_some() => return CourseOutcome::Unchanged,
            UpdateDecision::NoOp => return CourseOutcome::FetchFailed,
            UpdateDecision::Apply(kind) => kind,
        };
        let Some(announcement) = fetched else {
            return CourseOutcome::FetchFailed;
        };

        match repository::apply_update(&self.db, &course.short_name, &announcement).await {
            Ok(()) => {
                debug!("[{}] stored {:?}", course.short_name, kind);
                course.record(&announcement);
                CourseOutcome::Updated
            }
            Err(e) => {
                error!("[{}] Failed to store update: {}", course.short_name, e);
                CourseOutcome::StoreFailed
            }
        }
    }

    /// Sleeps the per-course delay; returns true if shutdown was requested.
    async fn pace<F>(&self, shutdown: Pin<&mut F>) -> bool
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => false,
            _ = shutdown => true,
        }
    }
}
