use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;
use crate::models::{CourseRow, FetchedAnnouncement, TrackedCourse, format_news_date};

pub async fn fetch_tracked_courses(db: &SqlitePool) -> Result<Vec<TrackedCourse>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        "SELECT id, name, short_name, url, news_date, news, message FROM COURSE_NEWS ORDER BY id",
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(TrackedCourse::from).collect())
}

pub async fn find_course_by_short_name(
    db: &SqlitePool,
    short_name: &str,
) -> Result<Option<TrackedCourse>, AppError> {
    let row = sqlx::query_as::<_, CourseRow>(
        "SELECT id, name, short_name, url, news_date, news, message FROM COURSE_NEWS WHERE short_name = ?",
    )
    .bind(short_name)
    .fetch_optional(db)
    .await?;

    Ok(row.map(TrackedCourse::from))
}

/// Replaces the stored announcement triple for `short_name` and commits.
///
/// Emits the audit line only after the commit succeeded.
pub async fn apply_update(
    db: &SqlitePool,
    short_name: &str,
    announcement: &FetchedAnnouncement,
) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    let affected = sqlx::query(
        "UPDATE COURSE_NEWS SET news = ?, message = ?, news_date = ? WHERE short_name = ?",
    )
    .bind(&announcement.title)
    .bind(&announcement.body_text)
    .bind(announcement.timestamp.naive_utc())
    .bind(short_name)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if affected == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!("course {}", short_name)));
    }

    tx.commit().await?;

    info!(
        "\n==========\n{}\n{}\n{}\n{}",
        short_name,
        announcement.title,
        announcement.body_text,
        format_news_date(&announcement.timestamp)
    );

    Ok(())
}
