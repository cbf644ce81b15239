pub mod announcement;
pub mod course;

pub use announcement::{FetchedAnnouncement, format_news_date};
pub use course::TrackedCourse;
pub(crate) use course::CourseRow;
