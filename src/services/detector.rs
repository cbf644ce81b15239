use crate::models::{FetchedAnnouncement, TrackedCourse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The title differs from the stored one, or nothing was stored yet.
    NewAnnouncement,
    /// Same title, different date: the announcement was edited.
    Edited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    NoOp,
    /// Replace title, body and date together.
    Apply(ChangeKind),
}

/// Title is the primary signal, the date the secondary one. The body is
/// never compared; it is rewritten whenever either signal moves.
pub fn should_update(current: &TrackedCourse, fetched: Option<&FetchedAnnouncement>) -> UpdateDecision {
    let Some(fetched) = fetched else {
        return UpdateDecision::NoOp;
    };

    if current.news.as_deref() != Some(fetched.title.as_str()) {
        return UpdateDecision::Apply(ChangeKind::NewAnnouncement);
    }

    if current.news_date != Some(fetched.timestamp) {
        return UpdateDecision::Apply(ChangeKind::Edited);
    }

    UpdateDecision::NoOp
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn course(news: Option<&str>, news_date: Option<DateTime<Utc>>) -> TrackedCourse {
        TrackedCourse {
            id: 1,
            name: "Operating Systems".to_string(),
            short_name: "OS".to_string(),
            url: "https://portal.test/os".to_string(),
            news: news.map(str::to_string),
            message: news.map(|_| "old body".to_string()),
            news_date,
        }
    }

    fn fetched(title: &str, timestamp: DateTime<Utc>, body: &str) -> FetchedAnnouncement {
        FetchedAnnouncement {
            title: title.to_string(),
            body_text: body.to_string(),
            timestamp,
        }
    }

    #[test]
    fn failed_fetch_is_a_noop() {
        assert_eq!(should_update(&course(None, None), None), UpdateDecision::NoOp);
    }

    #[test]
    fn unchanged_title_and_date_is_a_noop_even_if_body_differs() {
        let current = course(Some("Midterm moved"), Some(at(1, 10)));
        let decision = should_update(&current, Some(&fetched("Midterm moved", at(1, 10), "new body")));
        assert_eq!(decision, UpdateDecision::NoOp);
    }

    #[test]
    fn changed_title_wins_regardless_of_date_order() {
        let current = course(Some("Midterm moved"), Some(at(5, 10)));
        for date in [at(1, 10), at(5, 10), at(9, 10)] {
            let decision = should_update(&current, Some(&fetched("Lab cancelled", date, "")));
            assert_eq!(decision, UpdateDecision::Apply(ChangeKind::NewAnnouncement));
        }
    }

    #[test]
    fn same_title_with_different_date_is_an_edit() {
        let current = course(Some("Midterm moved"), Some(at(1, 10)));
        let later = should_update(&current, Some(&fetched("Midterm moved", at(2, 9), "Room changed to A1")));
        let earlier = should_update(&current, Some(&fetched("Midterm moved", at(1, 9), "")));
        assert_eq!(later, UpdateDecision::Apply(ChangeKind::Edited));
        assert_eq!(earlier, UpdateDecision::Apply(ChangeKind::Edited));
    }

    #[test]
    fn never_polled_course_always_updates() {
        let decision = should_update(&course(None, None), Some(&fetched("Final exam schedule", at(3, 8), "B")));
        assert_eq!(decision, UpdateDecision::Apply(ChangeKind::NewAnnouncement));
    }
}
