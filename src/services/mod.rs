pub mod detector;
pub mod fetcher;
pub mod poller;
pub mod session_guard;

pub use detector::{ChangeKind, UpdateDecision, should_update};
pub use fetcher::AnnouncementFetcher;
pub use poller::{NewsPoller, PollStats, shutdown_on};
