pub mod comments;
pub mod ids;
pub mod interactions;

pub use comments::CommentService;
pub use interactions::InteractionService;

use chrono::{DateTime, Utc};

/// Wall-clock source for anything that stamps identifiers.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
