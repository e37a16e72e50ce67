use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of "now" for handlers. Production reads the system clock; tests
/// pin it so day boundaries never move under them.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl Clock {
    pub fn system() -> Self {
        Self(Arc::new(Utc::now))
    }

    #[cfg(test)]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self(Arc::new(move || at))
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}
