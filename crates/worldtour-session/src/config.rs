//! Host-chosen session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration fixed at session creation; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Time between automatic reveals. Hosts pick this in whole minutes;
    /// sub-minute values exist only for tests and demos.
    pub reveal_interval: Duration,

    /// Ceiling on total reveals (manual and automatic combined).
    /// `None` means "the catalog size at creation time".
    pub max_reveals: Option<u32>,
}

impl SessionConfig {
    /// Convenience constructor for the host-facing "reveal every N
    /// minutes" setting.
    pub fn with_interval_minutes(minutes: u32) -> Self {
        Self {
            reveal_interval: Duration::from_secs(u64::from(minutes) * 60),
            ..Self::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use. Called by
    /// the registry at creation. Rules:
    /// - a zero interval becomes the default (5 minutes)
    /// - an explicit reveal ceiling of 0 becomes 1
    pub fn validated(mut self) -> Self {
        if self.reveal_interval.is_zero() {
            warn!("reveal interval of zero — falling back to default");
            self.reveal_interval = Self::default().reveal_interval;
        }
        if self.max_reveals == Some(0) {
            warn!("max_reveals of zero — clamping to 1");
            self.max_reveals = Some(1);
        }
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_secs(5 * 60),
            max_reveals: None,
        }
    }
}
