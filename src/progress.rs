//! Progress reporting hook.
//!
//! The pipeline announces human-readable phase strings ("Fetching board
//! game collection...") through an injected observer instead of touching
//! any UI directly. Advisory only — observers must not influence pipeline
//! behavior.

use tracing::{info, warn};

/// Receives advisory phase and condition messages during a pipeline run.
pub trait ProgressObserver: Send + Sync {
    /// A new pipeline phase has started.
    fn phase(&self, message: &str);

    /// The collection endpoint stayed busy through the whole attempt
    /// budget. The pipeline continues with an empty collection.
    fn busy(&self, message: &str) {
        self.phase(message);
    }
}

/// Observer that discards all notifications.
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn phase(&self, _message: &str) {}
}

/// Observer that forwards notifications to the tracing subscriber.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn phase(&self, message: &str) {
        info!("{}", message);
    }

    fn busy(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Phase announced before the collection fetch.
pub const PHASE_FETCHING_COLLECTION: &str = "Fetching board game collection...";

/// Phase announced before the recommendation request.
pub const PHASE_FETCHING_RECOMMENDATIONS: &str = "Fetching game recommendations...";

/// Advisory shown when the attempt budget is exhausted on busy responses.
pub const BUSY_ADVISORY: &str =
    "The collection service is busy. We tried multiple times but couldn't \
     fetch your collection. Please try again later.";

/// Advisory shown when the completion endpoint could not be reached.
pub const CREDENTIAL_ADVISORY: &str =
    "Error fetching game recommendations. Please check the API key.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl ProgressObserver for Recorder {
        fn phase(&self, message: &str) {
            self.seen.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_busy_defaults_to_phase() {
        let rec = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        rec.busy(BUSY_ADVISORY);
        assert_eq!(rec.seen.lock().unwrap().as_slice(), [BUSY_ADVISORY]);
    }
}
