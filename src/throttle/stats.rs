//! # Tracker Observability
//!
//! Point-in-time views of a tracker: the per-key snapshot and lifetime
//! counters.
//!
//! ```text
//!     Throttle Stats:
//!     ├─ Window:
//!     │  ├─ Tracked Keys: 2
//!     │  └─ Limit: 3 events / 1000ms
//!     └─ Lifetime:
//!        ├─ Events Recorded: 7
//!        ├─ Admissions Refused: 1
//!        ├─ Windows Expired: 3
//!        └─ Full Resets: 0
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of [`RateWindowTracker::snapshot`](super::RateWindowTracker::snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyCount {
    /// Resource key, e.g. an endpoint name
    pub key: String,

    /// Events recorded in the key's live window (always ≥ 1)
    pub count: u32,
}

/// Lifetime counters and current size of a tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerStats {
    /// Keys with a live window right now.
    pub tracked_keys: usize,

    /// Configured event limit.
    pub max_events_per_window: u32,

    /// Configured window length.
    pub window_ms: u64,

    /// Calls to `record_event` since construction.
    pub total_recorded: u64,

    /// `can_admit` calls that returned `false`.
    pub total_refused: u64,

    /// Windows that elapsed and were dropped.
    pub total_expired: u64,

    /// Calls to `reset_all`.
    pub total_resets: u64,
}

impl TrackerStats {
    /// Human-readable multi-line report.
    pub fn summary(&self) -> String {
        [
            "Throttle Stats:".to_string(),
            "├─ Window:".to_string(),
            format!("│  ├─ Tracked Keys: {}", self.tracked_keys),
            format!(
                "│  └─ Limit: {} events / {}ms",
                self.max_events_per_window, self.window_ms
            ),
            "└─ Lifetime:".to_string(),
            format!("   ├─ Events Recorded: {}", self.total_recorded),
            format!("   ├─ Admissions Refused: {}", self.total_refused),
            format!("   ├─ Windows Expired: {}", self.total_expired),
            format!("   └─ Full Resets: {}", self.total_resets),
        ]
        .join("\n")
    }
}

impl fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackerStats {
        TrackerStats {
            tracked_keys: 2,
            max_events_per_window: 3,
            window_ms: 1000,
            total_recorded: 6,
            total_refused: 2,
            total_expired: 1,
            total_resets: 0,
        }
    }

    #[test]
    fn test_summary_and_display() {
        let stats = sample();
        let summary = stats.summary();
        assert!(summary.contains("Tracked Keys: 2"));
        assert!(summary.contains("Limit: 3 events / 1000ms"));
        assert!(summary.contains("Admissions Refused: 2"));
        assert_eq!(stats.to_string(), summary);
    }

    #[test]
    fn test_summary_tree_indentation() {
        let summary = sample().summary();
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[4], "└─ Lifetime:");
        assert_eq!(lines[5], "   ├─ Events Recorded: 6");
        assert_eq!(lines[8], "   └─ Full Resets: 0");
        for line in &lines[5..] {
            assert!(line.starts_with("   "), "{:?}", line);
        }
    }

    #[test]
    fn test_key_count_serializes() {
        let row = KeyCount {
            key: "api/users".to_string(),
            count: 2,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"key":"api/users","count":2}"#);
    }
}
