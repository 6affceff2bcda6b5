use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BdayCalError, ErrorKind};

/// Where the orchestrator is in a refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    #[default]
    Idle,
    Fetching,
    Parsing,
    Computing,
    Ready,
    Failed,
}

impl RefreshState {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Fetching | Self::Parsing | Self::Computing)
    }
}

/// The most recent failed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Operator-facing health of the refresh loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub last_failure: Option<FailureInfo>,
    /// Reset to 0 by every successful pass
    pub consecutive_failures: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
}

impl Diagnostics {
    pub(crate) fn record_attempt(&mut self, at: DateTime<Utc>) {
        self.last_attempt = Some(at);
    }

    pub(crate) fn record_failure(&mut self, err: &BdayCalError, at: DateTime<Utc>) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure = Some(FailureInfo {
            kind: err.kind(),
            message: err.to_string(),
            at,
        });
    }

    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.consecutive_failures = 0;
        self.last_success = Some(at);
    }

    /// True while the last pass failed.
    pub fn is_degraded(&self) -> bool {
        self.consecutive_failures > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_failures_accumulate_until_success() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut diagnostics = Diagnostics::default();

        diagnostics.record_failure(&BdayCalError::Connect("refused".into()), at);
        diagnostics.record_failure(&BdayCalError::Auth("401".into()), at);
        assert_eq!(diagnostics.consecutive_failures, 2);
        assert_eq!(diagnostics.last_failure.as_ref().unwrap().kind, ErrorKind::Auth);
        assert!(diagnostics.is_degraded());

        diagnostics.record_success(at);
        assert_eq!(diagnostics.consecutive_failures, 0);
        assert!(!diagnostics.is_degraded());
        assert!(diagnostics.last_failure.is_some());
    }
}
