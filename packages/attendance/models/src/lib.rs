#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Attendance status types.
//!
//! An attendance submission is scored by how many of its location samples
//! fell inside the classroom geofence. [`StatusThresholds`] maps that count
//! to an [`AttendanceStatus`].

use rollcall_geofence_models::{GeofenceTally, RejectedSample};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Outcome of an attendance submission.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AttendanceStatus {
    /// Enough samples inside the geofence for the full session.
    Present,
    /// Inside for part of the session.
    Late,
    /// Only a few samples inside.
    Short,
    /// Too few samples inside to count.
    #[serde(rename = "Invalid Attempt")]
    #[strum(serialize = "Invalid Attempt")]
    InvalidAttempt,
}

/// Minimum inside-sample counts for each status bucket.
///
/// Counts at or above `present` are [`AttendanceStatus::Present`], then
/// `late..present` is Late, `short..late` is Short, and anything below
/// `short` is an invalid attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusThresholds {
    pub present: usize,
    pub late: usize,
    pub short: usize,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            present: 8,
            late: 5,
            short: 2,
        }
    }
}

impl StatusThresholds {
    /// Creates thresholds after checking `present > late > short >= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidThresholdsError`] if the buckets would overlap or
    /// be empty.
    pub const fn new(
        present: usize,
        late: usize,
        short: usize,
    ) -> Result<Self, InvalidThresholdsError> {
        let thresholds = Self {
            present,
            late,
            short,
        };
        match thresholds.validate() {
            Ok(()) => Ok(thresholds),
            Err(e) => Err(e),
        }
    }

    /// Checks that every bucket is non-empty and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidThresholdsError`] describing the offending values.
    pub const fn validate(&self) -> Result<(), InvalidThresholdsError> {
        if self.present > self.late && self.late > self.short && self.short >= 1 {
            Ok(())
        } else {
            Err(InvalidThresholdsError {
                present: self.present,
                late: self.late,
                short: self.short,
            })
        }
    }

    /// Maps an inside-sample count to its status.
    #[must_use]
    pub const fn status_for(&self, inside_count: usize) -> AttendanceStatus {
        if inside_count >= self.present {
            AttendanceStatus::Present
        } else if inside_count >= self.late {
            AttendanceStatus::Late
        } else if inside_count >= self.short {
            AttendanceStatus::Short
        } else {
            AttendanceStatus::InvalidAttempt
        }
    }
}

/// Error returned for thresholds that do not form ordered, non-empty
/// buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidThresholdsError {
    pub present: usize,
    pub late: usize,
    pub short: usize,
}

impl std::fmt::Display for InvalidThresholdsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid status thresholds present={} late={} short={}: expected present > late > short >= 1",
            self.present, self.late, self.short
        )
    }
}

impl std::error::Error for InvalidThresholdsError {}

/// Result of evaluating one attendance submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvaluation {
    pub status: AttendanceStatus,
    /// Valid samples inside the geofence. Drives `status`.
    pub inside_count: usize,
    /// Samples that passed validation and the accuracy filter.
    pub valid_sample_count: usize,
    /// Well-formed samples dropped for poor accuracy.
    pub filtered_count: usize,
    /// Everything that was submitted.
    pub total_samples: usize,
    pub rejected: Vec<RejectedSample>,
}

impl AttendanceEvaluation {
    /// Combines a geofence tally with the status it maps to.
    #[must_use]
    pub fn from_tally(tally: GeofenceTally, thresholds: &StatusThresholds) -> Self {
        Self {
            status: thresholds.status_for(tally.inside_count),
            inside_count: tally.inside_count,
            valid_sample_count: tally.valid_sample_count,
            filtered_count: tally.filtered_count,
            total_samples: tally.total_samples,
            rejected: tally.rejected,
        }
    }
}

/// Per-status head counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Present, including manually-marked students.
    pub present: usize,
    pub late: usize,
    pub short: usize,
    pub invalid: usize,
    /// Students the instructor marked present by hand.
    pub manual: usize,
    pub total: usize,
}

impl SessionStats {
    /// Counts geofence-evaluated statuses plus `manual` hand-marked
    /// students, which count as present.
    pub fn tally(statuses: impl IntoIterator<Item = AttendanceStatus>, manual: usize) -> Self {
        let mut stats = Self {
            present: manual,
            manual,
            total: manual,
            ..Self::default()
        };

        for status in statuses {
            stats.total += 1;
            match status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Short => stats.short += 1,
                AttendanceStatus::InvalidAttempt => stats.invalid += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn boundary_counts_map_to_documented_buckets() {
        let thresholds = StatusThresholds::default();
        let cases = [
            (12, AttendanceStatus::Present),
            (8, AttendanceStatus::Present),
            (7, AttendanceStatus::Late),
            (5, AttendanceStatus::Late),
            (4, AttendanceStatus::Short),
            (2, AttendanceStatus::Short),
            (1, AttendanceStatus::InvalidAttempt),
            (0, AttendanceStatus::InvalidAttempt),
        ];
        for (count, expected) in cases {
            assert_eq!(thresholds.status_for(count), expected, "count {count}");
        }
    }

    #[test]
    fn every_count_maps_to_exactly_one_bucket() {
        let thresholds = StatusThresholds::default();
        let mut previous = AttendanceStatus::InvalidAttempt;
        for count in 0..=20 {
            let status = thresholds.status_for(count);
            // Ordering is Present < Late < Short < InvalidAttempt.
            assert!(status <= previous, "non-monotonic at {count}");
            previous = status;
        }
    }

    #[test]
    fn status_names() {
        assert_eq!(AttendanceStatus::InvalidAttempt.to_string(), "Invalid Attempt");
        assert_eq!(
            AttendanceStatus::from_str("Invalid Attempt").unwrap(),
            AttendanceStatus::InvalidAttempt
        );
        assert_eq!(
            serde_json::to_value(AttendanceStatus::InvalidAttempt).unwrap(),
            "Invalid Attempt"
        );
        assert_eq!(serde_json::to_value(AttendanceStatus::Late).unwrap(), "Late");
    }

    #[test]
    fn thresholds_must_be_ordered() {
        assert!(StatusThresholds::new(8, 5, 2).is_ok());
        assert!(StatusThresholds::new(5, 5, 2).is_err());
        assert!(StatusThresholds::new(8, 2, 5).is_err());
        assert!(StatusThresholds::new(8, 5, 0).is_err());
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = StatusThresholds::new(4, 3, 1).unwrap();
        assert_eq!(thresholds.status_for(4), AttendanceStatus::Present);
        assert_eq!(thresholds.status_for(3), AttendanceStatus::Late);
        assert_eq!(thresholds.status_for(1), AttendanceStatus::Short);
        assert_eq!(thresholds.status_for(0), AttendanceStatus::InvalidAttempt);
    }

    #[test]
    fn evaluation_uses_inside_count_not_valid_count() {
        let tally = GeofenceTally {
            inside_count: 1,
            valid_sample_count: 12,
            filtered_count: 0,
            total_samples: 12,
            rejected: Vec::new(),
        };
        let evaluation = AttendanceEvaluation::from_tally(tally, &StatusThresholds::default());
        assert_eq!(evaluation.status, AttendanceStatus::InvalidAttempt);
        assert_eq!(evaluation.valid_sample_count, 12);
    }

    #[test]
    fn session_stats_count_manual_as_present() {
        let stats = SessionStats::tally(
            [
                AttendanceStatus::Present,
                AttendanceStatus::Late,
                AttendanceStatus::Late,
                AttendanceStatus::InvalidAttempt,
            ],
            2,
        );
        assert_eq!(
            stats,
            SessionStats {
                present: 3,
                late: 2,
                short: 0,
                invalid: 1,
                manual: 2,
                total: 6,
            }
        );
    }
}
