//! Attendance policy configuration.
//!
//! The default policy is embedded at compile time via [`include_str!`] from
//! `policy/default.toml`. A replacement can be supplied as a file path,
//! either explicitly or through the `ROLLCALL_POLICY` environment variable.

use std::path::{Path, PathBuf};

use rollcall_attendance_models::{InvalidThresholdsError, StatusThresholds};
use rollcall_geofence::EvaluationOptions;
use serde::{Deserialize, Serialize};

/// Environment variable naming a policy file to load instead of the
/// embedded default.
pub const POLICY_ENV_VAR: &str = "ROLLCALL_POLICY";

/// The embedded default policy.
pub const DEFAULT_POLICY_TOML: &str = include_str!("../policy/default.toml");

/// Errors that can occur while loading a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The policy file could not be read.
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The policy is not valid TOML or has unknown keys.
    #[error("Invalid policy TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Status thresholds overlap or leave a bucket empty.
    #[error("Invalid policy: {0}")]
    Thresholds(#[from] InvalidThresholdsError),

    /// An accuracy setting is negative or not finite.
    #[error("Invalid policy: {field} must be a finite, non-negative number of meters (got {value})")]
    Accuracy {
        /// Name of the offending setting.
        field: &'static str,
        /// The value that was provided.
        value: f64,
    },
}

/// Everything that decides how a submission is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttendancePolicy {
    /// Sample filtering and malformed-sample handling.
    #[serde(default)]
    pub geofence: EvaluationOptions,
    /// Inside-count buckets for each status.
    #[serde(default)]
    pub thresholds: StatusThresholds,
}

impl AttendancePolicy {
    /// Parses and validates a policy from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the TOML is malformed or the values fail
    /// validation.
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(s)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads a policy file.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_toml_str(&contents)?;
        log::info!("Loaded attendance policy from {}", path.display());
        Ok(policy)
    }

    /// Resolves the active policy: `path` if given, else the file named by
    /// `ROLLCALL_POLICY`, else the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the chosen policy fails to load.
    pub fn load(path: Option<&Path>) -> Result<Self, PolicyError> {
        if let Some(path) = path {
            return Self::from_path(path);
        }

        match std::env::var_os(POLICY_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::from_path(Path::new(&path)),
            _ => {
                log::debug!("Using embedded default attendance policy");
                Self::from_toml_str(DEFAULT_POLICY_TOML)
            }
        }
    }

    /// Checks the accuracy settings and status thresholds.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (field, value) in [
            ("accuracy_threshold_m", self.geofence.accuracy_threshold_m),
            ("missing_accuracy_m", self.geofence.missing_accuracy_m),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicyError::Accuracy { field, value });
            }
        }
        self.thresholds.validate()?;
        Ok(())
    }

    /// Renders the policy as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
