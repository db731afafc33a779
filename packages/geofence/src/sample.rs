//! Validation of raw location samples.
//!
//! Samples arrive as loosely-typed JSON objects. Each one is checked on its
//! own so that a single bad sample can be reported (or skipped) without
//! affecting the counts for the rest of the batch.

use rollcall_geofence_models::{RejectionReason, Sample, SampleField};
use serde_json::{Map, Value};

/// Validates a raw sample.
///
/// `latitude` and `longitude` are required numbers. `accuracy` is optional
/// and defaults to `missing_accuracy_m`. Values are not range-checked: any
/// well-formed number is accepted and left to the accuracy filter and the
/// ray cast. A string `timestamp` is kept; anything else in that slot is
/// ignored.
///
/// # Errors
///
/// Returns the first [`RejectionReason`] found.
pub fn validate(raw: &Value, missing_accuracy_m: f64) -> Result<Sample, RejectionReason> {
    let Value::Object(object) = raw else {
        return Err(RejectionReason::NotAnObject);
    };

    let latitude = required(object, SampleField::Latitude)?;
    let longitude = required(object, SampleField::Longitude)?;
    let accuracy = optional(object, SampleField::Accuracy)?.unwrap_or(missing_accuracy_m);

    let timestamp = object
        .get("timestamp")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Ok(Sample {
        latitude,
        longitude,
        accuracy,
        timestamp,
    })
}

fn optional(
    object: &Map<String, Value>,
    field: SampleField,
) -> Result<Option<f64>, RejectionReason> {
    let key: &str = field.as_ref();
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(RejectionReason::WrongType { field }),
    }
}

fn required(object: &Map<String, Value>, field: SampleField) -> Result<f64, RejectionReason> {
    optional(object, field)?.ok_or(RejectionReason::MissingField { field })
}
