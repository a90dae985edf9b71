//! Structural decoding of reassembled shape blocks

use crate::models::FrameRecord;
use thiserror::Error;

/// Error type for shape record decoding.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The block is not valid JSON or does not match the frame schema
    #[error("invalid shape JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The block decoded but a field is out of range
    #[error("field '{field}' {message}")]
    InvalidField { field: &'static str, message: String },
}

/// Decode one shape's JSON object into a [`FrameRecord`].
///
/// The returned record has an empty name; the scanner attaches the cleaned
/// label. Unknown keys are ignored.
pub fn decode(json: &str) -> Result<FrameRecord, RecordError> {
    let record: FrameRecord = serde_json::from_str(json)?;
    validate(&record)?;
    Ok(record)
}

fn validate(record: &FrameRecord) -> Result<(), RecordError> {
    if record.source_size.w == 0 || record.source_size.h == 0 {
        return Err(RecordError::InvalidField {
            field: "sourceSize",
            message: format!(
                "must have positive dimensions, got {}x{}",
                record.source_size.w, record.source_size.h
            ),
        });
    }

    for (field, value) in [("pivot.x", record.pivot.x), ("pivot.y", record.pivot.y)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(RecordError::InvalidField {
                field,
                message: format!("must be within [0, 1], got {}", value),
            });
        }
    }

    Ok(())
}
