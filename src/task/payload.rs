// src/task/payload.rs

//! JSON payload handed to the external tool as its only argument.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::task::model::TaskRecord;
use crate::types::Envelope;

#[derive(Serialize)]
struct WrappedRef<'a> {
    frecklecute: &'a TaskRecord,
}

#[derive(Deserialize)]
struct Wrapped {
    frecklecute: TaskRecord,
}

/// Encode task records as a JSON array.
///
/// An empty list encodes as `[]`.
pub fn encode_payload(records: &[TaskRecord], envelope: Envelope) -> Result<String> {
    let payload = match envelope {
        Envelope::Plain => serde_json::to_string(records)?,
        Envelope::Frecklecute => {
            let wrapped: Vec<WrappedRef<'_>> = records
                .iter()
                .map(|frecklecute| WrappedRef { frecklecute })
                .collect();
            serde_json::to_string(&wrapped)?
        }
    };
    Ok(payload)
}

/// Decode a payload produced by [`encode_payload`] with the same envelope.
pub fn decode_payload(payload: &str, envelope: Envelope) -> Result<Vec<TaskRecord>> {
    let records = match envelope {
        Envelope::Plain => serde_json::from_str(payload)?,
        Envelope::Frecklecute => serde_json::from_str::<Vec<Wrapped>>(payload)?
            .into_iter()
            .map(|w| w.frecklecute)
            .collect(),
    };
    Ok(records)
}
