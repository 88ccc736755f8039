//! Claim-check message and queue status types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a queue body is not a usable claim check.
#[derive(Debug, Error)]
pub enum ClaimCheckError {
    /// Body is not valid JSON.
    #[error("Malformed claim check: {0}")]
    Malformed(String),

    /// Required fields are absent or empty. Carries every missing name.
    #[error("Claim check missing required fields: {}", .0.join(","))]
    MissingFields(Vec<String>),
}

/// The claim-check message published per render job.
///
/// Carries a pointer to the stored payload rather than the payload itself,
/// keeping queue bodies small.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCheck {
    pub job_id: String,
    pub template: String,
    /// Object-store key of the rendered HTML payload.
    pub payload_location: String,
    pub compressed: bool,
    pub user_id: String,
    pub file_name: String,
}

/// Wire-lenient form used for parsing: every field optional so a structurally
/// broken message can be inspected and reported rather than silently dropped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaimCheck {
    job_id: Option<String>,
    template: Option<String>,
    payload_location: Option<String>,
    #[serde(default)]
    compressed: bool,
    user_id: Option<String>,
    file_name: Option<String>,
}

impl ClaimCheck {
    /// Serialize for the queue.
    pub fn to_json(&self) -> String {
        // Struct of plain strings and a bool cannot fail to serialize.
        serde_json::to_string(self).expect("claim check serialization")
    }

    /// Parse and validate a queue body.
    ///
    /// `jobId`, `template`, `payloadLocation` and `userId` are required;
    /// `compressed` defaults to false and `fileName` to `{template}.pdf`.
    pub fn parse(body: &str) -> Result<Self, ClaimCheckError> {
        let raw: RawClaimCheck =
            serde_json::from_str(body).map_err(|e| ClaimCheckError::Malformed(e.to_string()))?;

        let mut missing = Vec::new();
        let present = |field: &Option<String>, name: &str, missing: &mut Vec<String>| {
            match field {
                Some(v) if !v.is_empty() => true,
                _ => {
                    missing.push(name.to_string());
                    false
                }
            }
        };

        present(&raw.job_id, "jobId", &mut missing);
        present(&raw.template, "template", &mut missing);
        present(&raw.payload_location, "payloadLocation", &mut missing);
        present(&raw.user_id, "userId", &mut missing);

        if !missing.is_empty() {
            return Err(ClaimCheckError::MissingFields(missing));
        }

        let template = raw.template.unwrap_or_default();
        let file_name = raw
            .file_name
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| format!("{}.pdf", template));

        Ok(Self {
            job_id: raw.job_id.unwrap_or_default(),
            template,
            payload_location: raw.payload_location.unwrap_or_default(),
            compressed: raw.compressed,
            user_id: raw.user_id.unwrap_or_default(),
            file_name,
        })
    }
}

/// A message that exhausted or bypassed redelivery, kept for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetter {
    pub body: String,
    pub reason: String,
    pub delivery_count: u32,
}

/// Point-in-time queue counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStatus {
    pub queued: usize,
    pub dead_lettered: usize,
}
