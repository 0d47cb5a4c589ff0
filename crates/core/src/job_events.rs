//! Job events streamed over the status channel.
//!
//! The backend sends JSON text frames shaped
//! `{"type": "<kind>", "content": <string|number>}`. Each frame decodes
//! into one [`JobEvent`] variant; unknown kinds and malformed frames are
//! decode errors, which the channel drops.

use crate::error::CoreError;
use crate::lenient::value_to_text;

/// `job_status` content that marks the backend as idle.
pub const STATUS_IDLE: &str = "idle";

/// A typed event from the backend's status channel.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A line of encoder output.
    Output(String),
    /// An error line.
    Error(String),
    /// Raw progress payload, nominally a percentage.
    Progress(String),
    /// Backend job status (`"idle"` when no job is running).
    JobStatus(String),
    /// The job finished successfully.
    Success(String),
    /// The job was cancelled.
    Cancelled(String),
}

impl JobEvent {
    /// Decode one text frame. Only a JSON object with a string `type`
    /// is a frame.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let frame: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(text).map_err(|e| CoreError::Decode(e.to_string()))?;
        let kind = frame
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| CoreError::Decode("frame has no string \"type\"".into()))?;
        let content = frame
            .get("content")
            .map(value_to_text)
            .unwrap_or_default();

        match kind {
            "output" => Ok(Self::Output(content)),
            "error" => Ok(Self::Error(content)),
            "progress" => Ok(Self::Progress(content)),
            "job_status" => Ok(Self::JobStatus(content)),
            "success" => Ok(Self::Success(content)),
            "cancelled" => Ok(Self::Cancelled(content)),
            other => Err(CoreError::Decode(format!("unknown event type {other:?}"))),
        }
    }

    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Output(_) => "output",
            Self::Error(_) => "error",
            Self::Progress(_) => "progress",
            Self::JobStatus(_) => "job_status",
            Self::Success(_) => "success",
            Self::Cancelled(_) => "cancelled",
        }
    }

    /// The payload as text.
    pub fn content(&self) -> &str {
        match self {
            Self::Output(text)
            | Self::Error(text)
            | Self::Progress(text)
            | Self::JobStatus(text)
            | Self::Success(text)
            | Self::Cancelled(text) => text,
        }
    }

    /// Whether this event ends a running job.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::JobStatus(status) => status.trim() == STATUS_IDLE,
            Self::Success(_) | Self::Cancelled(_) => true,
            Self::Output(_) | Self::Error(_) | Self::Progress(_) => false,
        }
    }

    /// Progress as a percentage clamped to `0..=100`.
    ///
    /// `None` for non-progress events and for payloads that are not a
    /// finite number.
    pub fn progress_percent(&self) -> Option<f64> {
        let Self::Progress(raw) = self else {
            return None;
        };
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0))
    }
}
