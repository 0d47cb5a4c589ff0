//! Image-sequence descriptors reported by the backend scanner.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::FrameNumber;

/// One detected image sequence.
///
/// Only the first descriptor of a scan is acted upon; see
/// [`first_sequence`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDescriptor {
    /// printf-style filename pattern, e.g. `shotA.%04d.exr`.
    pub pattern: String,
    /// Filename stem before the frame number, e.g. `shotA.`.
    pub head: String,
    /// Filename remainder after the frame number, e.g. `.exr`.
    #[serde(default)]
    pub tail: String,
    #[serde(default)]
    pub padding: u32,
    #[serde(rename = "start")]
    pub start_frame: FrameNumber,
    #[serde(rename = "end")]
    pub end_frame: FrameNumber,
    /// Number of frames actually present (may be less than the range).
    #[serde(default)]
    pub count: u64,
    #[serde(rename = "range_string")]
    pub range_label: String,
}

impl SequenceDescriptor {
    /// Check the `start_frame <= end_frame` invariant.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.start_frame > self.end_frame {
            return Err(CoreError::Decode(format!(
                "sequence {} has start frame {} after end frame {}",
                self.pattern, self.start_frame, self.end_frame
            )));
        }
        Ok(())
    }

    /// Filename stem for the output movie: the head minus one trailing
    /// `.` or `_` separator.
    pub fn output_stem(&self) -> &str {
        self.head
            .strip_suffix('.')
            .or_else(|| self.head.strip_suffix('_'))
            .unwrap_or(&self.head)
    }
}

/// Pick the authoritative descriptor out of a scan result.
///
/// The first descriptor wins; an empty list means no sequence was found.
pub fn first_sequence(
    mut sequences: Vec<SequenceDescriptor>,
) -> Result<Option<SequenceDescriptor>, CoreError> {
    if sequences.is_empty() {
        return Ok(None);
    }
    let first = sequences.swap_remove(0);
    first.check()?;
    Ok(Some(first))
}
