//! Persisted operator settings.
//!
//! The backend keeps one flat JSON object of last-used values. The
//! client fetches it once at startup and writes the whole record back
//! after every launch or explicit save. Keys the client does not know
//! about are carried through untouched so a save never drops them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lenient::string_or_number;

/// Client-side fallbacks applied to missing or empty fields.
pub mod defaults {
    pub const FRAME_RATE: &str = "24";
    pub const SOURCE_FRAME_RATE: &str = "24";
    pub const DESIRED_DURATION: &str = "15";
    pub const CODEC: &str = "prores_422";
    pub const MP4_BITRATE: &str = "30";
    pub const PRORES_PROFILE: &str = "2";
    pub const PRORES_QSCALE: &str = "9";
}

/// Flat settings record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_input_folder: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_output_folder: String,
    /// Output frame rate.
    #[serde(default, deserialize_with = "string_or_number")]
    pub frame_rate: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub source_frame_rate: String,
    /// Desired output duration in seconds.
    #[serde(default, deserialize_with = "string_or_number")]
    pub desired_duration: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub codec: String,
    /// H.264/H.265 bitrate in Mbit/s.
    #[serde(default, deserialize_with = "string_or_number")]
    pub mp4_bitrate: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub prores_profile: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub prores_qscale: String,
    /// Keys this client does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            last_input_folder: String::new(),
            last_output_folder: String::new(),
            frame_rate: defaults::FRAME_RATE.into(),
            source_frame_rate: defaults::SOURCE_FRAME_RATE.into(),
            desired_duration: defaults::DESIRED_DURATION.into(),
            codec: defaults::CODEC.into(),
            mp4_bitrate: defaults::MP4_BITRATE.into(),
            prores_profile: defaults::PRORES_PROFILE.into(),
            prores_qscale: defaults::PRORES_QSCALE.into(),
            extra: BTreeMap::new(),
        }
    }
}

impl SettingsRecord {
    /// Parse a settings payload and fill every empty field with its default.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut record: Self = serde_json::from_value(value)?;
        record.apply_defaults();
        Ok(record)
    }

    /// Replace empty fields with the client defaults.
    ///
    /// The folder fields default to empty, so they are left alone.
    pub fn apply_defaults(&mut self) {
        let fallback = Self::default();
        fill(&mut self.frame_rate, fallback.frame_rate);
        fill(&mut self.source_frame_rate, fallback.source_frame_rate);
        fill(&mut self.desired_duration, fallback.desired_duration);
        fill(&mut self.codec, fallback.codec);
        fill(&mut self.mp4_bitrate, fallback.mp4_bitrate);
        fill(&mut self.prores_profile, fallback.prores_profile);
        fill(&mut self.prores_qscale, fallback.prores_qscale);
    }
}

fn fill(field: &mut String, fallback: String) {
    if field.trim().is_empty() {
        *field = fallback;
    }
}
