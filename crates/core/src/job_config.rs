//! Job form state and derivation of the submitted [`JobConfig`].
//!
//! [`JobForm`] holds the operator's current field values. The fields
//! that drive other fields are private: the codec can only change
//! through [`JobForm::apply_codec`], which keeps the output filename's
//! extension in step, and the input folder only changes through
//! [`SessionState`](crate::session::SessionState), which refuses it while
//! a job is running.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::codec::{apply_codec_extension, derive_prores_profile, split_extension, CodecFamily};
use crate::error::CoreError;
use crate::sequence::SequenceDescriptor;
use crate::settings::{defaults, SettingsRecord};
use crate::types::FrameNumber;

pub const DEFAULT_OUTPUT_FILENAME: &str = "output.mov";

/// How the backend should treat the audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioOption {
    #[default]
    #[serde(rename = "No Audio")]
    NoAudio,
    #[serde(rename = "Blank Audio Track")]
    BlankTrack,
}

impl AudioOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAudio => "No Audio",
            Self::BlankTrack => "Blank Audio Track",
        }
    }
}

/// Payload of `POST /api/convert`.
///
/// Only the fields of the codec's family are populated: `mp4_bitrate`
/// for H.264/H.265, `prores_profile` + `prores_qscale` for ProRes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobConfig {
    #[validate(length(min = 1, message = "input folder is required"))]
    pub input_folder: String,
    pub filename_pattern: String,
    #[validate(length(min = 1, message = "output folder is required"))]
    pub output_folder: String,
    pub output_filename: String,
    pub frame_rate: String,
    pub source_frame_rate: String,
    pub desired_duration: String,
    pub codec: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mp4_bitrate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prores_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prores_qscale: Option<String>,
    #[serde(default)]
    pub audio_option: AudioOption,
    pub start_frame: FrameNumber,
    pub end_frame: FrameNumber,
}

/// The operator-editable job form.
#[derive(Debug, Clone, PartialEq)]
pub struct JobForm {
    input_folder: String,
    codec: String,
    pub filename_pattern: String,
    pub start_frame: FrameNumber,
    pub end_frame: FrameNumber,
    /// Human-readable detected range, `None` when no sequence is loaded.
    pub range_label: Option<String>,
    pub output_folder: String,
    pub output_filename: String,
    pub frame_rate: String,
    pub source_frame_rate: String,
    pub desired_duration: String,
    pub mp4_bitrate: String,
    pub prores_qscale: String,
    pub audio_option: AudioOption,
}

impl Default for JobForm {
    fn default() -> Self {
        Self {
            input_folder: String::new(),
            codec: defaults::CODEC.into(),
            filename_pattern: String::new(),
            start_frame: 0,
            end_frame: 0,
            range_label: None,
            output_folder: String::new(),
            output_filename: DEFAULT_OUTPUT_FILENAME.into(),
            frame_rate: defaults::FRAME_RATE.into(),
            source_frame_rate: defaults::SOURCE_FRAME_RATE.into(),
            desired_duration: defaults::DESIRED_DURATION.into(),
            mp4_bitrate: defaults::MP4_BITRATE.into(),
            prores_qscale: defaults::PRORES_QSCALE.into(),
            audio_option: AudioOption::NoAudio,
        }
    }
}

impl JobForm {
    pub fn input_folder(&self) -> &str {
        &self.input_folder
    }

    pub(crate) fn set_input_folder(&mut self, folder: &str) {
        self.input_folder = folder.to_string();
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// Switch codec and rewrite the output filename's extension to match.
    pub fn apply_codec(&mut self, codec: &str) {
        self.codec = codec.to_string();
        self.output_filename = apply_codec_extension(&self.output_filename, codec);
    }

    /// Take pattern, frame range and filename stem from a detected sequence.
    ///
    /// The current extension is kept; a filename without one gets the
    /// codec's container extension.
    pub fn seed_from_sequence(&mut self, sequence: &SequenceDescriptor) {
        self.filename_pattern = sequence.pattern.clone();
        self.start_frame = sequence.start_frame;
        self.end_frame = sequence.end_frame;
        self.range_label = Some(sequence.range_label.clone());

        let extension = match split_extension(&self.output_filename).1 {
            "" => CodecFamily::of(&self.codec).container_extension(),
            ext => ext,
        };
        self.output_filename = format!("{}{extension}", sequence.output_stem());
    }

    /// Forget the detected sequence (scan found nothing).
    pub fn clear_sequence(&mut self) {
        self.filename_pattern.clear();
        self.start_frame = 0;
        self.end_frame = 0;
        self.range_label = None;
    }

    /// Fill the form from loaded settings.
    ///
    /// Folder fields already set on the form are kept.
    pub fn apply_settings(&mut self, settings: &SettingsRecord) {
        if self.input_folder.is_empty() {
            self.input_folder = settings.last_input_folder.clone();
        }
        if self.output_folder.is_empty() {
            self.output_folder = settings.last_output_folder.clone();
        }
        self.frame_rate = settings.frame_rate.clone();
        self.source_frame_rate = settings.source_frame_rate.clone();
        self.desired_duration = settings.desired_duration.clone();
        self.mp4_bitrate = settings.mp4_bitrate.clone();
        self.prores_qscale = settings.prores_qscale.clone();
        self.apply_codec(&settings.codec);
    }

    /// Write the form's values over `base`, keeping everything else.
    pub fn to_settings(&self, base: &SettingsRecord) -> SettingsRecord {
        let mut record = base.clone();
        record.last_input_folder = self.input_folder.clone();
        record.last_output_folder = self.output_folder.clone();
        record.frame_rate = self.frame_rate.clone();
        record.source_frame_rate = self.source_frame_rate.clone();
        record.desired_duration = self.desired_duration.clone();
        record.codec = self.codec.clone();
        record.mp4_bitrate = self.mp4_bitrate.clone();
        record.prores_qscale = self.prores_qscale.clone();
        if CodecFamily::of(&self.codec) == CodecFamily::ProRes {
            record.prores_profile = derive_prores_profile(&self.codec).to_string();
        }
        record
    }

    /// Derive a submission-ready config.
    ///
    /// Fails with [`CoreError::Validation`] when the input or output
    /// folder is empty.
    pub fn build(&self) -> Result<JobConfig, CoreError> {
        let (mp4_bitrate, prores_profile, prores_qscale) = match CodecFamily::of(&self.codec) {
            CodecFamily::Mp4 => (Some(self.mp4_bitrate.clone()), None, None),
            CodecFamily::ProRes => (
                None,
                Some(derive_prores_profile(&self.codec).to_string()),
                Some(self.prores_qscale.clone()),
            ),
            CodecFamily::Other => (None, None, None),
        };

        let config = JobConfig {
            input_folder: self.input_folder.trim().to_string(),
            filename_pattern: self.filename_pattern.clone(),
            output_folder: self.output_folder.trim().to_string(),
            output_filename: self.output_filename.clone(),
            frame_rate: self.frame_rate.clone(),
            source_frame_rate: self.source_frame_rate.clone(),
            desired_duration: self.desired_duration.clone(),
            codec: self.codec.clone(),
            mp4_bitrate,
            prores_profile,
            prores_qscale,
            audio_option: self.audio_option,
            start_frame: self.start_frame,
            end_frame: self.end_frame,
        };

        config.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            fields.sort();
            CoreError::Validation(format!("required fields are empty: {}", fields.join(", ")))
        })?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn shot_a() -> SequenceDescriptor {
        SequenceDescriptor {
            pattern: "shotA.%04d.exr".into(),
            head: "shotA.".into(),
            tail: ".exr".into(),
            padding: 4,
            start_frame: 1001,
            end_frame: 1240,
            count: 240,
            range_label: "1001-1240".into(),
        }
    }

    fn ready_form() -> JobForm {
        let mut form = JobForm::default();
        form.set_input_folder("/footage/shotA");
        form.output_folder = "/footage".into();
        form
    }

    #[test]
    fn seeding_from_scan_with_default_codec() {
        let mut form = JobForm::default();
        form.seed_from_sequence(&shot_a());

        assert_eq!(form.output_filename, "shotA.mov");
        assert_eq!(form.filename_pattern, "shotA.%04d.exr");
        assert_eq!(form.start_frame, 1001);
        assert_eq!(form.end_frame, 1240);
        assert_eq!(form.range_label.as_deref(), Some("1001-1240"));
    }

    #[test]
    fn seeding_keeps_current_extension() {
        let mut form = JobForm::default();
        form.apply_codec("h264");
        form.seed_from_sequence(&shot_a());
        assert_eq!(form.output_filename, "shotA.mp4");
    }

    #[test]
    fn seeding_without_extension_uses_codec_container() {
        let mut form = JobForm::default();
        form.output_filename = "untitled".into();
        form.seed_from_sequence(&shot_a());
        assert_eq!(form.output_filename, "shotA.mov");
    }

    #[test]
    fn switching_prores_to_h264_uses_bitrate() {
        let mut form = ready_form();
        form.apply_codec("prores_422");
        form.output_filename = "clip.mov".into();

        form.apply_codec("h264");
        assert_eq!(form.output_filename, "clip.mp4");

        let config = form.build().unwrap();
        assert_eq!(config.codec, "h264");
        assert_eq!(config.mp4_bitrate.as_deref(), Some(defaults::MP4_BITRATE));
        assert!(config.prores_profile.is_none());
        assert!(config.prores_qscale.is_none());

        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("prores_profile").is_none());
    }

    #[test]
    fn prores_config_carries_profile_and_qscale() {
        let mut form = ready_form();
        form.apply_codec("prores_422_lt");

        let config = form.build().unwrap();
        assert_eq!(config.prores_profile.as_deref(), Some("1"));
        assert_eq!(config.prores_qscale.as_deref(), Some(defaults::PRORES_QSCALE));
        assert!(config.mp4_bitrate.is_none());
    }

    #[test]
    fn other_codecs_carry_no_tuning_fields() {
        let mut form = ready_form();
        form.apply_codec("qtrle");

        let config = form.build().unwrap();
        assert!(config.mp4_bitrate.is_none());
        assert!(config.prores_profile.is_none());
        assert_eq!(config.output_filename, "output.mov");
    }

    #[test]
    fn empty_output_folder_is_rejected() {
        let mut form = ready_form();
        form.output_folder = String::new();

        let err = form.build().unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("output_folder"));
    }

    #[test]
    fn blank_input_folder_is_rejected() {
        let mut form = ready_form();
        form.set_input_folder("   ");
        assert_matches!(form.build(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn audio_option_serializes_as_label() {
        let mut form = ready_form();
        form.audio_option = AudioOption::BlankTrack;
        let json = serde_json::to_value(form.build().unwrap()).unwrap();
        assert_eq!(json["audio_option"], "Blank Audio Track");
    }

    #[test]
    fn settings_round_trip_through_form() {
        let mut settings = SettingsRecord::default();
        settings.last_input_folder = "/footage/shotA".into();
        settings.last_output_folder = "/footage".into();
        settings.codec = "h265".into();
        settings.frame_rate = "30".into();

        let mut form = JobForm::default();
        form.apply_settings(&settings);
        assert_eq!(form.input_folder(), "/footage/shotA");
        assert_eq!(form.output_filename, "output.mp4");

        assert_eq!(form.to_settings(&settings), settings);
    }

    #[test]
    fn prores_codec_updates_saved_profile() {
        let mut form = ready_form();
        form.apply_codec("prores_444");
        let record = form.to_settings(&SettingsRecord::default());
        assert_eq!(record.prores_profile, "4");
        assert_eq!(record.codec, "prores_444");
    }
}
