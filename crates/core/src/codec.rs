//! Codec rules: container extension and ProRes profile mapping.
//!
//! Codec identifiers are the backend's strings (`h264`, `h265`,
//! `prores_422`, `prores_422_lt`, `prores_444`, `qtrle`, ...). The
//! client never validates them against a fixed list; it only derives
//! the family-specific fields from them.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the extension segment of a filename (`.mov`, `.mp4`).
static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\w+$").expect("valid regex"));

pub const MP4_EXTENSION: &str = ".mp4";
pub const MOV_EXTENSION: &str = ".mov";

/// ProRes profile index used for unknown ProRes variants.
pub const DEFAULT_PRORES_PROFILE: u8 = 2;

/// Encoder family a codec identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFamily {
    /// `h264` / `h265`: bitrate-driven, MP4 container.
    Mp4,
    /// Any `prores*` variant: profile + qscale driven, MOV container.
    ProRes,
    /// Anything else (e.g. `qtrle`): MOV container, no tuning fields.
    Other,
}

impl CodecFamily {
    pub fn of(codec: &str) -> Self {
        match codec {
            "h264" | "h265" => Self::Mp4,
            c if c.starts_with("prores") => Self::ProRes,
            _ => Self::Other,
        }
    }

    pub fn container_extension(self) -> &'static str {
        match self {
            Self::Mp4 => MP4_EXTENSION,
            Self::ProRes | Self::Other => MOV_EXTENSION,
        }
    }
}

/// Map a ProRes codec value (or bare variant name) to its profile index.
///
/// | variant  | index |
/// |----------|-------|
/// | `422`    | 2     |
/// | `422_lt` | 1     |
/// | `444`    | 4     |
/// | other    | 2     |
pub fn derive_prores_profile(codec_value: &str) -> u8 {
    let variant = codec_value.strip_prefix("prores_").unwrap_or(codec_value);
    match variant {
        "422" => 2,
        "422_lt" => 1,
        "444" => 4,
        _ => DEFAULT_PRORES_PROFILE,
    }
}

/// Split a filename into its stem and extension (`.ext` or empty).
pub fn split_extension(filename: &str) -> (&str, &str) {
    match EXTENSION_RE.find(filename) {
        Some(m) => (&filename[..m.start()], m.as_str()),
        None => (filename, ""),
    }
}

/// Rewrite a filename's extension for the given codec.
///
/// Only the extension segment changes; a filename without one gets the
/// extension appended.
pub fn apply_codec_extension(filename: &str, codec: &str) -> String {
    let (stem, _) = split_extension(filename);
    format!("{stem}{}", CodecFamily::of(codec).container_extension())
}
