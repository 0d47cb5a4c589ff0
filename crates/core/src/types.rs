/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Frame numbers as reported by the backend scanner.
pub type FrameNumber = i64;
