//! Domain types for the image-sequence conversion client.
//!
//! Everything here is pure: settings, browse listings, sequence
//! descriptors, codec rules, the job form and its derived config, the
//! status-channel event type and the session state machine. Network
//! access lives in `seqconv-client`.

pub mod browse;
pub mod codec;
pub mod error;
pub mod job_config;
pub mod job_events;
pub mod lenient;
pub mod sequence;
pub mod session;
pub mod settings;
pub mod types;
